//! Back-office endpoints.
//!
//! Access is enforced by the server: helpers reach orders, top-up review,
//! promo codes and support; everything else needs an admin. Catalog
//! mutations drop the local catalog cache so the next read is fresh.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};
use tsmarket_core::{
    BankCardId, CategoryId, MissionId, OrderId, PrizeId, ProductId, PromoId, RewardId, Role,
    TagId, ThemeId, TicketId, TicketStatus, TopupCodeId, TopupRequestId, UserId,
};

use super::ApiClient;
use crate::error::{ClientError, ValidationError};
use crate::models::{
    Ack, AdminSettings, AdminStats, BankCard, BankCardInput, Category, CategoryInput, ImageUpload,
    Mission, MissionInput, Order, OrderStatusUpdate, Product, ProductInput, ProfileUpdate,
    PromoCode, PromoCodeInput, ReturnApproved, Reward, RewardInput, SupportTicket, Tag, TagInput,
    Theme, ThemeInput, Toggled, TopupCode, TopupCodeInput, TopupRequest, UploadedImage, User,
    WheelPrize, WheelPrizeInput, XpUpdated, to_data_url,
};

#[derive(Serialize)]
struct RevenueParam {
    #[serde(with = "rust_decimal::serde::float")]
    revenue: Decimal,
}

#[derive(Serialize)]
struct IsAdminParam {
    is_admin: bool,
}

#[derive(Serialize)]
struct BalanceParam {
    #[serde(with = "rust_decimal::serde::float")]
    balance: Decimal,
}

#[derive(Serialize)]
struct XpParam {
    xp: u64,
}

#[derive(Serialize)]
struct RoleParam {
    role: Role,
}

#[derive(Serialize)]
struct NoteParam<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
}

#[derive(Serialize)]
struct DiscountParam {
    #[serde(with = "rust_decimal::serde::float")]
    discount_percent: Decimal,
}

#[derive(Serialize)]
struct TicketResponseParams<'a> {
    response: &'a str,
    status: &'static str,
}

impl ApiClient {
    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Dashboard counters.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        self.get(&["admin", "stats"]).await
    }

    /// Override the displayed revenue.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn set_revenue(&self, revenue: Decimal) -> Result<Ack, ClientError> {
        self.put_query(&["admin", "stats", "revenue"], &RevenueParam { revenue })
            .await
    }

    /// Go back to revenue summed from orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn reset_revenue(&self) -> Result<Ack, ClientError> {
        self.delete(&["admin", "stats", "revenue"]).await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// All accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<User>, ClientError> {
        self.get(&["admin", "users"]).await
    }

    /// Grant or revoke the legacy admin flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn set_user_admin(&self, user_id: &UserId, is_admin: bool) -> Result<Ack, ClientError> {
        self.put_query(&["admin", "users", user_id.as_str(), "admin"], &IsAdminParam { is_admin })
            .await
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_user(&self, user_id: &UserId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "users", user_id.as_str()]).await
    }

    /// Set a user's balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn set_user_balance(&self, user_id: &UserId, balance: Decimal) -> Result<Ack, ClientError> {
        let ack = self
            .put_query(&["admin", "users", user_id.as_str(), "balance"], &BalanceParam { balance })
            .await?;
        info!(%balance, "User balance set");
        Ok(ack)
    }

    /// Set a user's XP; the server recomputes the level.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn set_user_xp(&self, user_id: &UserId, xp: u64) -> Result<XpUpdated, ClientError> {
        self.put_query(&["admin", "users", user_id.as_str(), "xp"], &XpParam { xp })
            .await
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn set_user_role(&self, user_id: &UserId, role: Role) -> Result<Ack, ClientError> {
        let ack = self
            .put_query(&["admin", "users", user_id.as_str(), "role"], &RoleParam { role })
            .await?;
        info!(%role, "User role changed");
        Ok(ack)
    }

    /// Update the signed-in admin's own email, password or name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Ack, ClientError> {
        self.put_json(&["admin", "profile"], update).await
    }

    // =========================================================================
    // Top-ups
    // =========================================================================

    /// Prepaid top-up codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn topup_codes(&self) -> Result<Vec<TopupCode>, ClientError> {
        self.get(&["admin", "topup-codes"]).await
    }

    /// Mint a top-up code.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input))]
    pub async fn create_topup_code(&self, input: &TopupCodeInput) -> Result<TopupCode, ClientError> {
        self.post_json(&["admin", "topup-codes"], input).await
    }

    /// Delete a top-up code.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(code_id = %code_id))]
    pub async fn delete_topup_code(&self, code_id: &TopupCodeId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "topup-codes", code_id.as_str()]).await
    }

    /// Every user's top-up requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_topup_requests(&self) -> Result<Vec<TopupRequest>, ClientError> {
        self.get(&["admin", "topup-requests"]).await
    }

    /// Approve a top-up request and credit the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request was already processed or the API
    /// request fails.
    #[instrument(skip(self), fields(request_id = %request_id))]
    pub async fn approve_topup(&self, request_id: &TopupRequestId) -> Result<Ack, ClientError> {
        let ack = self
            .put_empty(&["admin", "topup-requests", request_id.as_str(), "approve"])
            .await?;
        info!("Top-up approved");
        Ok(ack)
    }

    /// Reject a top-up request with an optional note to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request was already processed or the API
    /// request fails.
    #[instrument(skip(self), fields(request_id = %request_id))]
    pub async fn reject_topup(
        &self,
        request_id: &TopupRequestId,
        note: Option<&str>,
    ) -> Result<Ack, ClientError> {
        self.put_query(
            &["admin", "topup-requests", request_id.as_str(), "reject"],
            &NoteParam { note },
        )
        .await
    }

    /// Shop settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_settings(&self) -> Result<AdminSettings, ClientError> {
        self.get(&["admin", "settings"]).await
    }

    /// Replace the shop settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, settings))]
    pub async fn update_admin_settings(&self, settings: &AdminSettings) -> Result<Ack, ClientError> {
        self.put_json(&["admin", "settings"], settings).await
    }

    // =========================================================================
    // Rewards and wheel
    // =========================================================================

    /// Add a level reward.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(level = input.level_required))]
    pub async fn create_reward(&self, input: &RewardInput) -> Result<Reward, ClientError> {
        self.post_json(&["admin", "rewards"], input).await
    }

    /// Edit a level reward.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(reward_id = %reward_id))]
    pub async fn update_reward(&self, reward_id: &RewardId, input: &RewardInput) -> Result<Ack, ClientError> {
        self.put_json(&["admin", "rewards", reward_id.as_str()], input)
            .await
    }

    /// Remove a level reward.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(reward_id = %reward_id))]
    pub async fn delete_reward(&self, reward_id: &RewardId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "rewards", reward_id.as_str()]).await
    }

    /// Add a wheel prize.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input))]
    pub async fn create_wheel_prize(&self, input: &WheelPrizeInput) -> Result<WheelPrize, ClientError> {
        self.post_json(&["admin", "wheel-prizes"], input).await
    }

    /// Edit a wheel prize.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(prize_id = %prize_id))]
    pub async fn update_wheel_prize(&self, prize_id: &PrizeId, input: &WheelPrizeInput) -> Result<Ack, ClientError> {
        self.put_json(&["admin", "wheel-prizes", prize_id.as_str()], input)
            .await
    }

    /// Remove a wheel prize.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(prize_id = %prize_id))]
    pub async fn delete_wheel_prize(&self, prize_id: &PrizeId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "wheel-prizes", prize_id.as_str()]).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Every order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, ClientError> {
        self.get(&["admin", "orders"]).await
    }

    /// One order with full details.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is unknown or the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn admin_order(&self, order_id: &OrderId) -> Result<Order, ClientError> {
        self.get(&["admin", "orders", order_id.as_str()]).await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns a validation error for statuses staff may not set directly,
    /// or an error if the API request fails.
    #[instrument(skip(self, update), fields(order_id = %order_id, status = %update.status))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        update: &OrderStatusUpdate,
    ) -> Result<Ack, ClientError> {
        if !update.status.is_staff_settable() {
            return Err(ValidationError::StatusNotSettable(update.status).into());
        }
        self.put_json(&["admin", "orders", order_id.as_str(), "status"], update)
            .await
    }

    /// Delete an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "orders", order_id.as_str()]).await
    }

    /// Accept a pending return and refund the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if no return is pending or the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn approve_return(&self, order_id: &OrderId) -> Result<ReturnApproved, ClientError> {
        self.post_empty(&["admin", "orders", order_id.as_str(), "approve-return"])
            .await
    }

    // =========================================================================
    // Promo codes
    // =========================================================================

    /// All promo codes.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn promo_codes(&self) -> Result<Vec<PromoCode>, ClientError> {
        self.get(&["admin", "promo-codes"]).await
    }

    /// Create a promo code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code exists or the API request fails.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_promo_code(&self, input: &PromoCodeInput) -> Result<PromoCode, ClientError> {
        self.post_json(&["admin", "promo-codes"], input).await
    }

    /// Delete a promo code.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(promo_id = %promo_id))]
    pub async fn delete_promo_code(&self, promo_id: &PromoId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "promo-codes", promo_id.as_str()]).await
    }

    /// Flip a promo code between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(promo_id = %promo_id))]
    pub async fn toggle_promo_code(&self, promo_id: &PromoId) -> Result<Toggled, ClientError> {
        self.put_empty(&["admin", "promo-codes", promo_id.as_str(), "toggle"])
            .await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Add a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ClientError> {
        let product = self.post_json(&["products"], input).await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(product_id = %product_id))]
    pub async fn update_product(&self, product_id: &ProductId, input: &ProductInput) -> Result<Product, ClientError> {
        let product = self
            .put_json(&["products", product_id.as_str()], input)
            .await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<Ack, ClientError> {
        let ack = self.delete(&["products", product_id.as_str()]).await?;
        self.invalidate_catalog();
        Ok(ack)
    }

    /// Set a product's own discount.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn set_product_discount(
        &self,
        product_id: &ProductId,
        discount_percent: Decimal,
    ) -> Result<Ack, ClientError> {
        let ack = self
            .put_query(
                &["admin", "products", product_id.as_str(), "discount"],
                &DiscountParam { discount_percent },
            )
            .await?;
        self.invalidate_catalog();
        Ok(ack)
    }

    /// Replace a product's tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, tags), fields(product_id = %product_id))]
    pub async fn set_product_tags(&self, product_id: &ProductId, tags: &[TagId]) -> Result<Ack, ClientError> {
        let ack = self
            .put_json(&["admin", "products", product_id.as_str(), "tags"], tags)
            .await?;
        self.invalidate_catalog();
        Ok(ack)
    }

    /// Add a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ClientError> {
        let category = self.post_json(&["categories"], input).await?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn delete_category(&self, category_id: &CategoryId) -> Result<Ack, ClientError> {
        let ack = self.delete(&["categories", category_id.as_str()]).await?;
        self.invalidate_catalog();
        Ok(ack)
    }

    /// Add a tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create_tag(&self, input: &TagInput) -> Result<Tag, ClientError> {
        self.post_json(&["admin", "tags"], input).await
    }

    /// Delete a tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(tag_id = %tag_id))]
    pub async fn delete_tag(&self, tag_id: &TagId) -> Result<Ack, ClientError> {
        let ack = self.delete(&["admin", "tags", tag_id.as_str()]).await?;
        self.invalidate_catalog();
        Ok(ack)
    }

    /// Add a storefront theme.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_theme(&self, input: &ThemeInput) -> Result<Theme, ClientError> {
        self.post_json(&["admin", "themes"], input).await
    }

    /// Delete a theme. Built-in themes are refused by the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(theme_id = %theme_id))]
    pub async fn delete_theme(&self, theme_id: &ThemeId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "themes", theme_id.as_str()]).await
    }

    /// Upload an image and get the URL to store on a product or theme.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-image MIME type or empty data,
    /// or an error if the API request fails.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(&self, mime: &str, bytes: &[u8]) -> Result<UploadedImage, ClientError> {
        if !mime.starts_with("image/") {
            return Err(ValidationError::NotAnImage(mime.to_string()).into());
        }
        if bytes.is_empty() {
            return Err(ValidationError::Required { field: "image" }.into());
        }
        let body = ImageUpload {
            image: to_data_url(mime, bytes),
        };
        self.post_json(&["admin", "upload-image"], &body).await
    }

    // =========================================================================
    // Missions
    // =========================================================================

    /// Every mission, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_missions(&self) -> Result<Vec<Mission>, ClientError> {
        self.get(&["admin", "missions"]).await
    }

    /// Add a mission.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_mission(&self, input: &MissionInput) -> Result<Mission, ClientError> {
        self.post_json(&["admin", "missions"], input).await
    }

    /// Edit a mission.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(mission_id = %mission_id))]
    pub async fn update_mission(&self, mission_id: &MissionId, input: &MissionInput) -> Result<Ack, ClientError> {
        self.put_json(&["admin", "missions", mission_id.as_str()], input)
            .await
    }

    /// Delete a mission.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(mission_id = %mission_id))]
    pub async fn delete_mission(&self, mission_id: &MissionId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "missions", mission_id.as_str()]).await
    }

    /// Flip a mission between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(mission_id = %mission_id))]
    pub async fn toggle_mission(&self, mission_id: &MissionId) -> Result<Toggled, ClientError> {
        self.put_empty(&["admin", "missions", mission_id.as_str(), "toggle"])
            .await
    }

    // =========================================================================
    // Support
    // =========================================================================

    /// Every support ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_tickets(&self) -> Result<Vec<SupportTicket>, ClientError> {
        self.get(&["admin", "support", "tickets"]).await
    }

    /// Answer a ticket and move it to `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the ticket is unknown or the API request fails.
    #[instrument(skip(self, response), fields(ticket_id = %ticket_id))]
    pub async fn respond_to_ticket(
        &self,
        ticket_id: &TicketId,
        response: &str,
        status: TicketStatus,
    ) -> Result<Ack, ClientError> {
        self.put_query(
            &["admin", "support", "tickets", ticket_id.as_str()],
            &TicketResponseParams {
                response,
                status: status.as_str(),
            },
        )
        .await
    }

    // =========================================================================
    // Bank cards
    // =========================================================================

    /// Every shop bank card, active or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_bank_cards(&self) -> Result<Vec<BankCard>, ClientError> {
        self.get(&["admin", "bank-cards"]).await
    }

    /// Add a shop bank card.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input))]
    pub async fn create_bank_card(&self, input: &BankCardInput) -> Result<BankCard, ClientError> {
        self.post_json(&["admin", "bank-cards"], input).await
    }

    /// Flip a bank card between active and inactive.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(card_id = %card_id))]
    pub async fn toggle_bank_card(&self, card_id: &BankCardId) -> Result<Toggled, ClientError> {
        self.put_empty(&["admin", "bank-cards", card_id.as_str(), "toggle"])
            .await
    }

    /// Delete a bank card.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(card_id = %card_id))]
    pub async fn delete_bank_card(&self, card_id: &BankCardId) -> Result<Ack, ClientError> {
        self.delete(&["admin", "bank-cards", card_id.as_str()]).await
    }
}
