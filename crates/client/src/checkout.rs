//! Checkout orchestration.
//!
//! Ties the cart, the signed-in user and an optional promo code together:
//! shows a discount preview, checks the client-side preconditions and places
//! the order. The preview is informational; the server prices the order
//! again and its answer is what the user is charged.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};
use tsmarket_core::{Percent, Role};
use tsmarket_core::pricing::{CheckoutQuote, DiscountInputs, quote};

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::error::{ClientError, ValidationError};
use crate::models::{CreateOrderRequest, PlacedOrder, User, is_top10};

/// Minimum delivery address length, after trimming.
pub const ADDRESS_MIN_LEN: usize = 5;

/// Minimum phone number length, after trimming.
pub const PHONE_MIN_LEN: usize = 7;

/// A promo code the server accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedPromo {
    pub code: String,
    pub percent: Percent,
}

/// Where to deliver the order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryDetails {
    pub address: String,
    pub phone: String,
}

/// Discount preview shown before submitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub quote: CheckoutQuote,
    pub is_top10: bool,
    pub promo: Option<AppliedPromo>,
    /// XP the order would award.
    pub xp_to_gain: u64,
}

/// A placed order and the user as the server sees them afterwards.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub placed: PlacedOrder,
    /// `None` if the refresh after placing the order failed.
    pub user: Option<User>,
}

/// Checkout state for one cart.
pub struct Checkout {
    client: ApiClient,
    cart: Arc<CartStore>,
    promo: Mutex<Option<AppliedPromo>>,
}

impl Checkout {
    #[must_use]
    pub fn new(client: ApiClient, cart: Arc<CartStore>) -> Self {
        Self {
            client,
            cart,
            promo: Mutex::new(None),
        }
    }

    fn promo_slot(&self) -> MutexGuard<'_, Option<AppliedPromo>> {
        self.promo.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// The promo code currently applied, if any.
    #[must_use]
    pub fn applied_promo(&self) -> Option<AppliedPromo> {
        self.promo_slot().clone()
    }

    pub fn clear_promo(&self) {
        self.promo_slot().take();
    }

    /// Validate a promo code with the server and apply it.
    ///
    /// Blank input changes nothing. On failure any previously applied code
    /// is dropped.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection, or [`ValidationError::InvalidPromo`]
    /// if the server answered without marking the code valid.
    #[instrument(skip(self))]
    pub async fn apply_promo(&self, code: &str) -> Result<Option<AppliedPromo>, ClientError> {
        let code = code.trim();
        if code.is_empty() {
            return Ok(self.applied_promo());
        }

        let validation = match self.client.validate_promo(code).await {
            Ok(v) if v.valid => v,
            Ok(_) => {
                self.clear_promo();
                return Err(ValidationError::InvalidPromo.into());
            }
            Err(e) => {
                self.clear_promo();
                return Err(e);
            }
        };

        let applied = AppliedPromo {
            code: if validation.code.is_empty() {
                code.to_string()
            } else {
                validation.code
            },
            percent: Percent::new(validation.discount_percent),
        };
        info!(code = %applied.code, percent = %applied.percent, "Promo code applied");
        *self.promo_slot() = Some(applied.clone());
        Ok(Some(applied))
    }

    /// Whether `user` is on the top-10 leaderboard. Admins never are.
    ///
    /// A leaderboard that cannot be loaded counts as not top-10.
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    pub async fn is_top10(&self, user: &User) -> bool {
        if user.effective_role() == Role::Admin {
            return false;
        }
        match self.client.leaderboard().await {
            Ok(entries) => is_top10(&entries, &user.user_id),
            Err(e) => {
                warn!(error = %e, "Failed to load leaderboard, assuming not top-10");
                false
            }
        }
    }

    /// Discount preview for the current cart and promo.
    #[must_use]
    pub fn summarize(&self, user: &User, is_top10: bool) -> CheckoutSummary {
        let promo = self.applied_promo();
        let quote = quote(&DiscountInputs {
            subtotal: self.cart.total(),
            user_level: user.level,
            is_top10,
            promo_percent: promo.as_ref().map_or(Percent::ZERO, |p| p.percent),
        });
        CheckoutSummary {
            quote,
            is_top10,
            promo,
            xp_to_gain: self.cart.total_xp(),
        }
    }

    /// Discount preview, looking up the user's top-10 status first.
    pub async fn summary(&self, user: &User) -> CheckoutSummary {
        let top10 = self.is_top10(user).await;
        self.summarize(user, top10)
    }

    /// Check the preconditions and place the order.
    ///
    /// Checks run in order: signed in, cart not empty, address and phone
    /// long enough, balance covers the previewed total. On success the cart
    /// and promo are cleared and the user is reloaded; on failure the cart
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition, or the server's rejection.
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        user: Option<&User>,
        details: &DeliveryDetails,
    ) -> Result<CheckoutOutcome, ClientError> {
        let user = match user {
            Some(user) if self.client.session().is_authenticated() => user,
            _ => return Err(ValidationError::NotAuthenticated.into()),
        };
        if self.cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        let address = details.address.trim();
        if address.chars().count() < ADDRESS_MIN_LEN {
            return Err(ValidationError::AddressTooShort {
                min: ADDRESS_MIN_LEN,
            }
            .into());
        }
        let phone = details.phone.trim();
        if phone.chars().count() < PHONE_MIN_LEN {
            return Err(ValidationError::PhoneTooShort { min: PHONE_MIN_LEN }.into());
        }

        let summary = self.summary(user).await;
        check_balance(summary.quote.final_total, user.balance)?;

        let order = CreateOrderRequest {
            items: self.cart.order_items(),
            delivery_address: address.to_string(),
            phone_number: phone.to_string(),
            promo_code: summary.promo.map(|p| p.code),
        };
        let placed = self.client.place_order(&order).await?;
        info!(
            order_id = %placed.order.order_id,
            xp_gained = placed.xp_gained,
            level_up = placed.level_up,
            "Order placed"
        );

        if let Err(e) = self.cart.clear() {
            warn!(error = %e, "Order placed but the cart could not be cleared");
        }
        self.clear_promo();

        let user = match self.client.refresh_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Failed to refresh user after order");
                None
            }
        };

        Ok(CheckoutOutcome { placed, user })
    }
}

fn check_balance(required: Decimal, available: Decimal) -> Result<(), ValidationError> {
    if available < required {
        return Err(ValidationError::InsufficientBalance {
            required,
            available,
        });
    }
    Ok(())
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout")
            .field("cart", &self.cart)
            .field("promo", &self.applied_promo())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::cart::LineOptions;
    use crate::config::ClientConfig;
    use crate::models::Product;
    use crate::storage::MemoryStore;

    fn checkout() -> Checkout {
        let storage = Arc::new(MemoryStore::new());
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        let client = ApiClient::new(&config, storage.clone()).unwrap();
        Checkout::new(client, Arc::new(CartStore::load(storage)))
    }

    fn user(level: u32, balance: i64) -> User {
        serde_json::from_value(json!({
            "user_id": "user_1",
            "email": "a@example.com",
            "name": "Ali",
            "level": level,
            "balance": balance,
        }))
        .unwrap()
    }

    fn product(price: i64) -> Product {
        serde_json::from_value(json!({
            "product_id": "prod_1",
            "name": "Hoodie",
            "price": price,
            "xp_reward": 20,
        }))
        .unwrap()
    }

    #[test]
    fn test_summarize_composes_level_and_promo() {
        let checkout = checkout();
        checkout
            .cart()
            .add_item(&product(500), 2, LineOptions::default())
            .unwrap();
        *checkout.promo_slot() = Some(AppliedPromo {
            code: "SAVE10".to_string(),
            percent: Percent::whole(10),
        });

        let summary = checkout.summarize(&user(5, 0), false);
        assert_eq!(summary.quote.subtotal, Decimal::from(1000));
        assert_eq!(summary.quote.final_total, Decimal::from(855));
        assert_eq!(summary.xp_to_gain, 40);

        let doubled = checkout.summarize(&user(5, 0), true);
        assert_eq!(doubled.quote.level_discount_percent, Percent::whole(10));
        assert_eq!(doubled.quote.promo_discount_percent, Percent::whole(20));
    }

    #[tokio::test]
    async fn test_submit_requires_session_first() {
        let checkout = checkout();
        let err = checkout
            .submit(Some(&user(1, 100)), &DeliveryDetails::default())
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_cart_before_address() {
        let checkout = checkout();
        checkout
            .client
            .session()
            .set_token(&secrecy::SecretString::from("tok".to_string()))
            .unwrap();
        let err = checkout
            .submit(Some(&user(1, 100)), &DeliveryDetails::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_submit_checks_address_then_phone() {
        let checkout = checkout();
        checkout
            .client
            .session()
            .set_token(&secrecy::SecretString::from("tok".to_string()))
            .unwrap();
        checkout
            .cart()
            .add_item(&product(10), 1, LineOptions::default())
            .unwrap();

        let details = DeliveryDetails {
            address: "  ab  ".to_string(),
            phone: "1".to_string(),
        };
        let err = checkout.submit(Some(&user(1, 100)), &details).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::AddressTooShort { min: 5 })
        ));

        let details = DeliveryDetails {
            address: "Rudaki 12".to_string(),
            phone: " 12345 ".to_string(),
        };
        let err = checkout.submit(Some(&user(1, 100)), &details).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::PhoneTooShort { min: 7 })
        ));
        assert!(!checkout.cart().is_empty());
    }

    #[test]
    fn test_check_balance() {
        assert!(check_balance(Decimal::from(100), Decimal::from(100)).is_ok());
        assert_eq!(
            check_balance(Decimal::from(101), Decimal::from(100)),
            Err(ValidationError::InsufficientBalance {
                required: Decimal::from(101),
                available: Decimal::from(100),
            })
        );
    }

    #[tokio::test]
    async fn test_blank_promo_is_noop() {
        let checkout = checkout();
        assert_eq!(checkout.apply_promo("   ").await.unwrap(), None);
    }
}
