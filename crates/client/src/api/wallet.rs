//! Wallet endpoints: top-up codes, card top-ups and withdrawals.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use super::ApiClient;
use crate::error::{ClientError, ValidationError};
use crate::models::{
    BankCard, Receipt, RedeemResult, TopupHistoryEntry, TopupRequest, TopupRequestInput,
    TopupSettings, WithdrawalInput, WithdrawalRequest,
};

/// Shortest accepted card number, in characters excluding spaces.
pub const CARD_NUMBER_MIN_LEN: usize = 16;

#[derive(Serialize)]
struct CodeParam<'a> {
    code: &'a str,
}

/// Check a top-up request before sending it.
///
/// # Errors
///
/// Returns the first failed precondition.
pub fn validate_topup(amount: Decimal, receipt: &Receipt) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount);
    }
    if receipt.is_empty() {
        return Err(ValidationError::MissingReceipt);
    }
    Ok(())
}

/// Check a withdrawal against the user's `balance` before sending it.
///
/// # Errors
///
/// Returns the first failed precondition.
pub fn validate_withdrawal(input: &WithdrawalInput, balance: Decimal) -> Result<(), ValidationError> {
    if input.amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount);
    }
    if input.amount > balance {
        return Err(ValidationError::AmountExceedsBalance { available: balance });
    }
    let digits = input.card_number.chars().filter(|c| !c.is_whitespace()).count();
    if digits < CARD_NUMBER_MIN_LEN {
        return Err(ValidationError::CardNumberTooShort {
            min: CARD_NUMBER_MIN_LEN,
        });
    }
    if input.card_type.trim().is_empty() {
        return Err(ValidationError::MissingCardType);
    }
    Ok(())
}

impl ApiClient {
    /// Redeem a prepaid top-up code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is unknown or already used.
    #[instrument(skip(self))]
    pub async fn redeem_code(&self, code: &str) -> Result<RedeemResult, ClientError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ValidationError::Required { field: "code" }.into());
        }
        let result: RedeemResult = self
            .post_query(&["topup", "redeem"], &CodeParam { code })
            .await?;
        info!(amount = %result.amount, new_balance = %result.new_balance, "Top-up code redeemed");
        Ok(result)
    }

    /// Balance changes from top-ups, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn topup_history(&self) -> Result<Vec<TopupHistoryEntry>, ClientError> {
        self.get(&["topup", "history"]).await
    }

    /// Card details to transfer money to before requesting a top-up.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn topup_settings(&self) -> Result<TopupSettings, ClientError> {
        self.get(&["topup", "settings"]).await
    }

    /// Submit a card-transfer top-up for review.
    ///
    /// Follow up with [`crate::TopupWatch`] to learn when it is approved.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a non-positive amount or a missing
    /// receipt, or an error if the API request fails.
    #[instrument(skip(self, receipt))]
    pub async fn request_topup(
        &self,
        amount: Decimal,
        receipt: &Receipt,
    ) -> Result<TopupRequest, ClientError> {
        validate_topup(amount, receipt)?;
        let body = TopupRequestInput {
            amount,
            receipt_url: receipt.to_receipt_url(),
        };
        let request: TopupRequest = self.post_json(&["topup", "request"], &body).await?;
        info!(request_id = %request.request_id, status = %request.status, "Top-up requested");
        Ok(request)
    }

    /// The user's top-up requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn topup_requests(&self) -> Result<Vec<TopupRequest>, ClientError> {
        self.get(&["topup", "requests"]).await
    }

    /// Ask for a payout of `input.amount` to a bank card.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the request fails the checks of
    /// [`validate_withdrawal`], or an error if the API request fails.
    #[instrument(skip(self, input), fields(amount = %input.amount))]
    pub async fn request_withdrawal(
        &self,
        input: &WithdrawalInput,
        balance: Decimal,
    ) -> Result<WithdrawalRequest, ClientError> {
        validate_withdrawal(input, balance)?;
        self.post_json(&["withdrawals", "request"], input).await
    }

    /// The user's withdrawal requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn withdrawal_requests(&self) -> Result<Vec<WithdrawalRequest>, ClientError> {
        self.get(&["withdrawals", "requests"]).await
    }

    /// Active shop bank cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn bank_cards(&self) -> Result<Vec<BankCard>, ClientError> {
        self.get(&["bank-cards"]).await
    }
}
