use uuid::Uuid;

use crate::domain::repository::TransactionRepository;
use crate::domain::types::TransactionStatus;
use crate::error::ApiError;

/// What a callback did to the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The terminal transition was applied.
    Applied,
    /// The transaction was already terminal; nothing changed. A redelivered
    /// callback lands here instead of double-applying.
    AlreadyFinal,
}

// ── ApplyStkCallback ─────────────────────────────────────────────────────────

pub struct StkCallbackInput {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
    pub result_code: i64,
    pub result_desc: String,
    /// `MpesaReceiptNumber` from the callback metadata; present on success.
    pub receipt_number: Option<String>,
}

/// Apply the provider's asynchronous push-payment result.
///
/// Result code 0 completes the transaction and confirms the ticket; anything
/// else fails the transaction, cancels the ticket, and restores the event
/// inventory. Both branches are PENDING-guarded atomic units in the
/// repository, so neither can half-apply or apply twice.
pub struct ApplyStkCallbackUseCase<X: TransactionRepository> {
    pub transactions: X,
}

impl<X: TransactionRepository> ApplyStkCallbackUseCase<X> {
    pub async fn execute(&self, input: StkCallbackInput) -> Result<CallbackOutcome, ApiError> {
        let transaction = self
            .transactions
            .find_by_checkout_request_id(&input.checkout_request_id)
            .await?
            .ok_or(ApiError::TransactionNotFound)?;

        let applied = if input.result_code == 0 {
            let receipt = input.receipt_number.ok_or(ApiError::MissingData)?;
            self.transactions
                .complete_pending(transaction.id, &receipt)
                .await?
        } else {
            self.transactions
                .fail_pending(transaction.id, &input.result_desc)
                .await?
        };

        Ok(if applied {
            CallbackOutcome::Applied
        } else {
            CallbackOutcome::AlreadyFinal
        })
    }
}

// ── ValidateC2b ──────────────────────────────────────────────────────────────

pub struct C2bValidationInput {
    /// `BillRefNumber`: the ticket id the payer cited.
    pub bill_ref: String,
    /// `TransAmount` in whole currency units.
    pub amount: i64,
}

/// Answer the provider's pre-payment validation: accept only when the bill
/// reference resolves to a PENDING transaction with a matching amount.
pub struct ValidateC2bUseCase<X: TransactionRepository> {
    pub transactions: X,
}

impl<X: TransactionRepository> ValidateC2bUseCase<X> {
    pub async fn execute(&self, input: C2bValidationInput) -> Result<bool, ApiError> {
        let Ok(ticket_id) = input.bill_ref.parse::<Uuid>() else {
            return Ok(false);
        };
        let Some(transaction) = self.transactions.find_by_ticket_id(ticket_id).await? else {
            return Ok(false);
        };
        Ok(transaction.status == TransactionStatus::Pending && transaction.amount == input.amount)
    }
}

// ── ConfirmC2b ───────────────────────────────────────────────────────────────

pub struct C2bConfirmationInput {
    pub bill_ref: String,
    /// `TransID`: the provider's receipt for the completed payment.
    pub trans_id: String,
}

/// Outcome of a C2B confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C2bConfirmation {
    Applied,
    AlreadyFinal,
    /// The bill reference did not resolve to a transaction. Still
    /// acknowledged to the provider — the money has already moved and the
    /// provider does not retry confirmations.
    UnknownReference,
}

pub struct ConfirmC2bUseCase<X: TransactionRepository> {
    pub transactions: X,
}

impl<X: TransactionRepository> ConfirmC2bUseCase<X> {
    pub async fn execute(&self, input: C2bConfirmationInput) -> Result<C2bConfirmation, ApiError> {
        let Ok(ticket_id) = input.bill_ref.parse::<Uuid>() else {
            return Ok(C2bConfirmation::UnknownReference);
        };
        let Some(transaction) = self.transactions.find_by_ticket_id(ticket_id).await? else {
            return Ok(C2bConfirmation::UnknownReference);
        };
        let applied = self
            .transactions
            .complete_pending(transaction.id, &input.trans_id)
            .await?;
        Ok(if applied {
            C2bConfirmation::Applied
        } else {
            C2bConfirmation::AlreadyFinal
        })
    }
}
