use uuid::Uuid;

use crate::domain::repository::{
    PaymentGateway, StkPushRequest, TicketRepository, TransactionRepository,
};
use crate::domain::types::{PaymentMethod, TransactionStatus, normalize_phone_number};
use crate::error::ApiError;

// ── InitiatePayment ──────────────────────────────────────────────────────────

pub struct InitiatePaymentInput {
    pub ticket_id: Uuid,
    pub phone_number: Option<String>,
    /// `"stk"` or `"c2b"`.
    pub method: String,
}

/// Outcome of a payment initiation.
#[derive(Debug, Clone)]
pub enum PaymentInitiation {
    /// The provider accepted the push; the phone will prompt for a PIN.
    StkPush { checkout_request_id: String },
    /// Manual paybill details for an out-of-band payment. No state changed.
    Paybill {
        paybill: String,
        account_number: String,
        amount: i64,
    },
}

pub struct InitiatePaymentUseCase<T, X, G>
where
    T: TicketRepository,
    X: TransactionRepository,
    G: PaymentGateway,
{
    pub tickets: T,
    pub transactions: X,
    pub gateway: G,
    pub shortcode: String,
    pub public_base_url: String,
}

impl<T, X, G> InitiatePaymentUseCase<T, X, G>
where
    T: TicketRepository,
    X: TransactionRepository,
    G: PaymentGateway,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: InitiatePaymentInput,
    ) -> Result<PaymentInitiation, ApiError> {
        let method =
            PaymentMethod::parse(&input.method).ok_or(ApiError::InvalidPaymentMethod)?;

        let ticket = self
            .tickets
            .find_by_id(input.ticket_id)
            .await?
            .ok_or(ApiError::TicketNotFound)?;
        if ticket.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        let transaction = self
            .transactions
            .find_by_ticket_id(ticket.id)
            .await?
            .ok_or(ApiError::TransactionNotFound)?;
        if transaction.status == TransactionStatus::Completed {
            return Err(ApiError::AlreadyPaid);
        }

        match method {
            PaymentMethod::StkPush => {
                let raw = input.phone_number.ok_or(ApiError::MissingData)?;
                let phone_number =
                    normalize_phone_number(&raw).ok_or(ApiError::InvalidPhoneNumber)?;

                let response = self
                    .gateway
                    .stk_push(&StkPushRequest {
                        phone_number: phone_number.clone(),
                        // The provider rejects zero-amount requests.
                        amount: transaction.amount.max(1),
                        account_reference: ticket.id.to_string(),
                        callback_url: format!("{}/payment/callback", self.public_base_url),
                    })
                    .await?;

                self.transactions
                    .set_push_request(
                        transaction.id,
                        &phone_number,
                        &response.merchant_request_id,
                        &response.checkout_request_id,
                    )
                    .await?;

                Ok(PaymentInitiation::StkPush {
                    checkout_request_id: response.checkout_request_id,
                })
            }
            PaymentMethod::C2b => Ok(PaymentInitiation::Paybill {
                paybill: self.shortcode.clone(),
                account_number: ticket.id.to_string(),
                amount: transaction.amount,
            }),
        }
    }
}

// ── RegisterC2b ──────────────────────────────────────────────────────────────

pub struct RegisterC2bUseCase<G: PaymentGateway> {
    pub gateway: G,
    pub public_base_url: String,
}

impl<G: PaymentGateway> RegisterC2bUseCase<G> {
    pub async fn execute(&self) -> Result<(), ApiError> {
        self.gateway
            .register_c2b(
                &format!("{}/payment/c2b/validation", self.public_base_url),
                &format!("{}/payment/c2b/confirmation", self.public_base_url),
            )
            .await
    }
}
