#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::pagination::PageRequest;
use crate::domain::types::{
    Event, EventPatch, Role, Ticket, TicketDetail, Transaction, User,
};
use crate::error::ApiError;

/// Repository for the locally mirrored identity-provider users.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn create(&self, user: &User) -> Result<(), ApiError>;

    /// Refresh a mirror row from a provider snapshot. `role: None` leaves the
    /// stored role untouched (sync never demotes on claim absence).
    async fn update_mirror(
        &self,
        id: Uuid,
        external_id: &str,
        email: &str,
        name: &str,
        role: Option<Role>,
    ) -> Result<(), ApiError>;

    /// Explicit administrative role assignment. Returns `false` if no such user.
    async fn update_role(&self, id: Uuid, role: Role) -> Result<bool, ApiError>;

    /// Remove the mirror row for a deleted provider user. Returns `false` if
    /// no row existed.
    async fn delete_by_external_id(&self, external_id: &str) -> Result<bool, ApiError>;
}

/// Repository for purchasable events.
pub trait EventRepository: Send + Sync {
    /// List events ordered by event date ascending.
    async fn list(&self, page: PageRequest) -> Result<Vec<Event>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>, ApiError>;
    async fn create(&self, event: &Event) -> Result<(), ApiError>;

    /// Apply a partial update, returning the updated event, or `None` if it
    /// does not exist.
    async fn update(&self, id: Uuid, patch: &EventPatch) -> Result<Option<Event>, ApiError>;

    /// Delete an event. Returns `false` if no row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for ticket reservations.
pub trait TicketRepository: Send + Sync {
    /// Atomically decrement the event inventory by `ticket.quantity` and
    /// insert the ticket with its transaction. Fails with
    /// [`ApiError::InsufficientTickets`] when the inventory is short, in which
    /// case nothing is written.
    async fn reserve(&self, ticket: &Ticket, transaction: &Transaction) -> Result<(), ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ticket>, ApiError>;
    async fn find_detail(&self, id: Uuid) -> Result<Option<TicketDetail>, ApiError>;

    /// The user's tickets ordered by creation time descending, with the
    /// referenced event and owned transaction embedded.
    async fn list_details_by_user(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, ApiError>;
}

/// Repository for payment transactions.
pub trait TransactionRepository: Send + Sync {
    async fn find_by_ticket_id(&self, ticket_id: Uuid) -> Result<Option<Transaction>, ApiError>;
    async fn find_by_checkout_request_id(
        &self,
        checkout_request_id: &str,
    ) -> Result<Option<Transaction>, ApiError>;

    /// Store the provider correlation ids and the submitted phone number
    /// after a push payment is accepted. Status stays PENDING.
    async fn set_push_request(
        &self,
        id: Uuid,
        phone_number: &str,
        merchant_request_id: &str,
        checkout_request_id: &str,
    ) -> Result<(), ApiError>;

    /// Terminal success transition, guarded on current status PENDING:
    /// transaction → COMPLETED with the receipt, sibling ticket → CONFIRMED,
    /// as one atomic unit. Returns `false` (no-op) when the transaction is
    /// already terminal — a redelivered callback changes nothing.
    async fn complete_pending(&self, id: Uuid, receipt_number: &str) -> Result<bool, ApiError>;

    /// Terminal failure transition, same PENDING guard: transaction → FAILED,
    /// ticket → CANCELLED, and the event inventory restored by the ticket's
    /// quantity, as one atomic unit. Returns `false` when already terminal,
    /// in which case the inventory is not restored again.
    async fn fail_pending(&self, id: Uuid, failure_reason: &str) -> Result<bool, ApiError>;
}

/// A push-payment request submitted to the provider.
#[derive(Debug, Clone)]
pub struct StkPushRequest {
    /// Normalized `254…` subscriber number.
    pub phone_number: String,
    /// Whole currency units, already clamped to ≥ 1.
    pub amount: i64,
    /// Encodes the ticket id; echoed back on the paybill statement.
    pub account_reference: String,
    pub callback_url: String,
}

/// Provider correlation ids returned for an accepted push request.
#[derive(Debug, Clone)]
pub struct StkPushResponse {
    pub merchant_request_id: String,
    pub checkout_request_id: String,
}

/// Outbound port for the mobile-money provider.
pub trait PaymentGateway: Send + Sync {
    /// Submit a push payment. Transport failures and provider error payloads
    /// both surface as [`ApiError::UpstreamFailure`].
    async fn stk_push(&self, request: &StkPushRequest) -> Result<StkPushResponse, ApiError>;

    /// Register the pull-payment validation and confirmation URLs.
    async fn register_c2b(
        &self,
        validation_url: &str,
        confirmation_url: &str,
    ) -> Result<(), ApiError>;
}
