use anyhow::anyhow;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{EventRepository, TicketRepository};
use crate::domain::types::{Ticket, TicketDetail, TicketStatus, Transaction, TransactionStatus};
use crate::error::ApiError;

// ── ReserveTicket ────────────────────────────────────────────────────────────

pub struct ReserveTicketInput {
    pub event_id: Uuid,
    pub quantity: i32,
}

/// Create a PENDING ticket with its PENDING transaction, decrementing the
/// event inventory in the same atomic unit. Races for the last tickets are
/// serialized by the repository's conditional decrement.
pub struct ReserveTicketUseCase<E: EventRepository, T: TicketRepository> {
    pub events: E,
    pub tickets: T,
}

impl<E: EventRepository, T: TicketRepository> ReserveTicketUseCase<E, T> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: ReserveTicketInput,
    ) -> Result<TicketDetail, ApiError> {
        if input.quantity < 1 {
            return Err(ApiError::InvalidQuantity);
        }
        let event = self
            .events
            .find_by_id(input.event_id)
            .await?
            .ok_or(ApiError::EventNotFound)?;

        let now = Utc::now();
        let ticket = Ticket {
            id: Uuid::now_v7(),
            event_id: event.id,
            user_id,
            quantity: input.quantity,
            status: TicketStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let transaction = Transaction {
            id: Uuid::now_v7(),
            ticket_id: ticket.id,
            amount: event.price * input.quantity as i64,
            status: TransactionStatus::Pending,
            phone_number: None,
            merchant_request_id: None,
            checkout_request_id: None,
            receipt_number: None,
            failure_reason: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tickets.reserve(&ticket, &transaction).await?;

        self.tickets
            .find_detail(ticket.id)
            .await?
            .ok_or_else(|| ApiError::Internal(anyhow!("reserved ticket {} not found", ticket.id)))
    }
}

// ── ListMyTickets ────────────────────────────────────────────────────────────

pub struct ListMyTicketsUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> ListMyTicketsUseCase<T> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<TicketDetail>, ApiError> {
        self.tickets.list_details_by_user(user_id).await
    }
}

// ── GetTicket ────────────────────────────────────────────────────────────────

pub struct GetTicketUseCase<T: TicketRepository> {
    pub tickets: T,
}

impl<T: TicketRepository> GetTicketUseCase<T> {
    pub async fn execute(&self, user_id: Uuid, ticket_id: Uuid) -> Result<TicketDetail, ApiError> {
        let detail = self
            .tickets
            .find_detail(ticket_id)
            .await?
            .ok_or(ApiError::TicketNotFound)?;
        if detail.ticket.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        Ok(detail)
    }
}
