use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{TicketDetail, Transaction};
use crate::error::ApiError;
use crate::handlers::event::EventResponse;
use crate::handlers::{BearerHeader, current_user};
use crate::state::AppState;
use crate::usecase::ticket::{
    GetTicketUseCase, ListMyTicketsUseCase, ReserveTicketInput, ReserveTicketUseCase,
};

#[derive(Serialize)]
pub struct TransactionResponse {
    pub id: String,
    pub amount: i64,
    pub status: &'static str,
    pub phone_number: Option<String>,
    pub merchant_request_id: Option<String>,
    pub checkout_request_id: Option<String>,
    pub receipt_number: Option<String>,
    pub failure_reason: Option<String>,
    #[serde(serialize_with = "tikiti_core::serde::to_rfc3339_ms_opt")]
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id.to_string(),
            amount: transaction.amount,
            status: transaction.status.as_str(),
            phone_number: transaction.phone_number,
            merchant_request_id: transaction.merchant_request_id,
            checkout_request_id: transaction.checkout_request_id,
            receipt_number: transaction.receipt_number,
            failure_reason: transaction.failure_reason,
            completed_at: transaction.completed_at,
        }
    }
}

#[derive(Serialize)]
pub struct TicketDetailResponse {
    pub id: String,
    pub quantity: i32,
    pub status: &'static str,
    pub event: EventResponse,
    pub transaction: TransactionResponse,
    #[serde(serialize_with = "tikiti_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "tikiti_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<TicketDetail> for TicketDetailResponse {
    fn from(detail: TicketDetail) -> Self {
        Self {
            id: detail.ticket.id.to_string(),
            quantity: detail.ticket.quantity,
            status: detail.ticket.status.as_str(),
            event: detail.event.into(),
            transaction: detail.transaction.into(),
            created_at: detail.ticket.created_at,
            updated_at: detail.ticket.updated_at,
        }
    }
}

// ── POST /tickets ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTicketRequest {
    pub event_id: Uuid,
    pub quantity: i32,
}

pub async fn create_ticket(
    auth: BearerHeader,
    State(state): State<AppState>,
    Json(body): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketDetailResponse>), ApiError> {
    let user = current_user(&state, &auth).await?;
    let usecase = ReserveTicketUseCase {
        events: state.event_repo(),
        tickets: state.ticket_repo(),
    };
    let detail = usecase
        .execute(
            user.id,
            ReserveTicketInput {
                event_id: body.event_id,
                quantity: body.quantity,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(detail.into())))
}

// ── GET /tickets ─────────────────────────────────────────────────────────────

pub async fn get_tickets(
    auth: BearerHeader,
    State(state): State<AppState>,
) -> Result<Json<Vec<TicketDetailResponse>>, ApiError> {
    let user = current_user(&state, &auth).await?;
    let usecase = ListMyTicketsUseCase {
        tickets: state.ticket_repo(),
    };
    let details = usecase.execute(user.id).await?;
    Ok(Json(
        details.into_iter().map(TicketDetailResponse::from).collect(),
    ))
}

// ── GET /tickets/{id} ────────────────────────────────────────────────────────

pub async fn get_ticket(
    auth: BearerHeader,
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Json<TicketDetailResponse>, ApiError> {
    let user = current_user(&state, &auth).await?;
    let usecase = GetTicketUseCase {
        tickets: state.ticket_repo(),
    };
    let detail = usecase.execute(user.id, ticket_id).await?;
    Ok(Json(detail.into()))
}
