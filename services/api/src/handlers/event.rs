use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::pagination::PageRequest;
use crate::domain::types::{Event, EventPatch};
use crate::error::ApiError;
use crate::handlers::{BearerHeader, require_admin};
use crate::state::AppState;
use crate::usecase::event::{
    CreateEventInput, CreateEventUseCase, DeleteEventUseCase, GetEventUseCase, ListEventsUseCase,
    UpdateEventUseCase,
};

#[derive(Serialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(serialize_with = "tikiti_core::serde::to_rfc3339_ms")]
    pub date: chrono::DateTime<chrono::Utc>,
    pub venue: String,
    pub price: i64,
    pub available_tickets: i32,
    pub image_url: Option<String>,
    #[serde(serialize_with = "tikiti_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "tikiti_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.to_string(),
            title: event.title,
            description: event.description,
            date: event.date,
            venue: event.venue,
            price: event.price,
            available_tickets: event.available_tickets,
            image_url: event.image_url,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

// ── GET /events ──────────────────────────────────────────────────────────────

pub async fn get_events(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let usecase = ListEventsUseCase {
        events: state.event_repo(),
    };
    let events = usecase.execute(page).await?;
    Ok(Json(events.into_iter().map(EventResponse::from).collect()))
}

// ── GET /events/{id} ─────────────────────────────────────────────────────────

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventResponse>, ApiError> {
    let usecase = GetEventUseCase {
        events: state.event_repo(),
    };
    let event = usecase.execute(event_id).await?;
    Ok(Json(event.into()))
}

// ── POST /events ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub venue: String,
    pub price: i64,
    pub available_tickets: i32,
    pub image_url: Option<String>,
}

pub async fn create_event(
    auth: BearerHeader,
    State(state): State<AppState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let admin = require_admin(&state, &auth).await?;
    let usecase = CreateEventUseCase {
        events: state.event_repo(),
    };
    let event = usecase
        .execute(
            admin.id,
            CreateEventInput {
                title: body.title,
                description: body.description,
                date: body.date,
                venue: body.venue,
                price: body.price,
                available_tickets: body.available_tickets,
                image_url: body.image_url,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

// ── PUT /events/{id} ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<chrono::DateTime<chrono::Utc>>,
    pub venue: Option<String>,
    pub price: Option<i64>,
    pub available_tickets: Option<i32>,
    /// Absent leaves the image alone; an explicit `null` clears it.
    #[serde(default, deserialize_with = "tikiti_core::serde::double_option")]
    pub image_url: Option<Option<String>>,
}

pub async fn update_event(
    auth: BearerHeader,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, ApiError> {
    require_admin(&state, &auth).await?;
    let usecase = UpdateEventUseCase {
        events: state.event_repo(),
    };
    let event = usecase
        .execute(
            event_id,
            EventPatch {
                title: body.title,
                description: body.description,
                date: body.date,
                venue: body.venue,
                price: body.price,
                available_tickets: body.available_tickets,
                image_url: body.image_url,
            },
        )
        .await?;
    Ok(Json(event.into()))
}

// ── DELETE /events/{id} ──────────────────────────────────────────────────────

pub async fn delete_event(
    auth: BearerHeader,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &auth).await?;
    let usecase = DeleteEventUseCase {
        events: state.event_repo(),
    };
    usecase.execute(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
