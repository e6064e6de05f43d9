use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::pagination::PageRequest;
use crate::domain::repository::EventRepository;
use crate::domain::types::{Event, EventPatch, validate_event_fields};
use crate::error::ApiError;

// ── ListEvents ───────────────────────────────────────────────────────────────

pub struct ListEventsUseCase<R: EventRepository> {
    pub events: R,
}

impl<R: EventRepository> ListEventsUseCase<R> {
    pub async fn execute(&self, page: PageRequest) -> Result<Vec<Event>, ApiError> {
        self.events.list(page.clamped()).await
    }
}

// ── GetEvent ─────────────────────────────────────────────────────────────────

pub struct GetEventUseCase<R: EventRepository> {
    pub events: R,
}

impl<R: EventRepository> GetEventUseCase<R> {
    pub async fn execute(&self, event_id: Uuid) -> Result<Event, ApiError> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or(ApiError::EventNotFound)
    }
}

// ── CreateEvent ──────────────────────────────────────────────────────────────

pub struct CreateEventInput {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub venue: String,
    pub price: i64,
    pub available_tickets: i32,
    pub image_url: Option<String>,
}

pub struct CreateEventUseCase<R: EventRepository> {
    pub events: R,
}

impl<R: EventRepository> CreateEventUseCase<R> {
    pub async fn execute(
        &self,
        created_by: Uuid,
        input: CreateEventInput,
    ) -> Result<Event, ApiError> {
        if !validate_event_fields(
            Some(&input.title),
            Some(&input.venue),
            Some(input.price),
            Some(input.available_tickets),
        ) {
            return Err(ApiError::InvalidEventData);
        }
        let now = Utc::now();
        let event = Event {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            date: input.date,
            venue: input.venue,
            price: input.price,
            available_tickets: input.available_tickets,
            image_url: input.image_url,
            created_by,
            created_at: now,
            updated_at: now,
        };
        self.events.create(&event).await?;
        Ok(event)
    }
}

// ── UpdateEvent ──────────────────────────────────────────────────────────────

pub struct UpdateEventUseCase<R: EventRepository> {
    pub events: R,
}

impl<R: EventRepository> UpdateEventUseCase<R> {
    pub async fn execute(&self, event_id: Uuid, patch: EventPatch) -> Result<Event, ApiError> {
        if patch.is_empty() {
            return Err(ApiError::MissingData);
        }
        if !validate_event_fields(
            patch.title.as_deref(),
            patch.venue.as_deref(),
            patch.price,
            patch.available_tickets,
        ) {
            return Err(ApiError::InvalidEventData);
        }
        self.events
            .update(event_id, &patch)
            .await?
            .ok_or(ApiError::EventNotFound)
    }
}

// ── DeleteEvent ──────────────────────────────────────────────────────────────

pub struct DeleteEventUseCase<R: EventRepository> {
    pub events: R,
}

impl<R: EventRepository> DeleteEventUseCase<R> {
    pub async fn execute(&self, event_id: Uuid) -> Result<(), ApiError> {
        if !self.events.delete(event_id).await? {
            return Err(ApiError::EventNotFound);
        }
        Ok(())
    }
}
