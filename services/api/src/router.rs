use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use tikiti_core::health::healthz;
use tikiti_core::middleware::request_id_layer;

use crate::handlers::{
    event::{create_event, delete_event, get_event, get_events, update_event},
    payment::{c2b_confirmation, c2b_validation, initiate_payment, mpesa_callback, register_c2b},
    ticket::{create_ticket, get_ticket, get_tickets},
    user::{assign_role, get_me, get_role},
    webhook::identity_webhook,
};
use crate::state::AppState;

/// Readiness: the service is ready when its database answers.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Events
        .route("/events", get(get_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        // Tickets
        .route("/tickets", get(get_tickets).post(create_ticket))
        .route("/tickets/{id}", get(get_ticket))
        // Payments
        .route("/payment", post(initiate_payment))
        .route("/payment/callback", post(mpesa_callback))
        .route("/payment/c2b/register", post(register_c2b))
        .route("/payment/c2b/validation", post(c2b_validation))
        .route("/payment/c2b/confirmation", post(c2b_confirmation))
        // Users
        .route("/user", get(get_me))
        .route("/user/role", get(get_role))
        .route("/user/{id}/role", put(assign_role))
        // Identity webhook
        .route("/webhook/identity", post(identity_webhook))
        .layer(request_id_layer())
        .with_state(state)
}
