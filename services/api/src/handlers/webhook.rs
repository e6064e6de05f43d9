use axum::{Json, body::Bytes, extract::State, http::HeaderMap};

use tikiti_identity::event::IdentityEvent;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::user::{SyncIdentityUseCase, SyncOutcome};

// ── POST /webhook/identity ───────────────────────────────────────────────────

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::InvalidSignature)
}

/// Identity-provider webhook. The signature is verified over the raw body
/// before anything is parsed; unverified payloads are never processed.
pub async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = header(&headers, "webhook-id")?;
    let timestamp = header(&headers, "webhook-timestamp")?;
    let signature = header(&headers, "webhook-signature")?;

    state
        .webhook_verifier
        .verify(id, timestamp, signature, &body)
        .map_err(|e| {
            tracing::warn!(webhook_id = %id, error = %e, "identity webhook rejected");
            ApiError::InvalidSignature
        })?;

    let event: IdentityEvent =
        serde_json::from_slice(&body).map_err(|_| ApiError::MissingData)?;
    tracing::info!(webhook_id = %id, external_id = %event.data.id, "identity webhook received");

    let usecase = SyncIdentityUseCase {
        users: state.user_repo(),
    };
    let message = match usecase.execute(event).await? {
        SyncOutcome::Synchronized => "user synchronized",
        SyncOutcome::Ignored => "webhook received",
    };
    Ok(Json(serde_json::json!({"message": message})))
}
