use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness check.
///
/// Readiness (`/readyz`) lives in the service, which checks its own
/// dependencies (database ping).
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
