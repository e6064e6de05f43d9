use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Ticketing service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("user not found")]
    UserNotFound,
    #[error("event not found")]
    EventNotFound,
    #[error("ticket not found")]
    TicketNotFound,
    #[error("transaction not found")]
    TransactionNotFound,
    #[error("invalid quantity")]
    InvalidQuantity,
    #[error("invalid event data")]
    InvalidEventData,
    #[error("invalid phone number")]
    InvalidPhoneNumber,
    #[error("invalid payment method")]
    InvalidPaymentMethod,
    #[error("invalid role")]
    InvalidRole,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("missing data")]
    MissingData,
    #[error("insufficient tickets")]
    InsufficientTickets,
    #[error("ticket already paid")]
    AlreadyPaid,
    #[error("payment provider unavailable")]
    UpstreamFailure,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::TicketNotFound => "TICKET_NOT_FOUND",
            Self::TransactionNotFound => "TRANSACTION_NOT_FOUND",
            Self::InvalidQuantity => "INVALID_QUANTITY",
            Self::InvalidEventData => "INVALID_EVENT_DATA",
            Self::InvalidPhoneNumber => "INVALID_PHONE_NUMBER",
            Self::InvalidPaymentMethod => "INVALID_PAYMENT_METHOD",
            Self::InvalidRole => "INVALID_ROLE",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::MissingData => "MISSING_DATA",
            Self::InsufficientTickets => "INSUFFICIENT_TICKETS",
            Self::AlreadyPaid => "ALREADY_PAID",
            Self::UpstreamFailure => "UPSTREAM_FAILURE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound
            | Self::EventNotFound
            | Self::TicketNotFound
            | Self::TransactionNotFound => StatusCode::NOT_FOUND,
            Self::InvalidQuantity
            | Self::InvalidEventData
            | Self::InvalidPhoneNumber
            | Self::InvalidPaymentMethod
            | Self::InvalidRole
            | Self::InvalidSignature
            | Self::MissingData => StatusCode::BAD_REQUEST,
            Self::InsufficientTickets | Self::AlreadyPaid => StatusCode::CONFLICT,
            Self::UpstreamFailure => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    async fn assert_error(
        error: ApiError,
        expected_status: StatusCode,
        expected_kind: &str,
        expected_message: &str,
    ) {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], expected_kind);
        assert_eq!(json["message"], expected_message);
    }

    #[tokio::test]
    async fn should_return_unauthorized() {
        assert_error(
            ApiError::Unauthorized,
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "unauthorized",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_forbidden() {
        assert_error(
            ApiError::Forbidden,
            StatusCode::FORBIDDEN,
            "FORBIDDEN",
            "forbidden",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_user_not_found() {
        assert_error(
            ApiError::UserNotFound,
            StatusCode::NOT_FOUND,
            "USER_NOT_FOUND",
            "user not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_event_not_found() {
        assert_error(
            ApiError::EventNotFound,
            StatusCode::NOT_FOUND,
            "EVENT_NOT_FOUND",
            "event not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_ticket_not_found() {
        assert_error(
            ApiError::TicketNotFound,
            StatusCode::NOT_FOUND,
            "TICKET_NOT_FOUND",
            "ticket not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_transaction_not_found() {
        assert_error(
            ApiError::TransactionNotFound,
            StatusCode::NOT_FOUND,
            "TRANSACTION_NOT_FOUND",
            "transaction not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invalid_quantity() {
        assert_error(
            ApiError::InvalidQuantity,
            StatusCode::BAD_REQUEST,
            "INVALID_QUANTITY",
            "invalid quantity",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invalid_event_data() {
        assert_error(
            ApiError::InvalidEventData,
            StatusCode::BAD_REQUEST,
            "INVALID_EVENT_DATA",
            "invalid event data",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invalid_phone_number() {
        assert_error(
            ApiError::InvalidPhoneNumber,
            StatusCode::BAD_REQUEST,
            "INVALID_PHONE_NUMBER",
            "invalid phone number",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invalid_payment_method() {
        assert_error(
            ApiError::InvalidPaymentMethod,
            StatusCode::BAD_REQUEST,
            "INVALID_PAYMENT_METHOD",
            "invalid payment method",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invalid_role() {
        assert_error(
            ApiError::InvalidRole,
            StatusCode::BAD_REQUEST,
            "INVALID_ROLE",
            "invalid role",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_invalid_signature() {
        assert_error(
            ApiError::InvalidSignature,
            StatusCode::BAD_REQUEST,
            "INVALID_SIGNATURE",
            "invalid signature",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_missing_data() {
        assert_error(
            ApiError::MissingData,
            StatusCode::BAD_REQUEST,
            "MISSING_DATA",
            "missing data",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_insufficient_tickets() {
        assert_error(
            ApiError::InsufficientTickets,
            StatusCode::CONFLICT,
            "INSUFFICIENT_TICKETS",
            "insufficient tickets",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_already_paid() {
        assert_error(
            ApiError::AlreadyPaid,
            StatusCode::CONFLICT,
            "ALREADY_PAID",
            "ticket already paid",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_upstream_failure() {
        assert_error(
            ApiError::UpstreamFailure,
            StatusCode::BAD_GATEWAY,
            "UPSTREAM_FAILURE",
            "payment provider unavailable",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_internal() {
        assert_error(
            ApiError::Internal(anyhow::anyhow!("db error")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "internal error",
        )
        .await;
    }
}
