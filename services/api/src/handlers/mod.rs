pub mod event;
pub mod payment;
pub mod ticket;
pub mod user;
pub mod webhook;

use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use tikiti_identity::token::{TokenIdentity, validate_bearer_token};

use crate::domain::types::{Role, User};
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::user::CurrentUserUseCase;

/// The `Authorization: Bearer` header, absent on anonymous requests.
pub(crate) type BearerHeader = Option<TypedHeader<Authorization<Bearer>>>;

/// Validate the bearer token, yielding the provider identity.
pub(crate) fn token_identity(
    state: &AppState,
    auth: &BearerHeader,
) -> Result<TokenIdentity, ApiError> {
    let TypedHeader(Authorization(bearer)) = auth.as_ref().ok_or(ApiError::Unauthorized)?;
    validate_bearer_token(bearer.token(), &state.config.jwt_secret)
        .map_err(|_| ApiError::Unauthorized)
}

/// Resolve the caller's mirrored user record. A valid token without a mirror
/// row cannot act, so it is treated as unauthorized rather than a 404.
pub(crate) async fn current_user(state: &AppState, auth: &BearerHeader) -> Result<User, ApiError> {
    let identity = token_identity(state, auth)?;
    let usecase = CurrentUserUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(&identity.external_id)
        .await
        .map_err(|e| match e {
            ApiError::UserNotFound => ApiError::Unauthorized,
            other => other,
        })
}

/// Resolve the caller and require the ADMIN role.
pub(crate) async fn require_admin(state: &AppState, auth: &BearerHeader) -> Result<User, ApiError> {
    let user = current_user(state, auth).await?;
    if user.role != Role::Admin {
        return Err(ApiError::Forbidden);
    }
    Ok(user)
}
