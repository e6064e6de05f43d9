use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::{BearerHeader, current_user, require_admin, token_identity};
use crate::state::AppState;
use crate::usecase::user::{AssignRoleUseCase, GetRoleUseCase};

// ── GET /user/role ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RoleResponse {
    pub role: &'static str,
}

/// Anonymous callers (no token, or a token that fails validation) are GUESTs,
/// not errors.
pub async fn get_role(
    auth: BearerHeader,
    State(state): State<AppState>,
) -> Result<Json<RoleResponse>, ApiError> {
    let external_id = token_identity(&state, &auth).ok().map(|i| i.external_id);
    let usecase = GetRoleUseCase {
        users: state.user_repo(),
    };
    let role = usecase.execute(external_id.as_deref()).await?;
    Ok(Json(RoleResponse { role }))
}

// ── GET /user ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub role: &'static str,
    #[serde(serialize_with = "tikiti_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "tikiti_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_me(
    auth: BearerHeader,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = current_user(&state, &auth).await?;
    Ok(Json(UserResponse {
        id: user.id.to_string(),
        external_id: user.external_id,
        email: user.email,
        name: user.name,
        role: user.role.as_str(),
        created_at: user.created_at,
        updated_at: user.updated_at,
    }))
}

// ── PUT /user/{id}/role ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AssignRoleRequest {
    pub role: String,
}

pub async fn assign_role(
    auth: BearerHeader,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<AssignRoleRequest>,
) -> Result<StatusCode, ApiError> {
    require_admin(&state, &auth).await?;
    let usecase = AssignRoleUseCase {
        users: state.user_repo(),
    };
    usecase.execute(user_id, &body.role).await?;
    Ok(StatusCode::NO_CONTENT)
}
