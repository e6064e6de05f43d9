use chrono::Utc;
use uuid::Uuid;

use tikiti_identity::event::{IdentityEvent, IdentityEventKind, IdentityUserData};

use crate::domain::repository::UserRepository;
use crate::domain::types::{Role, User};
use crate::error::ApiError;

// ── SyncIdentity ─────────────────────────────────────────────────────────────

/// What an identity webhook delivery did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synchronized,
    /// Unrecognized event type; acknowledged and skipped.
    Ignored,
}

/// Upsert the local user mirror from an identity-provider event.
///
/// The mirror is keyed by the provider's user id, with an email fallback for
/// records that predate the provider link. The role claim is applied when
/// present; its absence never demotes an existing record.
pub struct SyncIdentityUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> SyncIdentityUseCase<U> {
    pub async fn execute(&self, event: IdentityEvent) -> Result<SyncOutcome, ApiError> {
        match event.kind {
            IdentityEventKind::UserCreated | IdentityEventKind::UserUpdated => {
                self.upsert(event.data).await?;
                Ok(SyncOutcome::Synchronized)
            }
            IdentityEventKind::UserDeleted => {
                let removed = self.users.delete_by_external_id(&event.data.id).await?;
                if !removed {
                    tracing::warn!(external_id = %event.data.id, "deleted user had no mirror row");
                }
                Ok(SyncOutcome::Synchronized)
            }
            IdentityEventKind::Unknown => Ok(SyncOutcome::Ignored),
        }
    }

    async fn upsert(&self, data: IdentityUserData) -> Result<(), ApiError> {
        let email = data.email.ok_or(ApiError::MissingData)?;
        let name = data.name.unwrap_or_else(|| email.clone());
        let role = match data.role.as_deref() {
            Some(claim) => Some(Role::parse(claim).ok_or(ApiError::InvalidRole)?),
            None => None,
        };

        let existing = match self.users.find_by_external_id(&data.id).await? {
            Some(user) => Some(user),
            // Pre-provider records are matched by email and adopt the
            // external id on first sync.
            None => self.users.find_by_email(&email).await?,
        };

        match existing {
            Some(user) => {
                self.users
                    .update_mirror(user.id, &data.id, &email, &name, role)
                    .await
            }
            None => {
                let now = Utc::now();
                self.users
                    .create(&User {
                        id: Uuid::now_v7(),
                        external_id: data.id,
                        email,
                        name,
                        role: role.unwrap_or(Role::User),
                        created_at: now,
                        updated_at: now,
                    })
                    .await
            }
        }
    }
}

// ── CurrentUser ──────────────────────────────────────────────────────────────

pub struct CurrentUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> CurrentUserUseCase<U> {
    pub async fn execute(&self, external_id: &str) -> Result<User, ApiError> {
        self.users
            .find_by_external_id(external_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── GetRole ──────────────────────────────────────────────────────────────────

/// Answer the role endpoint. Anonymous and unmirrored callers are GUESTs
/// rather than errors.
pub struct GetRoleUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetRoleUseCase<U> {
    pub async fn execute(&self, external_id: Option<&str>) -> Result<&'static str, ApiError> {
        let Some(external_id) = external_id else {
            return Ok("GUEST");
        };
        Ok(self
            .users
            .find_by_external_id(external_id)
            .await?
            .map(|user| user.role.as_str())
            .unwrap_or("GUEST"))
    }
}

// ── AssignRole ───────────────────────────────────────────────────────────────

/// Explicit administrative role assignment.
pub struct AssignRoleUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> AssignRoleUseCase<U> {
    pub async fn execute(&self, user_id: Uuid, role: &str) -> Result<(), ApiError> {
        let role = Role::parse(role).ok_or(ApiError::InvalidRole)?;
        if !self.users.update_role(user_id, role).await? {
            return Err(ApiError::UserNotFound);
        }
        Ok(())
    }
}
