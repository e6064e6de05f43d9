//! Identity-webhook event payloads.

use serde::Deserialize;

/// Event types the provider delivers. Anything else maps to `Unknown` and is
/// acknowledged without processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum IdentityEventKind {
    #[serde(rename = "user.created")]
    UserCreated,
    #[serde(rename = "user.updated")]
    UserUpdated,
    #[serde(rename = "user.deleted")]
    UserDeleted,
    #[serde(other)]
    Unknown,
}

/// One webhook delivery: `{"type": "...", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct IdentityEvent {
    #[serde(rename = "type")]
    pub kind: IdentityEventKind,
    pub data: IdentityUserData,
}

/// Provider-side user snapshot. `role` is an explicit claim from provider
/// metadata; absent means "leave the local role alone".
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUserData {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_created_event_with_role_claim() {
        let event: IdentityEvent = serde_json::from_str(
            r#"{
                "type": "user.created",
                "data": {
                    "id": "user_2x9qk",
                    "email": "amina@example.com",
                    "name": "Amina Odhiambo",
                    "role": "ADMIN"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(event.kind, IdentityEventKind::UserCreated);
        assert_eq!(event.data.id, "user_2x9qk");
        assert_eq!(event.data.email.as_deref(), Some("amina@example.com"));
        assert_eq!(event.data.role.as_deref(), Some("ADMIN"));
    }

    #[test]
    fn should_parse_deleted_event_without_profile_fields() {
        let event: IdentityEvent = serde_json::from_str(
            r#"{"type": "user.deleted", "data": {"id": "user_2x9qk"}}"#,
        )
        .unwrap();

        assert_eq!(event.kind, IdentityEventKind::UserDeleted);
        assert!(event.data.email.is_none());
        assert!(event.data.role.is_none());
    }

    #[test]
    fn should_map_unrecognized_type_to_unknown() {
        let event: IdentityEvent = serde_json::from_str(
            r#"{"type": "session.created", "data": {"id": "sess_1"}}"#,
        )
        .unwrap();

        assert_eq!(event.kind, IdentityEventKind::Unknown);
    }
}
