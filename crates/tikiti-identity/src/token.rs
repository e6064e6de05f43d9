//! Bearer-token validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(test)]
use serde::Serialize;

/// Caller identity extracted from a validated bearer token.
///
/// `external_id` is the identity provider's user id (the `sub` claim), not a
/// local row id — the service resolves its own mirror record from it.
#[derive(Debug, Clone)]
pub struct TokenIdentity {
    pub external_id: String,
    pub exp: u64,
}

/// Errors returned by [`validate_bearer_token`].
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Claims carried by the provider-issued session token.
///
/// Only `sub` (provider user id) and `exp` are consumed. Role is deliberately
/// absent: authorization reads the locally mirrored user record, which the
/// identity webhook keeps in sync.
#[derive(Debug, Deserialize)]
#[cfg_attr(test, derive(Serialize))]
struct Claims {
    sub: String,
    exp: u64,
}

/// Validate a bearer token, returning the caller identity.
///
/// Validation: HS256, exp checked, required claims: `exp` + `sub`.
/// Default leeway = 60s — tolerates clock skew against the provider.
pub fn validate_bearer_token(token: &str, secret: &str) -> Result<TokenIdentity, TokenError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })?;

    Ok(TokenIdentity {
        external_id: data.claims.sub,
        exp: data.claims.exp,
    })
}
