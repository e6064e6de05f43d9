//! Identity-webhook signature verification.
//!
//! The provider signs each delivery with the shared endpoint secret using the
//! svix scheme: the signed content is `"{id}.{timestamp}.{body}"`, the secret
//! is base64 behind a `whsec_` prefix, and the `webhook-signature` header
//! carries one or more space-separated `v1,<base64 mac>` candidates (multiple
//! appear after a secret rotation).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted distance between the delivery timestamp and now,
/// in either direction. Replays older than this are rejected outright.
const TIMESTAMP_TOLERANCE_SECS: i64 = 5 * 60;

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("malformed webhook secret")]
    BadSecret,
    #[error("timestamp outside tolerance")]
    StaleTimestamp,
    #[error("signature mismatch")]
    SignatureMismatch,
}

/// Verifier bound to one endpoint secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: Vec<u8>,
}

impl WebhookVerifier {
    /// Build from the provider's endpoint secret (`whsec_<base64>`; a bare
    /// base64 string is accepted too).
    pub fn new(secret: &str) -> Result<Self, WebhookError> {
        let encoded = secret.strip_prefix("whsec_").unwrap_or(secret);
        let key = STANDARD
            .decode(encoded)
            .map_err(|_| WebhookError::BadSecret)?;
        Ok(Self { key })
    }

    /// Verify one delivery: `id` and `timestamp` are the `webhook-id` /
    /// `webhook-timestamp` header values, `signature` is the raw
    /// `webhook-signature` header, `body` is the unparsed request body.
    pub fn verify(
        &self,
        id: &str,
        timestamp: &str,
        signature: &str,
        body: &[u8],
    ) -> Result<(), WebhookError> {
        let ts: i64 = timestamp.parse().map_err(|_| WebhookError::StaleTimestamp)?;
        if (Utc::now().timestamp() - ts).abs() > TIMESTAMP_TOLERANCE_SECS {
            return Err(WebhookError::StaleTimestamp);
        }

        for candidate in signature.split_ascii_whitespace() {
            let Some(encoded) = candidate.strip_prefix("v1,") else {
                continue;
            };
            let Ok(expected) = STANDARD.decode(encoded) else {
                continue;
            };
            let mut mac =
                HmacSha256::new_from_slice(&self.key).map_err(|_| WebhookError::BadSecret)?;
            mac.update(id.as_bytes());
            mac.update(b".");
            mac.update(timestamp.as_bytes());
            mac.update(b".");
            mac.update(body);
            // verify_slice is constant-time.
            if mac.verify_slice(&expected).is_ok() {
                return Ok(());
            }
        }
        Err(WebhookError::SignatureMismatch)
    }
}
