//! Daraja-shaped payment provider client.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::domain::repository::{PaymentGateway, StkPushRequest, StkPushResponse};
use crate::error::ApiError;

/// reqwest implementation of the [`PaymentGateway`] port.
///
/// The OAuth token is fetched per outbound call. Provider tokens are
/// short-lived and the call volume here is interactive-scale, so there is no
/// token cache.
#[derive(Clone)]
pub struct DarajaGateway {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
    shortcode: String,
    passkey: String,
}

#[derive(Debug, Deserialize)]
struct OauthResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct StkPushApiResponse {
    #[serde(rename = "MerchantRequestID")]
    merchant_request_id: Option<String>,
    #[serde(rename = "CheckoutRequestID")]
    checkout_request_id: Option<String>,
    #[serde(rename = "ResponseCode")]
    response_code: Option<String>,
    #[serde(rename = "ResponseDescription")]
    response_description: Option<String>,
}

impl DarajaGateway {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.mpesa_base_url.clone(),
            consumer_key: config.mpesa_consumer_key.clone(),
            consumer_secret: config.mpesa_consumer_secret.clone(),
            shortcode: config.mpesa_shortcode.clone(),
            passkey: config.mpesa_passkey.clone(),
        }
    }

    async fn access_token(&self) -> Result<String, ApiError> {
        let response = self
            .client
            .get(format!(
                "{}/oauth/v1/generate?grant_type=client_credentials",
                self.base_url
            ))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "provider oauth request failed");
                ApiError::UpstreamFailure
            })?;
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "provider oauth rejected");
            return Err(ApiError::UpstreamFailure);
        }
        let body: OauthResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "provider oauth response unreadable");
            ApiError::UpstreamFailure
        })?;
        Ok(body.access_token)
    }
}

impl PaymentGateway for DarajaGateway {
    async fn stk_push(&self, request: &StkPushRequest) -> Result<StkPushResponse, ApiError> {
        let token = self.access_token().await?;
        let timestamp = derive_timestamp(Utc::now());
        let password = derive_password(&self.shortcode, &self.passkey, &timestamp);

        let payload = serde_json::json!({
            "BusinessShortCode": self.shortcode,
            "Password": password,
            "Timestamp": timestamp,
            "TransactionType": "CustomerPayBillOnline",
            "Amount": request.amount,
            "PartyA": request.phone_number,
            "PartyB": self.shortcode,
            "PhoneNumber": request.phone_number,
            "CallBackURL": request.callback_url,
            "AccountReference": request.account_reference,
            "TransactionDesc": "Event Ticket Payment",
        });

        let response = self
            .client
            .post(format!("{}/mpesa/stkpush/v1/processrequest", self.base_url))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "stk push request failed");
                ApiError::UpstreamFailure
            })?;

        let status = response.status();
        let body: StkPushApiResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, status = %status, "stk push response unreadable");
            ApiError::UpstreamFailure
        })?;

        // "0" means accepted; anything else is a provider-side rejection.
        if !status.is_success() || body.response_code.as_deref() != Some("0") {
            tracing::warn!(
                status = %status,
                response_code = body.response_code.as_deref().unwrap_or("-"),
                response_description = body.response_description.as_deref().unwrap_or("-"),
                "stk push rejected by provider"
            );
            return Err(ApiError::UpstreamFailure);
        }

        match (body.merchant_request_id, body.checkout_request_id) {
            (Some(merchant_request_id), Some(checkout_request_id)) => Ok(StkPushResponse {
                merchant_request_id,
                checkout_request_id,
            }),
            _ => {
                tracing::warn!("stk push accepted without correlation ids");
                Err(ApiError::UpstreamFailure)
            }
        }
    }

    async fn register_c2b(
        &self,
        validation_url: &str,
        confirmation_url: &str,
    ) -> Result<(), ApiError> {
        let token = self.access_token().await?;
        let payload = serde_json::json!({
            "ShortCode": self.shortcode,
            "ResponseType": "Completed",
            "ConfirmationURL": confirmation_url,
            "ValidationURL": validation_url,
        });

        let response = self
            .client
            .post(format!("{}/mpesa/c2b/v1/registerurl", self.base_url))
            .bearer_auth(&token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "c2b register request failed");
                ApiError::UpstreamFailure
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "c2b register rejected");
            return Err(ApiError::UpstreamFailure);
        }
        Ok(())
    }
}

/// Provider timestamp format: `YYYYMMDDHHMMSS`, UTC.
fn derive_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// STK password: `base64(shortcode + passkey + timestamp)`.
fn derive_password(shortcode: &str, passkey: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{shortcode}{passkey}{timestamp}"))
}
