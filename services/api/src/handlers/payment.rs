use axum::{Json, extract::State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::{BearerHeader, current_user, require_admin};
use crate::state::AppState;
use crate::usecase::callback::{
    ApplyStkCallbackUseCase, C2bConfirmation, C2bConfirmationInput, C2bValidationInput,
    CallbackOutcome, ConfirmC2bUseCase, StkCallbackInput, ValidateC2bUseCase,
};
use crate::usecase::payment::{
    InitiatePaymentInput, InitiatePaymentUseCase, PaymentInitiation, RegisterC2bUseCase,
};

// ── POST /payment ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct InitiatePaymentRequest {
    pub ticket_id: Uuid,
    pub phone_number: Option<String>,
    /// `"stk"` or `"c2b"`.
    pub method: String,
}

pub async fn initiate_payment(
    auth: BearerHeader,
    State(state): State<AppState>,
    Json(body): Json<InitiatePaymentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = current_user(&state, &auth).await?;
    let usecase = InitiatePaymentUseCase {
        tickets: state.ticket_repo(),
        transactions: state.transaction_repo(),
        gateway: state.gateway(),
        shortcode: state.config.mpesa_shortcode.clone(),
        public_base_url: state.config.public_base_url.clone(),
    };
    let initiation = usecase
        .execute(
            user.id,
            InitiatePaymentInput {
                ticket_id: body.ticket_id,
                phone_number: body.phone_number,
                method: body.method,
            },
        )
        .await?;

    let response = match initiation {
        PaymentInitiation::StkPush {
            checkout_request_id,
        } => serde_json::json!({
            "success": true,
            "message": "STK push initiated",
            "checkout_request_id": checkout_request_id,
        }),
        PaymentInitiation::Paybill {
            paybill,
            account_number,
            amount,
        } => serde_json::json!({
            "success": true,
            "paybill": paybill,
            "account_number": account_number,
            "amount": amount,
        }),
    };
    Ok(Json(response))
}

// ── POST /payment/callback ───────────────────────────────────────────────────

/// The provider's STK result envelope: `Body.stkCallback.{…}`.
#[derive(Debug, Deserialize)]
pub struct StkCallbackEnvelope {
    #[serde(rename = "Body")]
    pub body: StkCallbackBody,
}

#[derive(Debug, Deserialize)]
pub struct StkCallbackBody {
    #[serde(rename = "stkCallback")]
    pub stk_callback: StkCallback,
}

#[derive(Debug, Deserialize)]
pub struct StkCallback {
    #[serde(rename = "MerchantRequestID")]
    pub merchant_request_id: String,
    #[serde(rename = "CheckoutRequestID")]
    pub checkout_request_id: String,
    #[serde(rename = "ResultCode")]
    pub result_code: i64,
    #[serde(rename = "ResultDesc")]
    pub result_desc: String,
    #[serde(rename = "CallbackMetadata", default)]
    pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackMetadata {
    #[serde(rename = "Item", default)]
    pub items: Vec<MetadataItem>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataItem {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value", default)]
    pub value: Option<serde_json::Value>,
}

impl StkCallback {
    /// `MpesaReceiptNumber` from the metadata items, when present.
    fn receipt_number(&self) -> Option<String> {
        self.callback_metadata
            .as_ref()?
            .items
            .iter()
            .find(|item| item.name == "MpesaReceiptNumber")?
            .value
            .as_ref()?
            .as_str()
            .map(str::to_owned)
    }
}

pub async fn mpesa_callback(
    State(state): State<AppState>,
    Json(envelope): Json<StkCallbackEnvelope>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let callback = envelope.body.stk_callback;
    let receipt_number = callback.receipt_number();
    tracing::info!(
        merchant_request_id = %callback.merchant_request_id,
        checkout_request_id = %callback.checkout_request_id,
        result_code = callback.result_code,
        "stk callback received"
    );

    let usecase = ApplyStkCallbackUseCase {
        transactions: state.transaction_repo(),
    };
    let outcome = usecase
        .execute(StkCallbackInput {
            merchant_request_id: callback.merchant_request_id,
            checkout_request_id: callback.checkout_request_id.clone(),
            result_code: callback.result_code,
            result_desc: callback.result_desc,
            receipt_number,
        })
        .await?;

    if outcome == CallbackOutcome::AlreadyFinal {
        tracing::info!(
            checkout_request_id = %callback.checkout_request_id,
            "stk callback redelivered for terminal transaction, ignored"
        );
    }
    Ok(Json(serde_json::json!({"success": true})))
}

// ── POST /payment/c2b/register ───────────────────────────────────────────────

pub async fn register_c2b(
    auth: BearerHeader,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_admin(&state, &auth).await?;
    let usecase = RegisterC2bUseCase {
        gateway: state.gateway(),
        public_base_url: state.config.public_base_url.clone(),
    };
    usecase.execute().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "C2B URLs registered successfully",
    })))
}

// ── POST /payment/c2b/validation ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct C2bRequest {
    #[serde(rename = "TransID", default)]
    pub trans_id: Option<String>,
    #[serde(rename = "TransAmount")]
    pub trans_amount: serde_json::Value,
    #[serde(rename = "BillRefNumber")]
    pub bill_ref_number: String,
}

/// The provider sends `TransAmount` as a decimal string ("100.00") in some
/// sandboxes and as a JSON number in others.
fn amount_units(value: &serde_json::Value) -> Option<i64> {
    let amount = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.parse::<f64>().ok()?,
        _ => return None,
    };
    Some(amount.round() as i64)
}

pub async fn c2b_validation(
    State(state): State<AppState>,
    Json(body): Json<C2bRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let accepted = match amount_units(&body.trans_amount) {
        Some(amount) => {
            let usecase = ValidateC2bUseCase {
                transactions: state.transaction_repo(),
            };
            usecase
                .execute(C2bValidationInput {
                    bill_ref: body.bill_ref_number.clone(),
                    amount,
                })
                .await?
        }
        None => false,
    };

    if accepted {
        Ok(Json(serde_json::json!({
            "ResultCode": 0,
            "ResultDesc": "Accepted",
        })))
    } else {
        tracing::info!(bill_ref = %body.bill_ref_number, "c2b validation rejected");
        // Provider-specified rejection shape; still HTTP 200.
        Ok(Json(serde_json::json!({
            "ResultCode": "C2B00012",
            "ResultDesc": "Rejected",
        })))
    }
}

// ── POST /payment/c2b/confirmation ───────────────────────────────────────────

pub async fn c2b_confirmation(
    State(state): State<AppState>,
    Json(body): Json<C2bRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let trans_id = body.trans_id.ok_or(ApiError::MissingData)?;
    let usecase = ConfirmC2bUseCase {
        transactions: state.transaction_repo(),
    };
    let outcome = usecase
        .execute(C2bConfirmationInput {
            bill_ref: body.bill_ref_number.clone(),
            trans_id,
        })
        .await?;

    match outcome {
        C2bConfirmation::Applied => {}
        C2bConfirmation::AlreadyFinal => {
            tracing::info!(bill_ref = %body.bill_ref_number, "c2b confirmation redelivered, ignored");
        }
        C2bConfirmation::UnknownReference => {
            // Money has already moved and the provider does not retry
            // confirmations; acknowledge and leave the trail in the logs.
            tracing::warn!(bill_ref = %body.bill_ref_number, "c2b confirmation for unknown reference");
        }
    }
    Ok(Json(serde_json::json!({
        "ResultCode": 0,
        "ResultDesc": "Confirmation received successfully",
    })))
}
