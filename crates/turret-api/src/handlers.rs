//! Route handlers.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use turret_core::{SignerKey, TurretError, TxFunctionHash};
use turret_heal::HealRequest;
use turret_store::{UploadReceipt, UploadRequest};

/// Upload request body.
#[derive(Debug, Deserialize)]
pub struct UploadBody {
    /// Function code, base64.
    pub code: String,
    /// Optional structured fields, base64 of a JSON document.
    #[serde(default)]
    pub fields: Option<String>,
    /// Fee payment envelope, wire text.
    pub fee_payment: String,
}

/// Upload response body.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Content digest of the stored function.
    pub hash: TxFunctionHash,
    /// Dedicated signer's public key.
    pub signer: SignerKey,
}

/// `POST /tx-functions`
pub async fn upload(
    State(state): State<AppState>,
    Json(body): Json<UploadBody>,
) -> Result<Json<UploadResponse>, ApiError> {
    let code = BASE64
        .decode(body.code.as_bytes())
        .map_err(|_| ApiError::from(TurretError::validation("code is not valid base64")))?;
    let fields = match &body.fields {
        Some(fields) => Some(BASE64.decode(fields.as_bytes()).map_err(|_| {
            ApiError::from(TurretError::validation("fields are not valid base64"))
        })?),
        None => None,
    };

    let receipt: UploadReceipt = state
        .store
        .upload(UploadRequest {
            code,
            fields,
            fee_payment: body.fee_payment,
        })
        .await
        .map_err(|error| ApiError {
            error,
            turret: Some(state.config.turret_address),
        })?;

    Ok(Json(UploadResponse {
        hash: receipt.hash,
        signer: receipt.signer,
    }))
}

/// Publishing response consumed by peer turrets during heal.
#[derive(Debug, Serialize)]
pub struct TxFunctionSignerResponse {
    /// Signer this turret dedicates to the function.
    pub signer: SignerKey,
}

/// `GET /tx-functions/:hash`
pub async fn tx_function_signer(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<TxFunctionSignerResponse>, ApiError> {
    let hash: TxFunctionHash = hash.parse().map_err(ApiError::from)?;
    let signer = state.store.resolve_local_signer(&hash).await?;
    Ok(Json(TxFunctionSignerResponse { signer }))
}

/// Heal response body.
#[derive(Debug, Serialize)]
pub struct HealResponse {
    /// Unsubmitted rotation transaction, wire text.
    pub xdr: String,
    /// Local co-signer public key.
    pub signer: SignerKey,
    /// Detached co-signature, base64.
    pub signature: String,
}

/// `POST /heal`
pub async fn heal(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<HealResponse>, ApiError> {
    // Decode by hand so malformed identity strings surface as this API's
    // `{ message }` validation shape rather than a bare rejection.
    let request: HealRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::from(TurretError::validation(format!("malformed heal request: {e}"))))?;

    let result = state.engine.heal(request).await?;
    Ok(Json(HealResponse {
        xdr: result.envelope_base64()?,
        signer: result.signer,
        signature: result.signature_base64(),
    }))
}
