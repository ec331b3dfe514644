//! The TxFunction store.

use crate::digest::tx_function_digest;
use crate::fees::process_fee_payment;
use crate::kv::KeyValueStore;
use crate::record::StoredTxFunction;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::sync::Arc;
use turret_core::{Result, SignerKey, TurretConfig, TurretError, TxFunctionHash, TxHash};
use turret_ledger::LedgerGateway;

/// Upload request: function code, optional structured fields, and the fee
/// payment envelope (wire text).
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Function code bytes.
    pub code: Vec<u8>,
    /// Optional structured fields blob; must be valid JSON when present.
    pub fields: Option<Vec<u8>>,
    /// Base64 fee payment envelope.
    pub fee_payment: String,
}

/// What an uploader gets back: the content address and the dedicated
/// signer's public key. Never the secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    /// Content digest of the stored function.
    pub hash: TxFunctionHash,
    /// Public key of the signer dedicated to this function.
    pub signer: SignerKey,
}

/// Content-addressed store of hosted functions and their dedicated signers.
pub struct TxFunctionStore {
    functions: Arc<dyn KeyValueStore>,
    allow_list: Arc<dyn KeyValueStore>,
    gateway: Arc<dyn LedgerGateway>,
    config: TurretConfig,
}

impl TxFunctionStore {
    /// Build a store over its backends.
    pub fn new(
        functions: Arc<dyn KeyValueStore>,
        allow_list: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn LedgerGateway>,
        config: TurretConfig,
    ) -> Self {
        Self {
            functions,
            allow_list,
            gateway,
            config,
        }
    }

    /// Store a new function after validating its fee payment.
    ///
    /// Validation order is fixed: fields shape, duplicate check, allow-list
    /// check, cost computation, fee payment. Each step's postcondition is
    /// the next step's precondition. Nothing is persisted until the payment
    /// has been accepted and submitted.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadReceipt> {
        let fields = request.fields.unwrap_or_default();
        if !fields.is_empty() {
            serde_json::from_slice::<serde_json::Value>(&fields)
                .map_err(|_| TurretError::validation("function fields are not valid JSON"))?;
        }

        let hash = tx_function_digest(&request.code, &fields);
        let key = hash.to_string();

        if self.functions.contains(&key).await? {
            return Err(TurretError::conflict(format!(
                "function {hash} has already been uploaded to this turret"
            )));
        }

        if self.config.network.is_restricted() && !self.allow_list.contains(&key).await? {
            return Err(TurretError::forbidden(format!(
                "function {hash} is not allowed on this turret"
            )));
        }

        let size = (request.code.len() + fields.len()) as u64;
        let cost = self.config.upload_cost(size)?;

        // Exact cost required: min = max = cost. Failures carry the cost so
        // the client can retry with a corrected fee.
        let payment = process_fee_payment(
            self.gateway.as_ref(),
            &self.config,
            &request.fee_payment,
            cost,
            cost,
        )
        .await
        .map_err(|e| e.with_cost(cost))?;

        let signing_key = SigningKey::generate(&mut OsRng);
        let record = StoredTxFunction::new(request.code, fields, cost, payment, &signing_key);
        let bytes = bincode::serialize(&record)
            .map_err(|e| TurretError::unavailable(format!("record encode: {e}")))?;

        // The conditional put is the authoritative duplicate guard; the
        // early contains() only orders the cheap rejection ahead of payment
        // processing.
        if !self.functions.put_if_absent(&key, bytes).await? {
            return Err(TurretError::conflict(format!(
                "function {hash} has already been uploaded to this turret"
            )));
        }

        let signer = record.signer_public_key;
        tracing::info!(%hash, %signer, %cost, "function stored");
        Ok(UploadReceipt { hash, signer })
    }

    /// Public key of the signer dedicated to `hash` on this node.
    ///
    /// This is how the heal engine proves the local node actually hosts a
    /// function before agreeing to co-sign a rotation for it.
    pub async fn resolve_local_signer(&self, hash: &TxFunctionHash) -> Result<SignerKey> {
        Ok(self.load(hash).await?.signer_public_key)
    }

    /// Sign `tx_hash` with the signer dedicated to `hash`.
    ///
    /// Returns the signer's public key and the detached 64-byte signature.
    /// The secret itself never crosses this boundary.
    pub async fn sign_transaction_hash(
        &self,
        hash: &TxFunctionHash,
        tx_hash: &TxHash,
    ) -> Result<(SignerKey, Vec<u8>)> {
        let record = self.load(hash).await?;
        let signature = record.signing_key().sign(tx_hash.as_bytes());
        Ok((record.signer_public_key, signature.to_bytes().to_vec()))
    }

    async fn load(&self, hash: &TxFunctionHash) -> Result<StoredTxFunction> {
        let bytes = self
            .functions
            .get(&hash.to_string())
            .await?
            .ok_or_else(|| {
                TurretError::not_found(format!("function {hash} could not be found on this turret"))
            })?;
        bincode::deserialize(&bytes)
            .map_err(|e| TurretError::unavailable(format!("record decode: {e}")))
    }
}
