//! Fee payment validation.
//!
//! A fee payment arrives as a signed envelope the client claims pays this
//! turret. The envelope is decoded and checked locally, probed against the
//! ledger to rule out a replayed receipt, and finally submitted; only the
//! submitted transaction's hash counts as the payment reference.

use turret_core::{Amount, Result, TurretConfig, TurretError, TxHash};
use turret_ledger::{LedgerGateway, Operation, TransactionEnvelope};

/// Validate and submit a fee payment, returning its hash.
///
/// Enforces: exactly one operation; that operation is a plain payment; the
/// destination is this turret's configured address; the asset is native; the
/// amount lies within `[min, max]` inclusive (exact fixed-point comparison);
/// and the transaction has not already been submitted to the ledger.
///
/// Violations fail with a `Payment` error (no cost attached; callers that
/// know the expected cost decorate it). Transport failures while probing or
/// submitting stay `Unavailable` so the caller knows a retry may succeed.
pub async fn process_fee_payment(
    gateway: &dyn LedgerGateway,
    config: &TurretConfig,
    envelope_text: &str,
    min: Amount,
    max: Amount,
) -> Result<TxHash> {
    let envelope = TransactionEnvelope::from_base64(envelope_text)
        .map_err(|_| TurretError::payment("fee payment envelope did not decode"))?;

    if envelope.tx.operations.len() != 1 {
        return Err(TurretError::payment(
            "fee payments cannot have more than one operation",
        ));
    }

    let Operation::Payment {
        destination,
        asset,
        amount,
    } = &envelope.tx.operations[0]
    else {
        return Err(TurretError::payment(format!(
            "fee payments must be native payments made to {}",
            config.turret_address
        )));
    };

    if destination != &config.turret_address || !asset.is_native() {
        return Err(TurretError::payment(format!(
            "fee payments must be native payments made to {}",
            config.turret_address
        )));
    }

    if *amount < min {
        return Err(TurretError::payment(format!(
            "fee payment too low, min = {min}"
        )));
    }
    if *amount > max {
        return Err(TurretError::payment(format!(
            "fee payment too large, max = {max}"
        )));
    }

    let hash = envelope.tx.hash(config.network)?;
    if gateway.transaction_exists(&hash).await? {
        return Err(TurretError::payment(format!(
            "fee payment {hash} has already been submitted"
        )));
    }

    let submitted = gateway.submit(&envelope).await.map_err(|e| match e {
        // A ledger rejection (bad signature, underfunded source) is the
        // payer's problem, not a turret fault.
        TurretError::Validation { reason } => {
            TurretError::payment(format!("fee payment failed to submit: {reason}"))
        }
        other => other,
    })?;

    tracing::debug!(%submitted, amount = %amount, "fee payment accepted");
    Ok(submitted)
}
