//! The heal state machine.

use crate::{HealRequest, HealResult};
use std::sync::Arc;
use turret_core::{
    directory::entry_key, Clock, Result, SignerKey, TurretConfig, TurretError,
};
use turret_ledger::{
    AccountRecord, LedgerGateway, Operation, SignerEntry, TransactionBuilder, TransactionEnvelope,
};
use turret_store::TxFunctionStore;
use turret_trust::TrustRegistry;

/// Transaction validity window for a built rotation, in seconds.
const ROTATION_TIMEOUT_SECS: u64 = 5 * 60;

/// Everything resolved during validation that the build step consumes.
struct ResolvedRotation {
    control: AccountRecord,
    remove: SignerEntry,
    install: SignerKey,
}

/// One-shot signer-rotation engine.
///
/// Holds only shared read-only collaborators; each [`heal`](Self::heal) call
/// is independent and stateless across requests.
pub struct HealEngine {
    trust: Arc<TrustRegistry>,
    gateway: Arc<dyn LedgerGateway>,
    store: Arc<TxFunctionStore>,
    clock: Arc<dyn Clock>,
    config: TurretConfig,
}

impl HealEngine {
    /// Build an engine over its collaborators.
    pub fn new(
        trust: Arc<TrustRegistry>,
        gateway: Arc<dyn LedgerGateway>,
        store: Arc<TxFunctionStore>,
        clock: Arc<dyn Clock>,
        config: TurretConfig,
    ) -> Self {
        Self {
            trust,
            gateway,
            store,
            clock,
            config,
        }
    }

    /// Validate a rotation request and, if every precondition holds, return
    /// the built transaction with this node's co-signature.
    ///
    /// Validation steps run strictly in order; each step's postcondition is
    /// the next step's precondition. Rejections carry the failed
    /// precondition so an operator can diagnose a misconfigured federation.
    pub async fn heal(&self, request: HealRequest) -> Result<HealResult> {
        self.check_self_guard(&request)?;
        self.validate_surface(&request)?;
        self.check_quorum(&request)?;
        let resolved = self.resolve(&request).await?;
        let envelope = self.build(&request, &resolved);
        self.sign(&request, envelope).await
    }

    /// A turret may never be party to removing or installing itself. This
    /// guard precedes every other check.
    fn check_self_guard(&self, request: &HealRequest) -> Result<()> {
        let me = &self.config.turret_address;
        if &request.old_turret == me || &request.new_turret == me {
            return Err(TurretError::validation(
                "a turret may not add or remove itself on a control account",
            ));
        }
        Ok(())
    }

    /// Request-surface checks: freshness and fee sanity. Identity fields
    /// were already validated by their typed parsers at the boundary.
    fn validate_surface(&self, request: &HealRequest) -> Result<()> {
        let now = self.clock.unix_now();
        let window = self.config.heal_window_secs;
        if request.timestamp.saturating_add(window) < now {
            return Err(TurretError::validation(format!(
                "request timestamp {} is older than {window} seconds",
                request.timestamp
            )));
        }
        // A forward-dated request is equally stale evidence of intent.
        if request.timestamp > now + window {
            return Err(TurretError::validation(format!(
                "request timestamp {} is in the future",
                request.timestamp
            )));
        }

        let fee = request.fee;
        if fee < self.config.min_heal_fee_stroops || fee > self.config.max_heal_fee_stroops {
            return Err(TurretError::validation(format!(
                "fee {fee} outside configured range [{}, {}]",
                self.config.min_heal_fee_stroops, self.config.max_heal_fee_stroops
            )));
        }
        Ok(())
    }

    /// Quorum check: rotation is only legitimate when it installs a turret
    /// this node trusts and removes one it no longer does.
    fn check_quorum(&self, request: &HealRequest) -> Result<()> {
        if !self.trust.is_trusted(&request.new_turret) {
            return Err(TurretError::validation(format!(
                "new turret {} is not trusted by the local quorum",
                request.new_turret
            )));
        }
        if self.trust.is_trusted(&request.old_turret) {
            return Err(TurretError::validation(format!(
                "old turret {} is still trusted by the local quorum and cannot be removed",
                request.old_turret
            )));
        }
        Ok(())
    }

    /// Pure-read resolution against the ledger and the local store.
    async fn resolve(&self, request: &HealRequest) -> Result<ResolvedRotation> {
        let control = self.gateway.get_account(&request.control_account).await?;

        // This node may only co-sign rotations for functions it actively
        // serves, proven by its own signer being installed on the account.
        let local_signer = self
            .store
            .resolve_local_signer(&request.tx_function_hash)
            .await?;
        if !control.has_signer(&local_signer) {
            return Err(TurretError::validation(format!(
                "this turret's signer {local_signer} is not on control account {}",
                request.control_account
            )));
        }

        // The on-chain directory, not turret self-reporting, decides which
        // signer the old turret owns.
        let directory = control.directory();
        let remove_key = directory
            .signer_owned_by(&request.old_turret)
            .copied()
            .ok_or_else(|| {
                TurretError::validation(format!(
                    "old turret {} is not recorded as a signer owner on {}",
                    request.old_turret, request.control_account
                ))
            })?;
        let remove = *control.signer(&remove_key).ok_or_else(|| {
            TurretError::validation(format!(
                "directory entry for {remove_key} has no matching signer on the account"
            ))
        })?;

        if directory.contains_owner(&request.new_turret) {
            return Err(TurretError::validation(format!(
                "new turret {} is already recorded as a signer owner on {}",
                request.new_turret, request.control_account
            )));
        }

        // Ask the new turret which signer it dedicates to this function.
        let turret_record = self.gateway.get_account(&request.new_turret).await?;
        let home_domain = turret_record.home_domain.as_deref().ok_or_else(|| {
            TurretError::not_found(format!(
                "unable to find contract on new turret {}: no home domain published",
                request.new_turret
            ))
        })?;
        let install = self
            .gateway
            .resolve_tx_function_signer(home_domain, &request.tx_function_hash)
            .await
            .ok_or_else(|| {
                TurretError::not_found(format!(
                    "unable to find contract on new turret {}",
                    request.new_turret
                ))
            })?;
        if control.has_signer(&install) {
            return Err(TurretError::validation(format!(
                "new turret signer {install} is already a signer on control account {}",
                request.control_account
            )));
        }

        Ok(ResolvedRotation {
            control,
            remove,
            install,
        })
    }

    /// Assemble the rotation transaction.
    ///
    /// The add precedes the remove so the account never dips below its
    /// signing threshold mid-transaction; the directory updates mirror the
    /// signer changes.
    fn build(&self, request: &HealRequest, resolved: &ResolvedRotation) -> TransactionEnvelope {
        let now = self.clock.unix_now();
        let tx = TransactionBuilder::new(
            resolved.control.id,
            resolved.control.next_sequence(),
            request.fee,
        )
        .add_operation(Operation::SetSigner {
            key: resolved.install,
            weight: resolved.remove.weight,
        })
        .add_operation(Operation::SetSigner {
            key: resolved.remove.key,
            weight: 0,
        })
        .add_operation(Operation::ManageData {
            name: entry_key(&resolved.install),
            value: Some(request.new_turret.to_string().into_bytes()),
        })
        .add_operation(Operation::ManageData {
            name: entry_key(&resolved.remove.key),
            value: None,
        })
        .valid_for(now, ROTATION_TIMEOUT_SECS)
        .build();
        TransactionEnvelope::unsigned(tx)
    }

    /// Produce this node's detached co-signature. The caller gathers the
    /// remaining signatures and submits.
    async fn sign(&self, request: &HealRequest, envelope: TransactionEnvelope) -> Result<HealResult> {
        let tx_hash = envelope.tx.hash(self.config.network)?;
        let (signer, signature) = self
            .store
            .sign_transaction_hash(&request.tx_function_hash, &tx_hash)
            .await?;

        tracing::info!(
            control = %request.control_account,
            old = %request.old_turret,
            new = %request.new_turret,
            function = %request.tx_function_hash,
            %signer,
            "rotation co-signed"
        );
        Ok(HealResult {
            envelope,
            signer,
            signature,
        })
    }
}
