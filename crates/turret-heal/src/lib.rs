//! Signer-rotation ("heal") protocol engine.
//!
//! When the federation stops trusting a turret, its dedicated signer on each
//! delegating account must be replaced with a signer from a turret that is
//! still trusted. No single turret can seize or discard control: this engine
//! only contributes one co-signature over a rotation transaction it has
//! independently validated against its own trust registry, the on-chain
//! owner directory, and its local function store. The caller gathers the
//! remaining co-signatures and submits.
//!
//! The engine persists nothing and performs pure reads until the final
//! signature; every rejection is terminal and side-effect-free.

#![forbid(unsafe_code)]

mod engine;

pub use engine::HealEngine;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use turret_core::{AccountId, Result, SignerKey, TxFunctionHash};
use turret_ledger::TransactionEnvelope;

/// A request to rotate one turret's signer off a control account.
///
/// Ephemeral; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealRequest {
    /// Account whose signer set is being rotated.
    pub control_account: AccountId,
    /// Turret being removed. Must no longer be trusted locally.
    pub old_turret: AccountId,
    /// Turret being installed. Must be trusted locally.
    pub new_turret: AccountId,
    /// Function whose signers are rotating.
    pub tx_function_hash: TxFunctionHash,
    /// When the requester produced this request (unix seconds). Must be
    /// within the configured freshness window of receipt.
    pub timestamp: u64,
    /// Transaction fee the requester proposes, in stroops.
    pub fee: u32,
    /// Requesting user's account, if they choose to identify. Unused by the
    /// protocol beyond syntactic validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_account: Option<AccountId>,
}

/// The engine's contribution to a rotation: the unsubmitted transaction and
/// this node's detached co-signature over its hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealResult {
    /// Unsubmitted rotation transaction (no signatures attached).
    pub envelope: TransactionEnvelope,
    /// Public key of the local co-signer.
    pub signer: SignerKey,
    /// Detached signature over the transaction hash.
    pub signature: Vec<u8>,
}

impl HealResult {
    /// Wire encoding of the envelope.
    pub fn envelope_base64(&self) -> Result<String> {
        self.envelope.to_base64()
    }

    /// Base64 of the detached signature.
    pub fn signature_base64(&self) -> String {
        BASE64.encode(&self.signature)
    }
}
