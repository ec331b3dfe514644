//! Test fixtures for the turret workspace.
//!
//! A scripted in-memory [`MockLedger`], a [`FixedClock`], and deterministic
//! builders for keys, accounts, trust documents, and payment envelopes.
//! Everything here is test-only support; nothing is wired into production
//! paths.

#![forbid(unsafe_code)]
#![allow(clippy::unwrap_used)]

pub mod builders;
pub mod ledger;

pub use builders::{
    account_id, control_account, fee_payment_envelope, signer_key, signing_key, trust_document,
    turret_account,
};
pub use ledger::MockLedger;

use turret_core::Clock;

/// Clock pinned to a fixed unix second.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_now(&self) -> u64 {
        self.0
    }
}
