//! Read/write façade over the external ledger.
//!
//! The ledger itself is an external collaborator: this crate models just
//! enough of it to serve the protocol. [`account`] mirrors queried account
//! state, [`tx`] builds and signs the transactions the heal engine emits and
//! the fee subroutine decodes, [`gateway`] is the async seam every protocol
//! crate depends on, and [`horizon`] is the production HTTP implementation.

#![forbid(unsafe_code)]

pub mod account;
pub mod gateway;
pub mod horizon;
pub mod tx;

pub use account::{AccountRecord, SignerEntry, Thresholds};
pub use gateway::LedgerGateway;
pub use horizon::HorizonGateway;
pub use tx::{
    Asset, DecoratedSignature, Operation, TimeBounds, Transaction, TransactionBuilder,
    TransactionEnvelope,
};
