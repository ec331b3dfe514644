//! Content-addressed TxFunction store with fee-gated upload.
//!
//! A TxFunction is an uploaded executable policy identified by the digest of
//! its code and optional structured fields. The store binds each function to
//! a dedicated signer keypair generated at upload time; the public key is
//! returned to the uploader and installed on delegating accounts, while the
//! secret never leaves the store boundary except as a signature byte string.
//!
//! Uploads are economically gated: the uploader must attach a fee payment
//! matching the size-derived cost exactly, validated and submitted against
//! the ledger before anything is persisted.

#![forbid(unsafe_code)]

pub mod digest;
pub mod fees;
pub mod kv;
pub mod record;
pub mod store;

pub use kv::{FilesystemKvStore, KeyValueStore, MemoryKvStore};
pub use record::StoredTxFunction;
pub use store::{TxFunctionStore, UploadReceipt, UploadRequest};
