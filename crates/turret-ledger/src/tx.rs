//! Transaction model, canonical hashing, and signing.
//!
//! The real ledger SDK owns the production wire format; this crate carries
//! its own compact envelope encoding (bincode + base64) with the same
//! semantics: a transaction hash is domain-separated by the network
//! passphrase, signatures are detached ed25519 over that hash, and an
//! envelope is the transaction plus any number of decorated signatures.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use turret_core::{AccountId, Amount, Network, Result, SignerKey, TurretError, TxHash};

/// Asset moved by a payment operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Asset {
    /// The ledger's native asset.
    Native,
    /// An issued asset.
    Issued {
        /// Asset code.
        code: String,
        /// Issuing account.
        issuer: AccountId,
    },
}

impl Asset {
    /// Whether this is the native asset.
    pub fn is_native(&self) -> bool {
        matches!(self, Asset::Native)
    }
}

/// One ledger operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Move `amount` of `asset` to `destination`.
    Payment {
        /// Receiving account.
        destination: AccountId,
        /// Asset being paid.
        asset: Asset,
        /// Exact amount.
        amount: Amount,
    },
    /// Install `key` at `weight`, or logically remove it at weight zero.
    ///
    /// Signer lists are not directly deletable on the ledger; removal is
    /// always a weight-zero update.
    SetSigner {
        /// Signer public key.
        key: SignerKey,
        /// New weight.
        weight: u8,
    },
    /// Write (`Some`) or clear (`None`) the data entry `name`.
    ManageData {
        /// Entry key.
        name: String,
        /// New value, or `None` to delete the entry.
        value: Option<Vec<u8>>,
    },
}

/// Validity window of a transaction, in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    /// Earliest acceptance time (0 = unbounded).
    pub min_time: u64,
    /// Latest acceptance time (0 = unbounded).
    pub max_time: u64,
}

/// An unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Source account whose sequence number this transaction consumes.
    pub source: AccountId,
    /// Sequence number the transaction must be applied at.
    pub sequence: i64,
    /// Fee in stroops.
    pub fee: u32,
    /// Validity window, if bounded.
    pub time_bounds: Option<TimeBounds>,
    /// Operations, applied atomically in order.
    pub operations: Vec<Operation>,
}

impl Transaction {
    /// Canonical hash, domain-separated by the network passphrase.
    pub fn hash(&self, network: Network) -> Result<TxHash> {
        let body = bincode::serialize(self).map_err(|e| {
            TurretError::validation(format!("transaction could not be encoded: {e}"))
        })?;
        let mut hasher = Sha256::new();
        hasher.update(Sha256::digest(network.passphrase().as_bytes()));
        hasher.update(&body);
        Ok(TxHash::from_bytes(hasher.finalize().into()))
    }
}

/// A detached signature together with the key that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoratedSignature {
    /// Public key of the signer.
    pub signer: SignerKey,
    /// 64-byte ed25519 signature over the transaction hash.
    pub signature: Vec<u8>,
}

/// A transaction plus the signatures gathered so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    /// The transaction being signed.
    pub tx: Transaction,
    /// Signatures collected so far.
    pub signatures: Vec<DecoratedSignature>,
}

impl TransactionEnvelope {
    /// Wrap an unsigned transaction.
    pub fn unsigned(tx: Transaction) -> Self {
        Self {
            tx,
            signatures: Vec::new(),
        }
    }

    /// Append a signature by `key` over this transaction's hash.
    pub fn sign(&mut self, key: &SigningKey, network: Network) -> Result<()> {
        let hash = self.tx.hash(network)?;
        let signature: Signature = key.sign(hash.as_bytes());
        self.signatures.push(DecoratedSignature {
            signer: SignerKey::from(key.verifying_key()),
            signature: signature.to_bytes().to_vec(),
        });
        Ok(())
    }

    /// Whether `signer` has a valid signature on this envelope.
    pub fn signed_by(&self, signer: &SignerKey, network: Network) -> Result<bool> {
        let hash = self.tx.hash(network)?;
        let key = signer.verifying_key()?;
        for decorated in self.signatures.iter().filter(|d| &d.signer == signer) {
            let Ok(bytes) = <[u8; 64]>::try_from(decorated.signature.as_slice()) else {
                continue;
            };
            if key
                .verify(hash.as_bytes(), &Signature::from_bytes(&bytes))
                .is_ok()
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Encode to wire text.
    pub fn to_base64(&self) -> Result<String> {
        let bytes = bincode::serialize(self)
            .map_err(|e| TurretError::validation(format!("envelope could not be encoded: {e}")))?;
        Ok(BASE64.encode(bytes))
    }

    /// Decode from wire text.
    pub fn from_base64(text: &str) -> Result<Self> {
        let bytes = BASE64
            .decode(text.trim())
            .map_err(|_| TurretError::validation("envelope is not valid base64"))?;
        bincode::deserialize(&bytes)
            .map_err(|_| TurretError::validation("envelope bytes did not decode"))
    }
}

/// Builder assembling a transaction against a known account sequence.
#[derive(Debug)]
pub struct TransactionBuilder {
    tx: Transaction,
}

impl TransactionBuilder {
    /// Start a transaction consuming `sequence` on `source`.
    pub fn new(source: AccountId, sequence: i64, fee: u32) -> Self {
        Self {
            tx: Transaction {
                source,
                sequence,
                fee,
                time_bounds: None,
                operations: Vec::new(),
            },
        }
    }

    /// Append an operation. Order is preserved and significant.
    pub fn add_operation(mut self, operation: Operation) -> Self {
        self.tx.operations.push(operation);
        self
    }

    /// Bound validity to `[now, now + timeout_secs]`.
    pub fn valid_for(mut self, now: u64, timeout_secs: u64) -> Self {
        self.tx.time_bounds = Some(TimeBounds {
            min_time: 0,
            max_time: now + timeout_secs,
        });
        self
    }

    /// Finish the transaction.
    pub fn build(self) -> Transaction {
        self.tx
    }
}
