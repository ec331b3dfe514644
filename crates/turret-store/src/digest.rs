//! Content addressing for uploaded functions.

use sha2::{Digest, Sha256};
use turret_core::TxFunctionHash;

/// Digest identifying a function: SHA-256 over the code bytes concatenated
/// with the optional fields bytes.
pub fn tx_function_digest(code: &[u8], fields: &[u8]) -> TxFunctionHash {
    let mut hasher = Sha256::new();
    hasher.update(code);
    hasher.update(fields);
    TxFunctionHash::from_bytes(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_deterministic() {
        assert_eq!(
            tx_function_digest(b"code", b"fields"),
            tx_function_digest(b"code", b"fields")
        );
    }

    #[test]
    fn digest_covers_both_parts() {
        let base = tx_function_digest(b"code", b"fields");
        assert_ne!(base, tx_function_digest(b"code", b""));
        assert_ne!(base, tx_function_digest(b"codefields", b""));
        // Concatenation means the split point does not matter; the protocol
        // hashes the joined payload, matching the upload cost basis.
        assert_eq!(base, tx_function_digest(b"codef", b"ields"));
    }
}
