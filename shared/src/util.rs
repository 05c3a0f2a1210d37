//! Small shared utilities

use sha2::{Digest, Sha256};

/// One-way hash for password credentials: lowercase hex SHA-256.
/// Plaintext is never stored or returned.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    hex::encode(digest)
}
