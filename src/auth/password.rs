use sha2::{Digest, Sha256};

/// Hex SHA-256 of the plaintext.
///
/// The digest is unsalted and deterministic: equal passwords produce equal
/// digests, which is what lets the user repository match logins by equality.
pub fn hash_password(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

pub fn verify_password(digest: &str, plain: &str) -> bool {
    hash_password(plain) == digest
}
