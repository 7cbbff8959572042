use sha2::Digest;

use crate::error::{Result, ScoreError};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// Lower-cases a configured digest after checking its shape.
pub fn normalize_sha256(value: &str) -> Result<String> {
    let value = value.trim();
    if value.len() != 64 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ScoreError::InvalidSha256 {
            value: value.to_string(),
        });
    }
    Ok(value.to_ascii_lowercase())
}
