use sha2::{Digest, Sha256};

/// Normalizes and hashes a PII field the way ad platforms expect: trimmed,
/// lower-cased, SHA-256, lowercase hex. Only empty input skips the digest;
/// whitespace-only input hashes as the empty string.
pub fn hash_pii(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let normalized = text.trim().to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}

pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// `(555) 123-4567` with country code `1` becomes `+15551234567`.
pub fn international_phone(raw: &str, country_code: &str) -> String {
    format!("+{country_code}{}", digits_only(raw))
}
