//! Fingerprinting: a stable comparison key derived from free-form text.

/// Number of leading characters that identify a job description.
pub const FINGERPRINT_LEN: usize = 100;

/// Returns the first `FINGERPRINT_LEN` characters of `text`.
///
/// Counts Unicode scalar values, so the slice never splits a character.
/// No normalization is applied; case folding happens at comparison time.
pub fn fingerprint(text: &str) -> &str {
    match text.char_indices().nth(FINGERPRINT_LEN) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
