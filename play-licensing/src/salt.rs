//! Hex encoding for salts passed across the method channel.

/// Decodes a hex-pair string into bytes.
///
/// Decoding is best-effort: odd length or non-hex digits yield `None`,
/// and the caller falls back to the configured salt. The empty string is
/// an empty salt. Upper and lower case digits are both accepted.
#[must_use]
pub fn decode_hex_salt(s: &str) -> Option<Vec<u8>> {
    hex::decode(s).ok()
}

/// Encodes bytes as lowercase hex pairs.
#[must_use]
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}
