//! API token keys and the `Authorization` header format

use rand::RngCore;

/// Length of a key in hex characters
pub const TOKEN_KEY_LEN: usize = 40;

/// A fresh random 40-character lowercase hex key
pub fn generate_key() -> String {
    let mut bytes = [0u8; TOKEN_KEY_LEN / 2];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Pull the key out of `Bearer <key>` or `Token <key>`
///
/// The scheme is matched case-insensitively. Anything else, including a
/// scheme with no key, yields `None`.
pub fn parse_authorization(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") && !scheme.eq_ignore_ascii_case("token") {
        return None;
    }

    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some(key)
}
