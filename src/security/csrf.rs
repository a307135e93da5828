//! Double-submit CSRF tokens.
//!
//! The cookie carries the raw 32-byte token. Pages receive a masked copy
//! (`pad || pad ^ token`) that changes on every render.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;

pub const CSRF_COOKIE_NAME: &str = "csrf_token";
pub const CSRF_FIELD_NAME: &str = "csrf_token";
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";
pub const CSRF_COOKIE_MAX_AGE: u64 = 365 * 24 * 60 * 60;

const TOKEN_LEN: usize = 32;

/// Raw token bytes.
pub type RawToken = [u8; TOKEN_LEN];

/// Masked token exposed to templates for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

#[must_use]
pub fn generate() -> RawToken {
    rand::rng().random()
}

#[must_use]
pub fn encode(token: &RawToken) -> String {
    URL_SAFE_NO_PAD.encode(token)
}

/// Decodes a cookie value. Anything that is not exactly 32 bytes is rejected.
#[must_use]
pub fn decode(value: &str) -> Option<RawToken> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| RawToken::try_from(bytes.as_slice()).ok())
}

/// Masks `token` with a fresh one-time pad.
#[must_use]
pub fn mask(token: &RawToken) -> String {
    let pad: RawToken = rand::rng().random();
    let mut out = Vec::with_capacity(TOKEN_LEN * 2);
    out.extend_from_slice(&pad);
    out.extend(pad.iter().zip(token).map(|(p, t)| p ^ t));
    URL_SAFE_NO_PAD.encode(out)
}

/// Recovers the raw token from a submitted value, masked or not.
#[must_use]
pub fn unmask(sent: &str) -> Option<RawToken> {
    let bytes = URL_SAFE_NO_PAD.decode(sent.trim()).ok()?;
    match bytes.len() {
        n if n == TOKEN_LEN * 2 => {
            let (pad, masked) = bytes.split_at(TOKEN_LEN);
            let mut token = [0u8; TOKEN_LEN];
            for (i, byte) in token.iter_mut().enumerate() {
                *byte = pad[i] ^ masked[i];
            }
            Some(token)
        }
        n if n == TOKEN_LEN => RawToken::try_from(bytes.as_slice()).ok(),
        _ => None,
    }
}

/// Checks a submitted token against the cookie-bound one.
#[must_use]
pub fn verify(real: &RawToken, sent: &str) -> bool {
    unmask(sent).is_some_and(|candidate| constant_time_eq(real, &candidate))
}

#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
