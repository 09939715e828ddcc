//! Reversible identity encoding for the simulator.
//!
//! The simulator carries the username through `ssoResponse` values and the
//! identity cookie as plain base64. The encoding is a functional stand-in
//! for the real backend's opaque artifact, not a security measure.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use rand::RngCore;

/// Name of the simulator's identity cookie.
///
/// One constant for set, read and clear.
pub const MOCK_COOKIE: &str = "sso-mock-auth";

/// Encodes a username into an `ssoResponse`/cookie value.
pub fn encode_username(username: &str) -> String {
    STANDARD.encode(username.as_bytes())
}

/// Decodes an `ssoResponse`/cookie value back into the username.
///
/// Returns `None` for values that are not base64-encoded UTF-8.
pub fn decode_username(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// Generates an opaque per-session token.
pub fn session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
