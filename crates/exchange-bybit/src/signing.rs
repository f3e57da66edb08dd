use anyhow::{anyhow, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `message` keyed by `secret`.
///
/// # Errors
/// Returns error if the key cannot initialise the MAC
pub fn hmac_hex(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| anyhow!("Invalid HMAC key: {e}"))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Signs a V5 request.
///
/// The signed string is `timestamp + api_key + recv_window + payload`, where
/// `payload` is the query string for GET and the raw JSON body for POST.
///
/// # Errors
/// Returns error if signing fails
pub fn sign_request(
    api_secret: &str,
    timestamp_ms: i64,
    api_key: &str,
    recv_window_ms: u64,
    payload: &str,
) -> Result<String> {
    hmac_hex(
        api_secret,
        &format!("{timestamp_ms}{api_key}{recv_window_ms}{payload}"),
    )
}
