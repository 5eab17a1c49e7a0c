//! HMAC-SHA256 signing for Feishu custom bot webhooks.
//!
//! The bot verifies requests with the following scheme:
//! - The HMAC key is the string `{timestamp}\n{secret}`
//! - The HMAC message is empty
//! - The signature is the base64-encoded digest, sent alongside the timestamp in the body
//!
//! The empty message is part of the platform's protocol. Signing the timestamp as the message
//! produces signatures the bot rejects.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::errors::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Compute the webhook signature for `timestamp` (unix seconds).
pub fn sign(secret: &str, timestamp: i64) -> Result<String> {
    let string_to_sign = format!("{}\n{}", timestamp, secret);

    let mac = HmacSha256::new_from_slice(string_to_sign.as_bytes()).map_err(|e| Error::Signing { message: e.to_string() })?;
    let signature = mac.finalize().into_bytes();

    Ok(BASE64_STANDARD.encode(signature))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_vector() {
        // Computed independently: base64(HMAC-SHA256(key = "1700000000\ntest-secret", msg = ""))
        let signature = sign("test-secret", 1_700_000_000).unwrap();
        assert_eq!(signature, "mbm4Y4oluIPQ00qlBIhX8vAZ0EKv3nw0LuTb91jPL84=");
    }

    #[test]
    fn test_deterministic() {
        let a = sign("test-secret", 1_700_000_000).unwrap();
        let b = sign("test-secret", 1_700_000_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_timestamp_changes_signature() {
        let signature = sign("test-secret", 1_700_000_001).unwrap();
        assert_eq!(signature, "wlkWJ5yHBgxkfCL58e+uYjHfCsGBZymTcoZgyih2z6M=");
        assert_ne!(signature, sign("test-secret", 1_700_000_000).unwrap());
    }

    #[test]
    fn test_secret_changes_signature() {
        let signature = sign("other-secret", 1_700_000_000).unwrap();
        assert_eq!(signature, "CsekdnVRew3Kc6cuploXuJbf2RUxbZ21emZTOmVTN9s=");
        assert_ne!(signature, sign("test-secret", 1_700_000_000).unwrap());
    }

    #[test]
    fn test_empty_secret_still_signs() {
        let signature = sign("", 0).unwrap();
        // 32-byte digest -> 44 base64 chars with padding
        assert_eq!(signature.len(), 44);
    }
}
