//! HMAC-SHA256 verification of the `X-Hub-Signature-256` header.
//!
//! Both sides are re-hashed to a fixed-length SHA-256 digest before the
//! constant-time comparison, so a malformed or wrong-length provided
//! signature never leaks the expected signature's length through timing.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// Verifies `signature_header` (e.g. `sha256=<hex>`) against `body` under
/// `secret`.
pub fn verify(secret: &[u8], body: &[u8], signature_header: &str) -> bool {
    let expected_hex = hex_hmac(secret, body);
    let provided = signature_header.strip_prefix(PREFIX).unwrap_or(signature_header);

    let expected_digest = Sha256::digest(expected_hex.as_bytes());
    let provided_digest = Sha256::digest(provided.as_bytes());

    expected_digest.ct_eq(&provided_digest).into()
}

fn hex_hmac(secret: &[u8], body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(body);
    mac.finalize()
        .into_bytes()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
pub(crate) fn sign_hex(secret: &[u8], body: &[u8]) -> String {
    format!("{PREFIX}{}", hex_hmac(secret, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_a_correctly_signed_body() {
        let secret = b"shh";
        let body = b"{\"action\":\"opened\"}";
        let sig = sign_hex(secret, body);
        assert!(verify(secret, body, &sig));
    }

    #[test]
    fn rejects_a_tampered_body() {
        let secret = b"shh";
        let sig = sign_hex(secret, b"original");
        assert!(!verify(secret, b"tampered", &sig));
    }

    #[test]
    fn rejects_signature_from_a_different_secret() {
        let body = b"payload";
        let sig = sign_hex(b"secret-a", body);
        assert!(!verify(b"secret-b", body, &sig));
    }

    #[test]
    fn rejects_wrong_length_signature_without_panicking() {
        let secret = b"shh";
        let body = b"payload";
        assert!(!verify(secret, body, "sha256=short"));
        assert!(!verify(secret, body, "sha256="));
    }
}
