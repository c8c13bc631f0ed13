//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs webhook payloads using HMAC-SHA256 with a shared secret and
//! delivers the signature in the `X-Hub-Signature-256` header as
//! `sha256=<hex>`. Verification is the first step in webhook processing;
//! invalid signatures are rejected before anything is parsed.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parses a GitHub signature header (e.g., "sha256=abc123...") into raw bytes.
///
/// Returns `None` for malformed headers (missing prefix, wrong algorithm,
/// invalid hex). Never panics.
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

/// Computes the HMAC-SHA256 signature of a payload using the given secret.
///
/// Mainly useful in tests for generating expected signatures.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Formats a signature as a GitHub-style header value (`sha256=<hex>`).
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a GitHub webhook signature against the payload and secret.
///
/// Returns `true` if the signature is valid. Uses the HMAC library's
/// constant-time comparison to prevent timing attacks.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let expected_signature = match parse_signature_header(signature_header) {
        Some(sig) => sig,
        None => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    mac.verify_slice(&expected_signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_header() {
        let result = parse_signature_header("sha256=1234abcd");
        assert_eq!(result, Some(vec![0x12, 0x34, 0xab, 0xcd]));
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        assert_eq!(parse_signature_header("1234abcd"), None);
    }

    #[test]
    fn parse_rejects_wrong_algorithm() {
        assert_eq!(parse_signature_header("sha1=1234abcd"), None);
    }

    #[test]
    fn parse_rejects_invalid_hex() {
        assert_eq!(parse_signature_header("sha256=xyz"), None);
        assert_eq!(parse_signature_header("sha256=abc"), None);
    }

    #[test]
    fn round_trip_verifies() {
        let payload = b"Hello, World!";
        let secret = b"It's a Secret to Everybody";

        let sig = compute_signature(payload, secret);
        let header = format_signature_header(&sig);

        assert!(verify_signature(payload, &header, secret));
    }

    #[test]
    fn wrong_secret_fails() {
        let payload = b"test payload";
        let sig = compute_signature(payload, b"correct-secret");
        let header = format_signature_header(&sig);

        assert!(!verify_signature(payload, &header, b"wrong-secret"));
    }

    #[test]
    fn tampered_payload_fails() {
        let secret = b"secret";
        let sig = compute_signature(b"original", secret);
        let header = format_signature_header(&sig);

        assert!(!verify_signature(b"tampered", &header, secret));
    }

    #[test]
    fn malformed_header_fails() {
        assert!(!verify_signature(b"payload", "", b"secret"));
        assert!(!verify_signature(b"payload", "sha256=zzz", b"secret"));
    }
}
