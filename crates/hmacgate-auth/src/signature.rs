//! HMAC-SHA512 signing and verification.
//!
//! A request signature is the lowercase hex encoding of
//! `HMAC-SHA512(secret, nonce || timestamp)`, where `||` is plain string
//! concatenation with no separator. Signer and verifier must agree on this
//! payload byte-for-byte; changing it breaks every existing client.

use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use crate::error::SignatureError;

type HmacSha512 = Hmac<Sha512>;

/// Build the canonical signing payload for a nonce and timestamp.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::signature::signing_payload;
///
/// assert_eq!(signing_payload("1", "1657670400"), b"11657670400");
/// ```
#[must_use]
pub fn signing_payload(nonce: &str, timestamp: &str) -> Vec<u8> {
    let mut payload = Vec::with_capacity(nonce.len() + timestamp.len());
    payload.extend_from_slice(nonce.as_bytes());
    payload.extend_from_slice(timestamp.as_bytes());
    payload
}

/// Sign `payload` with `secret` and return the hex-encoded digest.
///
/// # Examples
///
/// ```
/// use hmacgate_auth::signature::sign;
///
/// let signature = sign(b"some-secret", b"11657670400");
/// assert_eq!(signature.len(), 128);
/// ```
#[must_use]
pub fn sign(secret: &[u8], payload: &[u8]) -> String {
    hex::encode(hmac_sha512(secret, payload))
}

/// Verify a hex-encoded signature for `payload` under `secret`.
///
/// Returns `Ok(false)` when the signature decodes but does not match. The
/// comparison runs in constant time with respect to the digest contents.
///
/// # Errors
///
/// Returns [`SignatureError::Decode`] if `signature_hex` is not valid hex.
pub fn verify(secret: &[u8], payload: &[u8], signature_hex: &str) -> Result<bool, SignatureError> {
    let provided = hex::decode(signature_hex)?;
    let expected = hmac_sha512(secret, payload);
    Ok(provided.as_slice().ct_eq(expected.as_slice()).into())
}

fn hmac_sha512(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha512::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"some-secret";
    // 2022-07-13T00:00:00Z
    const TIMESTAMP: &str = "1657670400";
    const EXPECTED_SIGNATURE: &str = "1e18f0e0aca2ad42e180b3a70ef96cabce58aa05d6ab10ecc7e449a82029f7c7\
                                      dfc8fc52f26c6c3cc669198c901036d4c1f72ee7047cdba3d176641ee81ea4f5";

    #[test]
    fn test_should_match_known_signature_vector() {
        let payload = signing_payload("1", TIMESTAMP);
        assert_eq!(sign(SECRET, &payload), EXPECTED_SIGNATURE);
        assert!(verify(SECRET, &payload, EXPECTED_SIGNATURE).unwrap());
    }

    #[test]
    fn test_should_produce_lowercase_hex_of_full_digest() {
        let signature = sign(b"key", b"payload");
        assert_eq!(signature.len(), 128);
        assert!(
            signature
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn test_should_reject_signature_for_different_payload() {
        let payload = signing_payload("1", TIMESTAMP);
        let signature = sign(SECRET, &payload);

        let tampered = signing_payload("2", TIMESTAMP);
        assert!(!verify(SECRET, &tampered, &signature).unwrap());
    }

    #[test]
    fn test_should_reject_signature_for_different_secret() {
        let payload = signing_payload("1", TIMESTAMP);
        let signature = sign(SECRET, &payload);

        assert!(!verify(b"some-secretX", &payload, &signature).unwrap());
    }

    #[test]
    fn test_should_reject_truncated_signature_without_error() {
        let payload = signing_payload("1", TIMESTAMP);
        assert!(!verify(SECRET, &payload, &EXPECTED_SIGNATURE[..64]).unwrap());
    }

    #[test]
    fn test_should_return_decode_error_for_non_hex_signature() {
        let payload = signing_payload("1", TIMESTAMP);
        let corrupted = format!("{EXPECTED_SIGNATURE}X");

        let result = verify(SECRET, &payload, &corrupted);
        assert!(matches!(result, Err(SignatureError::Decode(_))));
    }

    #[test]
    fn test_should_accept_uppercase_hex_signature() {
        let payload = signing_payload("1", TIMESTAMP);
        let upper = EXPECTED_SIGNATURE.to_ascii_uppercase();
        assert!(verify(SECRET, &payload, &upper).unwrap());
    }

    #[test]
    fn test_should_treat_empty_signature_as_mismatch() {
        let payload = signing_payload("1", TIMESTAMP);
        assert!(!verify(SECRET, &payload, "").unwrap());
    }
}
