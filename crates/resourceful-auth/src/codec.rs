//! Signed opaque bearer tokens.
//!
//! A token is `<token id>.<signature>`, where the signature is the URL-safe
//! base64 of `HMAC-SHA256(secret, token id)`. The token id names a document in
//! the token collection; the signature only proves the id was issued with
//! this application's secret. Revocation is handled by the token document's
//! `active` flag, not by the codec.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Errors building a [`TokenCodec`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The signing secret was empty.
    #[error("the token secret must be a non-empty string")]
    EmptySecret,

    /// The secret could not key the MAC.
    #[error("the token secret cannot key HMAC-SHA256")]
    InvalidKey,
}

/// Issues and verifies bearer tokens.
///
/// # Example
///
/// ```
/// use resourceful_auth::TokenCodec;
///
/// let codec = TokenCodec::new("s3cr3t").unwrap();
/// let token = codec.issue("0190a1b2");
///
/// assert_eq!(codec.verify(&token), Some("0190a1b2"));
/// assert_eq!(codec.verify("0190a1b2.forged"), None);
/// ```
#[derive(Clone)]
pub struct TokenCodec {
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec signing with `secret`.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, CodecError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(CodecError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| CodecError::InvalidKey)?;
        Ok(Self { mac })
    }

    fn keyed(&self, id: &str) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(id.as_bytes());
        mac
    }

    /// Issues the token for a token document id.
    #[must_use]
    pub fn issue(&self, id: &str) -> String {
        let signature = self.keyed(id).finalize().into_bytes();
        format!("{id}.{}", URL_SAFE_NO_PAD.encode(signature))
    }

    /// Returns the token document id if `token` carries a valid signature.
    #[must_use]
    pub fn verify<'a>(&self, token: &'a str) -> Option<&'a str> {
        let (id, signature) = token.rsplit_once('.')?;
        if id.is_empty() {
            return None;
        }
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        self.keyed(id).verify_slice(&signature).ok().map(|()| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_is_rejected() {
        assert_eq!(TokenCodec::new("").unwrap_err(), CodecError::EmptySecret);
    }

    #[test]
    fn test_tokens_do_not_verify_across_secrets() {
        let a = TokenCodec::new("a").unwrap();
        let b = TokenCodec::new("b").unwrap();
        let token = a.issue("t1");
        assert_eq!(a.verify(&token), Some("t1"));
        assert_eq!(b.verify(&token), None);
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = TokenCodec::new("secret").unwrap();
        assert_eq!(codec.verify(""), None);
        assert_eq!(codec.verify("no-dot"), None);
        let token = codec.issue("t1");
        let signature = token.split_once('.').unwrap().1;
        assert_eq!(codec.verify(&format!(".{signature}")), None);
        assert_eq!(codec.verify(&format!("t2.{signature}")), None);
    }

    #[test]
    fn test_signature_is_hmac_sha256() {
        let token = TokenCodec::new("key").unwrap().issue("The quick brown fox jumps over the lazy dog");
        let signature = token.rsplit_once('.').unwrap().1;
        assert_eq!(
            URL_SAFE_NO_PAD.decode(signature).unwrap(),
            [
                0xf7, 0xbc, 0x83, 0xf4, 0x30, 0x53, 0x84, 0x24, 0xb1, 0x32, 0x98, 0xe6, 0xaa, 0x6f,
                0xb1, 0x43, 0xef, 0x4d, 0x59, 0xa1, 0x49, 0x46, 0x17, 0x59, 0x97, 0x47, 0x9d, 0xbc,
                0x2d, 0x1a, 0x3c, 0xd8,
            ]
        );
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let codec = TokenCodec::new("secret").unwrap();
        let token = codec.issue("t1");
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        assert_eq!(codec.verify(&tampered), None);
        assert_eq!(codec.verify("t1.not*base64"), None);
    }

    #[test]
    fn test_signature_is_url_safe() {
        let token = TokenCodec::new("secret").unwrap().issue("some-id");
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')));
    }
}
