// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication tokens for the custodian API.
//!
//! Every outbound call carries a fresh RS256 JWT whose claims bind the
//! request path and the SHA-256 of the exact body bytes. Tokens are valid for
//! [`TOKEN_TTL_SECS`] seconds; a call that does not reach the custodian inside
//! that window is rejected upstream and is not retried.

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const TOKEN_TTL_SECS: i64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("invalid RSA private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

/// Claim set of a signed custodian request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestClaims {
    pub uri: String,
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
    #[serde(rename = "bodyHash")]
    pub body_hash: String,
}

#[derive(Clone)]
pub struct RequestSigner {
    api_key: String,
    key: EncodingKey,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Load the signer from a PKCS#1 or PKCS#8 RSA private key.
    pub fn from_rsa_pem(api_key: impl Into<String>, pem: &[u8]) -> Result<Self, SigningError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(SigningError::InvalidKey)?;
        Ok(Self {
            api_key: api_key.into(),
            key,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Sign a call to `path` carrying `body`, issued now.
    pub fn sign(&self, path: &str, body: &[u8]) -> Result<String, SigningError> {
        self.sign_at(path, body, Utc::now().timestamp())
    }

    pub fn sign_at(&self, path: &str, body: &[u8], issued_at: i64) -> Result<String, SigningError> {
        let claims = self.claims(path, body, issued_at);
        encode(&Header::new(Algorithm::RS256), &claims, &self.key).map_err(SigningError::Sign)
    }

    fn claims(&self, path: &str, body: &[u8], issued_at: i64) -> RequestClaims {
        RequestClaims {
            uri: path.to_string(),
            nonce: Uuid::new_v4().to_string(),
            iat: issued_at,
            exp: issued_at + TOKEN_TTL_SECS,
            sub: self.api_key.clone(),
            body_hash: body_digest_hex(body),
        }
    }
}

/// Lowercase hex SHA-256 of `body`.
pub fn body_digest_hex(body: &[u8]) -> String {
    format!("{:x}", Sha256::digest(body))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    pub(crate) const TEST_PRIVATE_KEY: &str = include_str!("testdata/rsa_private.pem");
    pub(crate) const TEST_PUBLIC_KEY: &str = include_str!("testdata/rsa_public.pem");

    pub(crate) fn test_signer() -> RequestSigner {
        RequestSigner::from_rsa_pem("test-api-key", TEST_PRIVATE_KEY.as_bytes()).unwrap()
    }

    /// Verify a token with the fixture public key, ignoring expiry.
    pub(crate) fn decode_claims(token: &str) -> RequestClaims {
        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        decode::<RequestClaims>(token, &key, &validation)
            .expect("token verifies")
            .claims
    }

    #[test]
    fn empty_body_hashes_to_sha256_of_empty_string() {
        assert_eq!(
            body_digest_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn token_binds_path_body_and_api_key() {
        let signer = test_signer();
        let body = br#"{"name":"Treasury"}"#;

        let token = signer.sign("/v1/vault/accounts", body).unwrap();
        let claims = decode_claims(&token);

        assert_eq!(claims.uri, "/v1/vault/accounts");
        assert_eq!(claims.sub, "test-api-key");
        assert_eq!(claims.body_hash, body_digest_hex(body));
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
        assert!((Utc::now().timestamp() - claims.iat).abs() <= 5);
    }

    #[test]
    fn fresh_token_passes_expiry_validation() {
        let token = test_signer().sign("/v1/transactions", b"{}").unwrap();
        let key = DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap();
        let validation = Validation::new(Algorithm::RS256);
        assert!(decode::<RequestClaims>(&token, &key, &validation).is_ok());
    }

    #[test]
    fn tokens_one_second_apart_differ_in_nonce_and_expiry() {
        let signer = test_signer();
        let body = br#"{"amount":"0.1"}"#;
        let issued_at = 1_700_000_000;

        let first = decode_claims(&signer.sign_at("/v1/transactions", body, issued_at).unwrap());
        let second =
            decode_claims(&signer.sign_at("/v1/transactions", body, issued_at + 1).unwrap());

        assert_ne!(first.nonce, second.nonce);
        assert_eq!(first.exp, issued_at + 30);
        assert_eq!(second.exp, issued_at + 31);
        assert_eq!(first.body_hash, second.body_hash);
    }

    #[test]
    fn invalid_key_is_rejected() {
        let err = RequestSigner::from_rsa_pem("k", b"not a pem").unwrap_err();
        assert!(matches!(err, SigningError::InvalidKey(_)));
    }
}
