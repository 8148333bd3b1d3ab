//! Stateless signed bearer tokens (HS256 compact JWS).
//! A token is reconstructed and verified per request from the bearer string;
//! nothing is held server-side between requests.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Fixed issuer claim written into every token.
const ISSUER: &str = "self";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, always [`ISSUER`].
    pub iss: String,
    /// Subject: the authenticated identity's email.
    pub sub: String,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch; iat + configured TTL.
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a process-wide symmetric key.
/// Constructed once at startup from configuration; safe for concurrent use.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Issue a signed token for the given subject, valid for the configured TTL.
    pub fn issue(&self, subject: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal("token_encode".to_string(), e.to_string()))
    }

    /// Verify a bearer string and return its subject. Signature mismatch,
    /// malformed structure and expiry all collapse into `Unauthorized`; the
    /// caller learns nothing about which check failed.
    pub fn verify(&self, token: &str) -> AppResult<String> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|_| AppError::unauthorized("invalid_token", "invalid or expired token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(b"test-secret-key", Duration::from_secs(24 * 3600))
    }

    #[test]
    fn issue_then_verify_returns_subject() {
        let iss = issuer();
        let token = iss.issue("alice@example.com").unwrap();
        assert_eq!(iss.verify(&token).unwrap(), "alice@example.com");
    }

    #[test]
    fn expired_token_is_unauthorized() {
        // TTL of zero puts exp at (or before) now; jsonwebtoken's default
        // leeway is 60s, so force it off to observe the rejection.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&["self"]);
        validation.leeway = 0;
        let iss = TokenIssuer {
            encoding_key: EncodingKey::from_secret(b"test-secret-key"),
            decoding_key: DecodingKey::from_secret(b"test-secret-key"),
            validation,
            ttl: Duration::from_secs(0),
        };
        let now = Utc::now().timestamp();
        let claims = Claims { iss: "self".into(), sub: "alice@example.com".into(), iat: now - 7200, exp: now - 3600 };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &iss.encoding_key).unwrap();
        let err = iss.verify(&token).unwrap_err();
        assert_eq!(err.http_status(), 401);
    }

    #[test]
    fn tampered_signature_is_unauthorized() {
        let iss = issuer();
        let token = iss.issue("alice@example.com").unwrap();
        // Flip a byte inside the signature segment
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(iss.verify(&tampered).unwrap_err().http_status(), 401);
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let token = issuer().issue("alice@example.com").unwrap();
        let other = TokenIssuer::new(b"a-different-secret", Duration::from_secs(3600));
        assert_eq!(other.verify(&token).unwrap_err().http_status(), 401);
    }

    #[test]
    fn malformed_token_is_unauthorized() {
        let iss = issuer();
        for garbage in ["", "abc", "a.b", "a.b.c.d", "not a token at all"] {
            assert_eq!(iss.verify(garbage).unwrap_err().http_status(), 401, "token {:?}", garbage);
        }
    }
}
