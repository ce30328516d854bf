use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// The only algorithm tokens are signed or accepted with
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Clock skew tolerated on `exp`, in seconds
const LEEWAY_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    /// Token id, only used to correlate log lines
    pub jti: Uuid,
}

impl Claims {
    pub fn new(
        subject: impl Into<String>,
        issuer: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Generation("token lifetime out of range".to_string()))?;
        Ok(Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
            iss: issuer.into(),
            jti: Uuid::new_v4(),
        })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Missing authentication token")]
    Missing,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token signed with an unexpected algorithm")]
    InvalidAlgorithm,

    #[error("Token issuer mismatch")]
    InvalidIssuer,

    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => TokenError::InvalidAlgorithm,
            ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Issues and verifies HS256 bearer tokens with a fixed process-wide key.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: Duration,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], issuer: impl Into<String>, ttl: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }
        let issuer = issuer.into();

        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = LEEWAY_SECS;
        validation.validate_exp = true;
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer,
            ttl,
            validation,
        })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, TokenError> {
        let ttl = i64::try_from(config.jwt_expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| TokenError::Generation("token lifetime out of range".to_string()))?;
        Self::new(config.jwt_secret.as_bytes(), config.jwt_issuer.clone(), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a fresh token for `subject`, valid for the configured lifetime
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    pub(crate) fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(subject, self.issuer.clone(), now, self.ttl)?;
        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Check signature, algorithm, issuer and expiry, and return the claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-signing-key";

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SECRET, "social-api", Duration::hours(1)).unwrap()
    }

    #[test]
    fn test_issue_then_verify_recovers_subject() {
        let issuer = issuer();
        let token = issuer.issue("ann@x.com").unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "ann@x.com");
        assert_eq!(claims.iss, "social-api");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_always_carries_expiry() {
        let issuer = issuer();
        let token = issuer.issue("ann@x.com").unwrap();
        let claims = issuer.verify(&token).unwrap();
        let expires_at = claims.expires_at().unwrap();
        assert!(expires_at > Utc::now());
        assert!(expires_at <= Utc::now() + Duration::hours(1) + Duration::seconds(1));
    }

    #[test]
    fn test_expired_token_rejected() {
        let issuer = issuer();
        let token = issuer
            .issue_at("ann@x.com", Utc::now() - Duration::hours(2))
            .unwrap();
        assert_eq!(issuer.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampering_any_character_fails() {
        let issuer = issuer();
        let token = issuer.issue("ann@x.com").unwrap();

        for (i, c) in token.char_indices() {
            if c == '.' {
                continue;
            }
            let replacement = if c == 'A' { 'B' } else { 'A' };
            let mut tampered = String::with_capacity(token.len());
            tampered.push_str(&token[..i]);
            tampered.push(replacement);
            tampered.push_str(&token[i + c.len_utf8()..]);

            assert!(
                issuer.verify(&tampered).is_err(),
                "tampered token at index {} still verified",
                i
            );
        }
    }

    #[test]
    fn test_other_key_rejected() {
        let token = issuer().issue("ann@x.com").unwrap();
        let other = TokenIssuer::new(b"another-key", "social-api", Duration::hours(1)).unwrap();
        assert_eq!(other.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let claims = Claims::new("ann@x.com", "social-api", Utc::now(), Duration::hours(1)).unwrap();
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert_eq!(issuer().verify(&token), Err(TokenError::InvalidAlgorithm));
    }

    #[test]
    fn test_other_issuer_rejected() {
        let token = TokenIssuer::new(SECRET, "someone-else", Duration::hours(1))
            .unwrap()
            .issue("ann@x.com")
            .unwrap();
        assert_eq!(issuer().verify(&token), Err(TokenError::InvalidIssuer));
    }

    #[test]
    fn test_missing_and_garbage_tokens() {
        let issuer = issuer();
        assert_eq!(issuer.verify(""), Err(TokenError::Missing));
        assert_eq!(issuer.verify("   "), Err(TokenError::Missing));
        assert!(matches!(issuer.verify("not.a.jwt"), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            TokenIssuer::new(b"", "social-api", Duration::hours(1)),
            Err(TokenError::InvalidSecret)
        ));
    }

    #[test]
    fn test_lifetime_overflow_is_generation_error() {
        let mut config = crate::config::AppConfig::development().security;
        config.jwt_expiry_hours = u64::MAX;
        assert!(matches!(
            TokenIssuer::from_config(&config),
            Err(TokenError::Generation(_))
        ));

        config.jwt_expiry_hours = 2_000_000_000_000;
        let issuer = TokenIssuer::from_config(&config).unwrap();
        assert!(matches!(issuer.issue("ann@x.com"), Err(TokenError::Generation(_))));
    }
}
