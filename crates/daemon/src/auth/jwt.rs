use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::prelude::{Identity, Role};

/// Claims carried by a bearer token. Signed HS256.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: Uuid,
    /// Account role at issue time
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: u64,
    /// Expiration (unix seconds)
    pub exp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("credential rejected: {0}")]
    Invalid(jsonwebtoken::errors::Error),
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Issues and verifies the service's bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
        let claims = Claims {
            sub: identity.id,
            role: identity.role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Verify signature and expiry, returning the embedded identity.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(TokenError::Invalid)?;

        Ok(Identity::new(data.claims.sub, data.claims.role))
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret-test-secret-test-secret", 3600)
    }

    #[test]
    fn issue_then_verify_round_trips_identity() {
        let issuer = issuer();
        let identity = Identity::new(Uuid::new_v4(), Role::Parent);

        let token = issuer.issue(&identity).unwrap();
        let verified = issuer.verify(&token).unwrap();

        assert_eq!(verified, identity);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let identity = Identity::new(Uuid::new_v4(), Role::Child);
        let token = issuer().issue(&identity).unwrap();

        let other = TokenIssuer::new("a-completely-different-secret-value", 3600);
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = issuer();
        let identity = Identity::new(Uuid::new_v4(), Role::Child);

        // hand-roll claims that lapsed beyond the default leeway
        let now = OffsetDateTime::now_utc().unix_timestamp() as u64;
        let claims = Claims {
            sub: identity.id,
            role: identity.role,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::default(), &claims, &issuer.encoding).unwrap();

        assert!(matches!(issuer.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(issuer().verify("not-a-token").is_err());
    }
}
