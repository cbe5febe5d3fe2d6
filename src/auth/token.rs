use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::Clock;

/// The only identity allowed past the auth gate.
pub const ADMIN_IDENTITY: &str = "admin";

/// Token lifetime in hours
pub const TOKEN_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("token has expired")]
    Expired,
    #[error("token is malformed or its signature is invalid")]
    Malformed,
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub username: String, // Asserted identity
    pub exp: i64,         // Expiry timestamp
    pub iat: i64,         // Issued at timestamp
}

/// Signs and checks admin bearer tokens (HS256).
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(secret: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        }
    }

    pub fn issue(&self, identity: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = self.clock.now();
        let exp = now + Duration::hours(TOKEN_EXPIRY_HOURS);

        let claims = Claims {
            username: identity.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Returns the identity embedded in `token`.
    ///
    /// Expiry is checked against the injected clock rather than by the JWT
    /// library, so signature problems always win over expiry.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {}", e);
                AuthError::Malformed
            })?
            .claims;

        if self.clock.now().timestamp() > claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims.username)
    }
}
