use crate::error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
///
/// The role is captured at issuance and is not re-checked against the live
/// role assignment: a role change only takes effect once a new token is issued.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: i64,
    /// Email of the user at issuance time.
    pub email: String,
    /// Role name of the user at issuance time.
    pub role: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens with a fixed secret and lifetime.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Generates a token embedding the user's id, email and role name.
    ///
    /// # Returns
    /// Returns `AppError::InternalServerError` if encoding fails.
    pub fn generate_token(&self, user_id: i64, email: &str, role: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        self.encode_claims(&claims)
    }

    pub(crate) fn encode_claims(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature and expiry and returns its claims.
    ///
    /// # Returns
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature is invalid, or it has expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }
}
