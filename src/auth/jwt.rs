use crate::core::errors::SettlementError;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // User ID
    pub exp: usize,  // Expiration timestamp
    pub jti: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, SettlementError> {
        self.sub.parse().map_err(|_| SettlementError::InvalidToken)
    }
}

pub struct JwtService {
    secret: String,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: String, ttl_minutes: i64) -> Self {
        JwtService {
            secret,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    pub fn generate_token(&self, user_id: i64) -> Result<String, SettlementError> {
        let expiration = (Utc::now() + self.ttl).timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: usize::try_from(expiration).map_err(|e| SettlementError::TokenIssue(format!("Time error: {}", e)))?,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| SettlementError::TokenIssue(format!("JWT encoding error: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, SettlementError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            log::debug!("Rejected bearer token: {}", e);
            SettlementError::InvalidToken
        })?;

        Ok(token_data.claims)
    }
}
