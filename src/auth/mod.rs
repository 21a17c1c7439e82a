pub mod provider;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Claims carried by tokens from the identity provider. Only `sub` and `email`
/// are required downstream; they are optional here so a missing claim is
/// reported as such rather than as a generic decode failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn new(sub: Uuid, email: impl Into<String>, role: Option<String>, ttl_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: Some(sub.to_string()),
            email: Some(email.into()),
            role,
            aud: None,
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: Some(now.timestamp()),
        }
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.aud = Some(Value::String(audience.into()));
        self
    }
}

/// Authenticated caller, derived from verified claims and handed to handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Option<String>,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let sub = claims.sub.ok_or(AuthError::MissingClaim("sub"))?;
        let email = claims
            .email
            .filter(|e| !e.is_empty())
            .ok_or(AuthError::MissingClaim("email"))?;
        let id = Uuid::parse_str(&sub).map_err(|_| AuthError::InvalidSubject(sub))?;

        Ok(Self {
            id,
            email,
            role: claims.role,
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Token is missing the {0} claim")]
    MissingClaim(&'static str),

    #[error("Token subject is not a UUID: {0}")]
    InvalidSubject(String),

    #[error("JWT generation error: {0}")]
    Signing(String),
}

/// HS256 verification (and, for local tooling, issuance) against the shared secret.
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        AuthUser::try_from(data.claims)
    }

    pub fn issue(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}
