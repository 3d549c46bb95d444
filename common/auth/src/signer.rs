use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::claims::ClaimsRepr;
use crate::config::{JwtConfig, TOKEN_TTL_SECONDS};
use crate::error::{AuthError, AuthResult};

/// Identity a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: String,
    pub email: String,
    pub tenant: String,
    pub role: String,
}

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
}

pub struct TokenSigner {
    issuer: String,
    encoding_key: EncodingKey,
}

impl TokenSigner {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            issuer: config.issuer.clone(),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    pub fn issue(&self, subject: &TokenSubject) -> AuthResult<IssuedToken> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if it were signed at `now`.
    pub fn issue_at(&self, subject: &TokenSubject, now: DateTime<Utc>) -> AuthResult<IssuedToken> {
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECONDS);

        let claims = ClaimsRepr {
            id: subject.user_id.clone(),
            email: subject.email.clone(),
            kompania: subject.tenant.clone(),
            permission: subject.role.clone(),
            exp: expires_at.timestamp(),
            iat: Some(now.timestamp()),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Signing(err.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: TOKEN_TTL_SECONDS,
        })
    }
}
