use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a token is required for authentication")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("invalid token: {0}")]
    Verification(String),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("malformed claim payload: {0}")]
    InvalidJson(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Verification(value.to_string())
    }
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization => StatusCode::FORBIDDEN,
            AuthError::InvalidAuthorization
            | AuthError::Verification(_)
            | AuthError::InvalidClaim(_, _)
            | AuthError::InvalidJson(_) => StatusCode::UNAUTHORIZED,
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "auth_required",
            AuthError::InvalidAuthorization => "auth_header",
            AuthError::Verification(_) => "auth_token",
            AuthError::InvalidClaim(_, _) | AuthError::InvalidJson(_) => "auth_claims",
            AuthError::Signing(_) => "auth_signing",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let error = match &self {
            AuthError::Signing(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let mut response = (status, Json(ErrorBody { code, error })).into_response();
        response
            .headers_mut()
            .insert("X-Error-Code", axum::http::HeaderValue::from_static(code));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_forbidden() {
        let resp = AuthError::MissingAuthorization.into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "auth_required");
    }

    #[test]
    fn bad_token_is_unauthorized() {
        let resp = AuthError::Verification("ExpiredSignature".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "auth_token");
    }
}
