use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};

use crate::claims::Claims;
use crate::error::{AuthError, AuthResult};
use crate::verifier::JwtVerifier;

/// Caller claims from a verified bearer token.
///
/// A request that presents no credentials at all is rejected with
/// [`AuthError::MissingAuthorization`] (403). Credentials that are present
/// but unusable (wrong scheme, bad signature, expired) are 401.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

/// What the `Authorization` header offers before any verification.
#[derive(Debug, PartialEq, Eq)]
enum Presented<'a> {
    Nothing,
    Bearer(&'a str),
    Unusable,
}

fn presented(headers: &HeaderMap) -> Presented<'_> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Presented::Nothing;
    };
    let Ok(raw) = value.to_str() else {
        return Presented::Unusable;
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return Presented::Nothing;
    }
    match raw.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Presented::Bearer(token.trim()),
        Some(("Bearer", _)) => Presented::Nothing,
        None if raw == "Bearer" => Presented::Nothing,
        _ => Presented::Unusable,
    }
}

fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    match presented(headers) {
        Presented::Bearer(token) => Ok(token),
        Presented::Nothing => Err(AuthError::MissingAuthorization),
        Presented::Unusable => Err(AuthError::InvalidAuthorization),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = Arc::<JwtVerifier>::from_ref(state).verify(token)?;
        Ok(Self { claims })
    }
}
