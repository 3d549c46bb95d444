use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};
use common_auth::{AuthContext, AuthError, JwtVerifier};
use serde::{Deserialize, Serialize};
use tracing::Span;
use uuid::Uuid;

use crate::roles::Role;

/// Caller identity for a request, built only from verified token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityContext {
    pub user_id: String,
    pub email: String,
    pub tenant: String,
    pub role: Role,
    pub trace_id: Option<Uuid>,
}

impl SecurityContext {
    pub fn from_auth(auth: AuthContext, trace_id: Option<Uuid>) -> Self {
        let claims = auth.into_claims();
        Self {
            role: Role::from_permission(&claims.role),
            user_id: claims.subject,
            email: claims.email,
            tenant: claims.tenant,
            trace_id,
        }
    }
}

pub struct SecurityCtxExtractor(pub SecurityContext);

fn trace_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers.get("X-Trace-ID")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
}

#[async_trait]
impl<S> FromRequestParts<S> for SecurityCtxExtractor
where
    Arc<JwtVerifier>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        let trace_id = trace_id_from_headers(&parts.headers).or_else(|| Some(Uuid::new_v4()));
        let ctx = SecurityContext::from_auth(auth, trace_id);

        Span::current().record("tenant", tracing::field::display(&ctx.tenant));
        if let Some(tid) = ctx.trace_id.as_ref() {
            Span::current().record("trace_id", tracing::field::display(tid));
        }

        Ok(SecurityCtxExtractor(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, HeaderValue, Request};
    use common_auth::{JwtConfig, TokenSigner, TokenSubject};

    #[derive(Clone)]
    struct TestState {
        verifier: Arc<JwtVerifier>,
    }

    impl FromRef<TestState> for Arc<JwtVerifier> {
        fn from_ref(s: &TestState) -> Self {
            s.verifier.clone()
        }
    }

    fn config() -> JwtConfig {
        JwtConfig::new("context-secret", "meal-service")
    }

    async fn extract(auth_header: Option<&str>) -> Result<SecurityContext, AuthError> {
        let state = TestState { verifier: Arc::new(JwtVerifier::new(config())) };
        let mut builder = Request::builder().uri("/students");
        if let Some(value) = auth_header {
            builder = builder.header(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        SecurityCtxExtractor::from_request_parts(&mut parts, &state)
            .await
            .map(|SecurityCtxExtractor(ctx)| ctx)
    }

    #[tokio::test]
    async fn builds_context_from_verified_claims() {
        let issued = TokenSigner::new(&config())
            .issue(&TokenSubject {
                user_id: "u-1".into(),
                email: "ana@example.com".into(),
                tenant: "T1".into(),
                role: "SuperUser".into(),
            })
            .unwrap();

        let ctx = extract(Some(&format!("Bearer {}", issued.token))).await.unwrap();
        assert_eq!(ctx.user_id, "u-1");
        assert_eq!(ctx.tenant, "T1");
        assert_eq!(ctx.role, Role::SuperUser);
        assert!(ctx.trace_id.is_some());
    }

    #[tokio::test]
    async fn missing_header_is_rejected_as_missing() {
        let err = extract(None).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingAuthorization));
    }

    #[tokio::test]
    async fn forged_token_is_rejected_as_invalid() {
        let err = extract(Some("Bearer a.b.c")).await.unwrap_err();
        assert!(matches!(err, AuthError::Verification(_)));
    }
}
