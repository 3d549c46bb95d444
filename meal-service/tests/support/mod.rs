#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use common_auth::{JwtConfig, TokenSigner, TokenSubject};
use common_crypto::hash_secret;
use http_body_util::BodyExt;
use meal_service::config::ServiceConfig;
use meal_service::ids::RecordId;
use meal_service::models::{NewUserRecord, StudentFields};
use meal_service::store::{MemoryStore, RecordStore};
use meal_service::{router, AppState};
use serde_json::Value;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "meal-service-test-secret";
pub const JWT_ISSUER: &str = "meal-service";

pub fn test_config(allow_bypass_login: bool) -> ServiceConfig {
    ServiceConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://unused".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        jwt_issuer: JWT_ISSUER.to_string(),
        jwt_leeway_seconds: 0,
        allow_bypass_login,
        cors_allowed_origins: vec!["http://localhost:3000".to_string()],
    }
}

pub struct TestApp {
    pub store: MemoryStore,
    router: Router,
    signer: TokenSigner,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::build(false)
    }

    pub fn with_bypass_login() -> Result<Self> {
        Self::build(true)
    }

    fn build(allow_bypass_login: bool) -> Result<Self> {
        let store = MemoryStore::new();
        let config = test_config(allow_bypass_login);
        let signer = TokenSigner::new(&JwtConfig::new(JWT_SECRET, JWT_ISSUER));
        let state = AppState::new(Arc::new(store.clone()), config)?;
        Ok(Self {
            store,
            router: router(state),
            signer,
        })
    }

    pub async fn seed_user(
        &self,
        email: &str,
        password: &str,
        permission: &str,
        kompania: &str,
    ) -> Result<RecordId> {
        let password_hash = hash_secret(password).context("hash seed password")?;
        let id = self
            .store
            .insert_user(NewUserRecord {
                name: "Test".to_string(),
                surname: "User".to_string(),
                email: email.to_string(),
                password_hash,
                permission: permission.to_string(),
                kompania: kompania.to_string(),
            })
            .await?;
        Ok(id)
    }

    pub async fn seed_student(&self, name: &str, kompania: &str) -> Result<RecordId> {
        let id = self
            .store
            .insert_student(StudentFields {
                name: name.to_string(),
                surname: "Student".to_string(),
                card_type: "RFID".to_string(),
                card_id: format!("card-{name}"),
                qr_code: format!("qr-{name}"),
                status: "active".to_string(),
                kompania: kompania.to_string(),
            })
            .await?;
        Ok(id)
    }

    pub fn token(&self, tenant: &str, role: &str) -> Result<String> {
        self.token_at(tenant, role, Utc::now())
    }

    pub fn token_at(&self, tenant: &str, role: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let subject = TokenSubject {
            user_id: RecordId::generate().to_string(),
            email: format!("caller@{tenant}.test"),
            tenant: tenant.to_string(),
            role: role.to_string(),
        };
        let issued = self.signer.issue_at(&subject, issued_at)?;
        Ok(issued.token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        Ok((status, body))
    }
}

pub fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["id"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
