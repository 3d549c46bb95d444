use axum::{extract::State, Json};
use common_auth::{AuthError, TokenSubject};
use common_crypto::verify_secret;
use common_http_errors::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::extract::{Validate, ValidatedJson};
use crate::models::{User, UserRecord};
use crate::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const UNKNOWN_EMAIL: &str = "Invalid email";

/// Missing or blank credentials are not a client error here: they fall
/// through to the soft denial like any other unknown email.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> ApiResult<()> {
        Ok(())
    }
}

#[derive(Deserialize)]
pub struct BypassLoginRequest {
    #[serde(default)]
    pub email: String,
}

impl Validate for BypassLoginRequest {
    fn validate(&self) -> ApiResult<()> {
        Ok(())
    }
}

/// Login outcome envelope. Clients branch on `success`, not on the status
/// code, so rejected credentials are still a 200.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LoginResponse {
    fn denied(message: &str) -> Self {
        Self {
            success: false,
            token: None,
            expires_in: None,
            user: None,
            message: Some(message.to_string()),
        }
    }
}

fn grant(state: &AppState, record: UserRecord) -> ApiResult<LoginResponse> {
    let subject = TokenSubject {
        user_id: record.id.to_string(),
        email: record.email.clone(),
        tenant: record.kompania.clone(),
        role: record.permission.clone(),
    };

    let issued = state.token_signer.issue(&subject).map_err(|err: AuthError| {
        error!(user_id = %record.id, error = %err, "Failed to issue token");
        ApiError::internal("token signing failed", None)
    })?;

    Ok(LoginResponse {
        success: true,
        token: Some(issued.token),
        expires_in: Some(issued.expires_in),
        user: Some(User::from(record)),
        message: None,
    })
}

pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let LoginRequest { email, password } = body;

    let record = state.store.find_user_by_email(&email).await?;

    let Some(record) = record else {
        state.record_login_metric("unknown_email");
        return Ok(Json(LoginResponse::denied(INVALID_CREDENTIALS)));
    };

    if !verify_secret(&password, &record.password_hash) {
        state.record_login_metric("invalid_password");
        info!(user_id = %record.id, "Rejected login attempt");
        return Ok(Json(LoginResponse::denied(INVALID_CREDENTIALS)));
    }

    state.record_login_metric("success");
    let response = grant(&state, record)?;
    Ok(Json(response))
}

/// Issues a token for any known email without checking a password. Only
/// routed when the operator sets `ALLOW_BYPASS_LOGIN`.
pub async fn bypass_login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<BypassLoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let record = state.store.find_user_by_email(&body.email).await?;

    let Some(record) = record else {
        state.record_login_metric("bypass_unknown_email");
        return Ok(Json(LoginResponse::denied(UNKNOWN_EMAIL)));
    };

    warn!(user_id = %record.id, tenant = %record.kompania, "Issuing token through bypass login");
    state.record_login_metric("bypass");
    let response = grant(&state, record)?;
    Ok(Json(response))
}
