use axum::{
    extract::{Path, State},
    Json,
};
use common_crypto::hash_secret;
use common_http_errors::{ApiError, ApiResult};
use common_security::{SecurityCtxExtractor, TenantScope};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extract::{require, require_if_present, Validate, ValidatedJson};
use crate::ids::RecordId;
use crate::models::{NewUserRecord, User, UserChanges};
use crate::AppState;

/// Role stored when a new user is created without one.
pub(crate) const DEFAULT_PERMISSION: &str = "User";

/// Identifier envelope returned by every successful write.
#[derive(Debug, Serialize)]
pub struct IdResponse {
    pub id: RecordId,
}

#[derive(Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub permission: Option<String>,
    pub kompania: String,
}

impl Validate for NewUserRequest {
    fn validate(&self) -> ApiResult<()> {
        require("name", &self.name)?;
        require("surname", &self.surname)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        require_if_present("permission", self.permission.as_deref())?;
        require("kompania", &self.kompania)
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub permission: Option<String>,
    pub kompania: Option<String>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> ApiResult<()> {
        require_if_present("name", self.name.as_deref())?;
        require_if_present("surname", self.surname.as_deref())?;
        require_if_present("email", self.email.as_deref())?;
        require_if_present("permission", self.permission.as_deref())?;
        require_if_present("kompania", self.kompania.as_deref())
    }
}

impl UpdateUserRequest {
    /// A blank password in an edit form means "keep the current one".
    fn new_password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .filter(|password| !password.trim().is_empty())
    }
}

fn user_not_found() -> ApiError {
    ApiError::not_found("user_not_found", "User not found")
}

fn hash_password(password: &str) -> ApiResult<String> {
    hash_secret(password).map_err(|err| ApiError::internal(err, None))
}

pub async fn list_users(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
) -> ApiResult<Json<Vec<User>>> {
    let scope = TenantScope::for_context(&ctx);
    let users = state
        .store
        .list_users(&scope)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    Ok(Json(users.into_iter().map(User::from).collect()))
}

pub async fn create_user(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    ValidatedJson(body): ValidatedJson<NewUserRequest>,
) -> ApiResult<Json<IdResponse>> {
    let NewUserRequest {
        name,
        surname,
        email,
        password,
        permission,
        kompania,
    } = body;

    let password_hash = hash_password(&password)?;
    let record = NewUserRecord {
        name,
        surname,
        email,
        password_hash,
        permission: permission.unwrap_or_else(|| DEFAULT_PERMISSION.to_string()),
        kompania,
    };

    let id = state
        .store
        .insert_user(record)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    info!(user_id = %id, created_by = %ctx.user_id, "User created");
    Ok(Json(IdResponse { id }))
}

pub async fn update_user(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    Path(raw_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> ApiResult<Json<IdResponse>> {
    let id = RecordId::from_param("id", &raw_id)?;

    let password_hash = match body.new_password() {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };
    let changes = UserChanges {
        name: body.name,
        surname: body.surname,
        email: body.email,
        password_hash,
        permission: body.permission,
        kompania: body.kompania,
    };

    let matched = state
        .store
        .update_user(id, changes)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    if !matched {
        warn!(user_id = %id, "Update for unknown user");
        return Err(user_not_found().with_trace_id(ctx.trace_id));
    }
    Ok(Json(IdResponse { id }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<IdResponse>> {
    let id = RecordId::from_param("id", &raw_id)?;

    let deleted = state
        .store
        .delete_user(id)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    if !deleted {
        return Err(user_not_found().with_trace_id(ctx.trace_id));
    }
    info!(user_id = %id, deleted_by = %ctx.user_id, "User deleted");
    Ok(Json(IdResponse { id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_body_accepts_partial_fields() {
        let body: UpdateUserRequest =
            serde_json::from_str(r#"{"name":"Ana"}"#).expect("partial body");
        assert_eq!(body.name.as_deref(), Some("Ana"));
        assert!(body.password.is_none());
        assert!(body.validate().is_ok());
    }

    #[test]
    fn blank_password_keeps_the_current_one() {
        let body: UpdateUserRequest =
            serde_json::from_str(r#"{"name":"Ana","password":""}"#).expect("edit form body");
        assert!(body.validate().is_ok());
        assert!(body.new_password().is_none());

        let body: UpdateUserRequest =
            serde_json::from_str(r#"{"password":"fresh"}"#).expect("password body");
        assert_eq!(body.new_password(), Some("fresh"));
    }

    #[test]
    fn new_user_requires_password() {
        let body: NewUserRequest = serde_json::from_str(
            r#"{"name":"Ana","surname":"Kos","email":"ana@example.com","password":" ","kompania":"T1"}"#,
        )
        .expect("body shape");
        assert!(matches!(
            body.validate(),
            Err(ApiError::BadRequest { code: "invalid_body", .. })
        ));
    }
}
