use axum::{
    extract::{Path, State},
    Json,
};
use common_http_errors::{ApiError, ApiResult};
use common_security::{SecurityCtxExtractor, TenantScope};
use serde::Deserialize;
use tracing::info;

use crate::extract::{require, require_if_present, Validate, ValidatedJson};
use crate::ids::RecordId;
use crate::models::{Student, StudentChanges, StudentFields};
use crate::user_handlers::IdResponse;
use crate::AppState;

#[derive(Deserialize)]
pub struct NewStudentRequest {
    pub name: String,
    pub surname: String,
    #[serde(rename = "cardType")]
    pub card_type: String,
    #[serde(rename = "cardID")]
    pub card_id: String,
    #[serde(rename = "QRCode")]
    pub qr_code: String,
    pub status: String,
    pub kompania: String,
}

impl Validate for NewStudentRequest {
    fn validate(&self) -> ApiResult<()> {
        require("name", &self.name)?;
        require("surname", &self.surname)?;
        require("cardType", &self.card_type)?;
        require("cardID", &self.card_id)?;
        require("QRCode", &self.qr_code)?;
        require("status", &self.status)?;
        require("kompania", &self.kompania)
    }
}

impl From<NewStudentRequest> for StudentFields {
    fn from(req: NewStudentRequest) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            card_type: req.card_type,
            card_id: req.card_id,
            qr_code: req.qr_code,
            status: req.status,
            kompania: req.kompania,
        }
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    #[serde(rename = "cardType")]
    pub card_type: Option<String>,
    #[serde(rename = "cardID")]
    pub card_id: Option<String>,
    #[serde(rename = "QRCode")]
    pub qr_code: Option<String>,
    pub status: Option<String>,
    pub kompania: Option<String>,
}

impl Validate for UpdateStudentRequest {
    fn validate(&self) -> ApiResult<()> {
        require_if_present("name", self.name.as_deref())?;
        require_if_present("surname", self.surname.as_deref())?;
        require_if_present("cardType", self.card_type.as_deref())?;
        require_if_present("cardID", self.card_id.as_deref())?;
        require_if_present("QRCode", self.qr_code.as_deref())?;
        require_if_present("status", self.status.as_deref())?;
        require_if_present("kompania", self.kompania.as_deref())
    }
}

impl From<UpdateStudentRequest> for StudentChanges {
    fn from(req: UpdateStudentRequest) -> Self {
        Self {
            name: req.name,
            surname: req.surname,
            card_type: req.card_type,
            card_id: req.card_id,
            qr_code: req.qr_code,
            status: req.status,
            kompania: req.kompania,
        }
    }
}

pub(crate) fn student_not_found() -> ApiError {
    ApiError::not_found("student_not_found", "Student not found")
}

pub async fn list_students(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
) -> ApiResult<Json<Vec<Student>>> {
    let scope = TenantScope::for_context(&ctx);
    let students = state
        .store
        .list_students(&scope)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;
    Ok(Json(students))
}

pub async fn create_student(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    ValidatedJson(body): ValidatedJson<NewStudentRequest>,
) -> ApiResult<Json<IdResponse>> {
    let id = state
        .store
        .insert_student(StudentFields::from(body))
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    info!(student_id = %id, created_by = %ctx.user_id, "Student created");
    Ok(Json(IdResponse { id }))
}

pub async fn update_student(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    Path(raw_id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateStudentRequest>,
) -> ApiResult<Json<IdResponse>> {
    let id = RecordId::from_param("id", &raw_id)?;

    let matched = state
        .store
        .update_student(id, StudentChanges::from(body))
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    if !matched {
        return Err(student_not_found().with_trace_id(ctx.trace_id));
    }
    Ok(Json(IdResponse { id }))
}

pub async fn delete_student(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<IdResponse>> {
    let id = RecordId::from_param("id", &raw_id)?;

    let deleted = state
        .store
        .delete_student(id)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    if !deleted {
        return Err(student_not_found().with_trace_id(ctx.trace_id));
    }
    info!(student_id = %id, deleted_by = %ctx.user_id, "Student deleted");
    Ok(Json(IdResponse { id }))
}
