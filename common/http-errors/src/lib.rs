use axum::{http::{StatusCode, HeaderValue}, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use tracing::error;
use uuid::Uuid;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")] pub trace_id: Option<Uuid>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    NotFound { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    Conflict { code: &'static str, trace_id: Option<Uuid>, message: Option<String> },
    /// `message` goes to the log only; clients get a generic body.
    Internal { trace_id: Option<Uuid>, message: Option<String> },
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(e: E, trace_id: Option<Uuid>) -> Self { Self::Internal { trace_id, message: Some(e.to_string()) } }
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self { Self::BadRequest { code, trace_id: None, message: Some(message.into()) } }
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self { Self::NotFound { code, trace_id: None, message: Some(message.into()) } }
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self { Self::Conflict { code, trace_id: None, message: Some(message.into()) } }

    pub fn with_trace_id(mut self, id: Option<Uuid>) -> Self {
        match &mut self {
            ApiError::BadRequest { trace_id, .. }
            | ApiError::NotFound { trace_id, .. }
            | ApiError::Conflict { trace_id, .. }
            | ApiError::Internal { trace_id, .. } => *trace_id = id,
        }
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body, error_code) = match self {
            ApiError::BadRequest { code, trace_id, message } => (
                StatusCode::BAD_REQUEST,
                ErrorBody { code: code.into(), error: message.unwrap_or_else(|| "Bad request".into()), trace_id },
                code
            ),
            ApiError::NotFound { code, trace_id, message } => (
                StatusCode::NOT_FOUND,
                ErrorBody { code: code.into(), error: message.unwrap_or_else(|| "Not found".into()), trace_id },
                code
            ),
            ApiError::Conflict { code, trace_id, message } => (
                StatusCode::CONFLICT,
                ErrorBody { code: code.into(), error: message.unwrap_or_else(|| "Conflict".into()), trace_id },
                code
            ),
            ApiError::Internal { trace_id, message } => {
                error!(trace_id = ?trace_id, detail = message.as_deref().unwrap_or("unspecified"), "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody { code: "internal_error".into(), error: INTERNAL_MESSAGE.into(), trace_id },
                    "internal_error"
                )
            }
        };
        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(error_code) {
            resp.headers_mut().insert("X-Error-Code", val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
