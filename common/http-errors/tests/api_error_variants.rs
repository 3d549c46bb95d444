use common_http_errors::ApiError;
use axum::response::IntoResponse;
use axum::http::StatusCode;
use http_body_util::BodyExt;
use uuid::Uuid;

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn bad_request_variant() {
    let err = ApiError::BadRequest { code: "invalid_id", trace_id: None, message: None };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_id");
}

#[test]
fn not_found_variant() {
    let err = ApiError::not_found("student_not_found", "Student not found");
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "student_not_found");
}

#[test]
fn conflict_variant() {
    let resp = ApiError::conflict("email_taken", "Email already registered").into_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "email_taken");
}

#[tokio::test]
async fn internal_variant_hides_detail() {
    let trace = Some(Uuid::new_v4());
    let err = ApiError::Internal { trace_id: trace, message: Some("connection reset by peer".into()) };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "internal_error");

    let body = body_json(resp).await;
    assert_eq!(body["error"], "An internal error occurred");
    assert!(!body.to_string().contains("connection reset"));
}

#[tokio::test]
async fn message_is_rendered_as_error_field() {
    let resp = ApiError::bad_request("invalid_id", "Invalid ID format").into_response();
    let body = body_json(resp).await;
    assert_eq!(body["code"], "invalid_id");
    assert_eq!(body["error"], "Invalid ID format");
    assert!(body.get("trace_id").is_none());
}
