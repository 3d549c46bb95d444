use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use common_http_errors::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Declared shape checks for a request body, run after deserialization.
pub trait Validate {
    fn validate(&self) -> ApiResult<()>;
}

/// JSON body extractor that reports malformed or invalid bodies as 400
/// instead of axum's default 415/422 rejections.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            let detail = rejection.body_text();
            warn!(error = %detail, "Rejected request body");
            ApiError::bad_request("invalid_body", detail)
        })?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Required text field: present and not blank.
pub fn require(field: &'static str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(
            "invalid_body",
            format!("Field '{field}' must not be empty"),
        ));
    }
    Ok(())
}

/// Optional text field: when supplied it must not be blank.
pub fn require_if_present(field: &'static str, value: Option<&str>) -> ApiResult<()> {
    match value {
        Some(value) => require(field, value),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(require("name", "Ana").is_ok());
        assert!(matches!(
            require("name", "   "),
            Err(ApiError::BadRequest { code: "invalid_body", .. })
        ));
        assert!(require_if_present("name", None).is_ok());
        assert!(require_if_present("name", Some("")).is_err());
    }
}
