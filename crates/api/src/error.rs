//! Error to HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ledgerwise_shared::AppError;
use serde_json::json;
use tracing::{debug, error};

/// Handler error. Any component error converts into it with `?`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
        } else {
            debug!(code = self.0.error_code(), error = %self.0, "Request rejected");
        }

        let message = match &self.0 {
            AppError::Validation { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Configuration { message, .. } => message.clone(),
            AppError::NotFound(m) | AppError::UpstreamUnavailable(m) => m.clone(),
            AppError::Database(_) | AppError::Internal(_) => "An internal error occurred".to_string(),
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let response = ApiError(AppError::validation("UNBALANCED", "Debit: 100, Credit: 90")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "UNBALANCED");
        assert_eq!(body["message"], "Debit: 100, Credit: 90");
    }

    #[tokio::test]
    async fn test_database_error_hides_detail() {
        let response = ApiError(AppError::Database("connection refused".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "DATABASE_ERROR");
        assert_eq!(body["message"], "An internal error occurred");
    }
}
