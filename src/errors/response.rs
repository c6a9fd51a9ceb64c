use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use crate::errors::AppError;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DanglingReference { .. } | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Every failure leaves the API as `{"message": ...}` with the mapped status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_http_status() {
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Auth("no".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::not_found("Course").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::dangling("Student", "s1", "User", "u1").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn dangling_reference_names_both_sides() {
        let err = AppError::dangling("Fees", "f-1", "Student", "s-9");
        assert_eq!(err.to_string(), "Fees f-1 references missing Student s-9");
    }

    #[tokio::test]
    async fn renders_message_body() {
        let response = AppError::not_found("Fee record").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(value["message"], "Fee record not found");
    }
}
