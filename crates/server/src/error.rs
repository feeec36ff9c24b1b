use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::ordering::OrderingError;
use utils::response::ApiResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Ordering(#[from] OrderingError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    RecordNotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Ordering(err) => match err {
                OrderingError::NotFound { .. } => StatusCode::NOT_FOUND,
                OrderingError::Conflict { .. } => StatusCode::CONFLICT,
                OrderingError::MalformedInput { .. } => StatusCode::BAD_REQUEST,
                OrderingError::StoreWriteFailure { .. } | OrderingError::StoreReadFailure { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn ordering_errors_map_to_client_statuses() {
        let not_found = ApiError::Ordering(OrderingError::NotFound {
            collection: "clients",
            id: Uuid::new_v4(),
        });
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let conflict = ApiError::Ordering(OrderingError::Conflict {
            collection: "clients",
            id: Uuid::new_v4(),
        });
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);

        let malformed = ApiError::Ordering(OrderingError::MalformedInput {
            collection: "clients",
            reason: "duplicate id".into(),
        });
        assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_failures_are_server_errors() {
        let err = ApiError::Ordering(OrderingError::StoreWriteFailure {
            collection: "news",
            applied: 2,
            total: 5,
            source: db::ordering::StoreError::Unavailable("connection reset".into()),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        // Operators see how far the pass got before the failure.
        assert!(err.to_string().contains("2 of 5"));
    }
}
