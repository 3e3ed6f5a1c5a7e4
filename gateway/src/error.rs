// Gateway error mapping
//
// Every failure leaves the gateway as `{ "error": <message> }` with the
// status implied by the graph error kind.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use streamgraph_core::{ErrorBody, GraphError};

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("invalid request body: {0}")]
    Body(String),
    #[error("invalid path: {0}")]
    Path(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Path(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Graph(GraphError::Validation(_)) | ApiError::Body(_) | ApiError::Path(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Graph(GraphError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Graph(GraphError::Engine(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_follows_error_kind() {
        assert_eq!(
            ApiError::from(GraphError::Validation("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(GraphError::NotFound("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(GraphError::Engine("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Body("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Path("x".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn message_is_passed_through() {
        let err = ApiError::from(GraphError::Engine("Connection refused".into()));
        assert_eq!(err.to_string(), "Connection refused");
    }
}
