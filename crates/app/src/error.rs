use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use census_search_core::{ErrorKind, SearchError};
use serde::Serialize;
use tracing::{error, warn};

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

/// A core error on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub SearchError);

impl From<SearchError> for ApiError {
    fn from(error: SearchError) -> Self {
        Self(error)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self.0.kind() {
            ErrorKind::Internal => {
                error!(error = %self.0, "request failed");
                INTERNAL_MESSAGE.to_string()
            }
            ErrorKind::BadRequest | ErrorKind::NotFound => {
                warn!(error = %self.0, status = status.as_u16(), "request rejected");
                self.0.to_string()
            }
        };

        let body = ErrorResponse {
            message,
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
