use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::store::StoreError;

// ============================================================================
// CRUD Router Errors
// ============================================================================
//
// The status code is the whole answer: no error body is defined.
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("Identifier is malformed or missing")]
    MalformedIdentifier,

    #[error("No entity with identifier {0}")]
    IdentifierNotFound(u64),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::IdentifierNotFound(id) => ApiError::IdentifierNotFound(id),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedIdentifier => StatusCode::BAD_REQUEST,
            ApiError::IdentifierNotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).finish()
    }
}
