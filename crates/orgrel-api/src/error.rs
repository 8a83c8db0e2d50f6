//! Mapping of resolver and store failures onto HTTP responses

use axum::{http::StatusCode, Json};
use orgrel_core::{CsvError, ImportError, ImportFailure, ResolveError, StoreError};
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error("Import validation failed with {} error(s)", .0.len())]
    Validation(Vec<ImportError>),
}

impl From<ImportFailure> for ApiError {
    fn from(failure: ImportFailure) -> Self {
        match failure {
            ImportFailure::Validation(errors) => ApiError::Validation(errors),
            ImportFailure::Csv(e) => ApiError::Csv(e),
            ImportFailure::Store(e) => ApiError::Store(e),
        }
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Resolve(ResolveError::MemberNotFound(_))
            | ApiError::Resolve(ResolveError::MemberEmailNotFound(_)) => {
                (StatusCode::NOT_FOUND, "MEMBER_NOT_FOUND")
            }
            ApiError::Resolve(ResolveError::SelfRelationship(_)) => {
                (StatusCode::BAD_REQUEST, "SELF_RELATIONSHIP")
            }
            ApiError::Resolve(ResolveError::CycleDetected { .. }) => {
                (StatusCode::CONFLICT, "CYCLE_DETECTED")
            }
            ApiError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Store(StoreError::Conflict(_)) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Store(StoreError::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
            ApiError::Csv(_) => (StatusCode::BAD_REQUEST, "INVALID_CSV"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED"),
        }
    }
}

impl From<ApiError> for (StatusCode, Json<ErrorResponse>) {
    fn from(error: ApiError) -> Self {
        let (status, code) = error.status_and_code();
        let message = error.to_string();
        let errors = match error {
            ApiError::Validation(errors) => errors.into_iter().map(Into::into).collect(),
            _ => Vec::new(),
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: Some(code.to_string()),
                errors,
            }),
        )
    }
}
