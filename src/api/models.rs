use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::SettlementError;

/// Body of every error response.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub docs: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

pub fn status_for(err: &SettlementError) -> StatusCode {
    match err {
        SettlementError::AlreadyRegistered
        | SettlementError::UsernameTaken
        | SettlementError::EmailTaken
        | SettlementError::AlreadyGroupMember
        | SettlementError::PayerNotGroupMember
        | SettlementError::InactiveUser => StatusCode::BAD_REQUEST,
        SettlementError::InvalidCredentials | SettlementError::InvalidToken => StatusCode::UNAUTHORIZED,
        SettlementError::NotGroupMember(_) => StatusCode::FORBIDDEN,
        SettlementError::UserNotFound | SettlementError::GroupNotFound => StatusCode::NOT_FOUND,
        SettlementError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SettlementError::PasswordHash(_)
        | SettlementError::TokenIssue(_)
        | SettlementError::Storage(_)
        | SettlementError::Ledger(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            tracing::error!("request failed: {}", err);
        }
        ApiError {
            status,
            detail: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let mut response = (self.status, Json(ErrorResponse { detail: self.detail })).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
