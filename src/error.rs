use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Every failure travels as HTTP 200 with `status: 0`; the variant only
/// decides the message and what gets logged.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("An empty value has been received")]
    EmptyValue,
    #[error("Invalid due date")]
    InvalidDue,
    #[error("Invalid id")]
    InvalidId,
    #[error("User is not authorized")]
    Unauthorized,
    #[error("{0}")]
    Rejected(&'static str),
    #[error("Server side error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct Failure {
    status: u8,
    #[serde(rename = "tokenError", skip_serializing_if = "std::ops::Not::not")]
    token_error: bool,
    msg: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!(error = ?e, "request failed");
        }
        let body = Failure {
            status: 0,
            token_error: matches!(self, ApiError::Unauthorized),
            msg: self.to_string(),
        };
        Json(body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection, "unreadable json body");
        ApiError::EmptyValue
    }
}
