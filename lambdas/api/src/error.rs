use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cqrs_es::AggregateError;
use domain::Error;
use serde::Serialize;
use serde_json::json;

pub const UNAUTHENTICATED: &str = "Authentication failed. Please sign in to continue.";

fn status_of(err: &Error) -> StatusCode {
    match err {
        Error::MissingInput { .. } | Error::Validation { .. } => StatusCode::BAD_REQUEST,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::Forbidden => StatusCode::FORBIDDEN,
        Error::InvalidStateTransition { .. } | Error::Uniqueness { .. } => StatusCode::CONFLICT,
        Error::Upstream { .. } => StatusCode::BAD_GATEWAY,
        Error::UnparseableOutput { .. }
        | Error::Configuration { .. }
        | Error::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message shown to the caller; not-found errors carry a full sentence.
fn message_of(err: &Error) -> String {
    match err {
        Error::NotFound { entity } => entity.clone(),
        other => other.to_string(),
    }
}

/// Error on the AI routes: `{ "error": "..." }`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Replaces the message with a fixed one, keeping configuration errors visible.
    pub fn masked(err: Error, message: &str) -> Self {
        match err {
            Error::Configuration { .. } => err.into(),
            other => {
                tracing::error!("{}: {}", message, other);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = status_of(&err);
        if status.is_server_error() {
            tracing::error!("{}", err);
        }
        Self::new(status, message_of(&err))
    }
}

macro_rules! rejection_into_api_error {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    Self::new(rejection.status(), rejection.body_text())
                }
            }
        )*
    };
}

rejection_into_api_error!(JsonRejection, QueryRejection, PathRejection, MultipartRejection);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Error on the server actions: `{ "success": false, "error": "..." }`
#[derive(Debug)]
pub struct ActionError {
    pub status: StatusCode,
    pub message: String,
}

impl ActionError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: UNAUTHENTICATED.to_string(),
        }
    }
}

impl From<Error> for ActionError {
    fn from(err: Error) -> Self {
        let ApiError { status, message } = err.into();
        Self { status, message }
    }
}

impl From<JsonRejection> for ActionError {
    fn from(rejection: JsonRejection) -> Self {
        let ApiError { status, message } = rejection.into();
        Self { status, message }
    }
}

impl From<AggregateError<Error>> for ActionError {
    fn from(err: AggregateError<Error>) -> Self {
        match err {
            AggregateError::UserError(err) => err.into(),
            AggregateError::AggregateConflict => Error::Uniqueness {
                field: "appointment version".to_string(),
            }
            .into(),
            other => Error::persistence(other.to_string()).into(),
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

/// Successful server-action body
#[derive(Debug, Serialize)]
pub struct Success<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T: Serialize> Success<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(message: &str, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
        })
    }
}

impl Success<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: None,
        })
    }
}
