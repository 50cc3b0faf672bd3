use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use serde::Serialize;

use crate::backend::{AuthFailure, BackendError};

/// Fallback text when the backend gives us nothing to show.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred";

/// One message for one offending input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldErrors(vec![FieldError {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Display)]
pub enum AppError {
    #[display("Validation error: {}", errors)]
    Validation { errors: FieldErrors },
    #[display("Unauthorized: {}", message)]
    Unauthorized { message: String },
    #[display("Forbidden: {}", message)]
    Forbidden { message: String },
    #[display("Not found: {}", message)]
    NotFound { message: String },
    #[display("{}", message)]
    Persistence { message: String },
}

impl std::error::Error for AppError {}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    code: u16,
    message: String,
    error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a FieldErrors>,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let fields = match self {
            AppError::Validation { errors } => Some(errors),
            _ => None,
        };
        let error_response = ErrorResponse {
            code: status_code.as_u16(),
            message: self.to_string(),
            error_type: self.kind(),
            fields,
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

impl AppError {
    pub fn validation(errors: FieldErrors) -> Self {
        AppError::Validation { errors }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            errors: FieldErrors::single(field, message),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound {
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        AppError::Persistence {
            message: message.into(),
        }
    }

    /// Wraps a backend failure with the step that produced it. The raw
    /// backend text goes to the log, the caller only sees the friendly form.
    pub fn from_backend(context: &str, error: BackendError) -> Self {
        log::error!("{context}: {error}");
        AppError::Persistence {
            message: format!("{context}: {}", friendly_message(&error.message)),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "ValidationError",
            AppError::Unauthorized { .. } | AppError::Forbidden { .. } => "AuthError",
            AppError::NotFound { .. } => "NotFoundError",
            AppError::Persistence { .. } => "PersistenceError",
        }
    }
}

impl From<BackendError> for AppError {
    fn from(error: BackendError) -> Self {
        log::error!("backend error: {error}");
        AppError::Persistence {
            message: friendly_message(&error.message),
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::InvalidCredentials | AuthFailure::InvalidToken => {
                AppError::unauthorized(failure.to_string())
            }
            AuthFailure::Rejected { field, message } => AppError::invalid_field(field, message),
            AuthFailure::Backend(error) => AppError::from(error),
        }
    }
}

/// Maps well-known backend failure texts onto messages a user can act on.
pub fn friendly_message(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    if lowered.contains("row-level security") {
        "Permission denied. Please check your access rights.".to_string()
    } else if lowered.contains("duplicate key") || lowered.contains("unique constraint") {
        "This record already exists.".to_string()
    } else if lowered.contains("foreign key") {
        "Cannot perform this action due to related records.".to_string()
    } else if lowered.contains("not found") {
        "The requested resource was not found.".to_string()
    } else if raw.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        raw.to_string()
    }
}
