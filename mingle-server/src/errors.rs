use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use mingle_core::{
    AuthError, CommentError, DatabaseError, EventError, NotificationError, RegistrationError,
    TicketError,
};
use serde_json::json;
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{0}")]
    Forbidden(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing or invalid session")]
    Unauthorized,
    #[error("{0}")]
    Validation(String),
    #[error("Could not store the ticket artifact")]
    ArtifactWrite(String),
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The stable error type exposed in the response payload
    fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NotFound",
            Self::Conflict { .. } => "Conflict",
            Self::Forbidden(_) => "Forbidden",
            Self::InvalidCredentials | Self::Unauthorized => "Unauthorized",
            Self::Validation(_) => "ValidationError",
            Self::ArtifactWrite(_) => "ArtifactWriteError",
            Self::Unknown(_) => "InternalServerError",
        }
    }

    fn message(&self) -> String {
        match self {
            // Internals never leak to the client
            Self::Unknown(_) => "An unexpected error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::Unknown(inner) => error!("Unexpected error: {inner}"),
            Self::ArtifactWrite(inner) => error!("Ticket artifact failure: {inner}"),
            _ => {}
        }

        let body = json!({
            "error": true,
            "message": self.message(),
            "type": self.kind(),
        });

        (self.as_status_code(), Json(body)).into_response()
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::AdminExists => Self::Conflict {
                resource: "user",
                field: "role",
                value: "admin".to_string(),
            },
            AuthError::AdminOnly => Self::Forbidden(value.to_string()),
            AuthError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<EventError> for ServerError {
    fn from(value: EventError) -> Self {
        match value {
            EventError::Db(e) => e.into(),
            e => Self::Forbidden(e.to_string()),
        }
    }
}

impl From<TicketError> for ServerError {
    fn from(value: TicketError) -> Self {
        match value {
            TicketError::ArtifactWrite(inner) => Self::ArtifactWrite(inner),
            TicketError::Db(e) => e.into(),
        }
    }
}

impl From<RegistrationError> for ServerError {
    fn from(value: RegistrationError) -> Self {
        match value {
            RegistrationError::NotEventOrganizer => Self::Forbidden(value.to_string()),
            RegistrationError::Ticket(e) => e.into(),
            RegistrationError::Db(e) => e.into(),
        }
    }
}

impl From<NotificationError> for ServerError {
    fn from(value: NotificationError) -> Self {
        match value {
            NotificationError::Db(e) => e.into(),
            e => Self::Forbidden(e.to_string()),
        }
    }
}

impl From<CommentError> for ServerError {
    fn from(value: CommentError) -> Self {
        match value {
            CommentError::Db(e) => e.into(),
            e => Self::Forbidden(e.to_string()),
        }
    }
}
