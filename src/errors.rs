use axum::http::{header, StatusCode};
use axum::{response::IntoResponse, Json};
use sqlx::error::DatabaseError as _;

#[derive(Debug)]
pub enum RequestError {
    /// Missing or malformed input; the request is aborted with no mutation.
    Validation(&'static str),
    /// No session where one is required.
    NotAuthorized(&'static str),
    /// Ownership check failed (non-author edit, non-owner delete).
    Forbidden(&'static str),
    /// Back-office access without a staff role: redirect away with a notice
    /// instead of an error status.
    Denied(&'static str),
    NotFound(&'static str),
    /// Uniqueness violations surfaced as user errors (duplicate review,
    /// duplicate username, chapter number collisions).
    Conflict(&'static str),
    /// Delete blocked by dependent rows.
    Dependency(&'static str),
    /// Required server-side setup is missing (e.g. the default role row).
    Configuration(&'static str),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize)]
pub struct RequestErrorJsonWrapper {
    errors: RequestErrorJson,
}

#[derive(serde::Serialize)]
pub struct RequestErrorJson {
    body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson {
                body: vec![error.to_string()],
            },
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl RequestError {
    fn is_constraint(&self, needle: &str) -> bool {
        matches!(
            self,
            RequestError::DatabaseError(sqlx::Error::Database(e)) if e.message().contains(needle)
        )
    }

    /// Map a UNIQUE-constraint rejection from the store (the second writer in
    /// a duplicate-insert race, or a plain duplicate submission) to a
    /// user-facing conflict; pass every other error through.
    pub fn or_conflict(self, message: &'static str) -> Self {
        if self.is_constraint("UNIQUE constraint failed") {
            RequestError::Conflict(message)
        } else {
            self
        }
    }

    /// Map a FOREIGN-KEY rejection (delete blocked by dependents) to a
    /// user-facing dependency error; pass every other error through.
    pub fn or_dependency(self, message: &'static str) -> Self {
        if self.is_constraint("FOREIGN KEY constraint failed") {
            RequestError::Dependency(message)
        } else {
            self
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        match self {
            RequestError::Validation(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::NotAuthorized(message) => (
                StatusCode::UNAUTHORIZED,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::Forbidden(message) => (
                StatusCode::FORBIDDEN,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::Denied(message) => (
                StatusCode::SEE_OTHER,
                [(header::LOCATION, "/")],
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::Conflict(message) => (
                StatusCode::CONFLICT,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::Dependency(message) => (
                StatusCode::CONFLICT,
                Json(RequestErrorJsonWrapper::new(message)),
            )
                .into_response(),
            RequestError::Configuration(message) => {
                tracing::error!("configuration error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(RequestErrorJsonWrapper::new(message)),
                )
                    .into_response()
            }
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RequestErrorJsonWrapper::new("Internal Server Error")),
            )
                .into_response(),
            RequestError::DatabaseError(e) => {
                tracing::error!("database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(RequestErrorJsonWrapper::new("Internal Server Error")),
                )
                    .into_response()
            }
        }
    }
}
