//! Unified error handling for the back-office.
//!
//! Handlers return [`Result`]; errors render as `{"error": "<message>"}` with
//! the matching status. 5xx errors are captured to Sentry first.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::RepositoryError;

use crate::services::auth::AdminAuthError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Login or account provisioning failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AdminAuthError),

    /// Session store failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission for a module.
    #[error("Forbidden: {module:?} requires {required}")]
    Forbidden {
        module: AdminModule,
        required: PermissionLevel,
    },

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Auth(err) => match err {
                AdminAuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AdminAuthError::Disabled => StatusCode::FORBIDDEN,
                AdminAuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AdminAuthError::InvalidEmail(_) | AdminAuthError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                AdminAuthError::PasswordHash | AdminAuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show in the back-office.
    fn client_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg))
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg) => msg.clone(),
            Self::Auth(
                AdminAuthError::PasswordHash | AdminAuthError::Repository(_),
            )
            | Self::Database(_)
            | Self::Session(_)
            | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Forbidden { .. } => "You don't have permission to do that".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        } else if let Self::Forbidden { module, required } = &self {
            tracing::warn!(?module, %required, "Permission denied");
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an admin user.
pub fn set_sentry_user(admin_user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("order".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("x".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden {
                module: AdminModule::Orders,
                required: PermissionLevel::Limited,
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Database(RepositoryError::Conflict("slug taken".to_string())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AdminAuthError::UserAlreadyExists).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AdminAuthError::Disabled).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_conflict_message_passes_through() {
        let (status, body) = body_of(AppError::Database(RepositoryError::Conflict(
            "cannot move order from delivered to shipped".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "cannot move order from delivered to shipped");
    }

    #[tokio::test]
    async fn test_forbidden_hides_module_detail() {
        let (_, body) = body_of(AppError::Forbidden {
            module: AdminModule::AdminUsers,
            required: PermissionLevel::Full,
        })
        .await;
        assert_eq!(body["error"], "You don't have permission to do that");
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = body_of(AppError::Internal("pool timed out".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
