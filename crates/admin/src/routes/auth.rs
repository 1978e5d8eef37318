//! Admin login, logout and profile.

use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use larder_core::permission::{AdminModule, PermissionLevel};
use larder_db::AdminUser;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::auth::AdminAuthService;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The logged-in admin and what they may do.
#[derive(Debug, Serialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: AdminUser,
    pub is_superuser: bool,
    /// Effective level per module after overrides and superuser bypass.
    pub effective_permissions: BTreeMap<AdminModule, PermissionLevel>,
}

impl Profile {
    fn build(state: &AppState, admin: RequireAdmin) -> Self {
        let effective_permissions = admin.effective_permissions(state.gate());
        let is_superuser = state.gate().is_superuser(&admin.0.email);
        Self {
            user: admin.0,
            is_superuser,
            effective_permissions,
        }
    }
}

/// Log in with email and password.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Profile>> {
    let user = AdminAuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    // Fresh ID on privilege change.
    session.cycle_id().await?;
    set_current_admin(&session, &CurrentAdmin::from(&user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(admin_id = %user.id, role = %user.role, "Admin logged in");
    Ok(Json(Profile::build(&state, RequireAdmin(user))))
}

/// Log out and clear the session.
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session).await?;
    session.flush().await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The logged-in admin's profile.
pub async fn me(State(state): State<AppState>, admin: RequireAdmin) -> Json<Profile> {
    Json(Profile::build(&state, admin))
}
