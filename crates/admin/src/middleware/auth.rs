//! Authentication and permission checks for admin handlers.
//!
//! [`RequireAdmin`] resolves the session to a live, active admin account.
//! Handlers then call [`RequireAdmin::require`] with the module they touch
//! and the level the operation needs:
//!
//! ```rust,ignore
//! async fn index(
//!     State(state): State<AppState>,
//!     admin: RequireAdmin,
//! ) -> Result<Json<Vec<Product>>> {
//!     admin.require(state.gate(), AdminModule::Products, PermissionLevel::View)?;
//!     // ...
//! }
//! ```

use std::collections::BTreeMap;

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use larder_core::AdminRole;
use larder_core::permission::{AdminModule, PermissionGate, PermissionLevel, PermissionMap};
use larder_db::{AdminUser, AdminUserRepository};

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in, active admin.
///
/// Rejects with 401 when there is no session, the account was deleted or it
/// has been deactivated.
pub struct RequireAdmin(pub AdminUser);

impl RequireAdmin {
    /// Check the admin may perform a `required`-level operation on `module`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the gate denies access.
    pub fn require(
        &self,
        gate: &PermissionGate,
        module: AdminModule,
        required: PermissionLevel,
    ) -> Result<(), AppError> {
        let user = &self.0;
        if gate.allows(&user.email, user.role, &user.permissions, module, required) {
            Ok(())
        } else {
            Err(AppError::Forbidden { module, required })
        }
    }

    /// Check that `role` with `overrides` grants nothing above the caller's
    /// own effective level, module by module.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` naming the first module the grant
    /// would raise past the caller.
    pub fn can_grant(
        &self,
        gate: &PermissionGate,
        role: AdminRole,
        overrides: &PermissionMap,
    ) -> Result<(), AppError> {
        let user = &self.0;
        for module in AdminModule::ALL {
            let granted = overrides.level_for(role, module);
            let held = gate.level(&user.email, user.role, &user.permissions, module);
            if granted > held {
                return Err(AppError::Forbidden {
                    module,
                    required: granted,
                });
            }
        }
        Ok(())
    }

    /// Effective level for every module, superuser bypass included.
    #[must_use]
    pub fn effective_permissions(
        &self,
        gate: &PermissionGate,
    ) -> BTreeMap<AdminModule, PermissionLevel> {
        let user = &self.0;
        AdminModule::ALL
            .iter()
            .map(|module| {
                (
                    *module,
                    gate.level(&user.email, user.role, &user.permissions, *module),
                )
            })
            .collect()
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || AppError::Unauthorized("Please log in".to_string());

        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(unauthorized)?;

        let current: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or_else(unauthorized)?;

        let user = AdminUserRepository::new(state.pool())
            .get_by_id(current.id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| {
                tracing::info!(admin_id = %current.id, "Session for removed or inactive admin");
                unauthorized()
            })?;

        Ok(Self(user))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use larder_core::permission::SuperuserEmails;
    use larder_core::{AdminUserId, Email};

    use super::*;

    fn admin(email: &str, role: AdminRole, permissions: PermissionMap) -> RequireAdmin {
        RequireAdmin(AdminUser {
            id: AdminUserId::new(7),
            email: Email::parse(email).unwrap(),
            name: "Packing".to_string(),
            role,
            permissions,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn test_viewer_reads_but_cannot_edit() {
        let gate = PermissionGate::default();
        let viewer = admin("pack@larder.shop", AdminRole::Viewer, PermissionMap::new());

        assert!(
            viewer
                .require(&gate, AdminModule::Orders, PermissionLevel::View)
                .is_ok()
        );
        assert!(matches!(
            viewer.require(&gate, AdminModule::Orders, PermissionLevel::Limited),
            Err(AppError::Forbidden {
                module: AdminModule::Orders,
                required: PermissionLevel::Limited
            })
        ));
    }

    #[test]
    fn test_override_grants_order_updates() {
        let gate = PermissionGate::default();
        let overrides: PermissionMap = [(AdminModule::Orders, PermissionLevel::Limited)]
            .into_iter()
            .collect();
        let packer = admin("pack@larder.shop", AdminRole::Viewer, overrides);

        assert!(
            packer
                .require(&gate, AdminModule::Orders, PermissionLevel::Limited)
                .is_ok()
        );
        assert!(
            packer
                .require(&gate, AdminModule::Products, PermissionLevel::Limited)
                .is_err()
        );
    }

    #[test]
    fn test_superuser_bypasses_revoked_module() {
        let superusers: SuperuserEmails = "*@larder.shop".parse().unwrap();
        let gate = PermissionGate::new(superusers);
        let revoked: PermissionMap = [(AdminModule::AdminUsers, PermissionLevel::None)]
            .into_iter()
            .collect();
        let owner = admin("owner@larder.shop", AdminRole::Viewer, revoked);

        assert!(
            owner
                .require(&gate, AdminModule::AdminUsers, PermissionLevel::Full)
                .is_ok()
        );
        let levels = owner.effective_permissions(&gate);
        assert!(levels.values().all(|l| *l == PermissionLevel::Full));
        assert_eq!(levels.len(), AdminModule::ALL.len());
    }

    #[test]
    fn test_cannot_grant_above_own_level() {
        let gate = PermissionGate::default();
        let delegate: PermissionMap = [(AdminModule::AdminUsers, PermissionLevel::Limited)]
            .into_iter()
            .collect();
        let viewer = admin("pack@larder.shop", AdminRole::Viewer, delegate);

        assert!(matches!(
            viewer.can_grant(&gate, AdminRole::SuperAdmin, &PermissionMap::new()),
            Err(AppError::Forbidden {
                required: PermissionLevel::Full,
                ..
            })
        ));
        let orders_full: PermissionMap = [(AdminModule::Orders, PermissionLevel::Full)]
            .into_iter()
            .collect();
        assert!(matches!(
            viewer.can_grant(&gate, AdminRole::Viewer, &orders_full),
            Err(AppError::Forbidden {
                module: AdminModule::Orders,
                required: PermissionLevel::Full
            })
        ));
        assert!(
            viewer
                .can_grant(&gate, AdminRole::Viewer, &PermissionMap::new())
                .is_ok()
        );
    }

    #[test]
    fn test_superuser_can_grant_super_admin() {
        let superusers: SuperuserEmails = "owner@larder.shop".parse().unwrap();
        let gate = PermissionGate::new(superusers);
        let owner = admin("owner@larder.shop", AdminRole::Viewer, PermissionMap::new());
        assert!(
            owner
                .can_grant(&gate, AdminRole::SuperAdmin, &PermissionMap::new())
                .is_ok()
        );
    }
}
