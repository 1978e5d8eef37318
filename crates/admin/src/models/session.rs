//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use larder_core::{AdminUserId, Email};
use larder_db::AdminUser;

/// Session-stored admin identity.
///
/// Only identifies the admin; role and permissions are reloaded on every
/// request so changes apply immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: AdminUserId,
    pub email: Email,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
