//! HTTP middleware for the back-office.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers
//! 2. `TraceLayer` (request span)
//! 3. Request ID
//! 4. Session layer (`admin.session` table)
//! 5. Login rate limit (login route only)
//!
//! Authentication and permission checks happen in the [`RequireAdmin`]
//! extractor rather than as a layer.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdmin, clear_current_admin, set_current_admin};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_key};
