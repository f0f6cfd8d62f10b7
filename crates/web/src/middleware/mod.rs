//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with method, URI and latency)
//! 3. Request ID (record into span, Sentry scope and response)
//! 4. Security headers (CSP, framing, referrer policy)
//! 5. Session layer (tower-sessions, `PostgreSQL` store in production)
//!
//! The extractors in [`auth`] and [`flash`] read the session that the
//! session layer attaches to each request.

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAuth, clear_current_user, set_current_user};
pub use flash::{Layout, push_flash};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
