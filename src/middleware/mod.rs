//! Middleware layer.
//!
//! Each filter here intercepts one concern and knows nothing about its
//! neighbours. Order is decided in exactly one place,
//! [`crate::system::assemble`]:
//!
//! ```text
//! Auditor → CatchAll → CatchValidation → CatchUpstream → routing table
//! ```
//!
//! - [`audit`]: one [`AuditEvent`](crate::events::AuditEvent) per request, stamped by the injected clock
//! - [`catch_all`]: last line of defence; every failure and panic becomes a response
//! - [`catch_validation`]: malformed or missing input → `400`
//! - [`catch_upstream`]: dependency failures → `502` / `503` / `504`

pub mod audit;
pub mod catch_all;
pub mod catch_upstream;
pub mod catch_validation;

pub use audit::Auditor;
pub use catch_all::CatchAll;
pub use catch_upstream::CatchUpstream;
pub use catch_validation::CatchValidation;

use crate::response::Response;
use crate::status::Status;

/// JSON error body with the given status.
pub(crate) fn json_error(status: Status, body: serde_json::Value) -> Response {
    Response::builder().status(status).json(body.to_string().into_bytes())
}
