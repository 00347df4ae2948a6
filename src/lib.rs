//! # gatehouse
//!
//! The composition root of a small building-access service. A request
//! enters one [`Pipeline`](system::Pipeline), passes a fixed chain of
//! filters and is handed to exactly one collaborator:
//!
//! ```text
//! audit ─► catch-all ─► catch-validation ─► catch-upstream ─► routing table
//!                                                              ├─ /api/*        business API
//!                                                              ├─ /internal/*   diagnostics
//!                                                              ├─ web paths     web view
//!                                                              └─ /*            static assets
//! ```
//!
//! ## The contract
//!
//! - Every request gets exactly one well-formed response, whatever fails
//!   underneath: bad input becomes `400`, a broken downstream service
//!   becomes `502`/`503`/`504`, anything else becomes `500`.
//! - Every request produces exactly one [`AuditEvent`](events::AuditEvent),
//!   stamped by the injected [`Clock`](clock::Clock).
//! - Time, the audit trail and both downstream services are injected through
//!   [`Dependencies`](system::Dependencies). Nothing reads the environment.
//!
//! What a reverse proxy already owns (TLS, rate limiting, body-size limits,
//! authentication) gatehouse leaves to it.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gatehouse::client::HttpTransport;
//! use gatehouse::clock::SystemClock;
//! use gatehouse::events::TracingSink;
//! use gatehouse::system::{assemble, Dependencies};
//! use gatehouse::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gatehouse::Error> {
//!     let pipeline = assemble(Dependencies {
//!         clock: Arc::new(SystemClock),
//!         events: Arc::new(TracingSink),
//!         user_directory: Arc::new(HttpTransport::new("http://directory:8080", None)?),
//!         entry_logger: Arc::new(HttpTransport::new("http://entries:8080", None)?),
//!     });
//!     Server::bind("0.0.0.0:3000")?.serve(pipeline).await
//! }
//! ```

mod error;
mod failure;
mod filter;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod routing;
mod server;
mod status;

pub mod api;
pub mod assets;
pub mod client;
pub mod clock;
pub mod config;
pub mod diagnostic;
pub mod events;
pub mod inhabitants;
pub mod middleware;
pub mod system;
pub mod web;

pub use error::Error;
pub use failure::{
    Expectation, ExpectationKind, Failure, Location, UpstreamFailure, UpstreamKind,
    ValidationFailure,
};
pub use filter::{Filter, FilterChain};
pub use handler::{BoxFuture, BoxedHandler, Handler, Outcome};
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use routing::RoutingTable;
pub use server::Server;
pub use status::Status;
