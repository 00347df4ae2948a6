//! Downstream client adapters.
//!
//! Every downstream dependency is reached through a [`Transport`]: anything
//! that can turn a [`Request`] into a [`Response`]. Production wiring hands
//! the typed clients an [`HttpTransport`]; tests hand them an in-process
//! double ([`InProcess`], a closure, or [`FailingTransport`]) with the same
//! call semantics.
//!
//! The typed clients ([`UserDirectory`], [`EntryLogger`]) expose only what
//! the business API needs. They do not retry and they do not swallow
//! transport errors: a [`TransportError`] travels unchanged as the source of
//! an upstream [`Failure`], tagged with the dependency's name.

mod entry_logger;
mod network;
mod transport;
mod user_directory;

pub use entry_logger::{Action, EntryLogger, LogEntry};
pub use network::HttpTransport;
pub use transport::{FailingTransport, InProcess, Transport, TransportError};
pub use user_directory::{User, UserDirectory};

use serde::de::DeserializeOwned;

use crate::failure::{Failure, UpstreamFailure, UpstreamKind};
use crate::request::Request;
use crate::response::Response;
use crate::status::is_success;

/// Issues `req` and tags any transport error with `dependency`.
async fn send(
    transport: &dyn Transport,
    dependency: &'static str,
    req: Request,
) -> Result<Response, Failure> {
    transport.issue(req).await.map_err(|e| match e {
        TransportError::Cancelled => Failure::Cancelled,
        other => UpstreamFailure::new(dependency, UpstreamKind::Transport(other)).into(),
    })
}

fn expect_success(dependency: &'static str, resp: Response) -> Result<Response, Failure> {
    if is_success(resp.status_code()) {
        Ok(resp)
    } else {
        Err(UpstreamFailure::new(dependency, UpstreamKind::UnexpectedStatus(resp.status_code())).into())
    }
}

fn decode<T: DeserializeOwned>(dependency: &'static str, resp: &Response) -> Result<T, Failure> {
    serde_json::from_slice(resp.body())
        .map_err(|e| UpstreamFailure::new(dependency, UpstreamKind::BadPayload(e.to_string())).into())
}
