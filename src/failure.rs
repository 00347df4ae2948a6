//! Failure taxonomy for everything behind the filter chain.
//!
//! Leaf handlers and clients report problems as a [`Failure`]; the
//! containment filters turn each kind into a response:
//!
//! | Kind | Attributable to | Contained by | Status |
//! |---|---|---|---|
//! | [`Failure::Validation`] | the client | `catch_validation` | 400 |
//! | [`Failure::Upstream`] | a dependency | `catch_upstream` | 502 / 503 / 504 |
//! | [`Failure::Cancelled`] | the transport | `catch_all` | 499 |
//! | [`Failure::Unclassified`] | us | `catch_all` | 500 |
//!
//! Display strings are for logs. Response bodies are built separately and
//! only ever expose validation detail.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::client::TransportError;
use crate::status::Status;

/// Why a request could not be served.
#[derive(Debug, Error)]
pub enum Failure {
    /// Malformed or missing request data.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    /// A downstream dependency could not be reached or misbehaved.
    #[error(transparent)]
    Upstream(#[from] UpstreamFailure),

    /// The transport abandoned the call before it completed.
    #[error("downstream call cancelled")]
    Cancelled,

    /// Anything else.
    #[error("unclassified failure: {0}")]
    Unclassified(String),
}

impl Failure {
    pub fn unclassified(cause: impl fmt::Display) -> Self {
        Self::Unclassified(cause.to_string())
    }

    /// The status the containment filters answer this failure with.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::Upstream(u) => u.status(),
            Self::Cancelled => Status::ClientClosedRequest,
            Self::Unclassified(_) => Status::InternalServerError,
        }
    }
}

impl From<Expectation> for Failure {
    fn from(e: Expectation) -> Self {
        Self::Validation(ValidationFailure::new(vec![e]))
    }
}

impl From<std::io::Error> for Failure {
    fn from(e: std::io::Error) -> Self {
        Self::unclassified(e)
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

/// Where in the request an expected value lives.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Query,
    Path,
    Header,
    Body,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Query => "query",
            Self::Path => "path",
            Self::Header => "header",
            Self::Body => "body",
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectationKind {
    Missing,
    Invalid,
}

/// One violated expectation about the request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Expectation {
    name: String,
    #[serde(rename = "in")]
    location: Location,
    #[serde(rename = "reason")]
    kind: ExpectationKind,
}

impl Expectation {
    pub fn missing(name: &str, location: Location) -> Self {
        Self { name: name.to_owned(), location, kind: ExpectationKind::Missing }
    }

    pub fn invalid(name: &str, location: Location) -> Self {
        Self { name: name.to_owned(), location, kind: ExpectationKind::Invalid }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn location(&self) -> Location { self.location }
    pub fn kind(&self) -> ExpectationKind { self.kind }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ExpectationKind::Missing => "missing",
            ExpectationKind::Invalid => "invalid",
        };
        write!(f, "{} {} `{}`", what, self.location, self.name)
    }
}

/// The request broke one or more expectations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ValidationFailure {
    expectations: Vec<Expectation>,
}

impl ValidationFailure {
    pub fn new(expectations: Vec<Expectation>) -> Self {
        Self { expectations }
    }

    pub fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("request failed validation: ")?;
        for (i, e) in self.expectations.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationFailure {}

// ── Upstream ──────────────────────────────────────────────────────────────────

/// How a downstream call went wrong.
#[derive(Debug, Error)]
pub enum UpstreamKind {
    #[error(transparent)]
    Transport(TransportError),

    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("undecodable payload: {0}")]
    BadPayload(String),
}

/// A call to a named dependency failed.
#[derive(Debug, Error)]
#[error("upstream `{dependency}` failed: {kind}")]
pub struct UpstreamFailure {
    dependency: &'static str,
    #[source]
    kind: UpstreamKind,
}

impl UpstreamFailure {
    pub fn new(dependency: &'static str, kind: UpstreamKind) -> Self {
        Self { dependency, kind }
    }

    pub fn dependency(&self) -> &'static str { self.dependency }
    pub fn kind(&self) -> &UpstreamKind { &self.kind }

    pub fn status(&self) -> Status {
        match &self.kind {
            UpstreamKind::Transport(TransportError::Timeout) => Status::GatewayTimeout,
            UpstreamKind::Transport(_) => Status::ServiceUnavailable,
            UpstreamKind::UnexpectedStatus(_) | UpstreamKind::BadPayload(_) => Status::BadGateway,
        }
    }
}
