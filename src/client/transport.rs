use std::future::Future;

use thiserror::Error;

use crate::failure::Failure;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// Why a downstream call produced no response at all.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TransportError {
    #[error("connection refused by {0}")]
    ConnectionRefused(String),

    #[error("timed out waiting for upstream")]
    Timeout,

    #[error("call cancelled")]
    Cancelled,

    #[error("transport failure: {0}")]
    Io(String),
}

/// Something that can issue a request and (maybe) get a response back.
///
/// Any `Fn(Request) -> impl Future<Output = Result<Response, TransportError>>`
/// is a transport, which is usually the quickest way to stub one in a test.
pub trait Transport: Send + Sync {
    fn issue(&self, req: Request) -> BoxFuture<Result<Response, TransportError>>;
}

impl<F, Fut> Transport for F
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, TransportError>> + Send + 'static,
{
    fn issue(&self, req: Request) -> BoxFuture<Result<Response, TransportError>> {
        Box::pin(self(req))
    }
}

/// Runs an in-process handler as if it were a remote service.
///
/// A handler failure is answered the way a real server would answer it:
/// with that failure's status code. A cancellation stays a cancellation.
#[derive(Clone, Debug)]
pub struct InProcess(BoxedHandler);

impl InProcess {
    pub fn new(handler: impl Handler) -> Self {
        Self(handler.into_boxed_handler())
    }
}

impl Transport for InProcess {
    fn issue(&self, req: Request) -> BoxFuture<Result<Response, TransportError>> {
        let fut = self.0.call(req);
        Box::pin(async move {
            match fut.await {
                Ok(resp) => Ok(resp),
                Err(Failure::Cancelled) => Err(TransportError::Cancelled),
                Err(failure) => Ok(failure.status().into_response()),
            }
        })
    }
}

/// Always fails with the same error. Simulates an outage.
#[derive(Clone, Debug)]
pub struct FailingTransport(pub TransportError);

impl Transport for FailingTransport {
    fn issue(&self, _req: Request) -> BoxFuture<Result<Response, TransportError>> {
        let err = self.0.clone();
        Box::pin(async move { Err(err) })
    }
}
