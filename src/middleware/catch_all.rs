//! The catch-all filter.
//!
//! Sits directly inside the auditor. Whatever reaches it as a [`Failure`],
//! and any panic raised further inward, leaves as a well-formed response.
//! It never returns `Err` and never lets a panic through.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::json;
use tracing::{error, warn};

use crate::failure::Failure;
use crate::filter::Filter;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Outcome};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

use super::json_error;

#[derive(Clone, Copy, Debug, Default)]
pub struct CatchAll;

impl Filter for CatchAll {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        BoxedHandler::new(CatchAllHandler { next })
    }

    fn name(&self) -> &'static str {
        "catch_all"
    }
}

struct CatchAllHandler {
    next: BoxedHandler,
}

impl ErasedHandler for CatchAllHandler {
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        let next = self.next.clone();
        let method = req.method().clone();
        let path = req.path().to_owned();

        Box::pin(async move {
            // `next.call` runs inside the guarded future so a panic while
            // building the inner future is caught too.
            let guarded = AssertUnwindSafe(async move { next.call(req).await }).catch_unwind();

            match guarded.await {
                Ok(Ok(resp)) => Ok(resp),
                Ok(Err(Failure::Cancelled)) => {
                    warn!(%method, %path, "downstream call cancelled");
                    Ok(cancelled())
                }
                Ok(Err(failure)) => {
                    error!(%method, %path, error = %failure, "unhandled failure");
                    Ok(server_error())
                }
                Err(panic) => {
                    error!(%method, %path, panic = panic_message(panic.as_ref()), "handler panicked");
                    Ok(server_error())
                }
            }
        })
    }
}

/// The generic `500`. Carries no detail about what went wrong.
pub fn server_error() -> Response {
    json_error(Status::InternalServerError, json!({ "error": "internal server error" }))
}

fn cancelled() -> Response {
    json_error(Status::ClientClosedRequest, json!({ "error": "request cancelled" }))
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
