//! Turns validation failures into `400 Bad Request`.
//!
//! The body lists every violated expectation so the caller can fix the
//! request. Any other failure passes through untouched.

use serde_json::json;
use tracing::info;

use crate::failure::Failure;
use crate::filter::Filter;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Outcome};
use crate::request::Request;
use crate::status::Status;

use super::json_error;

#[derive(Clone, Copy, Debug, Default)]
pub struct CatchValidation;

impl Filter for CatchValidation {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        BoxedHandler::new(CatchValidationHandler { next })
    }

    fn name(&self) -> &'static str {
        "catch_validation"
    }
}

struct CatchValidationHandler {
    next: BoxedHandler,
}

impl ErasedHandler for CatchValidationHandler {
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        let next = self.next.clone();
        let path = req.path().to_owned();

        Box::pin(async move {
            match next.call(req).await {
                Err(Failure::Validation(v)) => {
                    info!(%path, violations = %v, "rejected malformed request");
                    Ok(json_error(
                        Status::BadRequest,
                        json!({ "error": "bad request", "violations": v.expectations() }),
                    ))
                }
                other => other,
            }
        })
    }
}
