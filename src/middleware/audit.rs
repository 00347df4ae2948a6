//! The audit filter.
//!
//! Wraps the whole pipeline. After the inner pipeline has produced its
//! outcome it reads the injected clock exactly once and publishes exactly one
//! [`AuditEvent`]. The response is returned as computed whatever the sink
//! does, including panicking.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::warn;

use crate::clock::Clock;
use crate::events::{AuditEvent, EventSink, RequestSummary, ResponseSummary};
use crate::filter::Filter;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Outcome};
use crate::request::Request;

/// Publishes one audit event per request.
#[derive(Clone)]
pub struct Auditor {
    clock: Arc<dyn Clock>,
    sink: Arc<dyn EventSink>,
}

impl Auditor {
    pub fn new(clock: Arc<dyn Clock>, sink: Arc<dyn EventSink>) -> Self {
        Self { clock, sink }
    }
}

impl Filter for Auditor {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        BoxedHandler::new(AuditHandler { auditor: self.clone(), next })
    }

    fn name(&self) -> &'static str {
        "audit"
    }
}

struct AuditHandler {
    auditor: Auditor,
    next: BoxedHandler,
}

impl ErasedHandler for AuditHandler {
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        let Auditor { clock, sink } = self.auditor.clone();
        let next = self.next.clone();
        let request = RequestSummary::of(&req);

        Box::pin(async move {
            let outcome = next.call(req).await;

            // Without a catch-all inside us the outcome may still be a
            // failure; record the status it would be answered with.
            let status = match &outcome {
                Ok(resp) => resp.status_code(),
                Err(failure) => failure.status().as_u16(),
            };

            let event = AuditEvent::new(clock.now(), request, ResponseSummary::new(status));
            if catch_unwind(AssertUnwindSafe(|| sink.publish(event))).is_err() {
                warn!("audit sink panicked, event lost");
            }

            outcome
        })
    }
}
