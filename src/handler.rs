//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The routing table, the inner routers and every filter need to hold
//! handlers of *different* types behind one interface. We hide the concrete
//! type behind `dyn ErasedHandler` and share it through [`BoxedHandler`].
//!
//! ```text
//! async fn knock(req: Request) -> Result<Response, Failure> { … }   ← user writes this
//!        ↓ router.on(Method::Post, "/api/knock", knock)
//! knock.into_boxed_handler()                                      ← Handler blanket impl
//!        ↓
//! BoxedHandler(Arc::new(FnHandler(knock)))                        ← heap-allocated wrapper
//!        ↓
//! handler.call(req)  at request time                              ← one vtable dispatch
//!        ↓
//! Box::pin(async { knock(req).await.map(IntoResponse::into_response).map_err(Into::into) })
//! ```
//!
//! Every handler yields an [`Outcome`]: either a response or a [`Failure`]
//! for the containment filters to translate. Filters are handlers too, so a
//! composed pipeline is just one more `BoxedHandler`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::failure::Failure;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased, `Send` future.
///
/// `Send + 'static` let tokio move the future across threads. Nothing in the
/// pipeline spawns it; dropping it cancels everything it is awaiting.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// What one handler invocation produces.
pub type Outcome = Result<Response, Failure>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because routers and filters in this crate implement
/// it directly; application code goes through [`Handler`].
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<Outcome>;
}

/// A type-erased handler shared across concurrent requests.
///
/// Cloning is one atomic reference count increment.
#[derive(Clone)]
pub struct BoxedHandler(Arc<dyn ErasedHandler + Send + Sync + 'static>);

impl BoxedHandler {
    pub(crate) fn new(inner: impl ErasedHandler + Send + Sync + 'static) -> Self {
        Self(Arc::new(inner))
    }

    pub fn call(&self, req: Request) -> BoxFuture<Outcome> {
        self.0.call(req)
    }
}

impl std::fmt::Debug for BoxedHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BoxedHandler")
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` (or closure) with the signature:
///
/// ```text
/// async fn name(req: Request) -> Result<impl IntoResponse, impl Into<Failure>>
/// ```
///
/// and for an already-erased [`BoxedHandler`].
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// impls below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R, E> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<Failure> + Send + 'static,
{
}

impl<F, Fut, R, E> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<Failure> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        BoxedHandler::new(FnHandler(self))
    }
}

impl private::Sealed for BoxedHandler {}

impl Handler for BoxedHandler {
    fn into_boxed_handler(self) -> BoxedHandler {
        self
    }
}

// ── Concrete wrapper ──────────────────────────────────────────────────────────

/// Newtype wrapper that holds a concrete handler `F` and implements
/// [`ErasedHandler`], bridging the typed world to the trait-object world.
struct FnHandler<F>(F);

impl<F, Fut, R, E> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<Failure> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        let fut = (self.0)(req);
        Box::pin(async move {
            fut.await
                .map(IntoResponse::into_response)
                .map_err(Into::into)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::{Expectation, Location};
    use crate::status::Status;

    async fn ok(_req: Request) -> Result<&'static str, Failure> {
        Ok("fine")
    }

    async fn invalid(_req: Request) -> Result<Response, Expectation> {
        Err(Expectation::missing("username", Location::Query))
    }

    #[tokio::test]
    async fn fn_handlers_are_erased() {
        let h = ok.into_boxed_handler();
        let resp = h.call(Request::get("/")).await.unwrap();
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.body_text(), "fine");
    }

    #[tokio::test]
    async fn error_types_convert_into_failure() {
        let h = invalid.into_boxed_handler();
        let err = h.call(Request::get("/")).await.unwrap_err();
        assert_eq!(err.status(), Status::BadRequest);
    }

    #[tokio::test]
    async fn boxed_handler_is_a_handler() {
        let h = ok.into_boxed_handler();
        let again = h.clone().into_boxed_handler();
        assert!(again.call(Request::get("/")).await.is_ok());
    }
}
