//! Radix-tree router used inside collaborators.
//!
//! One tree per HTTP method. O(path-length) lookup. The top-level
//! [`RoutingTable`](crate::RoutingTable) decides *which* collaborator gets a
//! request by prefix; a collaborator then uses this router to pick the
//! endpoint and pull out path parameters.

use std::collections::HashMap;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, Outcome};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// A method-aware endpoint router.
///
/// Unknown paths answer `404`; known paths with the wrong method answer `405`.
/// Each [`Router::on`] call returns `self` so registrations chain naturally.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax and `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid matchit pattern or is already taken
    /// for `method`.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(matched.value.clone(), params);
        }
        if self.routes.values().any(|tree| tree.at(path).is_ok()) {
            Lookup::WrongMethod
        } else {
            Lookup::Missing
        }
    }

    pub fn into_handler(self) -> BoxedHandler {
        BoxedHandler::new(self)
    }
}

enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    WrongMethod,
    Missing,
}

impl ErasedHandler for Router {
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        match self.lookup(req.method(), req.path()) {
            Lookup::Found(handler, params) => handler.call(req.with_params(params)),
            Lookup::WrongMethod => Box::pin(async { Ok(Response::status(Status::MethodNotAllowed)) }),
            Lookup::Missing => Box::pin(async { Ok(Response::status(Status::NotFound)) }),
        }
    }
}
