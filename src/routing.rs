//! Top-level routing table.
//!
//! An ordered list of `(matcher, handler)` pairs. Dispatch walks the list in
//! registration order and hands the request to the first match. There is no
//! hidden precedence: what you see in the builder chain is the order used.
//!
//! ```rust,no_run
//! # use gatehouse::{Request, Response, RoutingTable, Failure};
//! # async fn api(_: Request) -> Result<Response, Failure> { Ok(Response::text("")) }
//! # async fn internal(_: Request) -> Result<Response, Failure> { Ok(Response::text("")) }
//! # async fn web(_: Request) -> Result<Response, Failure> { Ok(Response::text("")) }
//! # async fn assets(_: Request) -> Result<Response, Failure> { Ok(Response::text("")) }
//! let table = RoutingTable::new()
//!     .bind("/api", api)
//!     .bind("/internal", internal)
//!     .mount(&["/users", "/inhabitants"], web)
//!     .fallback(assets);
//! ```
//!
//! Prefixes match on whole path segments: `/api` serves `/api` and
//! `/api/users/42` but not `/apiary`. Binding `/` installs the fallback,
//! which matches everything and must come last.
//!
//! The table refuses, at construction time, any registration that would let
//! two routes claim the same path, since the later one could never be
//! reached. Only the `/` fallback is allowed to overlap.

use std::fmt;

use tracing::debug;

use crate::failure::{Expectation, Location};
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, Outcome};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Matcher {
    Prefix(String),
    Exact(Vec<String>),
    Fallback,
}

impl Matcher {
    fn matches(&self, path: &str) -> bool {
        match self {
            Self::Prefix(prefix) => under(prefix, path),
            Self::Exact(paths) => paths.iter().any(|p| p == path),
            Self::Fallback => true,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(p) => write!(f, "{p}/*"),
            Self::Exact(paths) => write!(f, "{}", paths.join("|")),
            Self::Fallback => f.write_str("/*"),
        }
    }
}

/// `true` when `path` is `prefix` or lies below it on a segment boundary.
fn under(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

struct Route {
    matcher: Matcher,
    handler: BoxedHandler,
}

/// Ordered prefix table, first match wins.
#[derive(Default)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Routes every path under `prefix` to `handler`. `"/"` installs the fallback.
    ///
    /// # Panics
    ///
    /// Panics if `prefix` does not start with `/`, overlaps a route that is
    /// already registered, or is added after the fallback.
    pub fn bind(self, prefix: &str, handler: impl Handler) -> Self {
        let trimmed = prefix.trim_end_matches('/');
        let matcher = if trimmed.is_empty() && prefix.starts_with('/') {
            Matcher::Fallback
        } else {
            Matcher::Prefix(trimmed.to_owned())
        };
        self.add(matcher, handler)
    }

    /// Installs the catch-everything route. Same as `bind("/", handler)`.
    pub fn fallback(self, handler: impl Handler) -> Self {
        self.add(Matcher::Fallback, handler)
    }

    /// Routes exactly the listed paths to `handler`.
    ///
    /// # Panics
    ///
    /// Panics if a path does not start with `/`, is already claimed by
    /// another route, or is added after the fallback.
    pub fn mount(self, paths: &[&str], handler: impl Handler) -> Self {
        let paths = paths.iter().map(|p| (*p).to_owned()).collect();
        self.add(Matcher::Exact(paths), handler)
    }

    fn add(mut self, matcher: Matcher, handler: impl Handler) -> Self {
        if let Err(reason) = self.check(&matcher) {
            panic!("invalid route `{matcher}`: {reason}");
        }
        self.routes.push(Route { matcher, handler: handler.into_boxed_handler() });
        self
    }

    fn check(&self, new: &Matcher) -> Result<(), String> {
        match new {
            Matcher::Prefix(p) if !p.starts_with('/') => return Err("must start with `/`".into()),
            Matcher::Exact(paths) if paths.iter().any(|p| !p.starts_with('/')) => {
                return Err("every path must start with `/`".into());
            }
            _ => {}
        }

        for existing in &self.routes {
            let clash = match (&existing.matcher, new) {
                (Matcher::Fallback, _) => return Err("registered after the `/` fallback".into()),
                (_, Matcher::Fallback) => false,
                (Matcher::Prefix(a), Matcher::Prefix(b)) => under(a, b) || under(b, a),
                (Matcher::Prefix(a), Matcher::Exact(paths))
                | (Matcher::Exact(paths), Matcher::Prefix(a)) => paths.iter().any(|p| under(a, p)),
                (Matcher::Exact(a), Matcher::Exact(b)) => a.iter().any(|p| b.contains(p)),
            };
            if clash {
                return Err(format!("overlaps `{}`", existing.matcher));
            }
        }
        Ok(())
    }

    fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.matcher.matches(path))
    }

    /// Hands `req` to the first matching route, or answers `404` when none matches.
    ///
    /// A request whose body never arrived intact fails validation here
    /// instead, whatever its path.
    pub fn dispatch(&self, req: Request) -> BoxFuture<Outcome> {
        if req.body_unreadable {
            debug!(path = req.path(), "unreadable body");
            return Box::pin(async { Err(Expectation::invalid("body", Location::Body).into()) });
        }
        match self.find(req.path()) {
            Some(route) => {
                debug!(path = req.path(), route = %route.matcher, "dispatching");
                route.handler.call(req)
            }
            None => {
                debug!(path = req.path(), "no route");
                Box::pin(async { Ok(Response::status(Status::NotFound)) })
            }
        }
    }

    pub fn into_handler(self) -> BoxedHandler {
        BoxedHandler::new(self)
    }
}

impl ErasedHandler for RoutingTable {
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        self.dispatch(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Failure;

    fn named(name: &'static str) -> BoxedHandler {
        (move |_req: Request| async move { Ok::<_, Failure>(Response::text(name)) }).into_boxed_handler()
    }

    fn table() -> RoutingTable {
        RoutingTable::new()
            .bind("/api", named("api"))
            .bind("/internal", named("internal"))
            .mount(&["/users", "/inhabitants"], named("web"))
            .bind("/", named("static"))
    }

    fn route_of(t: &RoutingTable, path: &str) -> Option<String> {
        t.find(path).map(|r| r.matcher.to_string())
    }

    async fn served_by(t: &RoutingTable, path: &str) -> String {
        t.dispatch(Request::get(path)).await.unwrap().body_text()
    }

    #[tokio::test]
    async fn prefixes_win_over_fallback() {
        let t = table();
        assert_eq!(served_by(&t, "/api").await, "api");
        assert_eq!(served_by(&t, "/api/users/42").await, "api");
        assert_eq!(served_by(&t, "/internal/health").await, "internal");
        assert_eq!(served_by(&t, "/users").await, "web");
        assert_eq!(served_by(&t, "/inhabitants").await, "web");
    }

    #[tokio::test]
    async fn unmatched_paths_fall_through_to_static() {
        let t = table();
        assert_eq!(served_by(&t, "/unknown/path").await, "static");
        assert_eq!(served_by(&t, "/apiary").await, "static");
        assert_eq!(served_by(&t, "/users/42").await, "static");
        assert_eq!(served_by(&t, "/").await, "static");
    }

    #[tokio::test]
    async fn no_fallback_means_404() {
        let t = RoutingTable::new().bind("/api", named("api"));
        let resp = t.dispatch(Request::get("/elsewhere")).await.unwrap();
        assert_eq!(resp.status_code(), 404);
    }

    #[tokio::test]
    async fn unreadable_body_fails_validation_before_routing() {
        let t = table();
        let req = Request::post("/api/knock").with_body("partial").with_unreadable_body();
        match t.dispatch(req).await {
            Err(Failure::Validation(v)) => {
                assert_eq!(v.expectations()[0].name(), "body");
                assert_eq!(v.expectations()[0].location(), Location::Body);
            }
            other => panic!("expected a validation failure, got {other:?}"),
        }
    }

    #[test]
    fn trailing_slash_on_prefix_is_ignored() {
        let t = RoutingTable::new().bind("/api/", named("api"));
        assert_eq!(route_of(&t, "/api/x").as_deref(), Some("/api/*"));
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn nested_prefixes_are_rejected() {
        let _ = RoutingTable::new().bind("/api", named("a")).bind("/api/v2", named("b"));
    }

    #[test]
    #[should_panic(expected = "overlaps")]
    fn exact_path_under_prefix_is_rejected() {
        let _ = RoutingTable::new().bind("/api", named("a")).mount(&["/api/page"], named("b"));
    }

    #[tokio::test]
    async fn fallback_is_bind_root() {
        let t = RoutingTable::new().bind("/api", named("api")).fallback(named("static"));
        assert_eq!(served_by(&t, "/anything").await, "static");
        assert_eq!(route_of(&t, "/anything").as_deref(), Some("/*"));
    }

    #[test]
    #[should_panic(expected = "after the `/` fallback")]
    fn nothing_after_fallback() {
        let _ = RoutingTable::new().bind("/", named("static")).bind("/api", named("a"));
    }

    #[test]
    #[should_panic(expected = "must start with")]
    fn relative_prefix_is_rejected() {
        let _ = RoutingTable::new().bind("api", named("a"));
    }
}
