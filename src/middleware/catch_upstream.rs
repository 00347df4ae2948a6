//! Turns dependency failures into `502`, `503` or `504`.
//!
//! The body names the dependency and nothing else; the underlying transport
//! error is logged, not returned.

use serde_json::json;
use tracing::warn;

use crate::failure::Failure;
use crate::filter::Filter;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Outcome};
use crate::request::Request;

use super::json_error;

#[derive(Clone, Copy, Debug, Default)]
pub struct CatchUpstream;

impl Filter for CatchUpstream {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        BoxedHandler::new(CatchUpstreamHandler { next })
    }

    fn name(&self) -> &'static str {
        "catch_upstream"
    }
}

struct CatchUpstreamHandler {
    next: BoxedHandler,
}

impl ErasedHandler for CatchUpstreamHandler {
    fn call(&self, req: Request) -> BoxFuture<Outcome> {
        let next = self.next.clone();
        let path = req.path().to_owned();

        Box::pin(async move {
            match next.call(req).await {
                Err(Failure::Upstream(u)) => {
                    let status = u.status();
                    warn!(%path, dependency = u.dependency(), status = status.as_u16(), error = %u, "upstream request failed");
                    Ok(json_error(
                        status,
                        json!({ "error": "upstream dependency failed", "dependency": u.dependency() }),
                    ))
                }
                other => other,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportError;
    use crate::failure::{UpstreamFailure, UpstreamKind};
    use crate::handler::Handler;
    use crate::response::Response;

    fn failing(kind: fn() -> UpstreamKind) -> BoxedHandler {
        CatchUpstream.wrap(
            (move |_req: Request| async move {
                Err::<Response, _>(Failure::from(UpstreamFailure::new("entry-logger", kind())))
            })
            .into_boxed_handler(),
        )
    }

    #[tokio::test]
    async fn status_follows_failure_kind() {
        let refused = failing(|| UpstreamKind::Transport(TransportError::ConnectionRefused("x".into())));
        assert_eq!(refused.call(Request::get("/")).await.unwrap().status_code(), 503);

        let timeout = failing(|| UpstreamKind::Transport(TransportError::Timeout));
        assert_eq!(timeout.call(Request::get("/")).await.unwrap().status_code(), 504);

        let status = failing(|| UpstreamKind::UnexpectedStatus(500));
        assert_eq!(status.call(Request::get("/")).await.unwrap().status_code(), 502);
    }

    #[tokio::test]
    async fn body_hides_transport_detail() {
        let app = failing(|| UpstreamKind::Transport(TransportError::ConnectionRefused("10.0.0.7:8081".into())));
        let resp = app.call(Request::get("/")).await.unwrap();
        let body = resp.body_text();
        assert!(body.contains("entry-logger"));
        assert!(!body.contains("10.0.0.7"));
    }

    #[tokio::test]
    async fn leaves_other_failures_alone() {
        let app = CatchUpstream.wrap(
            (|_req: Request| async { Err::<Response, _>(Failure::Cancelled) }).into_boxed_handler(),
        );
        assert!(matches!(app.call(Request::get("/")).await, Err(Failure::Cancelled)));
    }
}
