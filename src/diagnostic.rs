//! Diagnostic endpoints, mounted under `/internal`.
//!
//! Orchestrators ask two questions, and operators ask a couple more.
//!
//! | Path | Question |
//! |---|---|
//! | `/internal/health` | Is the process alive? Failure → restart. |
//! | `/internal/ready` | Can it serve traffic? Failure → pulled from the load balancer. |
//! | `/internal/ping` | Is anything listening at all? |
//! | `/internal/uptime` | How long since the pipeline was assembled? |
//!
//! None of these touch a downstream dependency, so they stay green while the
//! user directory or entry logger is down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::clock::Clock;
use crate::failure::Failure;
use crate::handler::BoxedHandler;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;

/// Liveness check. Always `200 OK` with body `"ok"`.
pub async fn health(_req: Request) -> Result<Response, Failure> {
    Ok(Response::text("ok"))
}

/// Readiness check. Always `200 OK` with body `"ready"`.
pub async fn ready(_req: Request) -> Result<Response, Failure> {
    Ok(Response::text("ready"))
}

pub async fn ping(_req: Request) -> Result<Response, Failure> {
    Ok(Response::text("pong"))
}

/// The `/internal` collaborator. Uptime is measured on `clock` from now.
pub fn diagnostic(clock: Arc<dyn Clock>) -> BoxedHandler {
    let started: DateTime<Utc> = clock.now();

    let uptime = move |_req: Request| {
        let seconds = (clock.now() - started).num_seconds().max(0);
        async move { Ok::<_, Failure>(Json(json!({ "uptime_seconds": seconds })).into_response()) }
    };

    Router::new()
        .get("/internal/health", health)
        .get("/internal/ready", ready)
        .get("/internal/ping", ping)
        .get("/internal/uptime", uptime)
        .into_handler()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::clock::SteppingClock;

    #[tokio::test]
    async fn health_endpoints_answer() {
        let app = diagnostic(Arc::new(crate::clock::SystemClock));
        for (path, body) in [("/internal/health", "ok"), ("/internal/ready", "ready"), ("/internal/ping", "pong")] {
            let resp = app.call(Request::get(path)).await.unwrap();
            assert_eq!(resp.status_code(), 200, "{path}");
            assert_eq!(resp.body_text(), body, "{path}");
        }
    }

    #[tokio::test]
    async fn uptime_uses_injected_clock() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let app = diagnostic(Arc::new(SteppingClock::new(t, Duration::seconds(30))));
        let resp = app.call(Request::get("/internal/uptime")).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["uptime_seconds"], 30);
    }

    #[tokio::test]
    async fn unknown_internal_path_is_404() {
        let app = diagnostic(Arc::new(crate::clock::SystemClock));
        assert_eq!(app.call(Request::get("/internal/secrets")).await.unwrap().status_code(), 404);
    }
}
