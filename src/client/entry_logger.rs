use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Transport, decode, expect_success, send};
use crate::clock::Clock;
use crate::failure::Failure;
use crate::request::Request;

const DEPENDENCY: &str = "entry-logger";

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Enter,
    Exit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
        })
    }
}

/// One line of the building's entry log.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LogEntry {
    pub username: String,
    pub action: Action,
    pub timestamp: DateTime<Utc>,
}

/// Typed client for the entry logger service.
///
/// Entries are stamped here with the injected clock, not by the logger.
#[derive(Clone)]
pub struct EntryLogger {
    http: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl EntryLogger {
    pub fn new(http: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self { http, clock }
    }

    /// `POST /entry`
    pub async fn enter(&self, username: &str) -> Result<LogEntry, Failure> {
        self.record("/entry", username, Action::Enter).await
    }

    /// `POST /exit`
    pub async fn exit(&self, username: &str) -> Result<LogEntry, Failure> {
        self.record("/exit", username, Action::Exit).await
    }

    /// `GET /list`
    pub async fn list(&self) -> Result<Vec<LogEntry>, Failure> {
        let resp = send(self.http.as_ref(), DEPENDENCY, Request::get("/list")).await?;
        let resp = expect_success(DEPENDENCY, resp)?;
        decode(DEPENDENCY, &resp)
    }

    async fn record(&self, path: &str, username: &str, action: Action) -> Result<LogEntry, Failure> {
        let entry = LogEntry {
            username: username.to_owned(),
            action,
            timestamp: self.clock.now(),
        };
        let body = serde_json::to_vec(&entry).map_err(Failure::unclassified)?;
        let req = Request::post(path)
            .with_header("content-type", "application/json")
            .with_body(body);

        let resp = send(self.http.as_ref(), DEPENDENCY, req).await?;
        expect_success(DEPENDENCY, resp)?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::*;
    use crate::clock::FixedClock;
    use crate::client::{FailingTransport, TransportError};
    use crate::response::Response;
    use crate::status::Status;

    #[tokio::test]
    async fn enter_posts_a_clock_stamped_entry() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let seen: Arc<Mutex<Vec<LogEntry>>> = Arc::default();
        let sink = Arc::clone(&seen);

        let logger = EntryLogger::new(
            Arc::new(move |req: Request| {
                let sink = Arc::clone(&sink);
                async move {
                    assert_eq!(req.path(), "/entry");
                    sink.lock().unwrap().push(serde_json::from_slice(req.body()).unwrap());
                    Ok::<_, TransportError>(Response::status(Status::Created))
                }
            }),
            Arc::new(FixedClock(t)),
        );

        let entry = logger.enter("bob").await.unwrap();
        assert_eq!(entry.timestamp, t);
        assert_eq!(entry.action, Action::Enter);
        assert_eq!(seen.lock().unwrap()[0], entry);
    }

    #[tokio::test]
    async fn outage_is_an_upstream_failure() {
        let logger = EntryLogger::new(
            Arc::new(FailingTransport(TransportError::Timeout)),
            Arc::new(FixedClock(Utc::now())),
        );
        match logger.exit("bob").await.unwrap_err() {
            Failure::Upstream(u) => assert_eq!(u.dependency(), "entry-logger"),
            other => panic!("expected upstream failure, got {other:?}"),
        }
    }
}
