//! Business API, mounted under `/api`.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/knock?username=` | Let a known user in |
//! | POST | `/api/bye?username=` | Let a user out |
//! | GET | `/api/whoIsThere` | Users currently inside |
//! | GET | `/api/users/{id}` | Look a user up in the directory |
//!
//! Handlers report bad input and dependency trouble as a [`Failure`] and
//! leave the translation to the filter chain.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::client::{EntryLogger, User, UserDirectory};
use crate::failure::Failure;
use crate::handler::{BoxedHandler, Handler, Outcome};
use crate::inhabitants::Inhabitants;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::router::Router;
use crate::status::Status;

/// State shared by every API endpoint.
pub struct Api {
    directory: UserDirectory,
    entry_logger: EntryLogger,
    inhabitants: Arc<Inhabitants>,
}

impl Api {
    pub fn new(directory: UserDirectory, entry_logger: EntryLogger, inhabitants: Arc<Inhabitants>) -> Self {
        Self { directory, entry_logger, inhabitants }
    }

    /// The `/api` collaborator.
    pub fn into_handler(self) -> BoxedHandler {
        let api = Arc::new(self);
        Router::new()
            .post("/api/knock", with(&api, Self::knock))
            .post("/api/bye", with(&api, Self::bye))
            .get("/api/whoIsThere", with(&api, Self::who_is_there))
            .get("/api/users/{id}", with(&api, Self::user))
            .into_handler()
    }

    async fn knock(self: Arc<Self>, req: Request) -> Outcome {
        let username = req.required_query("username")?;

        if self.directory.find_by_name(&username).await?.is_none() {
            return Ok(problem(Status::NotFound, "unknown user"));
        }
        if !self.inhabitants.add(&username) {
            return Ok(problem(Status::Conflict, "already inside"));
        }
        if let Err(e) = self.entry_logger.enter(&username).await {
            self.inhabitants.remove(&username);
            return Err(e);
        }

        info!(%username, "entered");
        Ok(Status::Accepted.into_response())
    }

    async fn bye(self: Arc<Self>, req: Request) -> Outcome {
        let username = req.required_query("username")?;

        if !self.inhabitants.remove(&username) {
            return Ok(problem(Status::NotFound, "not inside"));
        }
        if let Err(e) = self.entry_logger.exit(&username).await {
            self.inhabitants.add(&username);
            return Err(e);
        }

        info!(%username, "left");
        Ok(Status::Accepted.into_response())
    }

    /// One directory listing, filtered down to whoever is inside.
    async fn who_is_there(self: Arc<Self>, _req: Request) -> Outcome {
        let inside: BTreeSet<String> = self.inhabitants.list().into_iter().collect();
        if inside.is_empty() {
            return Ok(Json(Vec::<User>::new()).into_response());
        }
        let users: Vec<User> = self.directory.list().await?
            .into_iter()
            .filter(|u| inside.contains(&u.name))
            .collect();
        Ok(Json(users).into_response())
    }

    async fn user(self: Arc<Self>, req: Request) -> Outcome {
        let id: u64 = req.parse_param("id")?;
        Ok(match self.directory.lookup(id).await? {
            Some(user) => Json(user).into_response(),
            None => problem(Status::NotFound, "no such user"),
        })
    }
}

/// Binds a shared-state endpoint into a plain request handler.
fn with<F, Fut>(api: &Arc<Api>, endpoint: F) -> impl Handler
where
    F: Fn(Arc<Api>, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, Failure>> + Send + 'static,
{
    let api = Arc::clone(api);
    move |req: Request| endpoint(Arc::clone(&api), req)
}

fn problem(status: Status, message: &str) -> Response {
    Response::builder()
        .status(status)
        .json(json!({ "error": message }).to_string().into_bytes())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use super::*;
    use crate::client::{FailingTransport, Transport, TransportError};
    use crate::clock::FixedClock;

    const BOB: &str = r#"{"id":1,"name":"bob","email":"bob@example.com"}"#;
    const ALICE: &str = r#"{"id":2,"name":"alice","email":"alice@example.com"}"#;

    fn directory() -> Arc<dyn Transport> {
        counting_directory(Arc::default())
    }

    fn counting_directory(calls: Arc<AtomicUsize>) -> Arc<dyn Transport> {
        Arc::new(move |req: Request| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok::<_, TransportError>(match (req.path(), req.query("username").as_deref()) {
                    ("/user", _) => Response::json(format!("[{BOB},{ALICE}]").into_bytes()),
                    ("/user/1", _) | ("/user/lookup", Some("bob")) => Response::json(BOB.as_bytes().to_vec()),
                    ("/user/lookup", Some("alice")) => Response::json(ALICE.as_bytes().to_vec()),
                    _ => Response::status(Status::NotFound),
                })
            }
        })
    }

    fn logger_ok() -> Arc<dyn Transport> {
        Arc::new(|_req: Request| async { Ok::<_, TransportError>(Response::status(Status::Created)) })
    }

    fn api(entry_logger: Arc<dyn Transport>) -> (BoxedHandler, Arc<Inhabitants>) {
        let inhabitants = Arc::new(Inhabitants::new());
        let api = Api::new(
            UserDirectory::new(directory()),
            EntryLogger::new(entry_logger, Arc::new(FixedClock(Utc::now()))),
            Arc::clone(&inhabitants),
        );
        (api.into_handler(), inhabitants)
    }

    #[tokio::test]
    async fn knock_lets_known_users_in_once() {
        let (app, inhabitants) = api(logger_ok());
        let first = app.call(Request::post("/api/knock?username=bob")).await.unwrap();
        assert_eq!(first.status_code(), 202);
        assert!(inhabitants.contains("bob"));

        let second = app.call(Request::post("/api/knock?username=bob")).await.unwrap();
        assert_eq!(second.status_code(), 409);
    }

    #[tokio::test]
    async fn knock_rejects_strangers() {
        let (app, inhabitants) = api(logger_ok());
        let resp = app.call(Request::post("/api/knock?username=eve")).await.unwrap();
        assert_eq!(resp.status_code(), 404);
        assert!(inhabitants.list().is_empty());
    }

    #[tokio::test]
    async fn knock_without_username_fails_validation() {
        let (app, _) = api(logger_ok());
        let err = app.call(Request::post("/api/knock")).await.unwrap_err();
        assert!(matches!(err, Failure::Validation(_)));
    }

    #[tokio::test]
    async fn failed_entry_log_rolls_back() {
        let (app, inhabitants) = api(Arc::new(FailingTransport(TransportError::Timeout)));
        let err = app.call(Request::post("/api/knock?username=bob")).await.unwrap_err();
        assert!(matches!(err, Failure::Upstream(_)));
        assert!(!inhabitants.contains("bob"));
    }

    #[tokio::test]
    async fn bye_and_who_is_there() {
        let (app, _) = api(logger_ok());
        app.call(Request::post("/api/knock?username=bob")).await.unwrap();

        let who = app.call(Request::get("/api/whoIsThere")).await.unwrap();
        let users: Vec<User> = serde_json::from_slice(who.body()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "bob");

        assert_eq!(app.call(Request::post("/api/bye?username=bob")).await.unwrap().status_code(), 202);
        assert_eq!(app.call(Request::post("/api/bye?username=bob")).await.unwrap().status_code(), 404);
    }

    #[tokio::test]
    async fn who_is_there_lists_the_directory_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let inhabitants = Arc::new(Inhabitants::new());
        let app = Api::new(
            UserDirectory::new(counting_directory(Arc::clone(&calls))),
            EntryLogger::new(logger_ok(), Arc::new(FixedClock(Utc::now()))),
            Arc::clone(&inhabitants),
        )
        .into_handler();

        let empty = app.call(Request::get("/api/whoIsThere")).await.unwrap();
        assert_eq!(empty.body_text(), "[]");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        inhabitants.add("alice");
        inhabitants.add("bob");
        inhabitants.add("ghost");
        let who = app.call(Request::get("/api/whoIsThere")).await.unwrap();
        let users: Vec<User> = serde_json::from_slice(who.body()).unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["bob", "alice"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn user_lookup() {
        let (app, _) = api(logger_ok());
        assert_eq!(app.call(Request::get("/api/users/1")).await.unwrap().status_code(), 200);
        assert_eq!(app.call(Request::get("/api/users/2")).await.unwrap().status_code(), 404);
        assert!(matches!(
            app.call(Request::get("/api/users/two")).await,
            Err(Failure::Validation(_))
        ));
    }
}
