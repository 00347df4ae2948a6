//! HTML web view.
//!
//! Reserves three exact paths:
//!
//! - `/users`: the whole user directory as a table
//! - `/inhabitants`: who is inside right now
//! - `/entries`: the building's entry log
//!
//! Pages are askama templates under `templates/`, all extending
//! `layout.html`. Askama escapes every interpolated value.

use std::sync::Arc;

use askama::Template;

use crate::client::{EntryLogger, LogEntry, User, UserDirectory};
use crate::failure::Failure;
use crate::handler::BoxedHandler;
use crate::inhabitants::Inhabitants;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Paths the web view answers. The routing table mounts exactly these.
pub const PATHS: &[&str] = &["/users", "/inhabitants", "/entries"];

#[derive(Template)]
#[template(path = "users.html")]
struct UsersPage {
    users: Vec<User>,
}

#[derive(Template)]
#[template(path = "inhabitants.html")]
struct InhabitantsPage {
    names: Vec<String>,
}

#[derive(Template)]
#[template(path = "entries.html")]
struct EntriesPage {
    entries: Vec<LogEntry>,
}

fn render(page: impl Template) -> Result<Response, Failure> {
    page.render().map(Response::html).map_err(Failure::unclassified)
}

/// The web-view collaborator.
pub fn web(
    directory: UserDirectory,
    entry_logger: EntryLogger,
    inhabitants: Arc<Inhabitants>,
) -> BoxedHandler {
    let users = move |_req: Request| {
        let directory = directory.clone();
        async move { render(UsersPage { users: directory.list().await? }) }
    };

    let inside = move |_req: Request| {
        let names = inhabitants.list();
        async move { render(InhabitantsPage { names }) }
    };

    let entries = move |_req: Request| {
        let entry_logger = entry_logger.clone();
        async move { render(EntriesPage { entries: entry_logger.list().await? }) }
    };

    Router::new()
        .get("/users", users)
        .get("/inhabitants", inside)
        .get("/entries", entries)
        .into_handler()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TransportError;
    use crate::clock::SystemClock;

    fn directory() -> UserDirectory {
        UserDirectory::new(Arc::new(|_req: Request| async {
            Ok::<_, TransportError>(Response::json(
                br#"[{"id":7,"name":"<script>","email":"x@example.com"}]"#.to_vec(),
            ))
        }))
    }

    fn entry_logger() -> EntryLogger {
        let log = |_req: Request| async {
            Ok::<_, TransportError>(Response::json(
                br#"[{"username":"bob","action":"enter","timestamp":"2024-03-01T09:00:00Z"},
                    {"username":"bob","action":"exit","timestamp":"2024-03-01T17:30:00Z"}]"#
                    .to_vec(),
            ))
        };
        EntryLogger::new(Arc::new(log), Arc::new(SystemClock))
    }

    fn app(inhabitants: Arc<Inhabitants>) -> BoxedHandler {
        web(directory(), entry_logger(), inhabitants)
    }

    #[tokio::test]
    async fn users_page_escapes_names() {
        let resp = app(Arc::new(Inhabitants::new())).call(Request::get("/users")).await.unwrap();
        assert_eq!(resp.header("content-type"), Some("text/html; charset=utf-8"));
        let body = resp.body_text();
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
        assert!(body.contains("x@example.com"));
    }

    #[tokio::test]
    async fn inhabitants_page_lists_everyone_inside() {
        let inhabitants = Arc::new(Inhabitants::new());
        let empty = app(Arc::clone(&inhabitants)).call(Request::get("/inhabitants")).await.unwrap();
        assert!(empty.body_text().contains("Nobody is inside."));

        inhabitants.add("bob");
        let body = app(inhabitants).call(Request::get("/inhabitants")).await.unwrap().body_text();
        assert!(body.contains("<li>bob</li>"));
    }

    #[tokio::test]
    async fn entries_page_shows_the_log() {
        let resp = app(Arc::new(Inhabitants::new())).call(Request::get("/entries")).await.unwrap();
        assert_eq!(resp.status_code(), 200);
        let body = resp.body_text();
        assert!(body.contains("2024-03-01T09:00:00+00:00"));
        assert!(body.contains("<td>exit</td>"));
    }

    #[tokio::test]
    async fn unreachable_directory_propagates_as_failure() {
        let dead = UserDirectory::new(Arc::new(|_req: Request| async {
            Err::<Response, _>(TransportError::Timeout)
        }));
        let app = web(dead, entry_logger(), Arc::new(Inhabitants::new()));
        assert!(matches!(app.call(Request::get("/users")).await, Err(Failure::Upstream(_))));
    }
}
