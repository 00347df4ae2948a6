//! Static file server, the `/` fallback.
//!
//! Serves files from one root directory. `/` and directory paths serve
//! their `index.html`. Any `..` segment or dotfile is refused with `404`,
//! the same answer a missing file gets, so the response says nothing about
//! what exists outside the root.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::failure::Failure;
use crate::handler::{BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{ContentType, Response};
use crate::status::Status;

/// The asset root shipped with the crate.
pub const DEFAULT_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/public");

const INDEX: &str = "index.html";

/// The static-asset collaborator rooted at `root`.
pub fn assets(root: impl Into<PathBuf>) -> BoxedHandler {
    let root = Arc::new(root.into());
    (move |req: Request| serve(Arc::clone(&root), req)).into_boxed_handler()
}

async fn serve(root: Arc<PathBuf>, req: Request) -> Result<Response, Failure> {
    if !req.method().is_read() {
        return Ok(Response::status(Status::MethodNotAllowed));
    }
    let Some(relative) = relative_path(req.path()) else {
        debug!(path = req.path(), "refused asset path");
        return Ok(Response::status(Status::NotFound));
    };

    let mut file = root.join(&relative);
    if relative.as_os_str().is_empty() || req.path().ends_with('/') || is_dir(&file).await {
        file.push(INDEX);
    }

    match tokio::fs::read(&file).await {
        Ok(bytes) => Ok(Response::builder().bytes(content_type(&file), bytes)),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            Ok(Response::status(Status::NotFound))
        }
        Err(e) => Err(e.into()),
    }
}

/// Request path → path relative to the root, or `None` when it tries to
/// leave the root or reach a dotfile.
fn relative_path(path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if segment.starts_with('.') || segment.contains('\\') {
            return None;
        }
        out.push(segment);
    }
    Some(out)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

fn content_type(file: &Path) -> ContentType {
    file.extension()
        .and_then(|e| e.to_str())
        .map_or(ContentType::OctetStream, ContentType::from_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(dir.path().join("style.css"), "body{}").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "docs").unwrap();
        std::fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        dir
    }

    #[tokio::test]
    async fn serves_files_with_content_type() {
        let dir = root();
        let app = assets(dir.path());
        let resp = app.call(Request::get("/style.css")).await.unwrap();
        assert_eq!(resp.status_code(), 200);
        assert_eq!(resp.header("content-type"), Some("text/css"));
        assert_eq!(resp.body_text(), "body{}");
    }

    #[tokio::test]
    async fn directories_serve_their_index() {
        let dir = root();
        let app = assets(dir.path());
        assert_eq!(app.call(Request::get("/")).await.unwrap().body_text(), "<h1>home</h1>");
        assert_eq!(app.call(Request::get("/docs")).await.unwrap().body_text(), "docs");
        assert_eq!(app.call(Request::get("/docs/")).await.unwrap().body_text(), "docs");
    }

    #[tokio::test]
    async fn missing_files_are_404() {
        let dir = root();
        let app = assets(dir.path());
        assert_eq!(app.call(Request::get("/unknown/path")).await.unwrap().status_code(), 404);
        assert_eq!(app.call(Request::get("/style.css/more")).await.unwrap().status_code(), 404);
    }

    #[tokio::test]
    async fn traversal_and_dotfiles_are_refused() {
        let dir = root();
        let app = assets(dir.path().join("docs"));
        assert_eq!(app.call(Request::get("/../style.css")).await.unwrap().status_code(), 404);
        let app = assets(dir.path());
        assert_eq!(app.call(Request::get("/.env")).await.unwrap().status_code(), 404);
    }

    #[tokio::test]
    async fn only_reads_are_allowed() {
        let dir = root();
        let app = assets(dir.path());
        assert_eq!(app.call(Request::post("/style.css")).await.unwrap().status_code(), 405);
    }

    #[test]
    fn files_without_extension_are_octet_stream() {
        assert_eq!(content_type(Path::new("/srv/LICENSE")), ContentType::OctetStream);
        assert_eq!(content_type(Path::new("/srv/logo.PNG")), ContentType::Png);
    }
}
