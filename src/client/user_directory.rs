use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{Transport, decode, expect_success, send};
use crate::failure::Failure;
use crate::request::Request;
use crate::status::Status;

const DEPENDENCY: &str = "user-directory";

/// A person the building knows about.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// Typed client for the user directory service.
///
/// | Call | Upstream request |
/// |---|---|
/// | [`lookup`](Self::lookup) | `GET /user/{id}` |
/// | [`find_by_name`](Self::find_by_name) | `GET /user/lookup?username=` |
/// | [`list`](Self::list) | `GET /user` |
#[derive(Clone)]
pub struct UserDirectory {
    http: Arc<dyn Transport>,
}

impl UserDirectory {
    pub fn new(http: Arc<dyn Transport>) -> Self {
        Self { http }
    }

    /// `Ok(None)` when the directory answers 404.
    pub async fn lookup(&self, id: u64) -> Result<Option<User>, Failure> {
        self.get_one(Request::get(&format!("/user/{id}"))).await
    }

    /// `Ok(None)` when nobody has that name.
    pub async fn find_by_name(&self, username: &str) -> Result<Option<User>, Failure> {
        self.get_one(Request::get("/user/lookup").query_pair("username", username)).await
    }

    pub async fn list(&self) -> Result<Vec<User>, Failure> {
        let resp = send(self.http.as_ref(), DEPENDENCY, Request::get("/user")).await?;
        let resp = expect_success(DEPENDENCY, resp)?;
        decode(DEPENDENCY, &resp)
    }

    async fn get_one(&self, req: Request) -> Result<Option<User>, Failure> {
        let resp = send(self.http.as_ref(), DEPENDENCY, req).await?;
        if resp.status_code() == Status::NotFound.as_u16() {
            return Ok(None);
        }
        let resp = expect_success(DEPENDENCY, resp)?;
        decode(DEPENDENCY, &resp).map(Some)
    }
}
