//! Incoming HTTP request type.
//!
//! The pipeline only ever looks at [`Request::path`]. Everything else is for
//! the leaf handlers, which pull typed values out with the `required_*` and
//! `parse_*` helpers. Those helpers fail with a validation [`Failure`] that
//! names the violated expectation, so a handler can simply `?` them.

use std::collections::HashMap;
use std::str::FromStr;

use crate::failure::{Expectation, Failure, Location};
use crate::method::Method;

/// An HTTP request as seen by handlers and transports.
#[derive(Clone, Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    /// Set by the server when the body could not be read off the wire.
    pub(crate) body_unreadable: bool,
}

impl Request {
    /// A request for `target`, which may carry a query string
    /// (`/api/knock?username=bob`).
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q.to_owned())),
            None => (target, None),
        };
        Self {
            method,
            path: if path.is_empty() { "/".to_owned() } else { path.to_owned() },
            query,
            headers: Vec::new(),
            body: Vec::new(),
            params: HashMap::new(),
            body_unreadable: false,
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::Get, target)
    }

    pub fn post(target: &str) -> Self {
        Self::new(Method::Post, target)
    }

    /// Appends a header. Returns `self` for chaining.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Replaces the body. Returns `self` for chaining.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Marks the body as lost in transit. Routing rejects such a request
    /// as invalid before any handler runs.
    pub(crate) fn with_unreadable_body(mut self) -> Self {
        self.body.clear();
        self.body_unreadable = true;
        self
    }

    /// Appends a `name=value` query pair, form-encoding both.
    pub fn query_pair(mut self, name: &str, value: &str) -> Self {
        let pair = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(name, value)
            .finish();
        self.query = Some(match self.query.take() {
            Some(q) if !q.is_empty() => format!("{q}&{pair}"),
            _ => pair,
        });
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Path plus query string, as it would appear on the request line.
    pub fn target(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// First decoded value of a query parameter.
    pub fn query(&self, name: &str) -> Option<String> {
        let q = self.query.as_deref()?;
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// A query parameter that must be present and non-empty.
    pub fn required_query(&self, name: &str) -> Result<String, Failure> {
        match self.query(name) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(Expectation::missing(name, Location::Query).into()),
        }
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/api/users/{id}`, `req.param("id")` on `/api/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// A path parameter that must be present.
    pub fn required_param(&self, key: &str) -> Result<&str, Failure> {
        self.param(key)
            .ok_or_else(|| Expectation::missing(key, Location::Path).into())
    }

    /// Parses a path parameter, failing validation when it is absent or malformed.
    pub fn parse_param<T: FromStr>(&self, key: &str) -> Result<T, Failure> {
        self.required_param(key)?
            .parse()
            .map_err(|_| Expectation::invalid(key, Location::Path).into())
    }

    /// Deserializes a JSON body, failing validation when it does not parse.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, Failure> {
        if self.body.is_empty() {
            return Err(Expectation::missing("body", Location::Body).into());
        }
        serde_json::from_slice(&self.body)
            .map_err(|_| Expectation::invalid("body", Location::Body).into())
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }
}
