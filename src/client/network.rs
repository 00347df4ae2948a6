//! Network transport over hyper's pooled client.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::debug;

use super::transport::{Transport, TransportError};
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// Issues requests against `base` over HTTP/1.1.
///
/// The optional timeout covers the whole exchange, body included. It is the
/// only timeout anywhere between a client and an upstream; the pipeline adds
/// none of its own.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client<HttpConnector, Full<Bytes>>,
    base: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// `base` is a URI prefix such as `http://directory.internal:8080`.
    ///
    /// Fails with [`Error::InvalidUpstream`] unless `base` is an absolute
    /// `http` URI.
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let uri: http::Uri = base
            .parse()
            .map_err(|e| Error::InvalidUpstream(format!("{base}: {e}")))?;
        if uri.scheme_str() != Some("http") || uri.authority().is_none() {
            return Err(Error::InvalidUpstream(format!("{base}: expected http://host[:port]")));
        }
        Ok(Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base: base.trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    async fn exchange(
        client: Client<HttpConnector, Full<Bytes>>,
        uri: http::Uri,
        req: Request,
    ) -> Result<Response, TransportError> {
        let authority = uri.authority().map(ToString::to_string).unwrap_or_default();

        let method = http::Method::try_from(req.method())
            .map_err(|e| TransportError::Io(e.to_string()))?;
        let mut builder = http::Request::builder().method(method).uri(uri);
        for (name, value) in req.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let outgoing = builder
            .body(Full::new(Bytes::copy_from_slice(req.body())))
            .map_err(|e| TransportError::Io(e.to_string()))?;

        let resp = client.request(outgoing).await.map_err(|e| {
            if e.is_connect() {
                TransportError::ConnectionRefused(authority.clone())
            } else {
                TransportError::Io(e.to_string())
            }
        })?;

        let (parts, body) = resp.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?
            .to_bytes();

        debug!(upstream = %authority, status = parts.status.as_u16(), "upstream replied");
        Ok(Response::from_parts(&parts, body.to_vec()))
    }
}

impl Transport for HttpTransport {
    fn issue(&self, req: Request) -> BoxFuture<Result<Response, TransportError>> {
        let client = self.client.clone();
        let target = format!("{}{}", self.base, req.target());
        let timeout = self.timeout;

        Box::pin(async move {
            let uri: http::Uri = target
                .parse()
                .map_err(|e: http::uri::InvalidUri| TransportError::Io(e.to_string()))?;
            let exchange = Self::exchange(client, uri, req);
            match timeout {
                Some(limit) => tokio::time::timeout(limit, exchange)
                    .await
                    .map_err(|_| TransportError::Timeout)?,
                None => exchange.await,
            }
        })
    }
}
