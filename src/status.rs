//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use gatehouse::{Response, Status};
//!
//! // status-only, no body
//! Response::status(Status::Conflict);
//!
//! Response::builder()
//!     .status(Status::Accepted)
//!     .header("location", "/api/whoIsThere")
//!     .json(br#"{"ok":true}"#.to_vec());
//! ```
//!
//! Only the codes this service and its upstreams actually speak are listed.
//! Anything else an upstream sends back is carried as a raw `u16`.

/// The HTTP status codes gatehouse produces or interprets.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201
    Accepted,             // 202

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    NotFound,             // 404
    MethodNotAllowed,     // 405
    Conflict,             // 409
    ClientClosedRequest,  // 499 (nginx)

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
    BadGateway,           // 502
    ServiceUnavailable,   // 503
    GatewayTimeout,       // 504
}

impl Status {
    /// Numeric code, e.g. `404`.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok                   => 200,
            Self::Created              => 201,
            Self::Accepted             => 202,
            Self::BadRequest           => 400,
            Self::NotFound             => 404,
            Self::MethodNotAllowed     => 405,
            Self::Conflict             => 409,
            Self::ClientClosedRequest  => 499,
            Self::InternalServerError  => 500,
            Self::BadGateway           => 502,
            Self::ServiceUnavailable   => 503,
            Self::GatewayTimeout       => 504,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        s.as_u16()
    }
}

/// `true` for any 2xx code.
pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}
