//! Infrastructure error type.

/// The error type returned by gatehouse's fallible setup operations.
///
/// Application-level failures (400, 404, 503, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, never as `Error`s. This type covers
/// what can go wrong before the first request: parsing the listen address,
/// validating upstream URIs, binding the port.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address `{0}`")]
    InvalidAddress(String),

    #[error("invalid upstream uri {0}")]
    InvalidUpstream(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_source() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "taken").into();
        assert_eq!(err.to_string(), "io: taken");
        assert!(std::error::Error::source(&err).is_some());
    }
}
