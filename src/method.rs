//! HTTP method as a typed enum.
//!
//! The RFC 9110 standard methods get their own variant. Any other valid
//! method token (`PURGE`, `PROPFIND`, ...) is carried as
//! [`Method::Extension`] so it still flows through the pipeline and gets
//! answered, and audited, like every other request.

use std::fmt;
use std::str::FromStr;

/// An HTTP method.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
    /// A non-standard method token, kept verbatim.
    Extension(String),
}

impl Method {
    /// Returns the wire representation (e.g. `"GET"`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
            Self::Extension(token) => token,
        }
    }

    /// `GET` and `HEAD` are the only methods the static asset server answers.
    pub fn is_read(&self) -> bool {
        matches!(self, Self::Get | Self::Head)
    }
}

/// Parses a method token. Case-sensitive per RFC 9110 §9.1, so `"get"` is an
/// extension method, not `GET`.
impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "CONNECT" => Self::Connect,
            "DELETE"  => Self::Delete,
            "GET"     => Self::Get,
            "HEAD"    => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH"   => Self::Patch,
            "POST"    => Self::Post,
            "PUT"     => Self::Put,
            "TRACE"   => Self::Trace,
            token if http::Method::from_bytes(token.as_bytes()).is_ok() => {
                Self::Extension(token.to_owned())
            }
            other => return Err(UnknownMethod(other.to_owned())),
        })
    }
}

/// Every `http::Method` is a valid token, so this never loses information.
impl From<&http::Method> for Method {
    fn from(m: &http::Method) -> Self {
        m.as_str()
            .parse()
            .unwrap_or_else(|_| Self::Extension(m.as_str().to_owned()))
    }
}

impl TryFrom<&Method> for http::Method {
    type Error = UnknownMethod;

    fn try_from(m: &Method) -> Result<Self, Self::Error> {
        Ok(match m {
            Method::Connect => http::Method::CONNECT,
            Method::Delete  => http::Method::DELETE,
            Method::Get     => http::Method::GET,
            Method::Head    => http::Method::HEAD,
            Method::Options => http::Method::OPTIONS,
            Method::Patch   => http::Method::PATCH,
            Method::Post    => http::Method::POST,
            Method::Put     => http::Method::PUT,
            Method::Trace   => http::Method::TRACE,
            Method::Extension(token) => http::Method::from_bytes(token.as_bytes())
                .map_err(|_| UnknownMethod(token.clone()))?,
        })
    }
}

impl serde::Serialize for Method {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that is not a valid method token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid HTTP method `{0}`")]
pub struct UnknownMethod(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("get".parse::<Method>(), Ok(Method::Extension("get".into())));
        assert_eq!("PURGE".parse::<Method>(), Ok(Method::Extension("PURGE".into())));
        assert!("GE T".parse::<Method>().is_err());
        assert!("".parse::<Method>().is_err());
    }

    #[test]
    fn converts_to_and_from_http() {
        let m = Method::from(&http::Method::POST);
        assert_eq!(m, Method::Post);
        assert_eq!(http::Method::try_from(&m), Ok(http::Method::POST));

        let purge = http::Method::from_bytes(b"PURGE").unwrap();
        let m = Method::from(&purge);
        assert_eq!(m.as_str(), "PURGE");
        assert!(!m.is_read());
        assert_eq!(http::Method::try_from(&m), Ok(purge));
    }

    #[test]
    fn malformed_extension_does_not_reach_the_wire() {
        let m = Method::Extension("NOT VALID".into());
        assert_eq!(http::Method::try_from(&m), Err(UnknownMethod("NOT VALID".into())));
    }
}
