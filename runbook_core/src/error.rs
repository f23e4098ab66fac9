use std::fmt;
use thiserror::Error as TError;

/// An Error occurred while talking to one of the remote endpoints or loading the configuration
#[derive(Debug)]
pub struct Error {
    kind: Box<Kind>,
}

impl Error {
    /// Instantiate a new Error
    pub(crate) fn new(kind: Kind) -> Error {
        Error {
            kind: Box::new(kind),
        }
    }

    /// Return the kind of error occurred
    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    /// True when the request never produced an HTTP answer
    pub fn is_network(&self) -> bool {
        matches!(*self.kind, Kind::Network(..))
    }

    /// True when the endpoint answered with something other than 200
    pub fn is_http_status(&self) -> bool {
        matches!(*self.kind, Kind::HttpStatus { .. })
    }

    /// The HTTP status code, if the endpoint answered at all
    pub fn status(&self) -> Option<u16> {
        match *self.kind {
            Kind::HttpStatus { status, .. } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

/// Enum listing possible errors from the runbook.
#[derive(Debug, TError)]
pub enum Kind {
    /// The request failed before an HTTP response arrived: DNS, refused connection, timeout, TLS or body read
    #[error("`{0}`, `{1}`")]
    Network(String, #[source] Box<dyn std::error::Error + Sync + Send>),
    /// The endpoint answered with a status other than 200
    #[error("unexpected status {status}")]
    HttpStatus { status: u16, body: String },
    /// A 200 response whose body was not the expected JSON
    #[error("`{0}`, `{1}`")]
    Decode(String, #[source] serde_json::Error),
    /// An Error parsing the runbook Config
    #[error("Error parsing config: {0}")]
    ConfigError(String),
}

// Helper trait for adding custom messages to transport Errors.
pub trait WrapNetworkError<T, E> {
    fn network_err(self, msg: &str) -> Result<T, Error>;
}

impl<T, E> WrapNetworkError<T, E> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn network_err(self, msg: &str) -> Result<T, Error> {
        self.map_err(|err| Error::new(Kind::Network(msg.into(), Box::new(err))))
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, Kind, WrapNetworkError};
    use std::io;

    #[test]
    fn http_status_error_exposes_status() {
        let err = Error::new(Kind::HttpStatus {
            status: 401,
            body: "unauthorized".into(),
        });
        assert!(err.is_http_status());
        assert!(!err.is_network());
        assert_eq!(Some(401), err.status());
        assert_eq!("unexpected status 401", err.to_string());
    }

    #[test]
    fn wraps_transport_errors_as_network() {
        let res: Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        let err = res.network_err("error sending request").unwrap_err();
        assert!(err.is_network());
        assert_eq!(None, err.status());
        assert_eq!("`error sending request`, `refused`", err.to_string());
        assert!(std::error::Error::source(&err).is_some());
    }
}
