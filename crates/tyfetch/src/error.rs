//! HTTP error types

use thiserror::Error;

/// Message used when a cancelled call carries no more specific reason
pub const DEFAULT_TIMEOUT_MESSAGE: &str = "Request timed out";

/// Message used for every unreachable-network failure
pub const DEFAULT_NETWORK_MESSAGE: &str = "Network error occurred";

/// Errors returned by [`RequestExecutor`](crate::RequestExecutor) calls
///
/// `Timeout`, `Status` and `Network` are the classified kinds. Every other
/// variant is an unclassified failure passed through to the caller as is.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The cancellation token fired before the transport completed
    #[error("{0}")]
    Timeout(String),
    /// The server answered with a non-2xx status
    #[error("HTTP error ({status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Reason phrase, or a message generated from the status class
        message: String,
    },
    /// The transport could not reach the network
    #[error("{0}")]
    Network(String),
    /// Base URL or request path could not be parsed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    /// The request body could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),
    /// The response body is not valid JSON for the requested type
    #[error("Deserialization error: {0}")]
    Deserialization(#[source] serde_json::Error),
    /// Any other transport failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// Proxy error
    #[error("Proxy error: {0}")]
    Proxy(String),
    /// Transport build error
    #[error("Transport build error: {0}")]
    Build(String),
}

/// Coarse classification of an [`HttpError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Cancelled or timed out
    Timeout,
    /// Non-2xx response
    Http,
    /// Network unreachable
    Network,
    /// Anything else
    Unclassified,
}

impl HttpError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::Timeout(_) => ErrorKind::Timeout,
            HttpError::Status { .. } => ErrorKind::Http,
            HttpError::Network(_) => ErrorKind::Network,
            _ => ErrorKind::Unclassified,
        }
    }

    /// Status code carried by an HTTP status error
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Structured failure signal returned by a [`Transport`](crate::Transport)
///
/// Classification keys off the variant, never off the message text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The call was cancelled or timed out, optionally with a reason
    #[error("cancelled: {}", .0.as_deref().unwrap_or(DEFAULT_TIMEOUT_MESSAGE))]
    Cancelled(Option<String>),
    /// DNS failure, refused connection, TLS failure and the like
    #[error("network unreachable: {0}")]
    Unreachable(String),
    /// Any other failure
    #[error("{0}")]
    Other(String),
}

impl From<TransportError> for HttpError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled(reason) => {
                HttpError::Timeout(reason.unwrap_or_else(|| DEFAULT_TIMEOUT_MESSAGE.to_string()))
            }
            TransportError::Unreachable(_) => HttpError::Network(DEFAULT_NETWORK_MESSAGE.to_string()),
            TransportError::Other(msg) => HttpError::Transport(msg),
        }
    }
}

#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Cancelled(Some(err.to_string()))
        } else if err.is_connect() {
            TransportError::Unreachable(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[cfg(all(feature = "bitreq", not(target_arch = "wasm32")))]
impl From<bitreq::Error> for TransportError {
    fn from(err: bitreq::Error) -> Self {
        use std::io;

        use bitreq::Error;

        match err {
            Error::IoError(io_err) => match io_err.kind() {
                io::ErrorKind::TimedOut => TransportError::Cancelled(Some(io_err.to_string())),
                // Malformed data from a reachable server
                io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
                    TransportError::Other(io_err.to_string())
                }
                // DNS lookup, refused/reset connections and TLS handshake
                // failures all surface as io errors of other kinds
                _ => TransportError::Unreachable(io_err.to_string()),
            },
            Error::AddressNotFound | Error::RustlsCreateConnection(_) | Error::ProxyConnect => {
                TransportError::Unreachable(err.to_string())
            }
            _ => TransportError::Other(err.to_string()),
        }
    }
}
