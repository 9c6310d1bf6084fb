//! HTTP response types

use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// HTTP Response type - generic over the body type R and error type E
/// This is the primary return type for all HTTP operations
pub type Response<R, E = HttpError> = Result<R, E>;

/// Raw response produced by a [`Transport`](crate::Transport)
///
/// Consumed once: either turned into an [`HttpError::Status`] or parsed as
/// JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase, when the transport exposes one
    pub status_text: Option<String>,
    /// Response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Response without a reason phrase
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: None,
            body: body.into(),
        }
    }

    /// Set the reason phrase
    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = Some(status_text.into());
        self
    }

    /// Check if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response status is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Message for a failed status: the reason phrase when present, else one
    /// derived from the status class
    pub fn error_message(&self) -> String {
        match self.status_text.as_deref() {
            Some(text) if !text.is_empty() => text.to_string(),
            _ if self.is_client_error() => format!("Client error: {}", self.status),
            _ if self.is_server_error() => format!("Server error: {}", self.status),
            _ => format!("HTTP error: {}", self.status),
        }
    }

    /// `Err(HttpError::Status)` unless the status is 2xx
    pub fn error_for_status(self) -> Response<Self> {
        if self.is_success() {
            return Ok(self);
        }

        Err(HttpError::Status {
            status: self.status,
            message: self.error_message(),
        })
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Response<T> {
        serde_json::from_slice(&self.body).map_err(HttpError::Deserialization)
    }
}
