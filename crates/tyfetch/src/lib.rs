//! Typed JSON HTTP client
//!
//! This crate provides a thin request executor: it resolves paths against a
//! base URL, encodes query parameters, serializes JSON bodies, sends the
//! request through a pluggable [`Transport`] and deserializes the JSON
//! response into the caller's type. Failures are classified into
//! [`HttpError::Timeout`], [`HttpError::Status`] and [`HttpError::Network`];
//! anything else is passed through unclassified.
//!
//! # Example
//!
//! ```no_run
//! use serde::Deserialize;
//! use tyfetch::{RequestExecutor, RequestOptions, Response};
//!
//! #[derive(Deserialize)]
//! struct Thing {
//!     id: u64,
//!     name: String,
//! }
//!
//! async fn example() -> Response<Thing> {
//!     let client = RequestExecutor::new("https://api.example.com")?;
//!     client
//!         .get("/thing", RequestOptions::new().query("verbose", true))
//!         .await
//! }
//! ```

mod backends;
mod error;
mod executor;
mod method;
mod request;
mod response;
mod transport;

#[cfg(all(feature = "bitreq", not(target_arch = "wasm32")))]
pub use backends::BitreqTransport;
#[cfg(all(any(feature = "bitreq", feature = "reqwest"), not(target_arch = "wasm32")))]
pub use backends::DefaultTransport;
#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
pub use backends::ReqwestTransport;
pub use backends::TransportBuilder;
pub use error::{
    ErrorKind, HttpError, TransportError, DEFAULT_NETWORK_MESSAGE, DEFAULT_TIMEOUT_MESSAGE,
};
pub use executor::RequestExecutor;
pub use method::HttpMethod;
pub use request::{
    build_url, merge_headers, serialize_body, Headers, QueryValue, RequestOptions, RequestSpec,
    ResolvedRequest, APPLICATION_JSON, CONTENT_TYPE,
};
pub use response::{Response, TransportResponse};
pub use tokio_util::sync::CancellationToken;
pub use transport::Transport;
