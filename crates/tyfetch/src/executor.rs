//! Typed request executor

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{instrument, Span};
use url::Url;

#[cfg(all(any(feature = "bitreq", feature = "reqwest"), not(target_arch = "wasm32")))]
use crate::backends::DefaultTransport;
use crate::error::{HttpError, TransportError};
use crate::method::HttpMethod;
use crate::request::{RequestOptions, RequestSpec};
use crate::response::Response;
use crate::transport::Transport;

/// Typed JSON client bound to a base URL
///
/// Every verb resolves its path against the base URL, sends the request
/// through the transport and deserializes a 2xx JSON body into `R`. The
/// executor holds no mutable state, so a shared reference can serve any
/// number of concurrent calls.
#[derive(Debug, Clone)]
pub struct RequestExecutor<T> {
    base_url: Url,
    transport: T,
}

#[cfg(all(any(feature = "bitreq", feature = "reqwest"), not(target_arch = "wasm32")))]
impl RequestExecutor<DefaultTransport> {
    /// Create an executor over the default transport
    pub fn new(base_url: &str) -> Response<Self> {
        Self::with_transport(base_url, DefaultTransport::new())
    }
}

impl<T> RequestExecutor<T>
where
    T: Transport,
{
    /// Create an executor over `transport`
    ///
    /// Fails with [`HttpError::Url`] if `base_url` is not an absolute URL.
    pub fn with_transport(base_url: &str, transport: T) -> Response<Self> {
        Ok(Self::from_url(Url::parse(base_url)?, transport))
    }

    /// Create an executor from an already parsed base URL
    pub fn from_url(base_url: Url, transport: T) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `path`
    pub async fn get<R>(&self, path: &str, options: RequestOptions) -> Response<R>
    where
        R: DeserializeOwned,
    {
        self.execute(path, RequestSpec::new(HttpMethod::Get).with_options(options))
            .await
    }

    /// POST `body` as JSON to `path`
    pub async fn post<B, R>(&self, path: &str, body: &B, options: RequestOptions) -> Response<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let spec = RequestSpec::new(HttpMethod::Post)
            .with_body(to_json(body)?)
            .with_options(options);
        self.execute(path, spec).await
    }

    /// PUT `body` as JSON to `path`
    pub async fn put<B, R>(&self, path: &str, body: &B, options: RequestOptions) -> Response<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let spec = RequestSpec::new(HttpMethod::Put)
            .with_body(to_json(body)?)
            .with_options(options);
        self.execute(path, spec).await
    }

    /// PATCH `body` as JSON to `path`
    pub async fn patch<B, R>(&self, path: &str, body: &B, options: RequestOptions) -> Response<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let spec = RequestSpec::new(HttpMethod::Patch)
            .with_body(to_json(body)?)
            .with_options(options);
        self.execute(path, spec).await
    }

    /// DELETE `path`
    pub async fn delete<R>(&self, path: &str, options: RequestOptions) -> Response<R>
    where
        R: DeserializeOwned,
    {
        self.execute(path, RequestSpec::new(HttpMethod::Delete).with_options(options))
            .await
    }

    #[instrument(
        name = "http_request",
        skip(self, spec),
        fields(
            http.method = %spec.method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        )
    )]
    async fn execute<R>(&self, path: &str, spec: RequestSpec) -> Response<R>
    where
        R: DeserializeOwned,
    {
        let request = spec.resolve(&self.base_url, path)?;
        let url = request.url.clone();
        Span::current().record("http.url", url.as_str());

        let cancel = spec
            .options
            .cancellation_token()
            .cloned()
            .unwrap_or_else(CancellationToken::new);

        tracing::debug!("Sending {} {}", spec.method, url);

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled(None)),
            result = self.transport.send(request, cancel.clone()) => result,
        };

        let response = result.map_err(|err| {
            tracing::warn!("Request to {} failed: {}", url, err);
            HttpError::from(err)
        })?;

        Span::current().record("http.status_code", response.status);

        let response = response.error_for_status().inspect_err(|err| {
            tracing::warn!("Request to {} returned {}", url, err);
        })?;

        response.json().inspect_err(|err| {
            tracing::warn!("Http Response error: {}", err);
        })
    }
}

fn to_json<B>(body: &B) -> Response<Value>
where
    B: Serialize + ?Sized,
{
    serde_json::to_value(body).map_err(HttpError::Serialization)
}
