//! reqwest-based transport

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::builder::TransportBuilder;
use crate::error::{HttpError, TransportError};
use crate::method::HttpMethod;
use crate::request::ResolvedRequest;
use crate::response::{Response, TransportResponse};
use crate::transport::Transport;

/// Transport backed by reqwest
///
/// The status text handed back is the canonical reason phrase of the status
/// code, when it has one.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default settings
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Create a new transport builder
    pub fn builder() -> TransportBuilder {
        TransportBuilder::default()
    }

    /// Create a transport from a reqwest::Client
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }

    pub(crate) fn from_builder(builder: TransportBuilder) -> Response<Self> {
        let mut client =
            reqwest::Client::builder().danger_accept_invalid_certs(builder.accept_invalid_certs);

        if let Some(proxy_config) = builder.proxy {
            let proxy_url = proxy_config.url.to_string();
            let proxy = if proxy_config.matcher.is_some() {
                reqwest::Proxy::custom(move |url| {
                    if proxy_config.applies_to(url) {
                        Some(proxy_url.clone())
                    } else {
                        None
                    }
                })
            } else {
                reqwest::Proxy::all(&proxy_url).map_err(|e| HttpError::Proxy(e.to_string()))?
            };
            client = client.proxy(proxy);
        }

        let inner = client
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self { inner })
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        request: ResolvedRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self.inner.request(to_reqwest(request.method), request.url);

        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>(TransportResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().map(str::to_string),
                body: body.to_vec(),
            })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled(None)),
            result = exchange => result.map_err(TransportError::from),
        }
    }
}
