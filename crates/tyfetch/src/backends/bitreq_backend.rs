//! bitreq-based transport

use async_trait::async_trait;
use bitreq::RequestExt;
use tokio_util::sync::CancellationToken;

use super::builder::{ProxyConfig, TransportBuilder};
use crate::error::{HttpError, TransportError};
use crate::method::HttpMethod;
use crate::request::ResolvedRequest;
use crate::response::{Response, TransportResponse};
use crate::transport::Transport;

/// Maximum number of cached connections kept by the bitreq client
const CONNECTION_CACHE_SIZE: usize = 10;

/// Transport backed by bitreq
#[derive(Clone)]
pub struct BitreqTransport {
    client: bitreq::Client,
    proxy: Option<ProxyConfig>,
}

impl std::fmt::Debug for BitreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitreqTransport")
            .field("proxy", &self.proxy)
            .finish_non_exhaustive()
    }
}

impl Default for BitreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl BitreqTransport {
    /// Create a transport with default settings
    pub fn new() -> Self {
        Self {
            client: bitreq::Client::new(CONNECTION_CACHE_SIZE),
            proxy: None,
        }
    }

    /// Create a new transport builder
    pub fn builder() -> TransportBuilder {
        TransportBuilder::default()
    }

    pub(crate) fn from_builder(builder: TransportBuilder) -> Response<Self> {
        if builder.accept_invalid_certs {
            tracing::warn!("bitreq transport ignores danger_accept_invalid_certs");
        }

        if let Some(proxy) = &builder.proxy {
            // Fail at build time rather than on the first proxied request
            bitreq::Proxy::new_http(proxy.url.clone())
                .map_err(|_| HttpError::Proxy(format!("Invalid proxy URL: {}", proxy.url)))?;
        }

        Ok(Self {
            client: bitreq::Client::new(CONNECTION_CACHE_SIZE),
            proxy: builder.proxy,
        })
    }

    fn prepare_request(&self, request: ResolvedRequest) -> Result<bitreq::Request, TransportError> {
        let url = request.url.as_str();
        let mut req = match request.method {
            HttpMethod::Get => bitreq::get(url),
            HttpMethod::Post => bitreq::post(url),
            HttpMethod::Put => bitreq::put(url),
            HttpMethod::Patch => bitreq::patch(url),
            HttpMethod::Delete => bitreq::delete(url),
        };

        for (key, value) in &request.headers {
            req = req.with_header(key.as_str(), value.as_str());
        }

        if let Some(body) = request.body {
            req = req.with_body(body.into_bytes());
        }

        match &self.proxy {
            Some(proxy) if proxy.applies_to(&request.url) => {
                let proxy = bitreq::Proxy::new_http(proxy.url.clone()).map_err(|_| {
                    TransportError::Other(format!("Invalid proxy URL: {}", proxy.url))
                })?;
                Ok(req.with_proxy(proxy))
            }
            _ => Ok(req),
        }
    }
}

#[async_trait]
impl Transport for BitreqTransport {
    async fn send(
        &self,
        request: ResolvedRequest,
        cancel: CancellationToken,
    ) -> Result<TransportResponse, TransportError> {
        let request = self.prepare_request(request)?;

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled(None)),
            response = request.send_async_with_client(&self.client) => response?,
        };

        let status_text = Some(response.reason_phrase.clone());
        Ok(TransportResponse {
            status: response.status_code as u16,
            status_text,
            body: response.into_bytes(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_new() {
        let transport = BitreqTransport::new();
        let _ = format!("{:?}", transport);
    }

    #[test]
    fn test_builder_proxy() {
        let proxy_url = url::Url::parse("http://localhost:8080").expect("Valid proxy URL");
        let result = BitreqTransport::builder().proxy(proxy_url).build();
        assert!(result.is_ok());
    }
}
