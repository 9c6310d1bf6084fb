//! Transport configuration

use regex::Regex;
use url::Url;

#[cfg(all(any(feature = "bitreq", feature = "reqwest"), not(target_arch = "wasm32")))]
use super::DefaultTransport;
use crate::error::HttpError;
use crate::response::Response;

/// Builder for configuring proxy and TLS settings of a transport
#[derive(Debug, Default)]
pub struct TransportBuilder {
    pub(crate) accept_invalid_certs: bool,
    pub(crate) proxy: Option<ProxyConfig>,
}

#[derive(Debug, Clone)]
pub(crate) struct ProxyConfig {
    pub(crate) url: Url,
    pub(crate) matcher: Option<Regex>,
}

impl ProxyConfig {
    /// Whether requests to `url` go through this proxy
    pub(crate) fn applies_to(&self, url: &Url) -> bool {
        match &self.matcher {
            Some(matcher) => matcher.is_match(url.host_str().unwrap_or("")),
            None => true,
        }
    }
}

impl TransportBuilder {
    /// Accept invalid TLS certificates
    ///
    /// Only honored by the reqwest backend.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Send every request through `url`
    pub fn proxy(mut self, url: Url) -> Self {
        self.proxy = Some(ProxyConfig { url, matcher: None });
        self
    }

    /// Send requests whose host matches `pattern` through `url`
    pub fn proxy_with_matcher(mut self, url: Url, pattern: &str) -> Response<Self> {
        let matcher = Regex::new(pattern)
            .map_err(|e| HttpError::Proxy(format!("Invalid proxy pattern: {}", e)))?;
        self.proxy = Some(ProxyConfig {
            url,
            matcher: Some(matcher),
        });
        Ok(self)
    }

    /// Build the default transport
    #[cfg(all(any(feature = "bitreq", feature = "reqwest"), not(target_arch = "wasm32")))]
    pub fn build(self) -> Response<DefaultTransport> {
        DefaultTransport::from_builder(self)
    }
}
