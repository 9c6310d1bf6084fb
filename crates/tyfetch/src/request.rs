//! Request specification and resolution
//!
//! A [`RequestSpec`] is what a caller asks for. Resolving it against the
//! executor's base URL yields a [`ResolvedRequest`]: absolute URL with the
//! encoded query string, merged headers and the serialized JSON body. The
//! resolution is pure, so identical inputs always produce identical requests.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Number, Value};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::HttpError;
use crate::method::HttpMethod;
use crate::response::Response;

/// Header name of the default content type
pub const CONTENT_TYPE: &str = "Content-Type";

/// Default content type of every request
pub const APPLICATION_JSON: &str = "application/json";

/// Header mapping. Keys are compared case-sensitively.
pub type Headers = BTreeMap<String, String>;

/// Value of a single query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Text, embedded as is
    String(String),
    /// Number, embedded in decimal form
    Number(Number),
    /// Boolean, embedded as `true`/`false`
    Bool(bool),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::String(s) => f.write_str(s),
            QueryValue::Bool(b) => write!(f, "{}", b),
            QueryValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    write!(f, "{}", i)
                } else if let Some(u) = n.as_u64() {
                    write!(f, "{}", u)
                } else if let Some(float) = n.as_f64() {
                    // Plain decimal, never exponent notation. f64 Display also
                    // drops a zero fraction ("3" rather than "3.0")
                    write!(f, "{}", float)
                } else {
                    write!(f, "{}", n)
                }
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(n) => QueryValue::Number(n),
            None => QueryValue::String(value.to_string()),
        }
    }
}

macro_rules! impl_query_value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    QueryValue::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_query_value_from_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

/// Per-call options shared by every verb
///
/// ```
/// use tyfetch::RequestOptions;
///
/// let options = RequestOptions::new()
///     .query("count", 3)
///     .query("active", true)
///     .header("X-Trace", "abc");
/// assert_eq!(options.query_params().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    query: Vec<(String, QueryValue)>,
    headers: Headers,
    cancellation: Option<CancellationToken>,
}

impl RequestOptions {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a query parameter. Repeated keys are all kept, in order.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Set a header, replacing an earlier value for the same key
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Attach a cancellation token. Cancelling it fails the call with
    /// [`HttpError::Timeout`].
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Query parameters in insertion order
    pub fn query_params(&self) -> &[(String, QueryValue)] {
        &self.query
    }

    /// Caller supplied headers
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Cancellation token, if any
    pub fn cancellation_token(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

/// Everything needed to perform one call, minus the path
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// HTTP method
    pub method: HttpMethod,
    /// JSON body, `None` means no payload at all
    pub body: Option<Value>,
    /// Query, headers and cancellation
    pub options: RequestOptions,
}

impl RequestSpec {
    /// Request with no body and default options
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            body: None,
            options: RequestOptions::default(),
        }
    }

    /// Set the JSON body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the options
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Materialize the request against `base_url`
    pub fn resolve(&self, base_url: &Url, path: &str) -> Response<ResolvedRequest> {
        debug_assert!(
            self.body.is_none() || self.method.has_body(),
            "{} requests carry no body",
            self.method
        );

        Ok(ResolvedRequest {
            method: self.method,
            url: build_url(base_url, path, &self.options.query)?,
            headers: merge_headers(&self.options.headers),
            body: serialize_body(self.body.as_ref())?,
        })
    }
}

/// A fully materialized request, as handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL including the query string
    pub url: Url,
    /// Default headers overlaid with the caller's
    pub headers: Headers,
    /// Serialized JSON body
    pub body: Option<String>,
}

impl ResolvedRequest {
    /// Header value by exact key
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

/// Resolve `path` against `base_url` and append the query parameters in order
pub fn build_url(base_url: &Url, path: &str, query: &[(String, QueryValue)]) -> Response<Url> {
    let mut url = base_url.join(path)?;

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, &value.to_string());
        }
    }

    Ok(url)
}

/// Default headers overlaid with `overrides`, the caller winning on collision
pub fn merge_headers(overrides: &Headers) -> Headers {
    let mut headers = Headers::new();
    headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
    headers.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    headers
}

/// Canonical JSON text of the body, `None` when there is no body
pub fn serialize_body(body: Option<&Value>) -> Response<Option<String>> {
    body.map(serde_json::to_string)
        .transpose()
        .map_err(HttpError::Serialization)
}
