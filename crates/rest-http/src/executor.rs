//! Single-shot HTTP request execution with shared driver settings.

use std::collections::BTreeMap;
use std::time::Duration;

use driver::{Error, Result};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::config::RestHttpConfig;

/// Timeout applied to every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Performs requests with the driver's proxy, TLS and header settings.
///
/// The underlying client is built once and reused for spec fetches and tool
/// calls alike.
#[derive(Debug)]
pub struct Executor {
    client: reqwest::Client,
    default_headers: BTreeMap<String, String>,
}

impl Executor {
    /// Build an executor from driver configuration.
    pub fn new(config: &RestHttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!config.verify_tls);

        if let Some(proxy) = &config.proxy {
            let url = proxy.url()?;
            let proxy = reqwest::Proxy::all(url.as_str())
                .map_err(|e| Error::Config(format!("invalid proxy: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            default_headers: config.effective_headers(),
        })
    }

    /// Perform one request and return the body text undecoded.
    ///
    /// `query` entries are appended to the URL, `body` is sent as JSON and
    /// `headers` override default headers with the same key. Client and
    /// server error statuses fail with [`Error::HttpStatus`].
    pub async fn execute(
        &self,
        method: Method,
        mut url: Url,
        query: Option<&Map<String, Value>>,
        body: Option<&Value>,
        headers: &BTreeMap<String, String>,
    ) -> Result<String> {
        if let Some(args) = query {
            append_query(&mut url, args);
        }
        let headers = self.merged_headers(headers)?;

        debug!(%method, %url, "sending request");
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        debug!(status = status.as_u16(), bytes = text.len(), "received response");

        if status.is_client_error() || status.is_server_error() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    /// Default headers overlaid with per-call headers.
    ///
    /// Header names are case-insensitive, so a call header replaces a
    /// default whose name differs only in case.
    fn merged_headers(&self, extra: &BTreeMap<String, String>) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.default_headers.len() + extra.len());
        for (name, value) in self.default_headers.iter().chain(extra) {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("invalid value for header {name}: {e}")))?;
            map.insert(header, value);
        }
        Ok(map)
    }
}

/// Append JSON arguments to the URL's query string.
///
/// Arrays repeat the key, `null` is skipped, and anything that is not a
/// string is sent as its JSON text.
fn append_query(url: &mut Url, args: &Map<String, Value>) {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    for (key, value) in args {
        let values = match value {
            Value::Array(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        };
        pairs.extend(values.iter().filter_map(query_value).map(|v| (key.as_str(), v)));
    }

    if pairs.is_empty() {
        return;
    }
    url.query_pairs_mut().extend_pairs(pairs);
}

fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
