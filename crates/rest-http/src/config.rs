//! Driver configuration.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use driver::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use url::Url;

const AUTHORIZATION: &str = "Authorization";

/// Options fixed when a [`RestHttpDriver`](crate::RestHttpDriver) is built.
///
/// Deserializable so it can be embedded in a TOML config file.
#[derive(Debug, Clone, Deserialize)]
pub struct RestHttpConfig {
    /// Spec URLs. The first one is primary.
    pub urls: Vec<String>,

    /// Strip `components` and non-success responses from the fetched spec.
    #[serde(default)]
    pub reduced_spec: bool,

    /// Headers sent with every request. Names match case-insensitively on
    /// the wire.
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,

    /// Proxy used for both http and https traffic.
    #[serde(default)]
    pub proxy: Option<ProxyConfig>,

    /// Credentials turned into an `Authorization: Basic ...` default header.
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,

    /// Verify TLS certificates.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Returned by `describe` instead of fetching the spec.
    #[serde(default)]
    pub custom_description: Option<String>,

    /// Returned by `system_prompt` instead of the generated prompt.
    #[serde(default)]
    pub custom_system_message: Option<String>,
}

fn default_verify_tls() -> bool {
    true
}

impl RestHttpConfig {
    /// Config with the given spec URLs and everything else at its default.
    pub fn new(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            reduced_spec: false,
            default_headers: BTreeMap::new(),
            proxy: None,
            basic_auth: None,
            verify_tls: true,
            custom_description: None,
            custom_system_message: None,
        }
    }

    /// The primary spec URL, parsed.
    pub(crate) fn primary_url(&self) -> Result<Url> {
        let raw = self
            .urls
            .first()
            .ok_or_else(|| Error::Config("at least one spec url is required".into()))?;
        Url::parse(raw).map_err(|e| Error::Config(format!("invalid spec url {raw}: {e}")))
    }

    /// Default headers with the basic-auth header folded in.
    ///
    /// An `Authorization` entry already present in the defaults wins,
    /// whatever its case.
    pub(crate) fn effective_headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.default_headers.clone();
        let has_auth = headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case(AUTHORIZATION));
        if has_auth {
            return headers;
        }
        if let Some(value) = self.basic_auth.as_ref().and_then(BasicAuth::header_value) {
            headers.insert(AUTHORIZATION.to_string(), value);
        }
        headers
    }
}

/// HTTP proxy endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Host name, optionally with a scheme (`http://` is assumed otherwise).
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl ProxyConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Set proxy credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Proxy URL in `scheme://[user:password@]host:port` form.
    ///
    /// Credentials are included only when both are set and non-empty.
    pub fn url(&self) -> Result<Url> {
        let raw = if self.host.contains("://") {
            format!("{}:{}", self.host.trim_end_matches('/'), self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        };
        let mut url =
            Url::parse(&raw).map_err(|e| Error::Config(format!("invalid proxy {raw}: {e}")))?;

        if let (Some(user), Some(pass)) = (non_empty(&self.username), non_empty(&self.password)) {
            url.set_username(user)
                .and_then(|()| url.set_password(Some(pass)))
                .map_err(|()| Error::Config(format!("proxy {raw} cannot carry credentials")))?;
        }
        Ok(url)
    }
}

/// Static Basic-Auth credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `Basic <base64(user:password)>`, or `None` if either part is empty.
    pub fn header_value(&self) -> Option<String> {
        if self.username.is_empty() || self.password.is_empty() {
            return None;
        }
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        Some(format!("Basic {token}"))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
