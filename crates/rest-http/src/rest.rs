//! REST-over-HTTP driver with OpenAPI discovery.

use driver::{Driver, DriverMeta, Result};
use reqwest::Method;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use url::Url;

use crate::config::{BasicAuth, ProxyConfig, RestHttpConfig};
use crate::executor::Executor;
use crate::extract::parse_tool_call;
use crate::spec::{join_url, reduce_spec, resolve_base_url};

/// Metadata advertised by [`RestHttpDriver`].
pub const REST_HTTP_META: DriverMeta = DriverMeta {
    protocol: "REST",
    transport: "HTTP",
    spec_format: "OpenAPI",
    target_llms: &["*"],
};

/// Builder for creating a [`RestHttpDriver`].
#[derive(Debug, Clone)]
pub struct RestHttpDriverBuilder {
    config: RestHttpConfig,
}

impl RestHttpDriverBuilder {
    /// Create a builder for the given spec URLs (first is primary).
    pub fn new(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            config: RestHttpConfig::new(urls),
        }
    }

    /// Reduce the fetched spec before handing it to the model.
    pub fn reduced_spec(mut self, reduced: bool) -> Self {
        self.config.reduced_spec = reduced;
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(name.into(), value.into());
        self
    }

    /// Add several headers sent with every request.
    pub fn default_headers<K, V>(mut self, headers: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.config
            .default_headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Route all traffic through a proxy.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Send Basic-Auth credentials unless an `Authorization` header is set.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.basic_auth = Some(BasicAuth::new(username, password));
        self
    }

    /// Toggle TLS certificate verification.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.config.verify_tls = verify;
        self
    }

    /// Serve this text from `describe` instead of fetching the spec.
    pub fn custom_description(mut self, description: impl Into<String>) -> Self {
        self.config.custom_description = Some(description.into());
        self
    }

    /// Serve this text from `system_prompt` instead of generating one.
    pub fn custom_system_message(mut self, message: impl Into<String>) -> Self {
        self.config.custom_system_message = Some(message.into());
        self
    }

    /// Build the driver.
    pub fn build(self) -> Result<RestHttpDriver> {
        RestHttpDriver::from_config(self.config)
    }
}

/// Driver that fetches an OpenAPI spec and executes REST calls.
#[derive(Debug)]
pub struct RestHttpDriver {
    config: RestHttpConfig,
    spec_url: Url,
    executor: Executor,
    base_url: OnceCell<String>,
}

impl RestHttpDriver {
    /// Create a builder for the REST driver.
    pub fn builder(urls: impl IntoIterator<Item = impl Into<String>>) -> RestHttpDriverBuilder {
        RestHttpDriverBuilder::new(urls)
    }

    /// Create a driver from a deserialized configuration.
    pub fn from_config(config: RestHttpConfig) -> Result<Self> {
        let spec_url = config.primary_url()?;
        let executor = Executor::new(&config)?;
        Ok(Self {
            config,
            spec_url,
            executor,
            base_url: OnceCell::new(),
        })
    }

    /// Configuration the driver was built with.
    pub fn config(&self) -> &RestHttpConfig {
        &self.config
    }

    /// Primary spec URL.
    pub fn spec_url(&self) -> &Url {
        &self.spec_url
    }

    /// Base URL if it has been resolved already.
    pub fn resolved_base_url(&self) -> Option<&str> {
        self.base_url.get().map(String::as_str)
    }

    /// Base URL for tool calls, resolved on first use and then kept for the
    /// lifetime of the driver.
    pub async fn base_url(&self) -> Result<&str> {
        let base = self
            .base_url
            .get_or_try_init(|| async {
                let spec = self.describe().await?;
                let base = resolve_base_url(&spec, &self.spec_url);
                info!(base_url = %base, "resolved base url");
                Ok::<_, driver::Error>(base)
            })
            .await?;
        Ok(base.as_str())
    }

    async fn fetch_spec(&self) -> Result<String> {
        debug!(url = %self.spec_url, "fetching spec");
        let spec = self
            .executor
            .execute(
                Method::GET,
                self.spec_url.clone(),
                None,
                None,
                &Default::default(),
            )
            .await?;

        if self.config.reduced_spec {
            Ok(reduce_spec(&spec))
        } else {
            Ok(spec)
        }
    }
}

impl Driver for RestHttpDriver {
    fn meta(&self) -> &DriverMeta {
        &REST_HTTP_META
    }

    async fn describe(&self) -> Result<String> {
        match &self.config.custom_description {
            Some(description) => Ok(description.clone()),
            None => self.fetch_spec().await,
        }
    }

    async fn system_prompt(&self) -> Result<String> {
        if let Some(message) = &self.config.custom_system_message {
            return Ok(message.clone());
        }
        let description = self.describe().await?;
        Ok(build_system_prompt(&description))
    }

    async fn process_response(&self, llm_response: &str) -> Result<String> {
        let Some(call) = parse_tool_call(llm_response) else {
            return Ok(llm_response.to_string());
        };

        let base = self.base_url().await?;
        let url = join_url(base, &call.path)?;
        let method = call.method();
        info!(path = %call.path, %method, arguments = ?call.arguments, "executing tool");

        let result = if method == Method::GET {
            self.executor
                .execute(method, url, Some(&call.arguments), None, &call.headers)
                .await?
        } else {
            let body = serde_json::Value::Object(call.arguments);
            self.executor
                .execute(method, url, None, Some(&body), &call.headers)
                .await?
        };

        debug!(bytes = result.len(), "tool response");
        Ok(result)
    }
}

/// Default prompt telling the model how to call the described tools.
fn build_system_prompt(description: &str) -> String {
    format!(
        "You are a helpful assistant with access to these tools:\n\n\
         {description}\n\n\
         Choose the appropriate tool based on the user's question. \
         If no tool is needed, reply directly.\n\n\
         When you need a tool, respond ONLY with one JSON object in exactly \
         this format, nothing else:\n\
         {{\"path\": \"/tool/path\", \"arguments\": {{\"argument-name\": \"value\"}}}}\n\n\
         After receiving a tool's response, turn the raw data into a concise, \
         natural answer to the user's question.\n\
         Use only the tools defined above.\n"
    )
}
