//! REST-over-HTTP driver.
//!
//! Fetches an OpenAPI document, hands it to the model as the tool
//! description, and turns the model's JSON tool calls into HTTP requests.
//!
//! # Overview
//!
//! - **Executor**: one HTTP request with the driver's headers, proxy and TLS
//!   settings. Returns the body text; 4xx/5xx become errors.
//! - **Extraction**: finds a `{"path": ..., "arguments": ...}` object in model
//!   output, with or without markdown fences. Anything else is plain text.
//! - **Spec handling**: optional size reduction, and base-URL resolution from
//!   `servers[0].url` or the spec URL's origin.
//! - **RestHttpDriver**: implements [`driver::Driver`] on top of the above.
//!
//! # Example
//!
//! ```no_run
//! use driver::Driver;
//! use rest_http::RestHttpDriver;
//!
//! # async fn example() -> driver::Result<()> {
//! let driver = RestHttpDriver::builder(["http://localhost:8000/openapi.json"])
//!     .reduced_spec(true)
//!     .default_header("X-Client", "mcs")
//!     .build()?;
//!
//! let prompt = driver.system_prompt().await?;
//! println!("{prompt}");
//!
//! let answer = driver
//!     .process_response(r#"{"path": "/tools/fibonacci", "arguments": {"n": 4}}"#)
//!     .await?;
//! println!("{answer}");
//! # Ok(())
//! # }
//! ```

mod config;
mod executor;
mod extract;
mod rest;
mod spec;

pub use config::{BasicAuth, ProxyConfig, RestHttpConfig};
pub use executor::{Executor, REQUEST_TIMEOUT};
pub use extract::{ToolCall, extract_json_block, parse_tool_call};
pub use rest::{REST_HTTP_META, RestHttpDriver, RestHttpDriverBuilder};
pub use spec::{join_url, reduce_spec, resolve_base_url};
