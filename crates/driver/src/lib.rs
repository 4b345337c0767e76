//! Driver interface for model-facing tool integrations.
//!
//! A driver connects a language model to a set of callable tools. It has
//! three jobs:
//!
//! - **Describe**: return a machine-readable description of the tools
//!   (for example an OpenAPI document).
//! - **System prompt**: wrap that description in instructions the model can
//!   follow when it wants to call a tool.
//! - **Process response**: take the model's raw output, execute the tool
//!   call it contains (if any), and return the raw result text.
//!
//! Transports and spec formats differ between drivers, so callers hold a
//! `D: Driver` rather than a concrete type.
//!
//! # Example
//!
//! ```ignore
//! use driver::{Driver, Result};
//!
//! async fn turn<D: Driver>(driver: &D, model_output: &str) -> Result<String> {
//!     driver.process_response(model_output).await
//! }
//! ```

mod error;
mod meta;

pub use error::{Error, Result};
pub use meta::{ANY_MODEL, DriverMeta};

use std::future::Future;

/// Capability interface every driver implements.
///
/// Each operation takes and returns plain text so that the embedding
/// application never needs to know which transport sits underneath.
pub trait Driver: Send + Sync {
    /// Static metadata used to pick a driver for a model.
    fn meta(&self) -> &DriverMeta;

    /// Return the tool description the model should see.
    fn describe(&self) -> impl Future<Output = Result<String>> + Send;

    /// Return the system prompt instructing the model how to call tools.
    fn system_prompt(&self) -> impl Future<Output = Result<String>> + Send;

    /// Execute the tool call embedded in `llm_response`, if there is one.
    ///
    /// Output that contains no recognizable call is returned unchanged.
    fn process_response(&self, llm_response: &str)
    -> impl Future<Output = Result<String>> + Send;
}
