//! Static driver metadata.

use std::fmt;

/// Wildcard entry in [`DriverMeta::target_llms`] matching every model.
pub const ANY_MODEL: &str = "*";

/// Describes what a driver speaks, so an orchestrator can choose one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverMeta {
    /// Call protocol (e.g. "REST").
    pub protocol: &'static str,
    /// Wire transport (e.g. "HTTP").
    pub transport: &'static str,
    /// Format of the tool description (e.g. "OpenAPI").
    pub spec_format: &'static str,
    /// Models the system prompt is written for. `"*"` means any.
    pub target_llms: &'static [&'static str],
}

impl DriverMeta {
    /// Whether this driver's prompt is intended for `model`.
    pub fn supports_model(&self, model: &str) -> bool {
        self.target_llms
            .iter()
            .any(|m| *m == ANY_MODEL || *m == model)
    }
}

impl fmt::Display for DriverMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({}, models: {})",
            self.protocol,
            self.transport,
            self.spec_format,
            self.target_llms.join(",")
        )
    }
}
