//! Tool-call extraction from free-form model output.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::debug;

const FENCE: &str = "```";

/// A tool call emitted by the model.
///
/// Expected shape:
///
/// ```json
/// {"path": "/tools/fibonacci", "method": "GET", "arguments": {"n": 4}, "headers": {}}
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCall {
    /// Tool path relative to the service base URL.
    pub path: String,
    /// Declared HTTP method. Absent means GET.
    #[serde(default)]
    pub method: Option<String>,
    /// Query parameters for GET, JSON body otherwise.
    #[serde(default, deserialize_with = "null_as_default")]
    pub arguments: Map<String, Value>,
    /// Per-call headers, overriding defaults with the same key.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
}

impl ToolCall {
    /// Wire method: GET when declared as GET (any case) or absent, POST
    /// for anything else.
    pub fn method(&self) -> Method {
        match self.method.as_deref() {
            None => Method::GET,
            Some(m) if m.eq_ignore_ascii_case("GET") => Method::GET,
            Some(_) => Method::POST,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Locate the candidate JSON block in `raw`.
///
/// Fenced output has its opening fence line and closing fence removed, then
/// the block runs from the first `{` to the last `}`. Unfenced output is
/// taken whole (trimmed). Returns `None` when there is nothing to parse.
pub fn extract_json_block(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.starts_with(FENCE) {
        return Some(trimmed);
    }

    let body = strip_fences(trimmed);
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    (end > start).then(|| &body[start..=end])
}

fn strip_fences(trimmed: &str) -> &str {
    // Opening fence line, including any language tag.
    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => &trimmed[FENCE.len()..],
    };
    body.trim_end()
        .strip_suffix(FENCE)
        .unwrap_or(body)
}

/// Parse the tool call embedded in `raw`, if there is one.
///
/// Anything that is not a JSON object with a non-empty `path` yields `None`;
/// the caller then treats `raw` as ordinary assistant text. Only the first
/// complete JSON value of the block is read, so stray text or braces after
/// a valid object do not hide it.
pub fn parse_tool_call(raw: &str) -> Option<ToolCall> {
    let block = extract_json_block(raw)?;

    let value = match serde_json::Deserializer::from_str(block)
        .into_iter::<Value>()
        .next()?
    {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "model output is not a tool call");
            return None;
        }
    };

    if !value.is_object() {
        return None;
    }
    match serde_json::from_value::<ToolCall>(value) {
        Ok(call) if !call.path.is_empty() => Some(call),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "json object is not a tool call");
            None
        }
    }
}
