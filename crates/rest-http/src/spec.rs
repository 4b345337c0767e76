//! OpenAPI document handling: size reduction and base-URL resolution.

use driver::{Error, Result};
use serde_json::Value;
use tracing::warn;
use url::Url;

/// Shrink a spec by dropping `components` and non-success responses.
///
/// Every operation keeps only the response codes starting with `2` or `3`.
/// Text that is not JSON is returned unchanged.
pub fn reduce_spec(spec_text: &str) -> String {
    let Ok(mut spec) = serde_json::from_str::<Value>(spec_text) else {
        return spec_text.to_string();
    };
    let Some(root) = spec.as_object_mut() else {
        return spec_text.to_string();
    };

    root.shift_remove("components");

    if let Some(paths) = root.get_mut("paths").and_then(Value::as_object_mut) {
        let operations = paths
            .values_mut()
            .filter_map(Value::as_object_mut)
            .flat_map(|item| item.values_mut())
            .filter_map(Value::as_object_mut);

        for op in operations {
            if let Some(responses) = op.get_mut("responses").and_then(Value::as_object_mut) {
                responses.retain(|code, _| code.starts_with('2') || code.starts_with('3'));
            }
        }
    }

    spec.to_string()
}

/// Base URL that tool paths are joined to.
///
/// Uses `servers[0].url` when present and non-empty (relative server URLs
/// are resolved against `spec_url`), otherwise `scheme://host[:port]` of
/// `spec_url`. Trailing slashes are removed.
pub fn resolve_base_url(spec_text: &str, spec_url: &Url) -> String {
    let declared = serde_json::from_str::<Value>(spec_text)
        .ok()
        .and_then(|spec| first_server_url(&spec));

    let base = match declared {
        Some(server) => match spec_url.join(&server) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!(%server, error = %e, "unusable servers[0].url, using spec origin");
                origin(spec_url)
            }
        },
        None => origin(spec_url),
    };
    base.trim_end_matches('/').to_string()
}

fn first_server_url(spec: &Value) -> Option<String> {
    spec.get("servers")?
        .as_array()?
        .first()?
        .get("url")?
        .as_str()
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn origin(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}

/// Join a tool path onto `base`.
///
/// A leading slash on `path` is ignored, so the result is always
/// `base/path` and never replaces the base's own path.
pub fn join_url(base: &str, path: &str) -> Result<Url> {
    let raw = format!("{}/{}", base, path.trim_start_matches('/'));
    Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{raw}: {e}")))
}
