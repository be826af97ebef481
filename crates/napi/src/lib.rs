#![deny(missing_docs)]
//! Node.js bindings that surface Feedflow's Rust implementation.

use napi::{Error, Result};
use napi_derive::napi;

/// Returns the version string reported by the core crate.
#[napi]
pub fn version() -> String {
    feedflow_core::version().to_string()
}

/// Renders a JSON array of tweets into a JSON object of date-keyed fragment lists.
#[napi]
pub fn render_twitter(items_json: String, config_json: Option<String>) -> Result<String> {
    let config = feedflow_core::config_from_json(config_json.as_deref()).map_err(to_napi_error)?;
    feedflow_core::render_twitter_json(&items_json, config).map_err(to_napi_error)
}

/// Wraps every match of `pattern` in `text` with a link under `link_prefix`.
#[napi]
pub fn annotate(text: String, link_prefix: String, pattern: String) -> Result<String> {
    feedflow_core::annotate_pattern(&text, &link_prefix, &pattern, Default::default())
        .map_err(to_napi_error)
}

fn to_napi_error(err: feedflow_core::FeedError) -> Error {
    Error::from_reason(err.to_string())
}
