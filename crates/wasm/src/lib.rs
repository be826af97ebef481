use feedflow_core::{FeedError, RenderConfig, config_from_json};
use js_sys::Function;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

/// Renders a JSON array of tweets into a JSON object of date-keyed fragment lists.
#[wasm_bindgen(js_name = render_twitter)]
pub fn render_twitter(items_json: &str, config_json: Option<String>) -> Result<String, JsError> {
    let config = config_from_json(config_json.as_deref()).map_err(to_js_error)?;
    feedflow_core::render_twitter_json(items_json, config).map_err(to_js_error)
}

/// Streams rendered fragments into the provided JavaScript callback.
///
/// The callback is invoked as `callback(dateKey, fragment)` in bucket order,
/// oldest key first, so callers can append to the DOM incrementally.
#[wasm_bindgen(js_name = stream_twitter)]
pub fn stream_twitter(
    items_json: &str,
    config_json: Option<String>,
    fragment_callback: &Function,
) -> Result<(), JsError> {
    let config = config_from_json(config_json.as_deref()).map_err(to_js_error)?;
    let buckets = feedflow_core::render_twitter(items_json, config).map_err(to_js_error)?;

    for (key, fragments) in &buckets {
        let key = JsValue::from_str(key.as_str());
        for fragment in fragments {
            fragment_callback
                .call2(&JsValue::UNDEFINED, &key, &JsValue::from_str(fragment))
                .map_err(js_callback_error)?;
        }
    }
    Ok(())
}

/// Wraps every match of `pattern` in `text` with a link under `link_prefix`.
#[wasm_bindgen(js_name = annotate)]
pub fn annotate(
    text: &str,
    link_prefix: &str,
    pattern: &str,
    mobile_app: Option<bool>,
) -> Result<String, JsError> {
    let config = RenderConfig {
        mobile_app: mobile_app.unwrap_or(false),
        ..RenderConfig::default()
    };
    feedflow_core::annotate_pattern(text, link_prefix, pattern, config).map_err(to_js_error)
}

fn to_js_error(err: FeedError) -> JsError {
    JsError::new(&err.to_string())
}

fn js_callback_error(err: JsValue) -> JsError {
    let message = err
        .as_string()
        .or_else(|| {
            js_sys::JSON::stringify(&err)
                .ok()
                .and_then(|s| s.as_string())
        })
        .unwrap_or_else(|| "callback threw".to_string());
    JsError::new(&message)
}
