//! Render configuration and the capability used to read it.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Granularity of the date bucket keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateKeyResolution {
    /// One bucket per UTC calendar day.
    #[default]
    Day,
    /// Millisecond keys; distinct instants rarely share a bucket.
    Instant,
}

/// Rendering options. Every field has a default so a partial (or empty)
/// JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RenderConfig {
    /// Dark theme for image frames. Accepts `0|1`, booleans and numeric strings.
    #[serde(default, deserialize_with = "flag")]
    pub dark_mode: bool,
    /// Hosted inside a mobile app shell: anchors skip the `onclick` override.
    #[serde(default)]
    pub mobile_app: bool,
    #[serde(default, rename = "date-key")]
    pub date_key_resolution: DateKeyResolution,
    #[serde(default = "default_true")]
    pub lazy_images: bool,
    #[serde(default = "default_true")]
    pub enforce_noopener: bool,
    /// Byte limit for per-token annotation regexes. `None` keeps the regex default.
    #[serde(default)]
    pub regex_size_limit: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            dark_mode: false,
            mobile_app: false,
            date_key_resolution: DateKeyResolution::Day,
            lazy_images: true,
            enforce_noopener: true,
            regex_size_limit: None,
        }
    }
}

fn default_true() -> bool {
    true
}

impl RenderConfig {
    /// Parses a JSON configuration object.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Background colour (hex, no `#`) for image frames.
    pub fn theme_color(&self) -> &'static str {
        if self.dark_mode { "424242" } else { "eee" }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
        Flag::Float(value) => value != 0.0,
        Flag::Str(value) => value.trim().parse::<f64>().is_ok_and(|n| n != 0.0),
    })
}

/// Synchronous access to the current configuration.
///
/// Read every time configuration-dependent markup is built, so a source backed
/// by mutable settings is picked up without rebuilding the renderer.
pub trait ConfigSource {
    fn get(&self) -> RenderConfig;
}

impl ConfigSource for RenderConfig {
    fn get(&self) -> RenderConfig {
        self.clone()
    }
}

impl<F> ConfigSource for F
where
    F: Fn() -> RenderConfig,
{
    fn get(&self) -> RenderConfig {
        self()
    }
}
