//! Feedflow core: renders social feed records into date-bucketed HTML fragments.
//!
//! ```text
//! raw items -> FeedSource::parse -> annotate (links, tags, mentions)
//!                                -> DateKey + TemplateStore -> FeedOutput
//! ```
//!
//! Media that needs an outside lookup never blocks `parse`; it comes back as
//! a [`PendingMedia`] handle next to the rendered buckets.

pub mod annotate;
pub mod config;
pub mod date_key;
pub mod error;
pub mod escape;
pub mod feed;
pub mod media;
pub mod query;
pub mod renderer;
pub mod rewrite;
pub mod template;
pub mod testing;
pub mod twitter;

pub use annotate::{AnnotateOptions, AnnotationPattern, annotate, annotate_all};
pub use config::{ConfigSource, DateKeyResolution, RenderConfig};
pub use date_key::{DateKey, format_date, parse_timestamp};
pub use error::{ConfigError, FeedError, RecordError, TemplateError};
pub use escape::{escape_html, secure_url};
pub use feed::{Buckets, FeedOutput, FeedSource, RawItem, apply_resolved};
pub use media::{Media, MediaResolver, NoopResolver, PendingMedia, ResolvedMedia};
pub use query::{DefaultQueryEncoder, QueryEncoder, TwitterQueryEncoder};
pub use renderer::{CanonicalFields, Renderer};
pub use rewrite::{RewriteOptions, rewrite_fragment};
pub use template::{DirSource, MemorySource, TemplateSource, TemplateStore, TemplateValues};
pub use twitter::Twitter;

/// Crate version, as reported to the bindings.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Renders a JSON array of tweets with the built-in templates.
///
/// Linked media is not resolved; those fragments keep their placeholders.
/// Returns the buckets as a JSON object keyed by date key.
pub fn render_twitter_json(items_json: &str, config: RenderConfig) -> error::Result<String> {
    let buckets = render_twitter(items_json, config)?;
    Ok(serde_json::to_string(&buckets)?)
}

/// Same as [`render_twitter_json`], returning the buckets themselves.
pub fn render_twitter(items_json: &str, config: RenderConfig) -> error::Result<Buckets> {
    let items: Vec<RawItem> = serde_json::from_str(items_json)?;
    let renderer = Renderer::with_config(config);
    renderer
        .templates()
        .preload(&[template::CONTENT_ITEM, template::IMAGE_FRAME, template::IFRAME_FRAME])?;

    Ok(Twitter::new()
        .parse(&items, &renderer, &NoopResolver)
        .into_buckets())
}

/// Reads an optional JSON config, falling back to the defaults.
pub fn config_from_json(config_json: Option<&str>) -> error::Result<RenderConfig> {
    match config_json {
        Some(json) => Ok(RenderConfig::from_json(json)?),
        None => Ok(RenderConfig::default()),
    }
}

/// Compiles `pattern` and annotates `text` with it under `config`.
pub fn annotate_pattern(
    text: &str,
    link_prefix: &str,
    pattern: &str,
    config: RenderConfig,
) -> error::Result<String> {
    let pattern = annotate::Regex::new(pattern)?;
    let renderer = Renderer::with_config(config);
    Ok(annotate(text, link_prefix, &pattern, &renderer.annotate_options()))
}
