//! Shared rendering capabilities handed to every feed source.

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::warn;

use crate::annotate::{AnnotateOptions, AnnotationPattern, annotate};
use crate::config::{ConfigSource, RenderConfig};
use crate::date_key::{self, DateKey};
use crate::error::TemplateResult;
use crate::escape::escape_html;
use crate::media::Media;
use crate::rewrite::{RewriteOptions, rewrite_fragment};
use crate::template::{
    CONTENT_ITEM, IFRAME_FRAME, IMAGE_FRAME, TemplateStore, TemplateValues,
};

/// Normalized per-item fields consumed by the content template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFields {
    pub source: String,
    pub id: String,
    /// Annotated body markup.
    pub text: String,
    /// Permalink to the item.
    pub link: String,
    pub date: String,
    /// Media markup or a pending placeholder.
    pub media: String,
    pub author_avatar: String,
    pub author_name: String,
    pub author_link: String,
}

impl CanonicalFields {
    /// Template values. Author name and avatar are plain text and get escaped;
    /// `text` and `media` are markup and go in as they are.
    pub fn to_values(&self) -> TemplateValues<'static> {
        let mut values = TemplateValues::new();
        values.insert("source", escape_html(&self.source));
        values.insert("id", escape_html(&self.id));
        values.insert("text", self.text.clone());
        values.insert("link", escape_html(&self.link));
        values.insert("date", escape_html(&self.date));
        values.insert("media", self.media.clone());
        values.insert("author_avatar", escape_html(&self.author_avatar));
        values.insert("author_name", escape_html(&self.author_name));
        values.insert("author_link", escape_html(&self.author_link));
        values
    }
}

/// Template store plus configuration, passed explicitly wherever markup is built.
pub struct Renderer {
    templates: TemplateStore,
    config: Box<dyn ConfigSource>,
}

impl Renderer {
    pub fn new(templates: TemplateStore, config: impl ConfigSource + 'static) -> Self {
        Self {
            templates,
            config: Box::new(config),
        }
    }

    /// Built-in templates with a fixed configuration.
    pub fn with_config(config: RenderConfig) -> Self {
        Self::new(TemplateStore::builtin(), config)
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Current configuration, read from the source on every call.
    pub fn config(&self) -> RenderConfig {
        self.config.get()
    }

    /// Renders a named template and runs the result through fragment post-processing.
    pub fn parse_template(&self, name: &str, values: &TemplateValues<'_>) -> TemplateResult<String> {
        let html = self.templates.render_named(name, values)?;
        let options = RewriteOptions::from(&self.config());

        Ok(rewrite_fragment(&html, options).unwrap_or_else(|err| {
            warn!(template = name, error = %err, "fragment rewrite failed, using raw markup");
            html
        }))
    }

    pub fn parse_item_template(&self, fields: &CanonicalFields) -> TemplateResult<String> {
        self.parse_template(CONTENT_ITEM, &fields.to_values())
    }

    /// Image linked to `link`, framed in the configured theme colour.
    pub fn image_html(&self, image: &str, link: &str) -> TemplateResult<String> {
        let config = self.config();
        let mut values = TemplateValues::new();
        values.insert("image", escape_html(image));
        values.insert("link", escape_html(link));
        values.insert("theme", config.theme_color().to_string());
        self.parse_template(IMAGE_FRAME, &values)
    }

    pub fn youtube_html(&self, url: &str) -> TemplateResult<String> {
        let mut values = TemplateValues::new();
        values.insert("url", escape_html(url));
        self.parse_template(IFRAME_FRAME, &values)
    }

    /// Markup for resolved media; empty for [`Media::None`].
    pub fn media_html(&self, media: &Media, link: &str) -> TemplateResult<String> {
        match media {
            Media::Image { url } => self.image_html(url, link),
            Media::Youtube { url } => self.youtube_html(url),
            Media::None => Ok(String::new()),
        }
    }

    pub fn format_date(&self, date: &DateTime<Utc>) -> String {
        date_key::format_date(date)
    }

    /// Bucket key at the configured resolution.
    pub fn date_key(&self, date: &DateTime<Utc>) -> DateKey {
        DateKey::with_resolution(date, self.config().date_key_resolution)
    }

    pub fn annotate_options(&self) -> AnnotateOptions {
        let config = self.config();
        AnnotateOptions {
            intercept_clicks: !config.mobile_app,
            size_limit: config.regex_size_limit,
        }
    }

    pub fn format_links(&self, text: &str, pattern: &Regex) -> String {
        annotate(text, "", pattern, &self.annotate_options())
    }

    pub fn format_hash_tags(&self, text: &str, base: &str) -> String {
        AnnotationPattern::hashtags(base).apply(text, &self.annotate_options())
    }

    pub fn format_user_names(&self, text: &str, base: &str) -> String {
        AnnotationPattern::mentions(base).apply(text, &self.annotate_options())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::with_config(RenderConfig::default())
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("templates", &self.templates)
            .field("config", &self.config())
            .finish()
    }
}
