//! HTML post-processing for rendered fragments, backed by lol_html.

use lol_html::errors::RewritingError;
use lol_html::{RewriteStrSettings, element, rewrite_str};

use crate::config::RenderConfig;

/// Flags that control how rendered fragments are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Missing `loading` attributes on `<img>` tags default to `lazy`.
    pub enforce_img_loading_lazy: bool,
    /// Anchors opening a new context (`target="_blank"`) get `noopener` in `rel`.
    pub enforce_link_noopener: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            enforce_img_loading_lazy: true,
            enforce_link_noopener: true,
        }
    }
}

impl From<&RenderConfig> for RewriteOptions {
    fn from(config: &RenderConfig) -> Self {
        RewriteOptions {
            enforce_img_loading_lazy: config.lazy_images,
            enforce_link_noopener: config.enforce_noopener,
        }
    }
}

impl RewriteOptions {
    fn is_noop(&self) -> bool {
        !self.enforce_img_loading_lazy && !self.enforce_link_noopener
    }
}

/// Rewrites one HTML fragment. Comments, text and untouched tags pass through verbatim.
pub fn rewrite_fragment(html: &str, options: RewriteOptions) -> Result<String, RewritingError> {
    if options.is_noop() || html.is_empty() {
        return Ok(html.to_string());
    }

    let mut handlers = Vec::new();

    if options.enforce_img_loading_lazy {
        handlers.push(element!("img", |el| {
            if el.get_attribute("loading").is_none() {
                el.set_attribute("loading", "lazy")?;
            }
            Ok(())
        }));
    }

    if options.enforce_link_noopener {
        handlers.push(element!("a[target=_blank]", |el| {
            let rel = el.get_attribute("rel").unwrap_or_default();
            if !rel.split_whitespace().any(|token| token == "noopener") {
                let rel = if rel.trim().is_empty() {
                    "noopener".to_string()
                } else {
                    format!("{} noopener", rel.trim())
                };
                el.set_attribute("rel", &rel)?;
            }
            Ok(())
        }));
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )
}
