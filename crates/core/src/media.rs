//! Media descriptors and deferred media resolution.
//!
//! Rendering never waits on a resolver. When an item's media has to be looked
//! up, its fragment carries a placeholder comment and the caller receives a
//! [`PendingMedia`] handle that may be awaited or dropped.

use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::date_key::DateKey;
use crate::renderer::Renderer;

/// What a resolver found behind a URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Media {
    Image {
        url: String,
    },
    Youtube {
        url: String,
    },
    /// Nothing embeddable, including any descriptor type this crate does not know.
    #[default]
    #[serde(other)]
    None,
}

impl Media {
    /// Reads a `{ "type": ..., "url": ... }` descriptor. Anything unreadable is `None`.
    pub fn from_descriptor(descriptor: &serde_json::Value) -> Self {
        Media::deserialize(descriptor).unwrap_or_default()
    }
}

/// Looks up embeddable media for a URL.
///
/// The returned future resolves at most once. Errors are the resolver's own
/// business and are reported as [`Media::None`].
pub trait MediaResolver {
    fn extract(&self, url: &str) -> BoxFuture<'static, Media>;
}

impl<F> MediaResolver for F
where
    F: Fn(&str) -> BoxFuture<'static, Media>,
{
    fn extract(&self, url: &str) -> BoxFuture<'static, Media> {
        self(url)
    }
}

/// Resolver that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl MediaResolver for NoopResolver {
    fn extract(&self, _url: &str) -> BoxFuture<'static, Media> {
        future::ready(Media::None).boxed()
    }
}

/// Placeholder inserted into a fragment while media for `item_id` is pending.
pub fn media_placeholder(item_id: &str) -> String {
    format!("<!--media:{item_id}-->")
}

/// Id of the element that wraps an item's media.
pub fn media_element_id(item_id: &str) -> String {
    format!("media-{item_id}")
}

/// Media lookup started during `parse` and not yet finished.
pub struct PendingMedia {
    item_id: String,
    date_key: DateKey,
    link: String,
    future: BoxFuture<'static, Media>,
}

impl PendingMedia {
    pub fn new(
        item_id: impl Into<String>,
        date_key: DateKey,
        link: impl Into<String>,
        future: BoxFuture<'static, Media>,
    ) -> Self {
        Self {
            item_id: item_id.into(),
            date_key,
            link: link.into(),
            future,
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn date_key(&self) -> &DateKey {
        &self.date_key
    }

    pub fn element_id(&self) -> String {
        media_element_id(&self.item_id)
    }

    pub fn placeholder(&self) -> String {
        media_placeholder(&self.item_id)
    }

    /// Waits for the resolver and renders the result.
    pub async fn resolve(self, renderer: &Renderer) -> ResolvedMedia {
        let media = self.future.await;
        let html = renderer
            .media_html(&media, &self.link)
            .unwrap_or_else(|err| {
                warn!(item_id = %self.item_id, error = %err, "failed to render resolved media");
                String::new()
            });

        ResolvedMedia {
            item_id: self.item_id,
            date_key: self.date_key,
            media,
            html,
        }
    }
}

impl fmt::Debug for PendingMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingMedia")
            .field("item_id", &self.item_id)
            .field("date_key", &self.date_key)
            .field("link", &self.link)
            .finish_non_exhaustive()
    }
}

/// Rendered outcome of a [`PendingMedia`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub item_id: String,
    pub date_key: DateKey,
    pub media: Media,
    /// Image or video frame markup; empty when nothing was found.
    pub html: String,
}

impl ResolvedMedia {
    pub fn element_id(&self) -> String {
        media_element_id(&self.item_id)
    }

    pub fn placeholder(&self) -> String {
        media_placeholder(&self.item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use futures::executor::block_on;
    use serde_json::json;

    fn key() -> DateKey {
        DateKey::day(&Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn reads_descriptors() {
        assert_eq!(
            Media::from_descriptor(&json!({"type": "image", "url": "https://i/x.png"})),
            Media::Image {
                url: "https://i/x.png".to_string()
            }
        );
        assert_eq!(
            Media::from_descriptor(&json!({"type": "youtube", "url": "https://y/embed/1"})),
            Media::Youtube {
                url: "https://y/embed/1".to_string()
            }
        );
        assert_eq!(
            Media::from_descriptor(&json!({"type": "vimeo", "url": "https://v/1"})),
            Media::None
        );
        assert_eq!(Media::from_descriptor(&json!({"type": "none"})), Media::None);
        assert_eq!(Media::from_descriptor(&json!("nope")), Media::None);
        assert_eq!(Media::from_descriptor(&json!({"type": "image"})), Media::None);
    }

    #[test]
    fn closures_are_resolvers() {
        let resolver = |url: &str| {
            future::ready(Media::Image {
                url: format!("{url}/preview.png"),
            })
            .boxed()
        };
        assert_eq!(
            block_on(resolver.extract("https://a.b")),
            Media::Image {
                url: "https://a.b/preview.png".to_string()
            }
        );
        assert_eq!(block_on(NoopResolver.extract("https://a.b")), Media::None);
    }

    #[test]
    fn resolves_to_image_frame() {
        let renderer = Renderer::default();
        let pending = PendingMedia::new(
            "42",
            key(),
            "https://twitter.com/web/status/42",
            future::ready(Media::Image {
                url: "https://img/1.png".to_string(),
            })
            .boxed(),
        );
        assert_eq!(pending.element_id(), "media-42");
        assert_eq!(pending.placeholder(), "<!--media:42-->");

        let resolved = block_on(pending.resolve(&renderer));
        assert_eq!(resolved.item_id, "42");
        assert!(resolved.html.contains(r#"src="https://img/1.png""#));
        assert!(resolved.html.contains(r#"href="https://twitter.com/web/status/42""#));
    }

    #[test]
    fn unresolved_media_renders_empty() {
        let renderer = Renderer::default();
        let pending = PendingMedia::new("7", key(), "https://s/7", NoopResolver.extract("x"));

        let resolved = block_on(pending.resolve(&renderer));
        assert_eq!(resolved.media, Media::None);
        assert_eq!(resolved.html, "");
    }
}
