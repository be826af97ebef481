//! Twitter feed source.
//!
//! Field names follow the v1.1 tweet object. Only the fields this renderer
//! reads are modelled; everything else in the payload is ignored.

use regex::Regex;
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{trace, warn};

use crate::annotate::{AnnotationPattern, annotate_all};
use crate::date_key::parse_timestamp;
use crate::error::RecordError;
use crate::escape::secure_url;
use crate::feed::{FeedOutput, FeedSource, RawItem};
use crate::media::{MediaResolver, PendingMedia, media_placeholder};
use crate::query::{QueryEncoder, TwitterQueryEncoder};
use crate::renderer::{CanonicalFields, Renderer};

pub const SOURCE: &str = "twitter";
pub const BASE_URL: &str = "https://twitter.com/";
pub const STATUS_URL: &str = "https://twitter.com/web/status/";
pub const HASHTAG_URL: &str = "https://twitter.com/hashtag/";

/// Prefix of a retweet's truncated text.
const SHARE_MARKER: &str = "RT @";

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)https?://t\.co/\w+").expect("link pattern is valid")
});

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tweet {
    #[serde(deserialize_with = "lenient")]
    pub id_str: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub full_text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub user: Option<User>,
    #[serde(deserialize_with = "lenient")]
    pub retweeted_status: Option<Box<Tweet>>,
    #[serde(deserialize_with = "lenient")]
    pub entities: Option<Entities>,
    #[serde(deserialize_with = "lenient")]
    pub extended_entities: Option<Entities>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct User {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub screen_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Entities {
    #[serde(deserialize_with = "lenient")]
    pub media: Vec<MediaEntity>,
    #[serde(deserialize_with = "lenient")]
    pub urls: Vec<UrlEntity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MediaEntity {
    #[serde(deserialize_with = "lenient")]
    pub media_url_https: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UrlEntity {
    #[serde(deserialize_with = "lenient")]
    pub expanded_url: Option<String>,
}

/// Reads a field, falling back to its default when it is `null` or mistyped.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl Tweet {
    /// Non-empty id, if any.
    pub fn id(&self) -> Option<&str> {
        self.id_str.as_deref().filter(|id| !id.is_empty())
    }

    fn raw_text(&self) -> &str {
        self.full_text
            .as_deref()
            .or(self.text.as_deref())
            .unwrap_or_default()
    }

    /// Body text, with a retweet flattened to `RT @user: <original full text>`.
    pub fn body_text(&self) -> String {
        let text = self.raw_text();
        match &self.retweeted_status {
            Some(shared) if text.starts_with(SHARE_MARKER) => {
                let marker = text.split(": ").next().unwrap_or(text);
                format!("{marker}: {}", shared.raw_text())
            }
            _ => text.to_string(),
        }
    }

    fn media_source(&self) -> MediaSource<'_> {
        let attached = self
            .extended_entities
            .as_ref()
            .and_then(|entities| entities.media.first())
            .and_then(|media| media.media_url_https.as_deref());

        if let Some(url) = attached.filter(|url| url.starts_with("https:")) {
            return MediaSource::Attached(url);
        }

        self.entities
            .as_ref()
            .and_then(|entities| entities.urls.first())
            .and_then(|link| link.expanded_url.as_deref())
            .filter(|url| !url.is_empty())
            .map_or(MediaSource::Absent, MediaSource::Linked)
    }
}

enum MediaSource<'a> {
    /// Secure URL of a native attachment.
    Attached(&'a str),
    /// First external link; needs a resolver.
    Linked(&'a str),
    Absent,
}

/// Twitter timeline and search results.
#[derive(Debug, Clone)]
pub struct Twitter {
    patterns: Vec<AnnotationPattern>,
}

impl Twitter {
    pub fn new() -> Self {
        // Links first, so sigils inside URLs are already wrapped when the
        // hashtag and mention passes run.
        Self {
            patterns: vec![
                AnnotationPattern::links(LINK_PATTERN.clone()),
                AnnotationPattern::hashtags(HASHTAG_URL),
                AnnotationPattern::mentions(BASE_URL),
            ],
        }
    }

    fn render_item(
        &self,
        item: &RawItem,
        renderer: &Renderer,
        resolver: &dyn MediaResolver,
        output: &mut FeedOutput,
    ) -> Result<(), RecordError> {
        let tweet = Tweet::deserialize(item)?;
        let id = tweet.id().ok_or(RecordError::MissingId)?;

        let created = tweet
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .ok_or_else(|| RecordError::InvalidTimestamp {
                id: id.to_string(),
                value: tweet.created_at.clone(),
            })?;
        let key = renderer.date_key(&created);
        let status = format!("{STATUS_URL}{id}");

        let user = tweet.user.as_ref();
        let avatar = user
            .and_then(|u| u.profile_image_url.as_deref())
            .map(secure_url)
            .unwrap_or_default();
        let author_name = user.and_then(|u| u.name.as_deref()).unwrap_or_default();
        let screen_name = user.and_then(|u| u.screen_name.as_deref()).unwrap_or_default();

        let mut pending = None;
        let media = match tweet.media_source() {
            MediaSource::Attached(url) => renderer.image_html(url, &status)?,
            MediaSource::Linked(url) => {
                pending = Some(PendingMedia::new(
                    id,
                    key.clone(),
                    status.clone(),
                    resolver.extract(url),
                ));
                media_placeholder(id)
            }
            MediaSource::Absent => String::new(),
        };

        let options = renderer.annotate_options();
        let fields = CanonicalFields {
            source: SOURCE.to_string(),
            id: id.to_string(),
            text: annotate_all(&tweet.body_text(), &self.patterns, &options),
            link: status,
            date: renderer.format_date(&created),
            media,
            author_avatar: avatar,
            author_name: author_name.to_string(),
            author_link: format!("{BASE_URL}{screen_name}"),
        };

        let fragment = renderer.parse_item_template(&fields)?;
        output.push(key, fragment);
        if let Some(pending) = pending {
            output.defer(pending);
        }
        Ok(())
    }
}

impl Default for Twitter {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedSource for Twitter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn query_encoder(&self) -> &dyn QueryEncoder {
        &TwitterQueryEncoder
    }

    fn parse(
        &self,
        items: &[RawItem],
        renderer: &Renderer,
        resolver: &dyn MediaResolver,
    ) -> FeedOutput {
        let mut output = FeedOutput::new();

        // Newest-first input: walking it backwards fills each bucket oldest first.
        for (index, item) in items.iter().enumerate().rev() {
            match self.render_item(item, renderer, resolver, &mut output) {
                Ok(()) => {}
                Err(RecordError::MissingId) => trace!(index, "skipping record without id"),
                Err(err) => warn!(index, error = %err, "skipping record"),
            }
        }

        output
    }
}
