//! Feed source abstraction and the bucketed output it produces.

use futures::future::join_all;
use std::collections::BTreeMap;

use crate::date_key::DateKey;
use crate::media::{MediaResolver, PendingMedia, ResolvedMedia};
use crate::query::{DefaultQueryEncoder, QueryEncoder};
use crate::renderer::Renderer;

/// One unmodified record from a source API.
pub type RawItem = serde_json::Value;

/// Rendered fragments grouped by date key, in chronological key order.
pub type Buckets = BTreeMap<DateKey, Vec<String>>;

/// A platform adapter: turns raw records into bucketed HTML fragments.
pub trait FeedSource {
    /// Source tag written into every fragment.
    fn name(&self) -> &'static str;

    fn query_encoder(&self) -> &dyn QueryEncoder {
        &DefaultQueryEncoder
    }

    /// Renders a batch. Records that cannot be rendered are logged and skipped,
    /// so this always returns.
    fn parse(
        &self,
        items: &[RawItem],
        renderer: &Renderer,
        resolver: &dyn MediaResolver,
    ) -> FeedOutput;
}

/// Result of one `parse` call.
#[derive(Debug, Default)]
pub struct FeedOutput {
    buckets: Buckets,
    pending: Vec<PendingMedia>,
}

impl FeedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment to its bucket, creating the bucket on first use.
    pub fn push(&mut self, key: DateKey, fragment: String) {
        self.buckets.entry(key).or_default().push(fragment);
    }

    pub fn defer(&mut self, pending: PendingMedia) {
        self.pending.push(pending);
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn pending(&self) -> &[PendingMedia] {
        &self.pending
    }

    /// Total number of rendered fragments.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drops pending lookups; their placeholders stay as empty comments.
    pub fn into_buckets(self) -> Buckets {
        self.buckets
    }

    pub fn into_parts(self) -> (Buckets, Vec<PendingMedia>) {
        (self.buckets, self.pending)
    }

    /// Waits for every pending lookup and splices its markup into its fragment.
    pub async fn resolve(self, renderer: &Renderer) -> Buckets {
        let (mut buckets, pending) = self.into_parts();
        let resolved = join_all(pending.into_iter().map(|p| p.resolve(renderer))).await;

        for media in resolved {
            apply_resolved(&mut buckets, &media);
        }
        buckets
    }
}

/// Replaces the placeholder for `media` within its bucket. Returns whether a
/// fragment was updated.
pub fn apply_resolved(buckets: &mut Buckets, media: &ResolvedMedia) -> bool {
    let placeholder = media.placeholder();
    let Some(fragments) = buckets.get_mut(&media.date_key) else {
        return false;
    };

    match fragments.iter_mut().find(|f| f.contains(&placeholder)) {
        Some(fragment) => {
            *fragment = fragment.replacen(&placeholder, &media.html, 1);
            true
        }
        None => false,
    }
}
