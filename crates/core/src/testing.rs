//! Test doubles for code built on this crate.

use futures::future::{self, BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::media::{Media, MediaResolver};

/// Resolver answering from a fixed URL table and recording every request.
///
/// Unknown URLs resolve to [`Media::None`], like a lookup that failed.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    responses: HashMap<String, Media>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_media(mut self, url: impl Into<String>, media: Media) -> Self {
        self.responses.insert(url.into(), media);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl MediaResolver for StaticResolver {
    fn extract(&self, url: &str) -> BoxFuture<'static, Media> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.to_string());
        }
        let media = self.responses.get(url).cloned().unwrap_or_default();
        future::ready(media).boxed()
    }
}
