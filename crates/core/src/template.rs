//! Template text lookup and placeholder substitution.
//!
//! A [`TemplateStore`] owns exactly one [`TemplateSource`] and a name-keyed
//! cache. The first lookup of a name goes to the source; every later lookup is
//! served from the cache. The cache only grows, and the store is meant to be
//! used from a single thread.

use regex::{Captures, Regex};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::LazyLock;

use crate::error::{TemplateError, TemplateResult};

/// Per-item content template.
pub const CONTENT_ITEM: &str = "content-item";
/// Linked image wrapper.
pub const IMAGE_FRAME: &str = "image-frame";
/// Embedded video player.
pub const IFRAME_FRAME: &str = "iframe-frame";

const BUILTIN_CONTENT_ITEM: &str = r#"<div class="content-item {{source}}" data-id="{{id}}">
  <a class="author" href="{{author_link}}" target="_blank" rel="external noopener"><img class="avatar" src="{{author_avatar}}" alt="">{{author_name}}</a>
  <div class="text">{{text}}</div>
  <div class="media" id="media-{{id}}">{{media}}</div>
  <a class="date" href="{{link}}" target="_blank" rel="external noopener">{{date}}</a>
</div>"#;

const BUILTIN_IMAGE_FRAME: &str = r#"<a class="image-frame" href="{{link}}" target="_blank" rel="external noopener" style="background-color:#{{theme}}"><img src="{{image}}" alt=""></a>"#;

const BUILTIN_IFRAME_FRAME: &str =
    r#"<iframe class="video-frame" src="{{url}}" frameborder="0" allowfullscreen></iframe>"#;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_-]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Values substituted into a template, keyed by placeholder name.
pub type TemplateValues<'a> = BTreeMap<&'a str, String>;

/// Backing store for raw template text.
pub trait TemplateSource {
    fn load(&self, name: &str) -> TemplateResult<String>;
}

/// In-memory templates.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default markup for every template the feed adapters use.
    pub fn builtin() -> Self {
        Self::new()
            .with_template(CONTENT_ITEM, BUILTIN_CONTENT_ITEM)
            .with_template(IMAGE_FRAME, BUILTIN_IMAGE_FRAME)
            .with_template(IFRAME_FRAME, BUILTIN_IFRAME_FRAME)
    }

    pub fn with_template(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }
}

impl TemplateSource for MemorySource {
    fn load(&self, name: &str) -> TemplateResult<String> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Templates stored as `<dir>/<name>-template.html` files.
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}-template.html"))
    }
}

impl TemplateSource for DirSource {
    fn load(&self, name: &str) -> TemplateResult<String> {
        std::fs::read_to_string(self.path_for(name)).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound {
                    name: name.to_string(),
                }
            } else {
                TemplateError::Io {
                    name: name.to_string(),
                    source,
                }
            }
        })
    }
}

/// Caching template lookup over a single source.
pub struct TemplateStore {
    source: Box<dyn TemplateSource>,
    cache: RefCell<HashMap<String, Rc<str>>>,
}

impl TemplateStore {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Store backed by [`MemorySource::builtin`].
    pub fn builtin() -> Self {
        Self::new(MemorySource::builtin())
    }

    /// Returns the raw text for `name`, loading it on first access.
    ///
    /// Failed loads are not cached, so a later call retries the source.
    pub fn get_template(&self, name: &str) -> TemplateResult<Rc<str>> {
        if let Some(text) = self.cache.borrow().get(name) {
            return Ok(Rc::clone(text));
        }

        let text: Rc<str> = Rc::from(self.source.load(name)?);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&text));
        Ok(text)
    }

    /// Loads every named template up front, stopping at the first failure.
    pub fn preload(&self, names: &[&str]) -> TemplateResult<()> {
        for name in names {
            self.get_template(name)?;
        }
        Ok(())
    }

    /// Number of cached templates.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Looks up `name` and substitutes `values` into it.
    pub fn render_named(&self, name: &str, values: &TemplateValues<'_>) -> TemplateResult<String> {
        let template = self.get_template(name)?;
        Ok(render(&template, values))
    }
}

impl std::fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateStore")
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

/// Replaces each `{{ key }}` in `template` with its value; unknown keys render empty.
///
/// Values are inserted verbatim and never re-scanned for placeholders.
pub fn render(template: &str, values: &TemplateValues<'_>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}
