//! Hyperlink annotation of plain text.
//!
//! Every match of a pattern becomes an anchor. Tokens are handled from the
//! last match to the first, and each one is rewritten by four boundary passes
//! over the evolving text:
//!
//! 1. delimiter, token, delimiter
//! 2. delimiter, token, end of text
//! 3. start of text, token, delimiter
//! 4. the token alone
//!
//! A token is only ever replaced where it is flanked by a delimiter or a text
//! edge. Markup inserted by an earlier token (or an earlier pattern) flanks its
//! tokens with `"`, `/`, `>` or `<`, none of which is a delimiter, so it is
//! never annotated twice.

pub use regex::Regex;
use regex::{Captures, RegexBuilder};
use std::sync::LazyLock;
use tracing::warn;

use crate::escape::href_safe;

/// Characters that may border an annotated token.
const DELIMITERS: &str = r"([ \[\]\s\-:?.,;!])";

/// `#tag` tokens.
pub static HASHTAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)#[^\s?)#@:!…]+").expect("hashtag pattern is valid")
});

/// `@name` tokens.
pub static MENTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)@[^\s?)#@:!…]+").expect("mention pattern is valid")
});

/// Options that shape generated anchors and per-token regexes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Adds an `onclick` that forces a new browsing context. Off inside mobile app shells.
    pub intercept_clicks: bool,
    /// Compiled size limit for the boundary regexes built from each token.
    pub size_limit: Option<usize>,
}

impl AnnotateOptions {
    /// Builds the anchor for `token`.
    ///
    /// With an empty `link_prefix` the token is itself the href. Otherwise the
    /// leading sigil is dropped and the rest is appended to the prefix.
    pub fn anchor(&self, link_prefix: &str, token: &str) -> String {
        let path = if link_prefix.is_empty() {
            token
        } else {
            strip_sigil(token)
        };
        let onclick = if self.intercept_clicks {
            r#" onclick="window.open(this.href);return false""#
        } else {
            ""
        };

        format!(
            r#"<a href="{}{}" rel="external noopener"{} target="_blank">{}</a>"#,
            link_prefix,
            href_safe(path),
            onclick,
            token
        )
    }
}

fn strip_sigil(token: &str) -> &str {
    let mut chars = token.chars();
    chars.next();
    chars.as_str()
}

/// A pattern and the href prefix its matches link to.
#[derive(Debug, Clone)]
pub struct AnnotationPattern {
    pattern: Regex,
    link_prefix: String,
}

impl AnnotationPattern {
    pub fn new(pattern: Regex, link_prefix: impl Into<String>) -> Self {
        Self {
            pattern,
            link_prefix: link_prefix.into(),
        }
    }

    /// Matches are complete URLs and link to themselves.
    pub fn links(pattern: Regex) -> Self {
        Self::new(pattern, "")
    }

    pub fn hashtags(base: impl Into<String>) -> Self {
        Self::new(HASHTAG_PATTERN.clone(), base)
    }

    pub fn mentions(base: impl Into<String>) -> Self {
        Self::new(MENTION_PATTERN.clone(), base)
    }

    pub fn apply(&self, text: &str, options: &AnnotateOptions) -> String {
        annotate(text, &self.link_prefix, &self.pattern, options)
    }
}

/// Applies each pattern in order over the evolving text.
pub fn annotate_all(text: &str, patterns: &[AnnotationPattern], options: &AnnotateOptions) -> String {
    patterns
        .iter()
        .fold(text.to_string(), |text, pattern| pattern.apply(&text, options))
}

/// Wraps every boundary-delimited occurrence of each `pattern` match in an anchor.
///
/// A token whose boundary regexes cannot be built is logged and left as is;
/// the remaining tokens are still processed.
pub fn annotate(text: &str, link_prefix: &str, pattern: &Regex, options: &AnnotateOptions) -> String {
    let tokens: Vec<&str> = pattern
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| !token.is_empty())
        .collect();

    let mut output = text.to_string();
    for token in tokens.into_iter().rev() {
        let link = options.anchor(link_prefix, token);
        match BoundedToken::compile(token, options.size_limit) {
            Ok(bounded) => output = bounded.replace(&output, &link),
            Err(err) => warn!(token, error = %err, "skipping annotation for token"),
        }
    }

    output
}

#[derive(Debug, Clone, Copy)]
enum Boundary {
    Both,
    LeftAndEnd,
    StartAndRight,
    Whole,
}

impl Boundary {
    const ORDER: [Boundary; 4] = [
        Boundary::Both,
        Boundary::LeftAndEnd,
        Boundary::StartAndRight,
        Boundary::Whole,
    ];

    fn pattern(self, escaped: &str) -> String {
        match self {
            Boundary::Both => format!("{DELIMITERS}{escaped}{DELIMITERS}"),
            Boundary::LeftAndEnd => format!("{DELIMITERS}{escaped}$"),
            Boundary::StartAndRight => format!("^{escaped}{DELIMITERS}"),
            Boundary::Whole => format!("^{escaped}$"),
        }
    }

    fn splice(self, caps: &Captures<'_>, link: &str) -> String {
        let group = |index: usize| caps.get(index).map_or("", |m| m.as_str());
        match self {
            Boundary::Both => format!("{}{link}{}", group(1), group(2)),
            Boundary::LeftAndEnd => format!("{}{link}", group(1)),
            Boundary::StartAndRight => format!("{link}{}", group(1)),
            Boundary::Whole => link.to_string(),
        }
    }
}

/// The four boundary regexes for one token, compiled together so a failure
/// leaves the text untouched.
struct BoundedToken {
    passes: Vec<(Boundary, Regex)>,
}

impl BoundedToken {
    fn compile(token: &str, size_limit: Option<usize>) -> Result<Self, regex::Error> {
        let escaped = regex::escape(token);
        let passes = Boundary::ORDER
            .iter()
            .map(|&boundary| {
                let mut builder = RegexBuilder::new(&boundary.pattern(&escaped));
                builder.case_insensitive(true).multi_line(true);
                if let Some(limit) = size_limit {
                    builder.size_limit(limit);
                }
                builder.build().map(|regex| (boundary, regex))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { passes })
    }

    fn replace(&self, text: &str, link: &str) -> String {
        self.passes
            .iter()
            .fold(text.to_string(), |text, (boundary, regex)| {
                regex
                    .replace_all(&text, |caps: &Captures<'_>| boundary.splice(caps, link))
                    .into_owned()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HASHTAG_BASE: &str = "https://twitter.com/hashtag/";
    const PROFILE_BASE: &str = "https://twitter.com/";

    fn plain() -> AnnotateOptions {
        AnnotateOptions::default()
    }

    fn link_pattern() -> Regex {
        Regex::new(r"(?im)https?://t\.co/\w+").unwrap()
    }

    fn tag(name: &str) -> String {
        plain().anchor(HASHTAG_BASE, &format!("#{name}"))
    }

    #[test]
    fn builds_anchor_without_sigil() {
        assert_eq!(
            plain().anchor(HASHTAG_BASE, "#rust"),
            r#"<a href="https://twitter.com/hashtag/rust" rel="external noopener" target="_blank">#rust</a>"#
        );
        assert_eq!(
            plain().anchor("", "https://t.co/abc"),
            r#"<a href="https://t.co/abc" rel="external noopener" target="_blank">https://t.co/abc</a>"#
        );
    }

    #[test]
    fn intercepts_clicks_outside_mobile_apps() {
        let options = AnnotateOptions {
            intercept_clicks: true,
            ..AnnotateOptions::default()
        };
        let anchor = options.anchor(PROFILE_BASE, "@ada");
        assert!(anchor.contains(r#"href="https://twitter.com/ada""#));
        assert!(anchor.contains(r#" onclick="window.open(this.href);return false""#));
    }

    #[test]
    fn covers_all_four_boundaries() {
        let hashtags = AnnotationPattern::hashtags(HASHTAG_BASE);
        let link = tag("a");

        assert_eq!(hashtags.apply("#a", &plain()), link);
        assert_eq!(hashtags.apply("#a end", &plain()), format!("{link} end"));
        assert_eq!(hashtags.apply("see #a", &plain()), format!("see {link}"));
        assert_eq!(
            hashtags.apply("see:#a! now", &plain()),
            format!("see:{link}! now")
        );
    }

    #[test]
    fn keeps_adjacent_punctuation() {
        let mentions = AnnotationPattern::mentions(PROFILE_BASE);
        let output = mentions.apply("thanks @ada! and @bob?", &plain());

        assert_eq!(
            output,
            format!(
                "thanks {}! and {}?",
                plain().anchor(PROFILE_BASE, "@ada"),
                plain().anchor(PROFILE_BASE, "@bob")
            )
        );
    }

    #[test]
    fn wraps_repeated_tokens_exactly_once() {
        let hashtags = AnnotationPattern::hashtags(HASHTAG_BASE);
        let output = hashtags.apply("#a #a #a", &plain());
        let link = tag("a");

        assert_eq!(output, format!("{link} {link} {link}"));
        assert_eq!(output.matches("<a ").count(), 3);
        assert_eq!(output.matches("</a>").count(), 3);
    }

    #[test]
    fn leaves_embedded_tokens_alone() {
        let mentions = AnnotationPattern::mentions(PROFILE_BASE);
        let output = mentions.apply("mail me at ada@example.com", &plain());
        assert_eq!(output, "mail me at ada@example.com");
    }

    #[test]
    fn matches_case_insensitively() {
        let pattern = Regex::new("(?i)#rust").unwrap();
        let output = annotate("#rust and #RUST", HASHTAG_BASE, &pattern, &plain());
        let link = plain().anchor(HASHTAG_BASE, "#RUST");
        assert_eq!(output, format!("{link} and {link}"));
    }

    #[test]
    fn escapes_regex_metacharacters_in_tokens() {
        let pattern = Regex::new(r"#[^\s]+").unwrap();
        let output = annotate("go #c++ and #a.b* (#x?)", HASHTAG_BASE, &pattern, &plain());

        assert!(output.contains(&plain().anchor(HASHTAG_BASE, "#c++")));
        assert!(output.contains(&plain().anchor(HASHTAG_BASE, "#a.b*")));
        assert!(!output.contains("<a href=\"https://twitter.com/hashtag/x?)\""));
    }

    #[test]
    fn keeps_dollar_signs_in_links() {
        let pattern = Regex::new(r"\$[A-Z]+").unwrap();
        let output = annotate("buy $ABC now", "https://x.com/cashtag/", &pattern, &plain());
        assert_eq!(
            output,
            format!("buy {} now", plain().anchor("https://x.com/cashtag/", "$ABC"))
        );
    }

    #[test]
    fn percent_encodes_quotes_in_href() {
        let hashtags = AnnotationPattern::hashtags(HASHTAG_BASE);
        let output = hashtags.apply(r#"#a"b"#, &plain());
        assert!(output.contains(r#"href="https://twitter.com/hashtag/a%22b""#));
    }

    #[test]
    fn construction_failure_skips_only_that_token() {
        let options = AnnotateOptions {
            size_limit: Some(1),
            ..AnnotateOptions::default()
        };
        let hashtags = AnnotationPattern::hashtags(HASHTAG_BASE);
        assert_eq!(hashtags.apply("#a and #b", &options), "#a and #b");
    }

    #[test]
    fn text_without_matches_is_unchanged() {
        let hashtags = AnnotationPattern::hashtags(HASHTAG_BASE);
        assert_eq!(hashtags.apply("nothing to see", &plain()), "nothing to see");
        assert_eq!(hashtags.apply("", &plain()), "");
    }

    #[test]
    fn multiline_text_uses_line_edges() {
        let hashtags = AnnotationPattern::hashtags(HASHTAG_BASE);
        let output = hashtags.apply("first\n#a\nlast", &plain());
        assert_eq!(output, format!("first\n{}\nlast", tag("a")));
    }

    #[test]
    fn chained_passes_do_not_reannotate_markup() {
        let patterns = [
            AnnotationPattern::links(link_pattern()),
            AnnotationPattern::hashtags(HASHTAG_BASE),
            AnnotationPattern::mentions(PROFILE_BASE),
        ];
        let output = annotate_all(
            "@ada loves #rust https://t.co/Xy12 #rust",
            &patterns,
            &plain(),
        );

        assert_eq!(
            output,
            format!(
                "{} loves {} {} {}",
                plain().anchor(PROFILE_BASE, "@ada"),
                tag("rust"),
                plain().anchor("", "https://t.co/Xy12"),
                tag("rust"),
            )
        );
        assert_eq!(output.matches("<a ").count(), 4);
    }

    #[test]
    fn mention_pass_skips_tokens_inside_earlier_anchors() {
        let hashtags = AnnotationPattern::hashtags(HASHTAG_BASE);
        let mentions = AnnotationPattern::mentions(PROFILE_BASE);
        let tagged = hashtags.apply("#ada @ada", &plain());
        let output = mentions.apply(&tagged, &plain());

        assert_eq!(
            output,
            format!("{} {}", tag("ada"), plain().anchor(PROFILE_BASE, "@ada"))
        );
    }
}
