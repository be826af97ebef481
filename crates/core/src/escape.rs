/// Escapes the characters that carry meaning in HTML text and attribute values.
///
/// | char | entity   |
/// |------|----------|
/// | `&`  | `&amp;`  |
/// | `"`  | `&quot;` |
/// | `<`  | `&lt;`   |
/// | `>`  | `&gt;`   |
/// | `'`  | `&#39;`  |
///
/// Returns the input unchanged (single copy) when nothing needs escaping.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut start = 0;

    for (index, byte) in s.bytes().enumerate() {
        let replacement = match byte {
            b'&' => "&amp;",
            b'"' => "&quot;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'\'' => "&#39;",
            _ => continue,
        };

        result.push_str(&s[start..index]);
        result.push_str(replacement);
        start = index + 1;
    }

    if start == 0 {
        return s.to_string();
    }

    result.push_str(&s[start..]);
    result
}

/// Percent-encodes the characters that would terminate or break out of a
/// double-quoted `href` value. Everything else is left for the source to have
/// encoded already.
pub fn href_safe(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            '"' => out.push_str("%22"),
            '<' => out.push_str("%3C"),
            '>' => out.push_str("%3E"),
            _ => out.push(ch),
        }
    }
    out
}

/// Rewrites a leading insecure `http:` scheme to `https:`.
pub fn secure_url(url: &str) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{rest}"),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_html("&<>\"'"), "&amp;&lt;&gt;&quot;&#39;");
        assert_eq!(
            escape_html("<script>alert('x')</script>"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"
        );
    }

    #[test]
    fn leaves_plain_and_unicode_text() {
        assert_eq!(escape_html("Jane Doe 🚀 日本語"), "Jane Doe 🚀 日本語");
        assert_eq!(escape_html(""), "");
        assert_eq!(escape_html("Tom & Jerry"), "Tom &amp; Jerry");
    }

    #[test]
    fn href_safe_only_touches_breaking_chars() {
        assert_eq!(href_safe("https://x.com/a?b=1&c=2"), "https://x.com/a?b=1&c=2");
        assert_eq!(href_safe("#a\"onmouseover"), "#a%22onmouseover");
        assert_eq!(href_safe("<b>"), "%3Cb%3E");
    }

    #[test]
    fn upgrades_insecure_scheme_only() {
        assert_eq!(secure_url("http://x.com/a.png"), "https://x.com/a.png");
        assert_eq!(secure_url("https://x.com/a.png"), "https://x.com/a.png");
        assert_eq!(secure_url("//x.com/http:a.png"), "//x.com/http:a.png");
        assert_eq!(secure_url(""), "");
    }
}
