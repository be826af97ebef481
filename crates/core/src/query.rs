//! Search query encoding, supplied per feed source.

/// Turns a user search query into the URL component a source expects.
pub trait QueryEncoder {
    fn encode(&self, query: &str) -> String;
}

/// Plain URI component encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQueryEncoder;

impl QueryEncoder for DefaultQueryEncoder {
    fn encode(&self, query: &str) -> String {
        urlencoding::encode(query).into_owned()
    }
}

/// Treats commas as alternatives: `a,b` searches for `a OR b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwitterQueryEncoder;

impl QueryEncoder for TwitterQueryEncoder {
    fn encode(&self, query: &str) -> String {
        let joined = query.split(',').collect::<Vec<_>>().join(" OR ");
        urlencoding::encode(&joined).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_encodes_components() {
        assert_eq!(DefaultQueryEncoder.encode("rust lang"), "rust%20lang");
        assert_eq!(DefaultQueryEncoder.encode("#rust,go"), "%23rust%2Cgo");
        assert_eq!(DefaultQueryEncoder.encode(""), "");
    }

    #[test]
    fn twitter_joins_terms_with_or() {
        assert_eq!(TwitterQueryEncoder.encode("rust,go"), "rust%20OR%20go");
        assert_eq!(TwitterQueryEncoder.encode("#rust"), "%23rust");
    }

    #[test]
    fn encoders_are_interchangeable() {
        let encoders: [&dyn QueryEncoder; 2] = [&DefaultQueryEncoder, &TwitterQueryEncoder];
        let encoded: Vec<String> = encoders.iter().map(|e| e.encode("a,b")).collect();
        assert_eq!(encoded, ["a%2Cb", "a%20OR%20b"]);
    }
}
