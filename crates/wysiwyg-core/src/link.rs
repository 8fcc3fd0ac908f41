use std::sync::OnceLock;

use regex::Regex;

use crate::error::{EditError, EditResult};

/// Value the link prompt is pre-filled with.
pub const DEFAULT_LINK_PREFIX: &str = "https://";

const ALLOWED_SCHEMES: &str = r"^(file|http|https)://";

fn scheme_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ALLOWED_SCHEMES).expect("scheme pattern is valid"))
}

/// A link target accepted by the `link` command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkUrl(String);

impl LinkUrl {
    /// Accepts only `file://`, `http://` and `https://` targets. The value is
    /// otherwise inserted verbatim.
    pub fn parse(raw: &str) -> EditResult<Self> {
        if scheme_pattern().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(EditError::InvalidLinkUrl(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_schemes() {
        for raw in ["https://example.com", "http://a", "file:///tmp/x.html"] {
            assert_eq!(LinkUrl::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn rejects_other_schemes() {
        for raw in ["ftp://bad", "example.com", "", " https://x", "HTTPS://x"] {
            assert!(matches!(
                LinkUrl::parse(raw),
                Err(EditError::InvalidLinkUrl(_))
            ));
        }
    }

    #[test]
    fn bare_prefix_is_accepted() {
        assert!(LinkUrl::parse(DEFAULT_LINK_PREFIX).is_ok());
    }
}
