//! Text typed into the editor from outside a session (`wysiwyg set`).
//!
//! Whatever the origin, the result looks like a textarea value: line breaks
//! are `\n` only and a leading byte-order mark is dropped.

use std::io::{self, Read};
use std::path::PathBuf;

use crate::error::{EditError, EditResult};

/// Where replacement buffer text comes from.
#[derive(Debug, Clone)]
pub enum BufferSource {
    File(PathBuf),
    Stdin,
    /// Command-line text with `\n`, `\t`, `\\` and `\"` escapes.
    Inline(String),
}

impl BufferSource {
    pub fn read(&self) -> EditResult<String> {
        let text = match self {
            BufferSource::File(path) => std::fs::read_to_string(path).map_err(|err| {
                EditError::InvalidContent(format!("cannot read '{}': {err}", path.display()))
            })?,
            BufferSource::Stdin => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .map_err(|err| EditError::InvalidContent(format!("cannot read stdin: {err}")))?;
                text
            }
            BufferSource::Inline(raw) => unescape_inline(raw)?,
        };
        Ok(as_textarea_value(&text))
    }
}

/// Drops a leading BOM and folds `\r\n` and lone `\r` into `\n`.
pub fn as_textarea_value(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if !text.contains('\r') {
        return text.to_string();
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn unescape_inline(raw: &str) -> EditResult<String> {
    let mut pieces = raw.split('\\');
    let mut output = String::with_capacity(raw.len());
    output.push_str(pieces.next().unwrap_or_default());

    let mut escaped_backslash = false;
    while let Some(piece) = pieces.next() {
        if escaped_backslash {
            // The previous piece ended in `\\`; this piece is plain text.
            escaped_backslash = false;
            output.push_str(piece);
            continue;
        }
        let mut chars = piece.chars();
        match chars.next() {
            Some('n') => output.push('\n'),
            Some('t') => output.push('\t'),
            Some('"') => output.push('"'),
            Some(other) => {
                return Err(EditError::InvalidContent(format!(
                    "unsupported escape sequence: \\{other}"
                )))
            }
            // `\\` splits into an empty piece.
            None if pieces.clone().next().is_some() => {
                output.push('\\');
                escaped_backslash = true;
                continue;
            }
            None => {
                return Err(EditError::InvalidContent(
                    "text ends with a lone backslash".to_string(),
                ))
            }
        }
        output.push_str(chars.as_str());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_inline_escapes() {
        let parsed = unescape_inline("<p>a</p>\\n<p class=\\\"x\\\">b</p>").unwrap();
        assert_eq!(parsed, "<p>a</p>\n<p class=\"x\">b</p>");
    }

    #[test]
    fn doubled_backslash_is_literal() {
        assert_eq!(unescape_inline("a\\\\nb").unwrap(), "a\\nb");
        assert_eq!(unescape_inline("\\\\\\t").unwrap(), "\\\t");
    }

    #[test]
    fn rejects_trailing_backslash() {
        let err = unescape_inline("oops\\").unwrap_err();
        assert!(matches!(err, EditError::InvalidContent(_)));
    }

    #[test]
    fn rejects_unknown_escape() {
        assert!(unescape_inline("a\\rb").is_err());
    }

    #[test]
    fn file_text_is_normalised_like_a_textarea() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.html");
        std::fs::write(&path, "\u{feff}<p>a</p>\r\n<p>b</p>\r").unwrap();

        let text = BufferSource::File(path).read().unwrap();
        assert_eq!(text, "<p>a</p>\n<p>b</p>\n");
    }

    #[test]
    fn missing_file_is_invalid_content() {
        let err = BufferSource::File(PathBuf::from("/nonexistent/draft.html"))
            .read()
            .unwrap_err();
        assert!(matches!(err, EditError::InvalidContent(_)));
    }
}
