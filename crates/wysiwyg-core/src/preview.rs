//! Preview surface the buffer is mirrored into after every command.
//!
//! `PreviewMode::Raw` renders the buffer as-is, which means any markup typed
//! by the user is live in the preview. `PreviewMode::Escaped` shows the
//! markup as text instead.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum PreviewMode {
    #[default]
    Raw,
    Escaped,
}

impl PreviewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PreviewMode::Raw => "raw",
            PreviewMode::Escaped => "escaped",
        }
    }

    /// Produces the preview document for `buffer`. Surrounding whitespace is
    /// trimmed in both modes.
    pub fn render(self, buffer: &str) -> String {
        let trimmed = buffer.trim();
        match self {
            PreviewMode::Raw => trimmed.to_string(),
            PreviewMode::Escaped => escape_html(trimmed),
        }
    }
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreviewMode {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "raw" => Ok(PreviewMode::Raw),
            "escaped" => Ok(PreviewMode::Escaped),
            _ => Err(()),
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            _ => output.push(ch),
        }
    }
    output
}

/// Receives rendered preview documents.
pub trait PreviewSink {
    fn render(&mut self, html: &str);
}

/// Keeps the latest preview in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreview {
    html: String,
    renders: usize,
}

impl MemoryPreview {
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }
}

impl PreviewSink for MemoryPreview {
    fn render(&mut self, html: &str) {
        self.html.clear();
        self.html.push_str(html);
        self.renders += 1;
    }
}

/// Discards previews.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPreview;

impl PreviewSink for NullPreview {
    fn render(&mut self, _html: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_mode_keeps_markup() {
        assert_eq!(
            PreviewMode::Raw.render("  <b onclick=\"x\">hi</b>\n"),
            "<b onclick=\"x\">hi</b>"
        );
    }

    #[test]
    fn escaped_mode_neutralises_markup() {
        assert_eq!(
            PreviewMode::Escaped.render("<a href='x'>&</a>"),
            "&lt;a href=&#39;x&#39;&gt;&amp;&lt;/a&gt;"
        );
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("raw".parse::<PreviewMode>(), Ok(PreviewMode::Raw));
        assert_eq!("escaped".parse::<PreviewMode>(), Ok(PreviewMode::Escaped));
        assert!("sanitized".parse::<PreviewMode>().is_err());
    }
}
