//! Toolbar commands and the markup each one produces.

use std::fmt;
use std::str::FromStr;

use crate::error::{EditError, EditResult};
use crate::link::LinkUrl;

/// Supported toolbar commands, in default toolbar order.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Command {
    Bold,
    Italic,
    Strike,
    Color,
    FontSize,
    Link,
    IncreaseIndent,
    DecreaseIndent,
    AlignLeft,
    AlignRight,
    AlignCenter,
    AlignJustify,
    ToggleSource,
}

impl Command {
    pub const ALL: &'static [Command] = &[
        Command::Bold,
        Command::Italic,
        Command::Strike,
        Command::Color,
        Command::FontSize,
        Command::Link,
        Command::IncreaseIndent,
        Command::DecreaseIndent,
        Command::AlignLeft,
        Command::AlignRight,
        Command::AlignCenter,
        Command::AlignJustify,
        Command::ToggleSource,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Bold => "bold",
            Command::Italic => "italic",
            Command::Strike => "strike",
            Command::Color => "color",
            Command::FontSize => "fontSize",
            Command::Link => "link",
            Command::IncreaseIndent => "increaseIndent",
            Command::DecreaseIndent => "decreaseIndent",
            Command::AlignLeft => "alignLeft",
            Command::AlignRight => "alignRight",
            Command::AlignCenter => "alignCenter",
            Command::AlignJustify => "alignJustify",
            Command::ToggleSource => "toggleSource",
        }
    }

    pub fn requires_link(self) -> bool {
        matches!(self, Command::Link)
    }

    /// Markup pair for this command, or `None` for commands that only refresh
    /// the preview.
    pub fn markup(self, link: Option<&LinkUrl>) -> EditResult<Option<Markup>> {
        let open = match self {
            Command::Bold => "<strong>".to_string(),
            Command::Italic => "<em>".to_string(),
            Command::Strike => "<del>".to_string(),
            Command::Color => r#"<span style="color: ">"#.to_string(),
            Command::FontSize => r#"<span style="font-size: ">"#.to_string(),
            Command::Link => {
                let link = link.ok_or(EditError::MissingLink)?;
                format!(r#"<a href="{}">"#, link.as_str())
            }
            Command::IncreaseIndent => "<blockquote>".to_string(),
            Command::DecreaseIndent => r#"<div style="text-indent: -1em">"#.to_string(),
            Command::AlignLeft => align_open("left"),
            Command::AlignRight => align_open("right"),
            Command::AlignCenter => align_open("center"),
            Command::AlignJustify => align_open("justify"),
            Command::ToggleSource => return Ok(None),
        };

        let close = match self {
            Command::Bold => "</strong>",
            Command::Italic => "</em>",
            Command::Strike => "</del>",
            Command::Color | Command::FontSize => "</span>",
            Command::Link => "</a>",
            Command::IncreaseIndent => "</blockquote>",
            Command::DecreaseIndent
            | Command::AlignLeft
            | Command::AlignRight
            | Command::AlignCenter
            | Command::AlignJustify => "</div>",
            Command::ToggleSource => return Ok(None),
        };

        Ok(Some(Markup { open, close }))
    }
}

fn align_open(alignment: &str) -> String {
    format!(r#"<div style="text-align: {alignment}">"#)
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = EditError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .iter()
            .copied()
            .find(|command| command.as_str() == value)
            .ok_or_else(|| EditError::UnknownCommand(value.to_string()))
    }
}

/// Opening and closing tags produced by a command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Markup {
    pub open: String,
    pub close: &'static str,
}

impl Markup {
    /// Surrounds `inner` with the tag pair.
    pub fn wrap(&self, inner: &str) -> String {
        let mut output = String::with_capacity(self.open.len() + inner.len() + self.close.len());
        output.push_str(&self.open);
        output.push_str(inner);
        output.push_str(self.close);
        output
    }

    /// The empty tag pair appended when nothing is selected.
    pub fn empty_pair(&self) -> String {
        self.wrap("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back_to_the_same_command() {
        for command in Command::ALL {
            assert_eq!(command.as_str().parse::<Command>().unwrap(), *command);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "foo".parse::<Command>().unwrap_err();
        assert!(matches!(err, EditError::UnknownCommand(name) if name == "foo"));
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!("Bold".parse::<Command>().is_err());
        assert!("fontsize".parse::<Command>().is_err());
    }

    #[test]
    fn toggle_source_has_no_markup() {
        assert!(Command::ToggleSource.markup(None).unwrap().is_none());
    }

    #[test]
    fn link_markup_requires_url() {
        let err = Command::Link.markup(None).unwrap_err();
        assert!(matches!(err, EditError::MissingLink));
    }

    #[test]
    fn alignment_markup_uses_direction() {
        let markup = Command::AlignJustify.markup(None).unwrap().unwrap();
        assert_eq!(
            markup.wrap("x"),
            r#"<div style="text-align: justify">x</div>"#
        );
    }
}
