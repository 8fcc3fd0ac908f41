use std::ops::Range;

use tracing::{debug, warn};

use crate::command::{Command, Markup};
use crate::error::{EditError, EditResult};
use crate::link::LinkUrl;
use crate::selection::SelectionState;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub command: Command,
    pub selection: Option<SelectionState>,
    pub link: Option<String>,
}

impl CommandRequest {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            selection: None,
            link: None,
        }
    }

    pub fn with_selection(mut self, selection: SelectionState) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

/// A single splice applied to the buffer. `range` is in bytes of the
/// original buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub original: String,
    pub replacement: String,
}

impl TextEdit {
    /// Splices the replacement into `buffer`, which must be the buffer the
    /// range was computed against.
    pub fn apply(&self, buffer: &str) -> String {
        let mut rebuilt = String::with_capacity(
            buffer.len() - self.range.len() + self.replacement.len(),
        );
        rebuilt.push_str(&buffer[..self.range.start]);
        rebuilt.push_str(&self.replacement);
        rebuilt.push_str(&buffer[self.range.end..]);
        rebuilt
    }
}

#[derive(Debug)]
pub struct CommandOutcome {
    pub command: Command,
    pub changed: bool,
    pub edit: Option<TextEdit>,
    pub result: String,
}

/// Markup for `command` around `text`. Commands without markup return the
/// text unchanged.
pub fn wrap_template(command: Command, text: &str, link: Option<&LinkUrl>) -> EditResult<String> {
    Ok(match command.markup(link)? {
        Some(markup) => markup.wrap(text),
        None => text.to_string(),
    })
}

/// The empty markup pair appended when there is no selection.
pub fn outer_template(command: Command, link: Option<&LinkUrl>) -> EditResult<String> {
    Ok(command
        .markup(link)?
        .map(|markup| markup.empty_pair())
        .unwrap_or_default())
}

pub fn apply_command(buffer: &str, request: &CommandRequest) -> EditResult<CommandOutcome> {
    let command = request.command;
    let link = resolve_link(command, request.link.as_deref())?;

    let Some(markup) = command.markup(link.as_ref())? else {
        debug!(%command, "command has no markup; buffer untouched");
        return Ok(unchanged(command, buffer));
    };

    let selection = request.selection.as_ref().filter(|s| !s.is_empty());
    let edit = match selection {
        Some(selection) => wrap_selection(buffer, selection, &markup)?,
        None => append_outer(buffer, &markup),
    };

    let result = edit.apply(buffer);
    debug!(
        %command,
        start = edit.range.start,
        end = edit.range.end,
        inserted = edit.replacement.len(),
        "applied command"
    );

    Ok(CommandOutcome {
        command,
        changed: result != buffer,
        edit: Some(edit),
        result,
    })
}

fn resolve_link(command: Command, raw: Option<&str>) -> EditResult<Option<LinkUrl>> {
    if !command.requires_link() {
        return Ok(None);
    }

    let raw = raw.ok_or(EditError::MissingLink)?;
    LinkUrl::parse(raw).map(Some).inspect_err(|_| {
        warn!(link = raw, "rejected link with unsupported scheme");
    })
}

fn unchanged(command: Command, buffer: &str) -> CommandOutcome {
    CommandOutcome {
        command,
        changed: false,
        edit: None,
        result: buffer.to_string(),
    }
}

fn wrap_selection(
    buffer: &str,
    selection: &SelectionState,
    markup: &Markup,
) -> EditResult<TextEdit> {
    let range = selection.byte_range(buffer)?;
    Ok(TextEdit {
        original: buffer[range.clone()].to_string(),
        replacement: markup.wrap(&selection.text),
        range,
    })
}

fn append_outer(buffer: &str, markup: &Markup) -> TextEdit {
    TextEdit {
        range: buffer.len()..buffer.len(),
        original: String::new(),
        replacement: markup.empty_pair(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_without_selection_appends_pair() {
        let outcome = apply_command("hello", &CommandRequest::new(Command::Bold)).unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.result, "hello<strong></strong>");
    }

    #[test]
    fn edit_splices_inside_multibyte_text() {
        let buffer = "héllo wörld";
        let start = buffer.find('w').unwrap();
        let edit = TextEdit {
            range: start..buffer.len(),
            original: "wörld".into(),
            replacement: "<em>wörld</em>".into(),
        };
        assert_eq!(edit.apply(buffer), "héllo <em>wörld</em>");
    }

    #[test]
    fn link_ignored_for_other_commands() {
        let request = CommandRequest::new(Command::Italic).with_link("ftp://nope");
        let outcome = apply_command("", &request).unwrap();
        assert_eq!(outcome.result, "<em></em>");
    }
}
