use crate::command::Command;
use crate::error::EditResult;

/// Ordered set of buttons shown above the text surface.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Toolbar {
    buttons: Vec<Command>,
}

impl Default for Toolbar {
    fn default() -> Self {
        Self {
            buttons: Command::ALL.to_vec(),
        }
    }
}

impl Toolbar {
    pub fn new(buttons: Vec<Command>) -> Self {
        Self { buttons }
    }

    /// Builds a toolbar from configured button names. Any name that is not a
    /// known command fails the whole toolbar.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> EditResult<Self> {
        let buttons = names
            .iter()
            .map(|name| name.as_ref().parse::<Command>())
            .collect::<EditResult<Vec<_>>>()?;
        Ok(Self { buttons })
    }

    pub fn buttons(&self) -> &[Command] {
        &self.buttons
    }

    pub fn command_at(&self, index: usize) -> Option<Command> {
        self.buttons.get(index).copied()
    }

    pub fn contains(&self, command: Command) -> bool {
        self.buttons.contains(&command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;

    #[test]
    fn default_toolbar_lists_every_command() {
        let toolbar = Toolbar::default();
        assert_eq!(toolbar.buttons().len(), 13);
        assert_eq!(toolbar.command_at(0), Some(Command::Bold));
        assert_eq!(toolbar.command_at(12), Some(Command::ToggleSource));
        assert_eq!(toolbar.command_at(13), None);
    }

    #[test]
    fn from_names_fails_fast_on_unknown() {
        let err = Toolbar::from_names(&["bold", "underline", "italic"]).unwrap_err();
        assert!(matches!(err, EditError::UnknownCommand(name) if name == "underline"));
    }

    #[test]
    fn from_names_keeps_order() {
        let toolbar = Toolbar::from_names(&["link", "bold"]).unwrap();
        assert_eq!(toolbar.buttons(), &[Command::Link, Command::Bold]);
        assert!(!toolbar.contains(Command::Italic));
    }
}
