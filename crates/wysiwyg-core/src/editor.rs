//! Editor session: owns the buffer and wires the command engine to the
//! selection tracker, toolbar, preview, storage and autosave schedule.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::autosave::{AutoSave, Clock, SystemClock, DEFAULT_SAVE_INTERVAL};
use crate::command::Command;
use crate::engine::{apply_command, CommandOutcome, CommandRequest};
use crate::error::{EditError, EditResult};
use crate::export::{export_json, export_to_dir, import_from_file, import_json};
use crate::link::DEFAULT_LINK_PREFIX;
use crate::preview::{PreviewMode, PreviewSink};
use crate::selection::{SelectionState, SelectionTracker};
use crate::store::{ContentStore, DEFAULT_STORAGE_KEY};
use crate::toolbar::Toolbar;

pub const UNLOAD_WARNING: &str =
    "You have unsaved changes. Are you sure you want to leave the page?";

/// Asks the user for a link target. `None` means the prompt was dismissed.
pub trait LinkPrompt {
    fn request_link(&mut self, default: &str) -> Option<String>;
}

/// Prompt that always answers with the same value.
#[derive(Clone, Debug, Default)]
pub struct FixedLink(pub Option<String>);

impl FixedLink {
    pub fn new(link: impl Into<String>) -> Self {
        Self(Some(link.into()))
    }
}

impl LinkPrompt for FixedLink {
    fn request_link(&mut self, _default: &str) -> Option<String> {
        self.0.clone()
    }
}

#[derive(Clone, Debug)]
pub struct EditorOptions {
    pub toolbar: Toolbar,
    pub storage_key: String,
    pub preview_mode: PreviewMode,
    pub autosave: bool,
    pub save_interval: Duration,
    pub link_default: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            toolbar: Toolbar::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            preview_mode: PreviewMode::Raw,
            autosave: true,
            save_interval: DEFAULT_SAVE_INTERVAL,
            link_default: DEFAULT_LINK_PREFIX.to_string(),
        }
    }
}

pub struct Editor<S, P> {
    buffer: String,
    selection: SelectionTracker,
    store: S,
    preview: P,
    prompt: Box<dyn LinkPrompt>,
    clock: Box<dyn Clock>,
    autosave: AutoSave,
    options: EditorOptions,
}

impl<S: ContentStore, P: PreviewSink> Editor<S, P> {
    /// Creates a session and restores any content persisted under the
    /// configured key.
    pub fn new(store: S, preview: P, options: EditorOptions) -> EditResult<Self> {
        let clock: Box<dyn Clock> = Box::new(SystemClock::default());
        let autosave = schedule_for(&options, clock.as_ref());

        let mut editor = Self {
            buffer: String::new(),
            selection: SelectionTracker::new(),
            store,
            preview,
            prompt: Box::new(FixedLink(None)),
            clock,
            autosave,
            options,
        };
        editor.load_from_store()?;
        editor.refresh_preview();
        Ok(editor)
    }

    /// Replaces the time source and restarts the autosave schedule from it.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self.autosave = schedule_for(&self.options, self.clock.as_ref());
        self
    }

    pub fn with_prompt(mut self, prompt: impl LinkPrompt + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn selection(&self) -> Option<&SelectionState> {
        self.selection.current()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.options.toolbar
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// The user edited the text directly.
    pub fn on_input(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.refresh_preview();
    }

    pub fn on_selection_changed(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.selection.on_selection_changed(start, end, text);
    }

    /// Selects `[start, end)` of the current buffer, in chars.
    pub fn select(&mut self, start: usize, end: usize) -> EditResult<()> {
        let selection = SelectionState::capture(&self.buffer, start, end)?;
        self.selection
            .on_selection_changed(selection.start, selection.end, selection.text);
        Ok(())
    }

    pub fn on_enter(&mut self) {
        self.selection.on_enter();
    }

    /// Runs the command bound to toolbar button `index`.
    pub fn activate(&mut self, index: usize) -> EditResult<CommandOutcome> {
        let command = self.options.toolbar.command_at(index).ok_or_else(|| {
            EditError::InvalidArguments(format!("no toolbar button at index {index}"))
        })?;
        self.execute(command)
    }

    /// Runs a command by name. Unknown names are ignored and leave the
    /// buffer and selection as they were.
    pub fn execute_named(&mut self, name: &str) -> EditResult<Option<CommandOutcome>> {
        match name.parse::<Command>() {
            Ok(command) => self.execute(command).map(Some),
            Err(EditError::UnknownCommand(name)) => {
                warn!(command = %name, "ignoring unknown command");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Runs `command`, asking the prompt for a URL when it needs one. A
    /// dismissed prompt aborts without touching the buffer.
    pub fn execute(&mut self, command: Command) -> EditResult<CommandOutcome> {
        let link = if command.requires_link() {
            match self.prompt.request_link(&self.options.link_default) {
                Some(link) => Some(link),
                None => {
                    debug!(%command, "link prompt dismissed");
                    self.selection.clear();
                    self.refresh_preview();
                    return Ok(CommandOutcome {
                        command,
                        changed: false,
                        edit: None,
                        result: self.buffer.clone(),
                    });
                }
            }
        } else {
            None
        };

        self.execute_with_link(command, link)
    }

    /// Runs `command` with an explicit link. The selection is cleared and the
    /// preview refreshed whether or not the command succeeds.
    pub fn execute_with_link(
        &mut self,
        command: Command,
        link: Option<String>,
    ) -> EditResult<CommandOutcome> {
        let request = CommandRequest {
            command,
            selection: self.selection.current().cloned(),
            link,
        };

        let outcome = apply_command(&self.buffer, &request);
        self.selection.clear();

        if let Ok(outcome) = &outcome {
            if outcome.changed {
                self.buffer.clone_from(&outcome.result);
            }
        }

        self.refresh_preview();
        outcome
    }

    /// Removes the last character of the buffer.
    pub fn undo(&mut self) -> Option<char> {
        self.buffer.pop()
    }

    pub fn refresh_preview(&mut self) {
        let html = self.options.preview_mode.render(&self.buffer);
        self.preview.render(&html);
    }

    /// Restores the persisted buffer. Returns whether anything was loaded; an
    /// empty stored value is ignored.
    pub fn load_from_store(&mut self) -> EditResult<bool> {
        match self.store.load(&self.options.storage_key)? {
            Some(content) if !content.is_empty() => {
                self.buffer = content;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn save_to_store(&mut self) -> EditResult<()> {
        self.store.save(&self.options.storage_key, &self.buffer)
    }

    /// Compares the buffer with what is persisted. Nothing persisted counts
    /// as an empty buffer.
    pub fn has_unsaved_changes(&self) -> EditResult<bool> {
        let saved = self.store.load(&self.options.storage_key)?;
        Ok(saved.as_deref().unwrap_or_default() != self.buffer)
    }

    /// Message to confirm before discarding unsaved changes, if any.
    ///
    /// An empty buffer with nothing persisted yet does not warn, so closing
    /// a session that was never typed into is silent. Any typed text warns
    /// until it has been saved.
    pub fn unload_warning(&self) -> EditResult<Option<&'static str>> {
        Ok(self.has_unsaved_changes()?.then_some(UNLOAD_WARNING))
    }

    /// Saves the buffer if the autosave interval has elapsed. Returns whether
    /// a save happened.
    pub fn tick(&mut self) -> EditResult<bool> {
        let now = self.clock.now();
        if !self.autosave.is_due(now) {
            return Ok(false);
        }

        self.save_to_store()?;
        self.autosave.mark_fired(now);
        info!(
            key = %self.options.storage_key,
            bytes = self.buffer.len(),
            "autosaved buffer"
        );
        Ok(true)
    }

    pub fn cancel_autosave(&mut self) {
        self.autosave.cancel();
    }

    pub fn autosave(&self) -> &AutoSave {
        &self.autosave
    }

    pub fn export_json(&self) -> EditResult<String> {
        export_json(&self.buffer)
    }

    pub fn export_to_dir(&self, dir: &Path) -> EditResult<PathBuf> {
        export_to_dir(dir, &self.buffer)
    }

    /// Replaces the buffer with the content of an exported document. The
    /// buffer is untouched when the document is malformed.
    pub fn import_json(&mut self, raw: &str) -> EditResult<()> {
        self.buffer = import_json(raw)?;
        self.refresh_preview();
        Ok(())
    }

    pub fn import_from_file(&mut self, path: &Path) -> EditResult<()> {
        self.buffer = import_from_file(path)?;
        self.refresh_preview();
        Ok(())
    }
}

fn schedule_for(options: &EditorOptions, clock: &dyn Clock) -> AutoSave {
    if options.autosave {
        AutoSave::start(options.save_interval, clock.now())
    } else {
        AutoSave::disabled(options.save_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::MemoryPreview;
    use crate::store::MemoryStore;

    fn editor_with(content: &str) -> Editor<MemoryStore, MemoryPreview> {
        let store = MemoryStore::new().with_entry(DEFAULT_STORAGE_KEY, content);
        Editor::new(store, MemoryPreview::default(), EditorOptions::default()).unwrap()
    }

    #[test]
    fn restores_persisted_content_on_start() {
        let editor = editor_with("<em>saved</em>");
        assert_eq!(editor.buffer(), "<em>saved</em>");
        assert_eq!(editor.preview().html(), "<em>saved</em>");
    }

    #[test]
    fn undo_removes_last_char_only() {
        let mut editor = editor_with("ab\u{e9}");
        assert_eq!(editor.undo(), Some('\u{e9}'));
        assert_eq!(editor.buffer(), "ab");
    }

    #[test]
    fn undo_on_empty_buffer_is_noop() {
        let mut editor = editor_with("");
        assert_eq!(editor.undo(), None);
        assert_eq!(editor.buffer(), "");
    }
}
