pub mod autosave;
pub mod command;
pub mod diff;
pub mod editor;
pub mod engine;
pub mod error;
pub mod export;
pub mod fs;
pub mod link;
pub mod payload;
pub mod preview;
pub mod selection;
pub mod store;
pub mod toolbar;

pub use autosave::{AutoSave, Clock, ManualClock, SystemClock, DEFAULT_SAVE_INTERVAL};
pub use command::{Command, Markup};
pub use editor::{Editor, EditorOptions, FixedLink, LinkPrompt, UNLOAD_WARNING};
pub use engine::{
    apply_command, outer_template, wrap_template, CommandOutcome, CommandRequest, TextEdit,
};
pub use error::{EditError, EditResult, ExitCode};
pub use link::{LinkUrl, DEFAULT_LINK_PREFIX};
pub use payload::BufferSource;
pub use preview::{MemoryPreview, NullPreview, PreviewMode, PreviewSink};
pub use selection::{SelectionState, SelectionTracker};
pub use store::{validate_key, ContentStore, FileStore, MemoryStore, DEFAULT_STORAGE_KEY};
pub use toolbar::Toolbar;
