//! `content.json` export and import.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EditError, EditResult};
use crate::fs::write_atomic;

pub const EXPORT_FILE_NAME: &str = "content.json";

#[derive(Debug, Serialize, Deserialize)]
struct ExportedContent {
    content: String,
}

pub fn export_json(buffer: &str) -> EditResult<String> {
    let document = ExportedContent {
        content: buffer.to_string(),
    };
    serde_json::to_string(&document)
        .map_err(|err| EditError::InvalidContent(format!("failed to encode export: {err}")))
}

/// Extracts `content` from an exported document. Anything that is not a JSON
/// object with a string `content` field is rejected.
pub fn import_json(raw: &str) -> EditResult<String> {
    let document: ExportedContent =
        serde_json::from_str(raw).map_err(|err| EditError::MalformedImport(err.to_string()))?;
    Ok(document.content)
}

/// Writes `content.json` into `dir` and returns its path.
pub fn export_to_dir(dir: &Path, buffer: &str) -> EditResult<PathBuf> {
    let path = dir.join(EXPORT_FILE_NAME);
    write_atomic(&path, &export_json(buffer)?)?;
    Ok(path)
}

pub fn import_from_file(path: &Path) -> EditResult<String> {
    let raw = fs::read_to_string(path).map_err(|err| {
        EditError::MalformedImport(format!(
            "failed to read import file '{}': {err}",
            path.display()
        ))
    })?;
    import_json(&raw)
}
