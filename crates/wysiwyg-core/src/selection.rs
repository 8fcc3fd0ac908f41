//! Selection state captured from the text surface.
//!
//! Offsets count chars, not bytes, so they stay meaningful for callers that
//! track positions in a widget rather than in UTF-8 storage.

use std::ops::Range;

use crate::error::{EditError, EditResult};

/// A highlighted range of the buffer together with its text.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectionState {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl SelectionState {
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Captures `[start, end)` of `buffer`, clamping nothing: out-of-range
    /// offsets are an error.
    pub fn capture(buffer: &str, start: usize, end: usize) -> EditResult<Self> {
        let range = char_range_to_bytes(buffer, start, end)
            .ok_or(EditError::StaleSelection { start, end })?;
        Ok(Self::new(start, end, &buffer[range]))
    }

    /// An empty range or empty text means no active selection.
    pub fn is_empty(&self) -> bool {
        self.start == self.end || self.text.is_empty()
    }

    /// Resolves the selection to a byte range of `buffer`, checking that the
    /// captured text still sits at the captured offsets.
    pub fn byte_range(&self, buffer: &str) -> EditResult<Range<usize>> {
        let stale = || EditError::StaleSelection {
            start: self.start,
            end: self.end,
        };

        let range = char_range_to_bytes(buffer, self.start, self.end).ok_or_else(stale)?;
        if buffer[range.clone()] != self.text {
            return Err(stale());
        }

        Ok(range)
    }
}

fn char_range_to_bytes(buffer: &str, start: usize, end: usize) -> Option<Range<usize>> {
    if start > end {
        return None;
    }

    let byte_start = char_to_byte(buffer, start)?;
    let byte_end = char_to_byte(buffer, end)?;
    Some(byte_start..byte_end)
}

fn char_to_byte(buffer: &str, offset: usize) -> Option<usize> {
    buffer
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(buffer.len()))
        .nth(offset)
}

/// Tracks the last known selection between input events.
#[derive(Clone, Debug, Default)]
pub struct SelectionTracker {
    current: Option<SelectionState>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_selection_changed(&mut self, start: usize, end: usize, text: impl Into<String>) {
        let selection = SelectionState::new(start, end, text);
        self.current = if selection.is_empty() {
            None
        } else {
            Some(selection)
        };
    }

    /// Enter invalidates the selection.
    pub fn on_enter(&mut self) {
        self.clear();
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&SelectionState> {
        self.current.as_ref()
    }
}
