use std::collections::HashMap;

use log::{debug, info};

use crate::buffer::Snapshot;

/// A committed edit: the content of one layer right after the edit
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub layer_index: usize,
    pub snapshot: Snapshot,
}

/// What the caller must write back into the layer set after undo/redo.
///
/// `snapshot == None` means the layer returns to its blank initial state.
#[derive(Debug, Clone, PartialEq)]
pub struct Restore {
    pub layer_index: usize,
    pub snapshot: Option<Snapshot>,
}

/// Linear undo/redo log of per-layer snapshots with a cursor.
///
/// Out-of-range undo/redo requests are no-ops returning `None`; spamming undo
/// at the start of history is ordinary traffic, not an error.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    /// Index of the currently applied entry, `None` before the first one
    cursor: Option<usize>,
    max_entries: Option<usize>,
    /// Content of evicted entries, per layer, so undo past the oldest kept
    /// entry still restores the right pixels
    baselines: HashMap<usize, Snapshot>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// A history that keeps at most `max_entries` entries (minimum 1)
    pub fn with_capacity_limit(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries.max(1)),
            ..Self::default()
        }
    }

    /// Record a committed edit, discarding any redoable entries first
    pub fn push(&mut self, layer_index: usize, snapshot: Snapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        if self.entries.len() > keep {
            debug!(
                "Discarding {} redoable history entries",
                self.entries.len() - keep
            );
            self.entries.truncate(keep);
        }

        self.entries.push(HistoryEntry {
            layer_index,
            snapshot,
        });

        if let Some(max) = self.max_entries {
            while self.entries.len() > max {
                let evicted = self.entries.remove(0);
                self.baselines.insert(evicted.layer_index, evicted.snapshot);
            }
        }

        self.cursor = Some(self.entries.len() - 1);
        debug!(
            "History push for layer {} (index {}, {} entries)",
            layer_index,
            self.history_index(),
            self.entries.len()
        );
    }

    /// Step back one entry. Returns the content the undone entry's layer had
    /// before that edit.
    pub fn undo(&mut self) -> Option<Restore> {
        let Some(current) = self.cursor else {
            debug!("Nothing to undo");
            return None;
        };

        let layer_index = self.entries[current].layer_index;
        self.cursor = current.checked_sub(1);
        Some(Restore {
            layer_index,
            snapshot: self.content_before(current, layer_index),
        })
    }

    /// Step forward one entry, returning that entry's content
    pub fn redo(&mut self) -> Option<Restore> {
        let next = self.cursor.map_or(0, |c| c + 1);
        let Some(entry) = self.entries.get(next) else {
            debug!("Nothing to redo");
            return None;
        };

        let restore = Restore {
            layer_index: entry.layer_index,
            snapshot: Some(entry.snapshot.clone()),
        };
        self.cursor = Some(next);
        Some(restore)
    }

    /// Drop the whole log
    pub fn reset(&mut self) {
        info!("History reset ({} entries dropped)", self.entries.len());
        self.entries.clear();
        self.baselines.clear();
        self.cursor = None;
    }

    /// Latest snapshot of `layer_index` strictly before entry `index`
    fn content_before(&self, index: usize, layer_index: usize) -> Option<Snapshot> {
        self.entries[..index]
            .iter()
            .rev()
            .find(|entry| entry.layer_index == layer_index)
            .map(|entry| entry.snapshot.clone())
            .or_else(|| self.baselines.get(&layer_index).cloned())
    }

    /// Cursor position, `-1` when no entry is applied
    pub fn history_index(&self) -> isize {
        self.cursor.map_or(-1, |c| c as isize)
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.map(|c| &self.entries[c])
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.map_or(0, |c| c + 1) < self.entries.len()
    }
}
