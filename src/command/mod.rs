mod history;

pub use history::{HistoryEntry, HistoryManager, Restore};

/// Session-level requests a view layer can raise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Undo,
    Redo,
    Reset,
}

/// One-shot request flags, one per [`Command`].
///
/// Raising a flag that is already raised does nothing, so a burst of requests
/// collapses into a single pending action per kind until the next drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandFlags {
    pub undo: bool,
    pub redo: bool,
    pub reset: bool,
}

impl CommandFlags {
    pub fn request(&mut self, command: Command) {
        *self.flag_mut(command) = true;
    }

    pub fn is_pending(&self, command: Command) -> bool {
        match command {
            Command::Undo => self.undo,
            Command::Redo => self.redo,
            Command::Reset => self.reset,
        }
    }

    pub fn any(&self) -> bool {
        self.undo || self.redo || self.reset
    }

    /// Clear every flag and return the commands that were raised.
    ///
    /// A pending reset supersedes undo and redo raised in the same cycle.
    pub fn drain(&mut self) -> Vec<Command> {
        let pending = std::mem::take(self);
        if pending.reset {
            return vec![Command::Reset];
        }
        [(pending.undo, Command::Undo), (pending.redo, Command::Redo)]
            .into_iter()
            .filter_map(|(raised, command)| raised.then_some(command))
            .collect()
    }

    fn flag_mut(&mut self, command: Command) -> &mut bool {
        match command {
            Command::Undo => &mut self.undo,
            Command::Redo => &mut self.redo,
            Command::Reset => &mut self.reset,
        }
    }
}
