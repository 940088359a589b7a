//! Undo/redo history
//!
//! A bounded linear history with a cursor. Executing a command while the cursor
//! is behind the newest entry discards the redo branch. When the capacity is
//! exceeded the oldest entry is evicted and the cursor moves with it.

use std::collections::VecDeque;

use crate::grid::{Grid, RenderEvent};
use crate::models::{GridPos, Item};

/// Default number of commands kept.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// The before/after state of one cell. `None` means empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub pos: GridPos,
    pub before: Option<Item>,
    pub after: Option<Item>,
}

/// One undoable edit: the primary cell plus any mirrored cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    changes: Vec<CellChange>,
}

impl Command {
    /// A single-cell command.
    pub fn new(pos: GridPos, after: Option<Item>, before: Option<Item>) -> Self {
        Self { changes: vec![CellChange { pos, before, after }] }
    }

    /// Add another cell to the same undo step.
    pub fn push(&mut self, change: CellChange) {
        self.changes.push(change);
    }

    /// The cell the user acted on.
    pub fn pos(&self) -> GridPos {
        self.changes[0].pos
    }

    pub fn changes(&self) -> &[CellChange] {
        &self.changes
    }

    /// Write every `after` state. Stored items are already fully resolved.
    pub fn execute(&self, grid: &mut Grid, events: &mut Vec<RenderEvent>) {
        for change in &self.changes {
            events.extend(grid.apply(change.pos, change.after.as_ref()));
        }
    }

    /// Restore every `before` state, newest change first.
    pub fn undo(&self, grid: &mut Grid, events: &mut Vec<RenderEvent>) {
        for change in self.changes.iter().rev() {
            events.extend(grid.apply(change.pos, change.before.as_ref()));
        }
    }
}

/// Bounded command history.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Command>,
    /// Number of executed entries; the cursor index is `applied - 1`
    applied: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::new(), applied: 0, capacity: capacity.max(1) }
    }

    /// Run a new command and make it the newest entry.
    pub fn execute(&mut self, command: Command, grid: &mut Grid, events: &mut Vec<RenderEvent>) {
        if self.applied < self.entries.len() {
            let discarded = self.entries.len() - self.applied;
            self.entries.truncate(self.applied);
            tracing::debug!(discarded, "redo branch discarded");
        }

        command.execute(grid, events);
        self.entries.push_back(command);
        self.applied += 1;

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.applied -= 1;
            tracing::debug!(capacity = self.capacity, "oldest history entry evicted");
        }
    }

    /// Undo the entry under the cursor. Returns false when there is nothing to undo.
    pub fn undo(&mut self, grid: &mut Grid, events: &mut Vec<RenderEvent>) -> bool {
        if self.applied == 0 {
            return false;
        }
        self.applied -= 1;
        self.entries[self.applied].undo(grid, events);
        true
    }

    /// Re-run the entry after the cursor. Returns false when there is nothing to redo.
    pub fn redo(&mut self, grid: &mut Grid, events: &mut Vec<RenderEvent>) -> bool {
        if self.applied >= self.entries.len() {
            return false;
        }
        self.entries[self.applied].execute(grid, events);
        self.applied += 1;
        true
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Cursor position: index of the last executed entry, -1 when none.
    pub fn index(&self) -> isize {
        self.applied as isize - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
    }
}
