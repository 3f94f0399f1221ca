//! Bounded undo/redo over whole-document snapshots.
//!
//! # Invariants
//! - Each stored snapshot is a consistent document (companions synced,
//!   numbers derived), so restoring one needs no repair pass.
//! - Recording a new state drops the redo stack.
//! - The undo stack never holds more than `capacity` entries; the oldest
//!   entry is evicted first.

use crate::document::Document;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<Document>,
    redo: Vec<Document>,
    capacity: usize,
}

impl History {
    /// Creates an empty history. A zero capacity keeps one entry.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Stores the state from before a successful mutation.
    pub fn record(&mut self, before: Document) {
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    /// Swaps `current` with the last recorded state. Returns `false` when empty.
    pub fn undo(&mut self, current: &mut Document) -> bool {
        let Some(previous) = self.undo.pop_back() else {
            return false;
        };
        self.redo.push(std::mem::replace(current, previous));
        true
    }

    /// Re-applies the last undone state. Returns `false` when empty.
    pub fn redo(&mut self, current: &mut Document) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        self.undo.push_back(std::mem::replace(current, next));
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
