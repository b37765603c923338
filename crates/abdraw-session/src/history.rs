//! Undo/redo manager over recorded commands.
//!
//! Each stack holds at most `capacity` commands. Executing past the limit
//! evicts the oldest undo entry, and executing anything clears redo.

use abdraw_core::Document;
use tracing::debug;

use crate::command::{Action, Command};
use crate::error::CommandError;

/// Default number of commands kept per stack
pub const DEFAULT_CAPACITY: usize = 50;

/// Manages undo/redo with reversible commands
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    /// Apply a command and record it for undo
    pub fn execute(&mut self, command: Command, doc: &mut Document) -> Result<Action, CommandError> {
        command.apply(doc)?;
        let action = command.action();
        self.undo_stack.push(command);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.capacity {
            self.undo_stack.remove(0);
        }
        debug!(%action, undo = self.undo_stack.len(), "command executed");
        Ok(action)
    }

    /// Revert the most recent command. `Ok(None)` when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> Result<Option<Action>, CommandError> {
        let Some(command) = self.undo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = command.inverse().apply(doc) {
            self.undo_stack.push(command);
            return Err(err);
        }
        let action = command.action();
        self.redo_stack.push(command);
        debug!(%action, redo = self.redo_stack.len(), "command undone");
        Ok(Some(action))
    }

    /// Re-apply the most recently undone command
    pub fn redo(&mut self, doc: &mut Document) -> Result<Option<Action>, CommandError> {
        let Some(command) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(err) = command.apply(doc) {
            self.redo_stack.push(command);
            return Err(err);
        }
        let action = command.action();
        self.undo_stack.push(command);
        debug!(%action, undo = self.undo_stack.len(), "command redone");
        Ok(Some(action))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of commands available to undo
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of commands available to redo
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Action the next undo would revert
    pub fn next_undo(&self) -> Option<Action> {
        self.undo_stack.last().map(Command::action)
    }

    /// Action the next redo would re-apply
    pub fn next_redo(&self) -> Option<Action> {
        self.redo_stack.last().map(Command::action)
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
