//! Error types for command application.

use abdraw_core::DocumentError;
use thiserror::Error;

/// A command that could not be applied to the document it was given.
///
/// The session only builds commands against its own document, so this is
/// reachable through direct use of [`crate::Command`] or [`crate::History`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("command does not fit the document: {0}")]
    Document(#[from] DocumentError),
}
