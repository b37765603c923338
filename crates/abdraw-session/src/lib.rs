//! Interactive editing for abDraw documents: reversible commands, a bounded
//! undo/redo history, and the gesture state machine that turns input events
//! into commands.

pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod history;
pub mod session;
mod tools;

pub use command::{Action, Command, ShapeEdit};
pub use config::{SessionConfig, Tool};
pub use error::CommandError;
pub use event::{InputEvent, Key, Modifiers};
pub use history::{DEFAULT_CAPACITY, History};
pub use session::{Outcome, Session, SessionState};
