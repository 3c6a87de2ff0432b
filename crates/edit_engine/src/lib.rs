//! Edit Engine - Reversible commands and undo/redo
//!
//! This crate implements the command-based editing system: a closed set of
//! reversible edit commands against versioned documents, and the per-document
//! command stack that executes, undoes and redoes them.

mod command;
mod error;
mod format_commands;
mod notify;
mod object_commands;
mod text_commands;
mod undo;

pub use command::*;
pub use error::*;
pub use format_commands::*;
pub use notify::*;
pub use object_commands::*;
pub use text_commands::*;
pub use undo::*;
