//! Store - Command history persistence
//!
//! This crate serializes commands to tagged records, captures and restores
//! whole command stacks, and reads and writes history files next to
//! documents.

mod error;
mod format;
mod history;
mod history_file;
mod serializer;
mod settings;

pub use error::*;
pub use format::*;
pub use history::*;
pub use history_file::*;
pub use serializer::*;
pub use settings::*;
