//! Document Model - Styled content, embedded objects, and versioned files
//!
//! This crate provides the document side of the editor's command engine:
//! styled text with format spans and inline objects, a versioned file model,
//! and the version store that edit commands read from and write to.

mod attributes;
mod base64_bytes;
mod codec;
mod content;
mod error;
mod ids;
mod object;
mod store;
mod version;

pub use attributes::*;
pub use codec::*;
pub use content::*;
pub use error::*;
pub use ids::*;
pub use object::*;
pub use store::*;
pub use version::*;
