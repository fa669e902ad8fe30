//! Command tree and its resolution
//!
//! Commands are registered on a root [`Command`], possibly nested, then the
//! command line is resolved with [`Command::parse`].

pub mod help;
pub mod resolve;
pub mod tree;
pub mod usage;
pub mod version;

// Re-export main types
pub use help::*;
pub use tree::*;
pub use version::*;
