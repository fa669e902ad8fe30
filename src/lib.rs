//! cmdflag - commands and subcommands on top of a small flag parser
//!
//! A program declares a tree of commands, each with its own flags, help text
//! and handler. Parsing consumes the global flags, then the first command and
//! its flags, then its subcommands, running every matched handler from the
//! top down.
//!
//! ```
//! use cmdflag::{handler, Application, Command, ErrorPolicy, FlagSet};
//!
//! let root = Command::new(Some(FlagSet::new("example", ErrorPolicy::Propagate)));
//! root.add(
//!     Application::new("split")
//!         .descr("splits a string around separators")
//!         .args("[sep ...]")
//!         .init(|fs| {
//!             let s = fs.string("s", "", "string to be split");
//!             handler(move |sep| {
//!                 let s = s.get();
//!                 let i = s.len() / 2;
//!                 println!("{} {:?} {}", &s[..i], sep, &s[i..]);
//!                 Ok(1)
//!             })
//!         }),
//! )
//! .unwrap();
//!
//! // ./program split -s hello & @
//! root.parse_from(["split", "-s", "hello", "&", "@"]).unwrap();
//! ```

// Public modules
pub mod command;
pub mod error;
pub mod flag;

// Re-export commonly used types
pub use command::{
    handler, noop, Application, BuildInfo, Command, Handler, Init, Module, FULL_VERSION_FLAG,
    HELP_COMMAND, VERSION_FLAG,
};
pub use error::{Error, FlagError, Result};
pub use flag::{Capture, ErrorPolicy, Flag, FlagSet, FlagType, Output, Value};

/// Current version of cmdflag
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
