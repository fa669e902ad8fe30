//! Flag parsing primitive
//!
//! Flags are single or double dash words (`-name`, `--name`), taking their
//! value either inline (`-name=value`) or from the next argument (`-name value`).
//! Bool flags only accept the inline form. Parsing stops at the first
//! argument that is not a flag.

pub mod output;
pub mod set;
pub mod value;

pub use output::*;
pub use set::*;
pub use value::*;

use std::path::Path;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

/// A flag set shared between the caller registering flags and the parser
pub type SharedFlagSet = Arc<Mutex<FlagSet>>;

static COMMAND_LINE: LazyLock<Mutex<SharedFlagSet>> = LazyLock::new(|| {
    Mutex::new(Arc::new(Mutex::new(FlagSet::new(
        program(),
        ErrorPolicy::Exit,
    ))))
});

/// The process-wide default flag set
///
/// Used for the global flags of a root command created without a flag set.
pub fn command_line() -> SharedFlagSet {
    Arc::clone(&COMMAND_LINE.lock().unwrap_or_else(PoisonError::into_inner))
}

/// Swap the process-wide default flag set, returning the previous one
///
/// Meant for test harnesses that save and restore the default set.
pub fn set_command_line(fset: SharedFlagSet) -> SharedFlagSet {
    let mut current = COMMAND_LINE.lock().unwrap_or_else(PoisonError::into_inner);
    std::mem::replace(&mut *current, fset)
}

/// Name of the running program: the base name of argv[0] without `.exe`
pub fn program() -> String {
    let arg0 = std::env::args().next().unwrap_or_default();
    let base = match Path::new(&arg0).file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => arg0.clone(),
    };
    match base.strip_suffix(".exe") {
        Some(stripped) => stripped.to_string(),
        None => base,
    }
}
