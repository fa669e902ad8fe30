//! Flag values
//!
//! A flag is bound to a shared [`Flag`] handle: the flag set writes into it
//! while parsing and the owner reads it back once parsing is done.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A value that can be set from the command line
pub trait Value: Send {
    /// Set the value from its textual form
    fn set(&mut self, raw: &str) -> Result<(), String>;

    /// Current value in textual form
    fn get(&self) -> String;

    /// Bool flags are set by their mere presence (`-name`)
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// The current value if this is a bool flag
    fn as_bool(&self) -> Option<bool> {
        None
    }

    /// Type name shown next to the flag in the defaults listing
    fn type_name(&self) -> &'static str {
        "value"
    }

    /// Whether `default` is the zero value, which is left out of the defaults listing
    fn is_zero(&self, default: &str) -> bool {
        default.is_empty()
    }

    /// Whether the default is shown quoted
    fn quote_default(&self) -> bool {
        false
    }
}

/// Primitive types that can back a [`Flag`]
pub trait FlagType: Clone + Default + Send + 'static {
    /// Name shown in usage, empty for bool flags
    const TYPE_NAME: &'static str;
    const IS_BOOL: bool = false;
    const QUOTED: bool = false;

    fn parse_flag(raw: &str) -> Result<Self, String>;

    fn format_flag(&self) -> String;

    fn as_bool(&self) -> Option<bool> {
        None
    }
}

impl FlagType for bool {
    const TYPE_NAME: &'static str = "";
    const IS_BOOL: bool = true;

    fn parse_flag(raw: &str) -> Result<Self, String> {
        match raw {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err("parse error".to_string()),
        }
    }

    fn format_flag(&self) -> String {
        self.to_string()
    }

    fn as_bool(&self) -> Option<bool> {
        Some(*self)
    }
}

impl FlagType for String {
    const TYPE_NAME: &'static str = "string";
    const QUOTED: bool = true;

    fn parse_flag(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn format_flag(&self) -> String {
        self.clone()
    }
}

impl FlagType for i64 {
    const TYPE_NAME: &'static str = "int";

    fn parse_flag(raw: &str) -> Result<Self, String> {
        raw.parse().map_err(|e: std::num::ParseIntError| e.to_string())
    }

    fn format_flag(&self) -> String {
        self.to_string()
    }
}

impl FlagType for u64 {
    const TYPE_NAME: &'static str = "uint";

    fn parse_flag(raw: &str) -> Result<Self, String> {
        raw.parse().map_err(|e: std::num::ParseIntError| e.to_string())
    }

    fn format_flag(&self) -> String {
        self.to_string()
    }
}

impl FlagType for f64 {
    const TYPE_NAME: &'static str = "float";

    fn parse_flag(raw: &str) -> Result<Self, String> {
        raw.parse().map_err(|e: std::num::ParseFloatError| e.to_string())
    }

    fn format_flag(&self) -> String {
        self.to_string()
    }
}

/// Shared handle to a flag's value
pub struct Flag<T>(Arc<Mutex<T>>);

impl<T> Flag<T> {
    pub fn new(value: T) -> Self {
        Flag(Arc::new(Mutex::new(value)))
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite the current value
    pub fn set(&self, value: T) {
        *self.lock() = value;
    }
}

impl<T: Clone> Flag<T> {
    /// Current value
    pub fn get(&self) -> T {
        self.lock().clone()
    }
}

impl<T> Clone for Flag<T> {
    fn clone(&self) -> Self {
        Flag(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Flag<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Flag").field(&*self.lock()).finish()
    }
}

impl<T: FlagType> Value for Flag<T> {
    fn set(&mut self, raw: &str) -> Result<(), String> {
        let parsed = T::parse_flag(raw)?;
        Flag::set(self, parsed);
        Ok(())
    }

    fn get(&self) -> String {
        self.lock().format_flag()
    }

    fn is_bool_flag(&self) -> bool {
        T::IS_BOOL
    }

    fn as_bool(&self) -> Option<bool> {
        self.lock().as_bool()
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn is_zero(&self, default: &str) -> bool {
        T::default().format_flag() == default
    }

    fn quote_default(&self) -> bool {
        T::QUOTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_accepts_go_spellings() {
        for raw in ["1", "t", "T", "true", "TRUE", "True"] {
            assert_eq!(bool::parse_flag(raw), Ok(true));
        }
        for raw in ["0", "f", "F", "false", "FALSE", "False"] {
            assert_eq!(bool::parse_flag(raw), Ok(false));
        }
        assert!(bool::parse_flag("yes").is_err());
    }

    #[test]
    fn test_handle_is_shared() {
        let flag = Flag::new(String::from("val1"));
        let mut bound: Box<dyn Value> = Box::new(flag.clone());

        bound.set("cli1").unwrap();
        assert_eq!(flag.get(), "cli1");
        assert_eq!(bound.get(), "cli1");
    }

    #[test]
    fn test_invalid_number() {
        let mut bound = Flag::new(0i64);
        assert!(Value::set(&mut bound, "twelve").is_err());
        assert!(Value::set(&mut bound, "-12").is_ok());
        assert_eq!(bound.get(), -12);

        let mut unsigned = Flag::new(0u64);
        assert!(Value::set(&mut unsigned, "-1").is_err());
    }

    #[test]
    fn test_zero_defaults() {
        assert!(Flag::new(0i64).is_zero("0"));
        assert!(Flag::new(false).is_zero("false"));
        assert!(Flag::new(String::new()).is_zero(""));
        assert!(!Flag::new(String::new()).is_zero("val1"));
    }
}
