//! Flag set: registration and parsing of single-dash flags

use crate::error::{FlagError, FlagResult};
use crate::flag::output::Output;
use crate::flag::value::{Flag, FlagType, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{self, Write};
use std::process;
use std::sync::Arc;

/// Function printing the usage message of a flag set
pub type UsageFn = Arc<dyn Fn(&FlagSet, &mut dyn Write) -> io::Result<()> + Send + Sync>;

/// What a flag set does when parsing fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Print the error and usage, then return the error
    #[default]
    Propagate,
    /// Print the error and usage, then exit with status 2 (0 for help)
    Exit,
    /// Exit like `Exit` without printing anything
    ExitSilently,
}

struct FlagDef {
    usage: String,
    default: String,
    value: Box<dyn Value>,
}

/// A set of named flags parsed from an argument list
pub struct FlagSet {
    name: String,
    policy: ErrorPolicy,
    flags: BTreeMap<String, FlagDef>,
    actual: BTreeSet<String>,
    args: Vec<String>,
    parsed: bool,
    output: Output,
    usage: Option<UsageFn>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>, policy: ErrorPolicy) -> Self {
        FlagSet {
            name: name.into(),
            policy,
            flags: BTreeMap::new(),
            actual: BTreeSet::new(),
            args: Vec::new(),
            parsed: false,
            output: Output::default(),
            usage: None,
        }
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn output(&self) -> Output {
        self.output.clone()
    }

    pub fn set_output(&mut self, output: Output) {
        self.output = output;
    }

    /// Replace the function printing the usage message on errors and `-h`
    pub fn set_usage(&mut self, usage: UsageFn) {
        self.usage = Some(usage);
    }

    /// Register a flag of a primitive type and return the handle it is bound to
    ///
    /// # Panics
    ///
    /// Panics if a flag with the same name is already registered.
    pub fn var<T: FlagType>(&mut self, name: &str, default: T, usage: &str) -> Flag<T> {
        let flag = Flag::new(default);
        self.custom(name, usage, Box::new(flag.clone()));
        flag
    }

    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> Flag<bool> {
        self.var(name, default, usage)
    }

    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> Flag<String> {
        self.var(name, default.to_string(), usage)
    }

    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> Flag<i64> {
        self.var(name, default, usage)
    }

    pub fn uint(&mut self, name: &str, default: u64, usage: &str) -> Flag<u64> {
        self.var(name, default, usage)
    }

    pub fn float(&mut self, name: &str, default: f64, usage: &str) -> Flag<f64> {
        self.var(name, default, usage)
    }

    /// Register a flag backed by a caller supplied [`Value`]
    ///
    /// The value's current content is recorded as the default.
    ///
    /// # Panics
    ///
    /// Panics if a flag with the same name is already registered.
    pub fn custom(&mut self, name: &str, usage: &str, value: Box<dyn Value>) {
        if self.flags.contains_key(name) {
            panic!("{} flag redefined: {}", self.name, name);
        }
        let def = FlagDef {
            usage: usage.to_string(),
            default: value.get(),
            value,
        };
        self.flags.insert(name.to_string(), def);
    }

    /// Look up a registered flag
    pub fn lookup(&self, name: &str) -> Option<&dyn Value> {
        self.flags.get(name).map(|def| def.value.as_ref())
    }

    /// Whether `name` is a registered bool flag currently set to true
    pub fn bool_flag(&self, name: &str) -> bool {
        self.lookup(name).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    /// Whether the flag was given on the command line
    pub fn is_set(&self, name: &str) -> bool {
        self.actual.contains(name)
    }

    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Arguments left after the flags
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }

    pub fn narg(&self) -> usize {
        self.args.len()
    }

    /// Parse flags from `arguments`, which must not include the program name
    ///
    /// Parsing stops at the first argument that is not a flag, or right after
    /// a `--` terminator. On failure the error policy of the set applies.
    pub fn parse<S: AsRef<str>>(&mut self, arguments: &[S]) -> FlagResult<()> {
        self.parsed = true;
        self.actual.clear();
        self.args = arguments.iter().map(|a| a.as_ref().to_string()).collect();
        loop {
            match self.parse_one() {
                Ok(true) => continue,
                Ok(false) => return Ok(()),
                Err(err) => return self.fail(err),
            }
        }
    }

    /// Parse one flag, returning whether there may be more
    fn parse_one(&mut self) -> FlagResult<bool> {
        let Some(s) = self.args.first() else {
            return Ok(false);
        };
        if s.len() < 2 || !s.starts_with('-') {
            return Ok(false);
        }
        let mut minuses = 1;
        if s.as_bytes()[1] == b'-' {
            minuses = 2;
            if s.len() == 2 {
                self.args.remove(0);
                return Ok(false);
            }
        }
        let name = &s[minuses..];
        if name.is_empty() || name.starts_with('-') || name.starts_with('=') {
            return Err(FlagError::BadSyntax(s.clone()));
        }
        let (name, inline) = match name.split_once('=') {
            Some((name, value)) => (name.to_string(), Some(value.to_string())),
            None => (name.to_string(), None),
        };
        self.args.remove(0);

        let Some(def) = self.flags.get_mut(&name) else {
            if name == "help" || name == "h" {
                return Err(FlagError::Help);
            }
            return Err(FlagError::Undefined(name));
        };

        let raw = if def.value.is_bool_flag() {
            inline.unwrap_or_else(|| "true".to_string())
        } else {
            match inline {
                Some(value) => value,
                None if !self.args.is_empty() => self.args.remove(0),
                None => return Err(FlagError::MissingValue(name)),
            }
        };
        if let Err(reason) = def.value.set(&raw) {
            return Err(FlagError::InvalidValue {
                name,
                value: raw,
                reason,
            });
        }
        self.actual.insert(name);
        Ok(true)
    }

    fn fail(&self, err: FlagError) -> FlagResult<()> {
        if self.policy != ErrorPolicy::ExitSilently {
            let mut out = self.output.lock();
            if err != FlagError::Help {
                let _ = writeln!(out, "{}", err);
            }
            let _ = self.write_usage(&mut **out);
            let _ = out.flush();
        }
        match self.policy {
            ErrorPolicy::Propagate => Err(err),
            ErrorPolicy::Exit | ErrorPolicy::ExitSilently => {
                process::exit(if err == FlagError::Help { 0 } else { 2 })
            }
        }
    }

    /// Print the usage message, using the custom usage function if one is set
    pub fn write_usage(&self, out: &mut dyn Write) -> io::Result<()> {
        match &self.usage {
            Some(usage) => usage(self, out),
            None => {
                if self.name.is_empty() {
                    writeln!(out, "Usage:")?;
                } else {
                    writeln!(out, "Usage of {}:", self.name)?;
                }
                self.print_defaults(out)
            }
        }
    }

    /// Print every flag with its usage and default, sorted by name
    pub fn print_defaults(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(self.defaults().as_bytes())
    }

    /// The defaults listing as a string
    pub fn defaults(&self) -> String {
        let mut buf = String::new();
        for (name, def) in &self.flags {
            let mut line = format!("  -{}", name);
            let (kind, usage) = unquote_usage(&def.usage, def.value.type_name());
            if !kind.is_empty() {
                line.push(' ');
                line.push_str(&kind);
            }
            // Single letter bool flags fit on the same line
            if line.len() <= 4 {
                line.push('\t');
            } else {
                line.push_str("\n    \t");
            }
            line.push_str(&usage.replace('\n', "\n    \t"));
            if !def.value.is_zero(&def.default) {
                if def.value.quote_default() {
                    line.push_str(&format!(" (default {:?})", def.default));
                } else {
                    line.push_str(&format!(" (default {})", def.default));
                }
            }
            buf.push_str(&line);
            buf.push('\n');
        }
        buf
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSet")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("flags", &self.flags.keys().collect::<Vec<_>>())
            .field("args", &self.args)
            .field("parsed", &self.parsed)
            .finish()
    }
}

/// Extract a back-quoted name from a usage string
///
/// `"load configuration from `file`"` yields `("file", "load configuration from file")`.
/// Without back quotes the type name is used instead.
fn unquote_usage(usage: &str, type_name: &str) -> (String, String) {
    if let Some(start) = usage.find('`') {
        if let Some(len) = usage[start + 1..].find('`') {
            let end = start + 1 + len;
            let name = usage[start + 1..end].to_string();
            let plain = format!("{}{}{}", &usage[..start], name, &usage[end + 1..]);
            return (name, plain);
        }
    }
    (type_name.to_string(), usage.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::output::Capture;

    fn set() -> FlagSet {
        FlagSet::new("test", ErrorPolicy::Propagate).with_output(Capture::new().output())
    }

    #[test]
    fn test_parse_all_forms() {
        let mut fs = set();
        let v1 = fs.string("v1", "val1", "usage1");
        let n = fs.int("n", 0, "count");
        let verbose = fs.bool("verbose", false, "chatty");
        let ratio = fs.float("ratio", 1.0, "ratio");

        fs.parse(&["-v1=cli1", "--n", "42", "-verbose", "-ratio=0.5", "file", "-n=7"])
            .unwrap();

        assert_eq!(v1.get(), "cli1");
        assert_eq!(n.get(), 42);
        assert!(verbose.get());
        assert_eq!(ratio.get(), 0.5);
        assert_eq!(fs.args(), &["file", "-n=7"]);
        assert_eq!(fs.narg(), 2);
        assert!(fs.is_set("v1"));
        assert!(fs.bool_flag("verbose"));
    }

    #[test]
    fn test_terminator_and_lone_dash() {
        let mut fs = set();
        let b = fs.bool("b", false, "");
        fs.parse(&["-b", "--", "-b"]).unwrap();
        assert!(b.get());
        assert_eq!(fs.args(), &["-b"]);

        let mut fs = set();
        fs.parse(&["-", "x"]).unwrap();
        assert_eq!(fs.args(), &["-", "x"]);
    }

    #[test]
    fn test_bool_takes_no_separate_value() {
        let mut fs = set();
        let b = fs.bool("b", true, "");
        fs.parse(&["-b=false", "true"]).unwrap();
        assert!(!b.get());
        assert_eq!(fs.arg(0), Some("true"));
        assert!(!fs.bool_flag("b"));
    }

    #[test]
    fn test_errors() {
        let mut fs = set();
        fs.int("n", 0, "");
        assert_eq!(
            fs.parse(&["-x"]),
            Err(FlagError::Undefined("x".to_string()))
        );
        assert_eq!(fs.parse(&["-n"]), Err(FlagError::MissingValue("n".to_string())));
        assert_eq!(fs.parse(&["---n"]), Err(FlagError::BadSyntax("---n".to_string())));
        assert_eq!(fs.parse(&["-=1"]), Err(FlagError::BadSyntax("-=1".to_string())));
        assert!(matches!(
            fs.parse(&["-n", "abc"]),
            Err(FlagError::InvalidValue { ref name, .. }) if name == "n"
        ));
    }

    #[test]
    fn test_help_prints_usage() {
        let capture = Capture::new();
        let mut fs = FlagSet::new("test", ErrorPolicy::Propagate).with_output(capture.output());
        fs.string("v1", "val1", "usage1");

        assert_eq!(fs.parse(&["-h"]), Err(FlagError::Help));
        let text = capture.contents();
        assert!(text.starts_with("Usage of test:\n"));
        assert!(text.contains("  -v1 string\n    \tusage1 (default \"val1\")\n"));
        assert!(!text.contains("help requested"));
    }

    #[test]
    fn test_declared_help_flag_is_not_special() {
        let mut fs = set();
        let h = fs.bool("h", false, "");
        fs.parse(&["-h"]).unwrap();
        assert!(h.get());
    }

    #[test]
    fn test_defaults_layout() {
        let mut fs = set();
        fs.bool("v", false, "verbose output");
        fs.uint("size", 0, "chunk `bytes`");
        fs.string("o", "", "output file");

        assert_eq!(
            fs.defaults(),
            "  -o string\n    \toutput file\n  -size bytes\n    \tchunk bytes\n  -v\tverbose output\n"
        );
    }

    #[test]
    fn test_custom_usage() {
        let capture = Capture::new();
        let mut fs = FlagSet::new("test", ErrorPolicy::Propagate).with_output(capture.output());
        fs.set_usage(Arc::new(|fs: &FlagSet, out: &mut dyn Write| {
            writeln!(out, "custom usage for {}", fs.name())
        }));

        assert!(fs.parse(&["-nope"]).is_err());
        assert_eq!(
            capture.contents(),
            "flag provided but not defined: -nope\ncustom usage for test\n"
        );
    }

    #[test]
    #[should_panic(expected = "flag redefined: v1")]
    fn test_redefined_flag_panics() {
        let mut fs = set();
        fs.string("v1", "", "");
        fs.string("v1", "", "");
    }
}
