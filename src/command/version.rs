//! Version flags
//!
//! Declaring a global bool flag named [`VERSION_FLAG`] or [`FULL_VERSION_FLAG`]
//! is enough to get the program version printed when it is set. Nothing
//! happens for programs that do not declare them.

use std::env::consts::{ARCH, OS};
use std::fmt::Write as _;

/// Bool flag name displaying the program version
pub const VERSION_FLAG: &str = "version";

/// Bool flag name displaying the program version along with compiler and dependency versions
pub const FULL_VERSION_FLAG: &str = "fullversion";

const NO_BUILD_INFO: &str = "no version available (no build information provided)";

/// A versioned module, the program itself or one of its dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub path: String,
    pub version: String,
    /// Module used in place of this one
    pub replace: Option<Box<Module>>,
}

impl Module {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        Module {
            path: path.into(),
            version: version.into(),
            replace: None,
        }
    }

    pub fn replaced_by(mut self, module: Module) -> Self {
        self.replace = Some(Box::new(module));
        self
    }

    fn write_to(&self, buf: &mut String) {
        let _ = write!(buf, "{} {}", self.path, self.version);
        match &self.replace {
            Some(module) => {
                buf.push_str(" => ");
                module.write_to(buf);
            }
            None => buf.push('\n'),
        }
    }
}

/// Build metadata of the running program
///
/// Use [`build_info!`](crate::build_info) to fill it from the calling crate's
/// manifest and, given the module generated by the `built` crate, from its
/// compiler and `Cargo.lock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub main: Module,
    pub deps: Vec<Module>,
    pub compiler: String,
    pub compiler_version: String,
}

impl BuildInfo {
    pub fn new(path: impl Into<String>, version: impl Into<String>) -> Self {
        BuildInfo {
            main: Module::new(path, version),
            deps: Vec::new(),
            compiler: "rustc".to_string(),
            compiler_version: "unknown".to_string(),
        }
    }

    pub fn with_dep(mut self, dep: Module) -> Self {
        self.deps.push(dep);
        self
    }

    /// Add the `(name, version)` pairs as dependencies, skipping the main module
    pub fn with_deps<'a, I>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (path, version) in deps {
            if path != self.main.path {
                self.deps.push(Module::new(path, version));
            }
        }
        self
    }

    pub fn with_compiler_version(mut self, version: impl Into<String>) -> Self {
        self.compiler_version = version.into();
        self
    }

    /// Take the compiler version from `rustc -V` output, e.g. `rustc 1.80.0 (051478957 2024-07-21)`
    pub fn with_rustc_version(self, rustc_version: &str) -> Self {
        let version = match rustc_version.strip_prefix("rustc ") {
            Some(rest) => rest.split_whitespace().next().unwrap_or(rest),
            None => rustc_version.trim(),
        };
        self.with_compiler_version(version)
    }

    /// `<program> version <version> <os>/<arch>`
    pub fn version(&self, program: &str) -> String {
        format!("{} version {} {}/{}\n", program, self.main.version, OS, ARCH)
    }

    /// Version line with the compiler, followed by every module
    pub fn full_version(&self, program: &str) -> String {
        format!(
            "{} full version {} {}/{} compiled by {} ({})\n{}\n",
            program,
            self.main.version,
            OS,
            ARCH,
            self.compiler,
            self.compiler_version,
            self.modules()
        )
    }

    /// One line per module, main module first and dependencies indented
    pub fn modules(&self) -> String {
        let mut buf = String::new();
        self.main.write_to(&mut buf);
        for dep in &self.deps {
            buf.push('\t');
            dep.write_to(&mut buf);
        }
        buf
    }
}

impl Default for BuildInfo {
    fn default() -> Self {
        BuildInfo::new("", NO_BUILD_INFO)
    }
}

/// [`BuildInfo`] of the crate invoking the macro
///
/// With no argument only the package name and version are known. Pass the
/// module holding the file written by `built::write_built_file` to also get
/// the compiler version and every package of `Cargo.lock`:
///
/// ```ignore
/// mod built_info {
///     include!(concat!(env!("OUT_DIR"), "/built.rs"));
/// }
///
/// let info = cmdflag::build_info!(built_info);
/// ```
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::BuildInfo::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    };
    ($($built:ident)::+) => {
        $crate::build_info!()
            .with_rustc_version($($built)::+::RUSTC_VERSION)
            .with_deps($($built)::+::DEPENDENCIES.iter().copied())
    };
}
