//! Command tree: applications and their registration

use crate::command::version::BuildInfo;
use crate::error::{Error, Result};
use crate::flag::{self, ErrorPolicy, FlagSet, Output, SharedFlagSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Function called with the arguments left once a command's flags are parsed
///
/// It returns how many of those arguments it used; nested commands are looked
/// up right after them.
pub type Handler = Box<dyn FnMut(&[String]) -> anyhow::Result<usize>>;

/// Box a closure into a [`Handler`]
pub fn handler<F>(f: F) -> Handler
where
    F: FnMut(&[String]) -> anyhow::Result<usize> + 'static,
{
    Box::new(f)
}

/// Handler that does nothing and consumes no argument
pub fn noop() -> Handler {
    handler(|_| Ok(0))
}

/// Registers a command's flags and produces its handler
///
/// Called once each time the command is matched, right before its flags are
/// parsed. Closures taking a `&mut FlagSet` implement it.
pub trait Init: Send + Sync {
    fn init(&self, flags: &mut FlagSet) -> Handler;
}

impl<F> Init for F
where
    F: Fn(&mut FlagSet) -> Handler + Send + Sync,
{
    fn init(&self, flags: &mut FlagSet) -> Handler {
        self(flags)
    }
}

/// Attributes of a command
#[derive(Clone, Default)]
pub struct Application {
    /// Command name, unique among its siblings
    pub name: String,
    /// Short description
    pub descr: String,
    /// Description of the expected arguments
    pub args: String,
    /// Displayed by the help command
    pub help: String,
    /// How errors in the command's flags are handled
    pub policy: ErrorPolicy,
    /// Flag registration and handler factory
    pub init: Option<Arc<dyn Init>>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Application {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn descr(mut self, descr: impl Into<String>) -> Self {
        self.descr = descr.into();
        self
    }

    pub fn args(mut self, args: impl Into<String>) -> Self {
        self.args = args.into();
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the initializer from a closure
    pub fn init<F>(mut self, init: F) -> Self
    where
        F: Fn(&mut FlagSet) -> Handler + Send + Sync + 'static,
    {
        self.init = Some(Arc::new(init));
        self
    }

    /// Set the initializer from any [`Init`] implementation
    pub fn initializer(mut self, init: Arc<dyn Init>) -> Self {
        self.init = Some(init);
        self
    }

    /// Flag set for this command writing to `output`, with its flags registered
    pub(crate) fn flag_set(&self, output: Output) -> (FlagSet, Option<Handler>) {
        let mut fs =
            FlagSet::new(format!("command `{}`", self.name), self.policy).with_output(output);
        let handler = self.init.as_ref().map(|init| init.init(&mut fs));
        (fs, handler)
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("descr", &self.descr)
            .field("args", &self.args)
            .field("help", &self.help)
            .field("policy", &self.policy)
            .field("init", &self.init.is_some())
            .finish()
    }
}

/// A node of the command tree
///
/// The root has no application: it holds the global flags and the top level
/// commands. Every other node is created by [`Command::add`].
pub struct Command {
    app: Option<Application>,
    subs: Mutex<Vec<Arc<Command>>>,
    pub(crate) globals: SharedFlagSet,
    pub(crate) build: BuildInfo,
}

impl Command {
    /// Create a root command
    ///
    /// Global flags live in `globals`, or in the process-wide default set
    /// ([`flag::command_line`]) when `None`.
    pub fn new(globals: Option<FlagSet>) -> Arc<Command> {
        Command::with_build_info(globals, BuildInfo::default())
    }

    /// Create a root command reporting `build` for the version flags
    pub fn with_build_info(globals: Option<FlagSet>, build: BuildInfo) -> Arc<Command> {
        let globals = match globals {
            Some(fset) => Arc::new(Mutex::new(fset)),
            None => flag::command_line(),
        };
        Arc::new(Command {
            app: None,
            subs: Mutex::new(Vec::new()),
            globals,
            build,
        })
    }

    fn node(app: Application, globals: SharedFlagSet) -> Command {
        Command {
            app: Some(app),
            subs: Mutex::new(Vec::new()),
            globals,
            build: BuildInfo::default(),
        }
    }

    fn lock_subs(&self) -> MutexGuard<'_, Vec<Arc<Command>>> {
        self.subs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Command name, empty for the root
    pub fn name(&self) -> &str {
        self.app.as_ref().map(|app| app.name.as_str()).unwrap_or("")
    }

    /// Attributes of the command, `None` for the root
    pub fn application(&self) -> Option<&Application> {
        self.app.as_ref()
    }

    pub fn is_root(&self) -> bool {
        self.app.is_none()
    }

    /// Lock the global flag set of the tree, shared by every node, to register
    /// or inspect flags
    pub fn globals(&self) -> MutexGuard<'_, FlagSet> {
        self.globals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn build_info(&self) -> &BuildInfo {
        &self.build
    }

    /// Add a command and return it, for nesting further commands under it
    ///
    /// Safe to call from several threads. The name must be non empty and
    /// unique among the siblings, and the initializer must be set.
    pub fn add(&self, app: Application) -> Result<Arc<Command>> {
        if app.name.is_empty() {
            return Err(Error::MissingCommandName);
        }
        if app.init.is_none() {
            return Err(Error::MissingInitializer);
        }

        let mut subs = self.lock_subs();
        if subs.iter().any(|sub| sub.name() == app.name) {
            return Err(Error::DuplicateCommand(app.name));
        }
        trace!(parent = self.name(), command = %app.name, "registered command");
        let sub = Arc::new(Command::node(app, Arc::clone(&self.globals)));
        subs.push(Arc::clone(&sub));
        Ok(sub)
    }

    /// Like [`Command::add`] but panics on an invalid application
    pub fn must_add(&self, app: Application) -> Arc<Command> {
        match self.add(app) {
            Ok(sub) => sub,
            Err(err) => panic!("cmdflag: {}", err),
        }
    }

    /// Commands defined on this node, in insertion order
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.lock_subs().clone()
    }

    /// Find a direct subcommand by exact name
    pub fn find(&self, name: &str) -> Option<Arc<Command>> {
        self.lock_subs()
            .iter()
            .find(|sub| sub.name() == name)
            .cloned()
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("app", &self.app)
            .field("subs", &*self.lock_subs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn root() -> Arc<Command> {
        Command::new(Some(FlagSet::new("test", ErrorPolicy::Propagate)))
    }

    fn app(name: &str) -> Application {
        Application::new(name).init(|_| noop())
    }

    #[test]
    fn test_add_in_order() {
        let c = root();
        c.add(app("cmd1")).unwrap();
        c.add(app("cmd2")).unwrap();

        let names: Vec<_> = c.commands().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["cmd1", "cmd2"]);
        assert!(c.find("cmd2").is_some());
        assert!(c.find("cmd3").is_none());
    }

    #[test]
    fn test_add_rejects_invalid_applications() {
        let c = root();
        assert!(matches!(
            c.add(Application::default()),
            Err(Error::MissingCommandName)
        ));
        assert!(matches!(
            c.add(Application::new("test")),
            Err(Error::MissingInitializer)
        ));
        c.add(app("test")).unwrap();
        assert!(matches!(
            c.add(app("test")),
            Err(Error::DuplicateCommand(ref name)) if name == "test"
        ));
        assert_eq!(c.commands().len(), 1);
    }

    #[test]
    fn test_same_name_at_different_levels() {
        let c = root();
        let sub = c.add(app("get")).unwrap();
        sub.add(app("get")).unwrap();
        assert_eq!(sub.commands().len(), 1);
    }

    #[test]
    #[should_panic(expected = "missing command name")]
    fn test_must_add_panics() {
        root().must_add(Application::default());
    }

    #[test]
    fn test_concurrent_add() {
        let c = root();
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let c = Arc::clone(&c);
                thread::spawn(move || {
                    for j in 0..16 {
                        c.add(app(&format!("cmd{}-{}", i, j))).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(c.commands().len(), 128);
    }

    #[test]
    fn test_root_has_no_application() {
        let c = root();
        assert!(c.is_root());
        assert_eq!(c.name(), "");
        let sub = c.add(app("sub")).unwrap();
        assert!(!sub.is_root());
        assert_eq!(sub.application().unwrap().name, "sub");
    }

    #[test]
    fn test_nested_commands_share_the_global_flags() {
        let c = root();
        c.globals().bool("v", false, "verbose");
        let sub = c.add(app("sub")).unwrap();
        let nested = sub.add(app("nested")).unwrap();

        assert!(Arc::ptr_eq(&sub.globals, &c.globals));
        assert!(Arc::ptr_eq(&nested.globals, &c.globals));
        assert!(nested.globals().lookup("v").is_some());
    }
}
