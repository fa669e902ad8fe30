//! Resolution of the command line against the command tree

use crate::command::tree::Command;
use crate::command::usage;
use crate::command::version::{FULL_VERSION_FLAG, VERSION_FLAG};
use crate::error::{Error, Result};
use crate::flag::{program, Output};
use std::sync::PoisonError;
use tracing::{debug, trace};

impl Command {
    /// Parse the process arguments, see [`Command::parse_from`]
    pub fn parse(&self) -> Result<()> {
        self.parse_from(std::env::args().skip(1))
    }

    /// Parse the global flags and, if any, the command and its flags, then
    /// the nested commands recursively
    ///
    /// `args` must not include the program name. Each matched command's
    /// handler runs before its own subcommands are looked up.
    ///
    /// A first positional argument that names no command is an error, unless
    /// this node has no commands at all. Deeper down, an argument that names
    /// no command simply ends the resolution: it was already handed to the
    /// parent's handler.
    pub fn parse_from<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();

        let (residual, out) = {
            let mut globals = self.globals.lock().unwrap_or_else(PoisonError::into_inner);
            globals.set_usage(usage::tree_usage(self.commands()));
            globals.parse(&args)?;
            let out = globals.output();

            if globals.bool_flag(VERSION_FLAG) {
                debug!("version flag set, skipping command dispatch");
                out.write_str(&self.build.version(&program()))?;
                return Ok(());
            }
            if globals.bool_flag(FULL_VERSION_FLAG) {
                debug!("full version flag set, skipping command dispatch");
                out.write_str(&self.build.full_version(&program()))?;
                return Ok(());
            }
            (globals.args().to_vec(), out)
        };

        self.dispatch(residual, 0, &out, true)
    }

    /// Match `args[start]` against the subcommands and run the match
    fn dispatch(&self, args: Vec<String>, start: usize, out: &Output, top: bool) -> Result<()> {
        let Some(name) = args.get(start) else {
            return Ok(());
        };
        let subs = self.commands();
        if subs.is_empty() {
            return Ok(());
        }

        let Some(sub) = subs.iter().find(|sub| sub.name() == name.as_str()) else {
            if top {
                return Err(Error::NoCommand(name.clone()));
            }
            trace!(parent = self.name(), token = %name, "no nested command matched");
            return Ok(());
        };

        let (residual, consumed) = sub.run(&args[start + 1..], out)?;
        sub.dispatch(residual, consumed, out, false)
    }

    /// Parse this command's flags and call its handler
    ///
    /// Returns the arguments left after the flags and how many of them the
    /// handler consumed.
    fn run(&self, args: &[String], out: &Output) -> Result<(Vec<String>, usize)> {
        let Some(app) = self.application() else {
            return Ok((args.to_vec(), 0));
        };
        let (mut fs, handler) = app.flag_set(out.clone());
        let Some(mut handler) = handler else {
            return Err(Error::MissingInitializer);
        };
        fs.set_usage(usage::command_usage(app, self.commands()));
        fs.parse(args)?;

        let residual = fs.args().to_vec();
        debug!(command = %app.name, args = ?residual, "running command");
        let consumed = handler(&residual).map_err(|err| match err.downcast::<Error>() {
            Ok(err) => err,
            Err(err) => Error::Handler(err),
        })?;
        trace!(command = %app.name, consumed, "command done");
        Ok((residual, consumed))
    }
}
