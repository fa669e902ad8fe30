//! Usage messages for the root and for individual commands

use crate::command::tree::{Application, Command};
use crate::flag::{program, FlagSet, Output, UsageFn};
use std::io::{self, Write};
use std::sync::Arc;

impl Command {
    /// Print the usage of this command: its flags and its subcommands
    pub fn write_usage(&self, out: &mut dyn Write) -> io::Result<()> {
        match self.application() {
            None => {
                let globals = self.globals();
                write_tree_usage(out, &globals, &self.commands())
            }
            Some(app) => {
                let (fs, _) = app.flag_set(Output::default());
                write_command_usage(out, app, &fs, &self.commands())
            }
        }
    }

    /// The usage as a string
    pub fn usage(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write_usage(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Usage function for the global flag set of a root command
pub(crate) fn tree_usage(subs: Vec<Arc<Command>>) -> UsageFn {
    Arc::new(move |fs: &FlagSet, out: &mut dyn Write| write_tree_usage(out, fs, &subs))
}

/// Usage function for the flag set of a matched command
pub(crate) fn command_usage(app: &Application, subs: Vec<Arc<Command>>) -> UsageFn {
    let app = app.clone();
    Arc::new(move |fs: &FlagSet, out: &mut dyn Write| write_command_usage(out, &app, fs, &subs))
}

fn write_tree_usage(out: &mut dyn Write, globals: &FlagSet, subs: &[Arc<Command>]) -> io::Result<()> {
    writeln!(out, "Usage of {}:", program())?;
    globals.print_defaults(out)?;
    write_subcommands(out, subs)
}

fn write_command_usage(
    out: &mut dyn Write,
    app: &Application,
    fs: &FlagSet,
    subs: &[Arc<Command>],
) -> io::Result<()> {
    writeln!(out, "Usage of command `{}`:", app.name)?;
    write!(out, "\n{}\n{} {}\n", app.descr, app.name, app.args)?;
    fs.print_defaults(out)?;
    write_subcommands(out, subs)
}

fn write_subcommands(out: &mut dyn Write, subs: &[Arc<Command>]) -> io::Result<()> {
    if subs.is_empty() {
        return Ok(());
    }
    write!(out, "\nSubcommands:")?;
    for app in subs.iter().filter_map(|sub| sub.application()) {
        write!(out, "\n{}\n{} {}\n", app.descr, app.name, app.args)?;
        // Registering the flags runs the initializer; its handler is dropped unused
        let (fs, _) = app.flag_set(Output::default());
        fs.print_defaults(out)?;
    }
    Ok(())
}
