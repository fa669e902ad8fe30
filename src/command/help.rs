//! The `help` command

use crate::command::tree::{handler, Application, Command};
use crate::error::{Error, Result};
use crate::flag::FlagSet;
use std::sync::Arc;

/// Name of the command displaying the help of a given command
///
/// With no argument it displays the usage instead:
///
/// ```text
/// ./myprogram help commandname
/// ```
pub const HELP_COMMAND: &str = "help";

impl Command {
    /// Add the `help` command to this command
    pub fn add_help(self: &Arc<Self>) -> Result<Arc<Command>> {
        let parent = Arc::downgrade(self);
        let app = Application::new(HELP_COMMAND)
            .descr("display the help for a given command")
            .args("command")
            .init(move |fs: &mut FlagSet| {
                let parent = parent.clone();
                let out = fs.output();
                handler(move |args| {
                    let Some(parent) = parent.upgrade() else {
                        return Ok(0);
                    };
                    let Some(name) = args.first() else {
                        out.write_str(&parent.usage()?)?;
                        return Ok(0);
                    };
                    let Some(app) = parent.find(name).and_then(|sub| sub.application().cloned())
                    else {
                        return Err(Error::CommandNotFound(name.clone()).into());
                    };
                    out.write_str(&format!(
                        "{}\n{} {}\n{}\n",
                        app.descr, app.name, app.args, app.help
                    ))?;
                    Ok(1)
                })
            });
        self.add(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::tree::noop;
    use crate::flag::{Capture, ErrorPolicy};

    #[test]
    fn test_help_on_nested_command() {
        let capture = Capture::new();
        let c = Command::new(Some(
            FlagSet::new("test", ErrorPolicy::Propagate).with_output(capture.output()),
        ));
        let connect = c
            .add(Application::new("connect").descr("connect to a database").init(|_| noop()))
            .unwrap();
        connect.add_help().unwrap();
        connect
            .add(Application::new("export").help("exports the rows of a table").init(|_| noop()))
            .unwrap();

        c.parse_from(["connect", "help", "export"]).unwrap();
        assert!(capture.contents().contains("exports the rows of a table"));

        capture.clear();
        c.parse_from(["connect", "help"]).unwrap();
        assert!(capture.contents().starts_with("Usage of command `connect`:"));
    }

    #[test]
    fn test_help_is_listed_in_usage() {
        let c = Command::new(Some(FlagSet::new("test", ErrorPolicy::Propagate)));
        c.add_help().unwrap();
        let usage = c.usage().unwrap();
        assert!(usage.contains("display the help for a given command\nhelp command\n"));
        assert!(matches!(c.add_help(), Err(Error::DuplicateCommand(_))));
    }
}
