//! Error policies of flag sets, checked on a child process
//!
//! `test_child_process` does nothing unless `CMDFLAG_POLICY` is set. The other
//! tests run this test binary again, filtered on it, and look at how the child
//! exits.

use assert_cmd::Command;
use cmdflag::{handler, Application, Command as Root, ErrorPolicy, FlagSet};
use predicates::prelude::*;
use std::env;
use std::process;

const POLICY_VAR: &str = "CMDFLAG_POLICY";
const ARGS_VAR: &str = "CMDFLAG_ARGS";

fn policy(name: &str) -> ErrorPolicy {
    match name {
        "exit" => ErrorPolicy::Exit,
        "silent" => ErrorPolicy::ExitSilently,
        _ => ErrorPolicy::Propagate,
    }
}

#[test]
fn test_child_process() {
    let Ok(name) = env::var(POLICY_VAR) else {
        return;
    };
    let policy = policy(&name);
    let args = env::var(ARGS_VAR).unwrap_or_default();

    let mut globals = FlagSet::new("policy", policy);
    globals.bool("v", false, "verbose output");
    let root = Root::new(Some(globals));
    root.add(Application::new("sub").descr("a command").policy(policy).init(|fs| {
        fs.int("n", 0, "how many");
        handler(|_| Ok(0))
    }))
    .unwrap();

    match root.parse_from(args.split_whitespace()) {
        Ok(()) => process::exit(0),
        Err(err) => {
            eprintln!("returned: {}", err);
            process::exit(1)
        }
    }
}

fn child(policy: &str, args: &str) -> Command {
    let mut cmd = Command::new(env::current_exe().unwrap());
    cmd.args(["test_child_process", "--exact", "--nocapture", "--test-threads=1"])
        .env(POLICY_VAR, policy)
        .env(ARGS_VAR, args);
    cmd
}

#[test]
fn test_propagate_returns_the_error() {
    child("propagate", "-x")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("flag provided but not defined: -x\nUsage of policy"))
        .stderr(predicate::str::contains("returned: flag provided but not defined: -x"));
}

#[test]
fn test_exit_prints_error_and_usage() {
    child("exit", "-x")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("flag provided but not defined: -x\nUsage of policy"))
        .stderr(predicate::str::contains("returned:").not());

    child("exit", "sub -n many")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value \"many\" for flag -n"))
        .stderr(predicate::str::contains("Usage of command `sub`:"));
}

#[test]
fn test_exit_on_help_is_success() {
    child("exit", "-h")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Usage of policy"))
        .stderr(predicate::str::contains("not defined").not());

    child("exit", "sub -help")
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Usage of command `sub`:"));
}

#[test]
fn test_exit_silently_prints_nothing() {
    child("silent", "-x").assert().code(2).stderr("");
    child("silent", "sub -n many").assert().code(2).stderr("");
    child("silent", "-h").assert().code(0).stderr("");
}
