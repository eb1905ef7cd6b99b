//! Development tasks of this repository: formatting, linting and type checks.
//!
//! The tasks are declared in a YAML task table. The builtin table lives at
//! `crates/xtask/tasks/rust.yml`. It can be replaced with another one via the
//! `XTASK_TASKS_FILE` environment variable.

mod cmd;
mod config;
pub mod runner;
pub mod tasks;
mod util;

use clap::Parser;
use cmd::Cmd;

/// Assorted development scripts for this repository
///
/// The tasks come from `crates/xtask/tasks/rust.yml` by default. Set
/// `XTASK_TASKS_FILE=crates/xtask/tasks/python.yml` to run the ruff and mypy
/// table instead. Run `cargo xtask list` to see the active table.
#[derive(Parser, Debug)]
enum Args {
    Format(cmd::Format),
    Lint(cmd::Lint),
    TypeCheck(cmd::TypeCheck),
    Check(cmd::Check),
    List(cmd::List),
}

pub fn run() -> anyhow::Result<()> {
    match Args::parse() {
        Args::Format(cmd) => cmd.run(),
        Args::Lint(cmd) => cmd.run(),
        Args::TypeCheck(cmd) => cmd.run(),
        Args::Check(cmd) => cmd.run(),
        Args::List(cmd) => cmd.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn subcommand_names() {
        let args = Args::try_parse_from(["xtask", "type-check", "--dry-run"]).unwrap();
        assert_matches!(args, Args::TypeCheck(_));

        let args = Args::try_parse_from(["xtask", "check"]).unwrap();
        assert_matches!(args, Args::Check(_));

        Args::try_parse_from(["xtask", "test"]).unwrap_err();
    }

    #[test]
    fn help_mentions_the_python_table() {
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("XTASK_TASKS_FILE=crates/xtask/tasks/python.yml"));
    }
}
