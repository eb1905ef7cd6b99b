use crate::config::Config;
use crate::runner::{self, DryRunner, ProcessRunner, Runner};
use crate::util::repo_root;
use clap::Parser;

#[derive(Parser, Debug)]
pub struct TaskOpts {
    /// Only print the commands that would run, without running them.
    #[clap(long)]
    dry_run: bool,
}

impl TaskOpts {
    fn run_task(self, task: &str) -> anyhow::Result<()> {
        let table = Config::load()?.task_table()?;

        let mut runner: Box<dyn Runner> = if self.dry_run {
            Box::new(DryRunner)
        } else {
            Box::new(ProcessRunner::new(repo_root()))
        };

        runner::execute(&table, task, runner.as_mut())
    }
}

/// Rewrite the sources with the formatter and fix auto-fixable lints.
#[derive(Parser, Debug)]
pub struct Format {
    #[clap(flatten)]
    opts: TaskOpts,
}

/// Run the linters and check the formatting without modifying anything.
#[derive(Parser, Debug)]
pub struct Lint {
    #[clap(flatten)]
    opts: TaskOpts,
}

/// Run the strict type checker over the whole repository.
#[derive(Parser, Debug)]
pub struct TypeCheck {
    #[clap(flatten)]
    opts: TaskOpts,
}

/// Run `lint` and then `type-check`, stopping at the first failure.
/// This is what CI runs.
#[derive(Parser, Debug)]
pub struct Check {
    #[clap(flatten)]
    opts: TaskOpts,
}

impl crate::cmd::Cmd for Format {
    fn run(self) -> anyhow::Result<()> {
        self.opts.run_task("format")
    }
}

impl crate::cmd::Cmd for Lint {
    fn run(self) -> anyhow::Result<()> {
        self.opts.run_task("lint")
    }
}

impl crate::cmd::Cmd for TypeCheck {
    fn run(self) -> anyhow::Result<()> {
        self.opts.run_task("type-check")
    }
}

impl crate::cmd::Cmd for Check {
    fn run(self) -> anyhow::Result<()> {
        self.opts.run_task("check")
    }
}
