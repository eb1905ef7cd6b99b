use crate::tasks::{Invocation, TaskTable};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Executes the commands that tasks expand to.
pub trait Runner {
    fn run(&mut self, invocation: &Invocation) -> Result<()>;
}

/// Spawns the commands as child processes inheriting the standard streams.
pub struct ProcessRunner {
    current_dir: PathBuf,
}

impl ProcessRunner {
    pub fn new(current_dir: PathBuf) -> Self {
        Self { current_dir }
    }
}

impl Runner for ProcessRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        let mut cmd = devx_cmd::Cmd::new(&invocation.program);

        cmd.args(&invocation.args)
            .current_dir(&self.current_dir)
            .log_cmd(None);

        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        cmd.run()?;

        Ok(())
    }
}

/// Only reports the commands instead of running them.
pub struct DryRunner;

impl Runner for DryRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<()> {
        info!(task = %invocation.task, cmd = %invocation, "Skipping command (dry run)");
        Ok(())
    }
}

/// Runs all commands of the task in order, stopping at the first failure.
pub fn execute(table: &TaskTable, task: &str, runner: &mut dyn Runner) -> Result<()> {
    let plan = table.plan(task)?;
    let start = Instant::now();

    for (i, invocation) in plan.iter().enumerate() {
        info!(
            task = %invocation.task,
            cmd = %invocation,
            "Running command {}/{}",
            i + 1,
            plan.len()
        );

        runner
            .run(invocation)
            .with_context(|| format!("Task `{task}` failed while running `{invocation}`"))?;
    }

    info!(task, elapsed = ?start.elapsed(), "Task finished");

    Ok(())
}
