//! Declarative table of development tasks.
//!
//! A task is an ordered list of steps. A step either runs an external command
//! or runs another task, which makes composite tasks such as `check` possible.

use crate::util::fs;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

const BUILTIN_TASKS: &str = include_str!("../tasks/rust.yml");

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Failed to read the task table")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse the task table")]
    Parse {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("Unknown task `{name}`, available tasks: {available}")]
    UnknownTask { name: String, available: String },

    #[error("Tasks reference each other in a cycle: {cycle}")]
    Cycle { cycle: String },

    #[error("Task `{task}` has a step with an empty command")]
    EmptyCommand { task: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TaskTable {
    tasks: BTreeMap<String, Vec<Step>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Step {
    /// Run an external program. The first item is the program, the rest are
    /// its arguments.
    Run {
        run: Vec<String>,
        #[serde(default)]
        env: BTreeMap<String, String>,
    },

    /// Run all steps of another task.
    Task { task: String },
}

/// A single external command produced by expanding a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// The task that declares this command.
    pub task: String,
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl TaskTable {
    /// The tasks of this workspace.
    pub fn builtin() -> Self {
        Self::from_yaml(BUILTIN_TASKS)
            .unwrap_or_else(|err| panic!("BUG: the builtin task table is invalid: {err:#?}"))
    }

    pub fn load(path: &Path) -> Result<Self, TaskError> {
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    /// Parses the table and checks that every task in it can be expanded.
    pub fn from_yaml(yaml: &str) -> Result<Self, TaskError> {
        let table: Self = serde_yaml::from_str(yaml)?;

        for name in table.tasks.keys() {
            table.plan(name)?;
        }

        Ok(table)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Step])> {
        self.tasks
            .iter()
            .map(|(name, steps)| (name.as_str(), steps.as_slice()))
    }

    /// Expands the task into the flat list of commands to run, in order.
    /// Steps that reference other tasks are replaced with the steps of those
    /// tasks, recursively.
    pub fn plan(&self, task: &str) -> Result<Vec<Invocation>, TaskError> {
        let mut plan = vec![];
        self.expand(task, &mut vec![], &mut plan)?;
        Ok(plan)
    }

    fn expand<'a>(
        &'a self,
        task: &'a str,
        stack: &mut Vec<&'a str>,
        plan: &mut Vec<Invocation>,
    ) -> Result<(), TaskError> {
        if stack.contains(&task) {
            return Err(TaskError::Cycle {
                cycle: stack.iter().chain([&task]).join(" -> "),
            });
        }

        let steps = self
            .tasks
            .get(task)
            .ok_or_else(|| TaskError::UnknownTask {
                name: task.to_owned(),
                available: self.tasks.keys().join(", "),
            })?;

        stack.push(task);

        for step in steps {
            match step {
                Step::Run { run, env } => {
                    let (program, args) = run.split_first().ok_or_else(|| {
                        TaskError::EmptyCommand {
                            task: task.to_owned(),
                        }
                    })?;

                    plan.push(Invocation {
                        task: task.to_owned(),
                        program: program.clone(),
                        args: args.to_vec(),
                        env: env.clone(),
                    });
                }
                Step::Task { task } => self.expand(task, stack, plan)?,
            }
        }

        stack.pop();

        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Run { run, env } => {
                for (key, value) in env {
                    write!(f, "{key}={} ", quote(value))?;
                }
                f.write_str(&run.iter().map(|arg| quote(arg)).join(" "))
            }
            Step::Task { task } => write!(f, "<{task}>"),
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{key}={} ", quote(value))?;
        }

        let argv = std::iter::once(&self.program).chain(&self.args);
        f.write_str(&argv.map(|arg| quote(arg)).join(" "))
    }
}

fn quote(arg: &str) -> String {
    shlex::try_quote(arg).map_or_else(|_| format!("{arg:?}"), Into::into)
}
