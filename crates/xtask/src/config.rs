use crate::tasks::TaskTable;
use crate::util::repo_abs_path;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;

const PYTHON_TASKS_FILE: &str = "crates/xtask/tasks/python.yml";

/// Configuration read from `XTASK_*` environment variables.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Path of a YAML task table that replaces the builtin one. Relative
    /// paths are resolved against the repository root.
    tasks_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Self> {
        from_env("XTASK_")
    }

    /// Human-readable origin of the task table returned by [`Self::task_table`].
    pub fn task_table_source(&self) -> String {
        match &self.tasks_file {
            Some(tasks_file) => repo_abs_path([tasks_file]).display().to_string(),
            None => format!(
                "builtin table (set XTASK_TASKS_FILE={} for the ruff and mypy tasks)",
                PYTHON_TASKS_FILE
            ),
        }
    }

    pub fn task_table(&self) -> Result<TaskTable> {
        let Some(tasks_file) = &self.tasks_file else {
            return Ok(TaskTable::builtin());
        };

        let path = repo_abs_path([tasks_file]);

        TaskTable::load(&path)
            .with_context(|| format!("Couldn't load the task table from {}", path.display()))
    }
}

fn from_env<T: DeserializeOwned>(prefix: &str) -> Result<T> {
    envy::prefixed(prefix).from_env().with_context(|| {
        format!(
            "Couldn't load config from environment for {}",
            std::any::type_name::<T>()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_by_default() {
        let table = Config::default().task_table().unwrap();
        assert_eq!(table, TaskTable::builtin());
    }

    #[test]
    fn tasks_file_is_relative_to_repo_root() {
        let config = Config {
            tasks_file: Some(["crates", "xtask", "tasks", "python.yml"].iter().collect()),
        };

        let table = config.task_table().unwrap();
        let [type_check] = table.plan("type-check").unwrap().try_into().unwrap();

        assert_eq!(type_check.to_string(), "mypy --strict .");
    }

    #[test]
    fn builtin_source_points_to_python_table() {
        let source = Config::default().task_table_source();
        assert!(source.contains(PYTHON_TASKS_FILE));

        let config = Config {
            tasks_file: Some(PYTHON_TASKS_FILE.into()),
        };
        config.task_table().unwrap();
        assert!(config.task_table_source().ends_with("python.yml"));
    }

    #[test]
    fn missing_tasks_file() {
        let config = Config {
            tasks_file: Some("no-such-tasks.yml".into()),
        };

        let err = config.task_table().unwrap_err();
        assert!(err.to_string().starts_with("Couldn't load the task table from"));
    }
}
