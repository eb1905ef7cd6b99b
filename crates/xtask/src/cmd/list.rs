use crate::config::Config;
use clap::Parser;
use itertools::Itertools;

/// Print the available tasks together with their steps.
#[derive(Parser, Debug)]
pub struct List {}

impl crate::cmd::Cmd for List {
    fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let table = config.task_table()?;

        println!("Tasks from {}\n", config.task_table_source());

        for (name, steps) in table.iter() {
            println!("{name}:\n    {}", steps.iter().join("\n    "));
        }

        Ok(())
    }
}
