mod list;
mod task;

pub(crate) use list::*;
pub(crate) use task::*;

pub(crate) trait Cmd {
    fn run(self) -> anyhow::Result<()>;
}
