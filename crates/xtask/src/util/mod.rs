pub(crate) mod fs;

use std::path::{Path, PathBuf};

pub(crate) fn repo_abs_path<I>(components: I) -> PathBuf
where
    I: IntoIterator,
    I::Item: AsRef<Path>,
{
    let mut path = repo_root();
    path.extend(components);
    path
}

pub(crate) fn repo_root() -> PathBuf {
    // The manifest of this crate lives at `crates/xtask/Cargo.toml`
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .unwrap_or_else(|| panic!("BUG: xtask must be located at `<repo>/crates/xtask`"))
        .to_owned()
}
