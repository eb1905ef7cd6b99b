pub(crate) use fs_err::*;
