//! Snapshot assertions shared by the tests of this workspace.

pub mod debug;

use display_error_chain::DisplayErrorChain;
use expect_test::Expect;
use std::error::Error;

/// Approximate number of characters that can fit on a single screen
const COMMON_SCREEN_CHARS_WIDTH: usize = 60;

/// Asserts that the error and the chain of its sources are rendered as the
/// given expected snapshot. See [`make_err_snapshot`] for the format.
#[track_caller]
pub fn assert_err_eq(actual: &dyn Error, expected: &Expect) {
    expected.assert_eq(&make_err_snapshot(actual));
}

/// Renders the error message followed by the messages of all of its sources,
/// one per line:
///
/// ```text
/// Top-level error
/// Caused by:
///   -> Inner error
///   -> Root error
/// ```
pub fn make_err_snapshot(err: &dyn Error) -> String {
    DisplayErrorChain::new(err).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl Error for Layer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            self.1.as_deref().map(|source| source as _)
        }
    }

    #[test]
    fn single_error_has_no_causes() {
        assert_err_eq(&Layer("Root error", None), &expect!["Root error"]);
    }

    #[test]
    fn causes_are_listed_from_outer_to_inner() {
        let root = Layer("Root error", None);
        let inner = Layer("Inner error", Some(Box::new(root)));
        let top = Layer("Top-level error", Some(Box::new(inner)));

        assert_err_eq(
            &top,
            &expect![[r#"
                Top-level error
                Caused by:
                  -> Inner error
                  -> Root error"#]],
        );
    }
}
