use crate::COMMON_SCREEN_CHARS_WIDTH;
use expect_test::Expect;
use std::fmt;

/// Asserts that the [`fmt::Debug`] representation of `actual` is equal to the
/// given expected snapshot. Uses [`make_snapshot`] to make the snapshot fit
/// into a common width of a single screen.
#[track_caller]
pub fn assert_eq<T: fmt::Debug>(actual: T, expected: &Expect) {
    expected.assert_eq(&make_snapshot(&actual));
}

/// Formats `actual` to string using [`fmt::Debug`] implementation of `actual`.
/// If its string length exceeds approximately a single-screen amount of characters,
/// it will be pretty-formatted with the `#` formatting specifier to fit its width
/// into a single screen.
pub fn make_snapshot<T: fmt::Debug>(actual: T) -> String {
    let terse = format!("{actual:?}");

    if terse.len() >= COMMON_SCREEN_CHARS_WIDTH {
        return format!("{actual:#?}");
    }

    terse
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    #[test]
    fn short_values_stay_on_one_line() {
        super::assert_eq(("a", 1), &expect![[r#"("a", 1)"#]]);
    }

    #[test]
    fn long_values_are_pretty_printed() {
        super::assert_eq(
            ["a somewhat long string", "that doesn't fit", "into a single line"],
            &expect![[r#"
                [
                    "a somewhat long string",
                    "that doesn't fit",
                    "into a single line",
                ]"#]],
        );
    }
}
