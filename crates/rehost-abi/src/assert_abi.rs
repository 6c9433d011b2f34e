//! `<assert.h>`.

/// `assert`: a false condition aborts the emulated program.
///
/// # Panics
///
/// Panics with `assert failed` when `cond` is false.
pub fn assert(cond: bool) {
    if !cond {
        panic!("assert failed");
    }
}

/// `assert` carrying the asserted expression and its source location, as
/// `__assert_fail` reports them.
///
/// # Panics
///
/// Panics with `file:line: assertion failed: expr` when `cond` is false.
pub fn assert_at(cond: bool, expr: &str, file: &str, line: u32) {
    if !cond {
        panic!("{file}:{line}: assertion failed: {expr}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_conditions_pass() {
        assert(true);
        assert_at(1 + 1 == 2, "1 + 1 == 2", "main.c", 3);
    }

    #[test]
    #[should_panic(expected = "assert failed")]
    fn false_condition_is_fatal() {
        assert(false);
    }

    #[test]
    #[should_panic(expected = "main.c:9: assertion failed: n > 0")]
    fn located_failure_names_the_expression() {
        assert_at(false, "n > 0", "main.c", 9);
    }
}
