use itertools::{EitherOrBoth, Itertools};

/// Compares typed text against the current target word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMatcher {
    pub normalize_case: bool,
}

impl InputMatcher {
    pub fn new(normalize_case: bool) -> Self {
        Self { normalize_case }
    }

    fn same_char(&self, a: char, b: char) -> bool {
        if self.normalize_case {
            a.to_lowercase().eq(b.to_lowercase())
        } else {
            a == b
        }
    }

    pub fn is_exact_match(&self, input: &str, target: &str) -> bool {
        input
            .trim()
            .chars()
            .zip_longest(target.chars())
            .all(|pair| match pair {
                EitherOrBoth::Both(a, b) => self.same_char(a, b),
                _ => false,
            })
    }

    /// True while every typed character agrees with the target at its index.
    ///
    /// Typing past the end of the target counts as a divergence.
    pub fn is_prefix_consistent(&self, input: &str, target: &str) -> bool {
        input
            .trim()
            .chars()
            .zip_longest(target.chars())
            .all(|pair| match pair {
                EitherOrBoth::Both(a, b) => self.same_char(a, b),
                EitherOrBoth::Left(_) => false,
                EitherOrBoth::Right(_) => true,
            })
    }

    /// Backspace is only honoured once the input has gone wrong.
    pub fn allows_deletion(&self, input: &str, target: &str) -> bool {
        !self.is_prefix_consistent(input, target)
    }
}

impl Default for InputMatcher {
    fn default() -> Self {
        Self::new(true)
    }
}
