//! Text input filtering.
//!
//! Form fields restrict what a member may type to an allowed character set
//! and an optional maximum length. The filter is pure: callers feed it the
//! current field value and write back the cleaned value when one is returned.

pub const ALPHABET_LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
pub const ALPHABET_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const NUMERIC: &str = "0123456789";
pub const SPACE: &str = " ";
pub const SPECIAL_CHARACTERS: &str = ",.!?;:_<>";
pub const ALL: &str = " ,.!?;:_<>0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFilter {
    allowed: String,
    max_length: Option<usize>,
}

impl InputFilter {
    /// Filter accepting the union of `allowed` sets; no sets means [`ALL`].
    #[must_use]
    pub fn new(allowed: &[&str], max_length: Option<usize>) -> Self {
        let allowed = allowed.concat();
        let allowed = if allowed.is_empty() { ALL.to_owned() } else { allowed };
        Self { allowed, max_length }
    }

    /// Cleaned value, or `None` when `value` is already valid.
    #[must_use]
    pub fn filter(&self, value: &str) -> Option<String> {
        let kept = value.chars().filter(|c| self.allowed.contains(*c));
        let cleaned: String = match self.max_length {
            Some(max) => kept.take(max).collect(),
            None => kept.collect(),
        };
        (cleaned != value).then_some(cleaned)
    }
}

impl Default for InputFilter {
    fn default() -> Self {
        Self::new(&[], None)
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
