//! Validation rule evaluator.

use crate::schema::ValidationRule;

impl ValidationRule {
    /// Whether `candidate` satisfies this rule. Matching is exact and
    /// case-sensitive; nothing is trimmed.
    pub fn accepts(&self, candidate: &str) -> bool {
        match self {
            ValidationRule::Any => true,
            ValidationRule::Int => is_int(candidate),
            ValidationRule::Bool => candidate == "true" || candidate == "false",
            ValidationRule::Path => is_quoted_path(candidate),
            ValidationRule::OneOf(values) => values.iter().any(|v| v == candidate),
        }
    }
}

/// Signed 32-bit decimal integer, optional leading `+` or `-`.
fn is_int(candidate: &str) -> bool {
    candidate.parse::<i32>().is_ok()
}

/// At least two characters, wrapped in double quotes.
fn is_quoted_path(candidate: &str) -> bool {
    candidate.len() >= 2 && candidate.starts_with('"') && candidate.ends_with('"')
}

/// Strip the surrounding quotes from a value accepted by [`ValidationRule::Path`].
pub fn unquote_path(value: &str) -> &str {
    if is_quoted_path(value) {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
