//! Composable predicates for [`Vault::find`](super::Vault::find).
//!
//! ```
//! use notpass::vault::query::{and, field, or};
//! use notpass::vault::{GROUP_FIELD, NAME_FIELD, USERNAME_FIELD};
//!
//! let condition = and(vec![
//!     or(vec![
//!         field(GROUP_FIELD).contains("bank"),
//!         field(NAME_FIELD).contains("bank"),
//!     ]),
//!     field(USERNAME_FIELD).equals("luke"),
//! ]);
//! # let _ = condition;
//! ```
//!
//! A field missing from an entry compares as the empty string.

use regex::Regex;

use super::entry::Entry;
use crate::errors::{NotpassError, Result};

/// A predicate over entries.
pub type Condition = Box<dyn Fn(&Entry) -> bool + Send + Sync>;

/// Matches every entry.
pub fn any() -> Condition {
    Box::new(|_: &Entry| true)
}

/// Matches no entry.
pub fn none() -> Condition {
    Box::new(|_: &Entry| false)
}

/// Matches when every condition matches (vacuously true when empty).
pub fn and(conditions: Vec<Condition>) -> Condition {
    Box::new(move |e: &Entry| conditions.iter().all(|c| c(e)))
}

/// Matches when at least one condition matches.
pub fn or(conditions: Vec<Condition>) -> Condition {
    Box::new(move |e: &Entry| conditions.iter().any(|c| c(e)))
}

/// Start a matcher on the named field.
pub fn field(name: &str) -> FieldMatcher {
    FieldMatcher {
        name: name.to_string(),
    }
}

/// Builds conditions that look at one field.
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    name: String,
}

impl FieldMatcher {
    pub fn equals(self, value: &str) -> Condition {
        let value = value.to_string();
        Box::new(move |e: &Entry| field_string(e, &self.name) == value)
    }

    pub fn contains(self, value: &str) -> Condition {
        let value = value.to_string();
        Box::new(move |e: &Entry| field_string(e, &self.name).contains(&value))
    }

    /// Glob match: `*` is any run of characters, `?` exactly one.
    ///
    /// The match is anchored at each end unless the pattern starts or ends
    /// with `*`.
    pub fn matches_wildcard(self, pattern: &str) -> Result<Condition> {
        let regex = wildcard_to_regex(pattern)?;
        Ok(Box::new(move |e: &Entry| regex.is_match(&field_string(e, &self.name))))
    }
}

fn field_string(entry: &Entry, name: &str) -> String {
    entry.get(name).map(|v| v.as_string()).unwrap_or_default()
}

fn wildcard_to_regex(pattern: &str) -> Result<Regex> {
    let expr = wildcard_to_regex_pattern(pattern);
    Regex::new(&expr).map_err(|_| NotpassError::InvalidPattern(pattern.to_string()))
}

fn wildcard_to_regex_pattern(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if c == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(c);
    }

    let body = regex::escape(&collapsed)
        .replace("\\*", ".*")
        .replace("\\?", ".");

    let (body, anchor_start) = match body.strip_prefix(".*") {
        Some(rest) => (rest, false),
        None => (body.as_str(), true),
    };
    let (body, anchor_end) = match body.strip_suffix(".*") {
        Some(rest) => (rest, false),
        None => (body, true),
    };

    let mut expr = String::from("(?s)");
    if anchor_start {
        expr.push('^');
    }
    expr.push_str(body);
    if anchor_end {
        expr.push('$');
    }
    expr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::entry::{NAME_FIELD, USERNAME_FIELD};
    use crate::vault::Value;

    fn named(name: &str) -> Entry {
        Entry::new().with_name(name)
    }

    fn wildcard(pattern: &str, value: &str) -> bool {
        field(NAME_FIELD).matches_wildcard(pattern).unwrap()(&named(value))
    }

    #[test]
    fn any_and_none() {
        let e = named("x");
        assert!(any()(&e));
        assert!(!none()(&e));
    }

    #[test]
    fn and_or_combinators() {
        let e = Entry::new().with_name("foo").with_username("luke");

        assert!(and(vec![])(&e));
        assert!(!or(vec![])(&e));
        assert!(and(vec![any(), field(USERNAME_FIELD).equals("luke")])(&e));
        assert!(!and(vec![any(), none()])(&e));
        assert!(or(vec![none(), field(NAME_FIELD).contains("oo")])(&e));
        assert!(!or(vec![none(), field(NAME_FIELD).contains("bar")])(&e));
    }

    #[test]
    fn equals_and_contains() {
        let e = named("foobar");
        assert!(field(NAME_FIELD).equals("foobar")(&e));
        assert!(!field(NAME_FIELD).equals("foo")(&e));
        assert!(field(NAME_FIELD).contains("oba")(&e));
        assert!(field(NAME_FIELD).contains("")(&e));
    }

    #[test]
    fn missing_field_is_empty_string() {
        let e = named("foo");
        assert!(field("email").equals("")(&e));
        assert!(!field("email").contains("x")(&e));
    }

    #[test]
    fn matches_against_secret_payload() {
        let e = Entry::new().with("pin", Value::secret("1234"));
        assert!(field("pin").equals("1234")(&e));
    }

    #[test]
    fn wildcard_star() {
        assert!(wildcard("bar*", "barbaz"));
        assert!(!wildcard("bar*", "foobar"));
        assert!(wildcard("*bar", "foobar"));
        assert!(!wildcard("*bar", "barbaz"));
        assert!(wildcard("*bar*", "foobarbaz"));
        assert!(wildcard("f*z", "foobarbaz"));
        assert!(!wildcard("f*z", "foobarbazq"));
    }

    #[test]
    fn wildcard_question_mark() {
        assert!(wildcard("bar?", "barr"));
        assert!(!wildcard("bar?", "bar"));
        assert!(!wildcard("bar?", "barrr"));
    }

    #[test]
    fn wildcard_collapses_stars_and_escapes_meta() {
        assert_eq!(wildcard_to_regex_pattern("a**b"), "(?s)^a.*b$");
        assert!(wildcard("a.c", "a.c"));
        assert!(!wildcard("a.c", "abc"));
        assert!(wildcard("(x)+", "(x)+"));
    }

    #[test]
    fn bare_star_matches_everything() {
        assert!(wildcard("*", ""));
        assert!(wildcard("***", "anything"));
    }
}
