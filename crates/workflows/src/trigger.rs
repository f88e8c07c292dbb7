//! Trigger evaluation: does this rule fire for this event?

use {
    regex::{Regex, RegexBuilder},
    tracing::warn,
};

use crate::rule::Trigger;

/// The inbound fact a trigger is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent<'a> {
    /// The bare match token of a command, e.g. `/start`.
    Command(&'a str),
    /// The full body of a free-text message.
    Message(&'a str),
}

/// Decide whether `trigger` fires for `event`. Pure and panic-free; an
/// unparseable pattern logs once per evaluation and never matches.
#[must_use]
pub fn fires(trigger: &Trigger, event: TriggerEvent<'_>) -> bool {
    match (trigger, event) {
        (Trigger::Command { command }, TriggerEvent::Command(token)) => command == token,
        (Trigger::Message { pattern }, TriggerEvent::Message(text)) => {
            matches_pattern(pattern, text)
        },
        _ => false,
    }
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn matches_pattern(pattern: &str, text: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    match compile_pattern(pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!(pattern, error = %e, "unparseable message trigger pattern");
            false
        },
    }
}
