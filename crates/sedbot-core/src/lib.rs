//! sedbot — Chat-History-Aware Substitution (core library)
//!
//! This crate provides the command parsing and the substitution engine used by the
//! `sedbot` host. It holds no state: callers hand it a parsed request and a snapshot
//! of the author's recent messages.

mod engine;
mod message;
mod parse;
mod pattern;

pub use engine::{MatchOutcome, Substituter, DEFAULT_MAX_OUTPUT_LENGTH};
pub use message::MessageEvent;
pub use parse::{
    escape_field, is_substitution, parse_command, parse_substitution, unescape_field, Command,
    CommandKind, FlagSet, SubstitutionRequest,
};
pub use pattern::{CompiledPattern, Match, PatternCompiler, RegexCompiler, RegexPattern};

/// Reasons a chat line is not a well-formed command.
///
/// Every variant means the same thing to a host: the line is ordinary chat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("not a command")]
    NotACommand,

    #[error("missing separator after command keyword")]
    MissingSeparator,

    #[error("invalid separator: {0:?}")]
    InvalidSeparator(char),

    #[error("expected 3 separated fields, found {found}")]
    FieldCount { found: usize },

    #[error("unknown flag: {0}")]
    UnknownFlag(char),

    #[error("flag given twice: {0}")]
    DuplicateFlag(char),

    #[error("invalid occurrence: {0:?}")]
    InvalidOccurrence(String),
}

/// A pattern the regex backend refused to compile.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid regex: {message}")]
pub struct PatternError {
    message: String,
}

impl PatternError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Backend-provided description of the failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn event(seq: u64, sender: &str, text: &str) -> MessageEvent {
        MessageEvent::new("freenode", "#test", sender, text, seq)
    }

    #[test]
    fn parse_then_evaluate() {
        let history = vec![event(0, "Rockj", "o_O"), event(1, "Rockj", "Du er en superhelt")];
        let req = parse_substitution("s/superhelt/idiot/").unwrap();
        let out = Substituter::new(DEFAULT_MAX_OUTPUT_LENGTH).evaluate(&req, &history);
        assert_eq!(out.as_deref(), Some("<Rockj> Du er en idiot"));
    }

    #[test]
    fn parse_error_messages() {
        assert_eq!(ParseError::UnknownFlag('x').to_string(), "unknown flag: x");
        assert_eq!(
            ParseError::FieldCount { found: 2 }.to_string(),
            "expected 3 separated fields, found 2"
        );
    }
}
