//! sedbot — Chat-History-Aware Substitution Bot
//!
//! This crate wraps the `sedbot-core` engine with per-channel history, opt-in
//! `troll` commands, and configuration, and exposes the host-facing `Bot`.

mod bot;
mod config;
mod history;

#[cfg(feature = "pyo3")]
mod python;

pub use bot::{Bot, ChatEvent, ChatMessage, Reply};
pub use config::{ConfigError, MetaRewriteConfig, SedConfig};
pub use history::{ChannelKey, HistoryStore, DEFAULT_HISTORY_CAPACITY};
pub use sedbot_core::{
    escape_field, is_substitution, parse_command, parse_substitution, unescape_field, Command,
    CommandKind, CompiledPattern, FlagSet, Match, MatchOutcome, MessageEvent, ParseError, PatternCompiler,
    PatternError, RegexCompiler, RegexPattern, Substituter, SubstitutionRequest, DEFAULT_MAX_OUTPUT_LENGTH,
};
