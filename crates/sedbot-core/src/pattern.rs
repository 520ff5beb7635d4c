use regex::{Regex, RegexBuilder};

use crate::PatternError;

/// One match of a compiled pattern, with its captured groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Byte offsets of the whole match in the searched text.
    pub start: usize,
    pub end: usize,
    /// `groups[0]` is capture group 1. `None` for groups that did not participate.
    groups: Vec<Option<String>>,
}

impl Match {
    pub fn new(start: usize, end: usize, groups: Vec<Option<String>>) -> Self {
        Self { start, end, groups }
    }

    /// Text captured by 1-based group `n`, if it participated in the match.
    pub fn group(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.groups.get(i))
            .and_then(|g| g.as_deref())
    }
}

/// A regex backend. The engine only ever goes through this seam.
pub trait PatternCompiler {
    type Pattern: CompiledPattern;

    fn compile(&self, pattern: &str, case_insensitive: bool) -> Result<Self::Pattern, PatternError>;
}

pub trait CompiledPattern {
    /// Number of capture groups declared by the pattern, not counting the whole match.
    fn group_count(&self) -> usize;

    fn is_match(&self, text: &str) -> bool;

    /// All non-overlapping matches, left to right.
    fn find_all(&self, text: &str) -> Vec<Match>;
}

/// The default backend, built on the `regex` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexCompiler;

#[derive(Debug, Clone)]
pub struct RegexPattern(Regex);

impl PatternCompiler for RegexCompiler {
    type Pattern = RegexPattern;

    fn compile(&self, pattern: &str, case_insensitive: bool) -> Result<RegexPattern, PatternError> {
        RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map(RegexPattern)
            .map_err(|e| PatternError::new(e.to_string()))
    }
}

impl CompiledPattern for RegexPattern {
    fn group_count(&self) -> usize {
        self.0.captures_len() - 1
    }

    fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }

    fn find_all(&self, text: &str) -> Vec<Match> {
        self.0
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let groups = caps
                    .iter()
                    .skip(1)
                    .map(|g| g.map(|m| m.as_str().to_string()))
                    .collect();
                Some(Match::new(whole.start(), whole.end(), groups))
            })
            .collect()
    }
}
