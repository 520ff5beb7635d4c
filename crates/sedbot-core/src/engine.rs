use tracing::debug;

use crate::message::MessageEvent;
use crate::parse::{is_substitution, FlagSet, SubstitutionRequest};
use crate::pattern::{CompiledPattern, Match, PatternCompiler, RegexCompiler};

/// Cap on the length of substituted text, in chars.
pub const DEFAULT_MAX_OUTPUT_LENGTH: usize = 400;

/// What happened when a request was evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The rendered `<sender> text` line.
    Replaced(String),
    NoCandidateMessage,
    PatternDidNotCompile,
    NoMatchFound,
    UndefinedGroupReference(usize),
    /// Carries the cap that was exceeded.
    OutputTooLong(usize),
}

impl MatchOutcome {
    /// The line a host should send, if any.
    ///
    /// Failures are silent unless `verbose` is set.
    pub fn render(&self, verbose: bool) -> Option<String> {
        let diagnostic = match self {
            MatchOutcome::Replaced(line) => return Some(line.clone()),
            MatchOutcome::PatternDidNotCompile => {
                "The Regular Expression pattern could not be compiled.".to_string()
            }
            MatchOutcome::NoCandidateMessage | MatchOutcome::NoMatchFound => {
                "Found no match to your search.".to_string()
            }
            MatchOutcome::UndefinedGroupReference(n) => {
                format!("No group {n}. Define the matching group.")
            }
            MatchOutcome::OutputTooLong(limit) => {
                format!("ERROR: Replaced pattern was longer than {limit} characters.")
            }
        };
        verbose.then_some(diagnostic)
    }

    fn label(&self) -> &'static str {
        match self {
            MatchOutcome::Replaced(_) => "replaced",
            MatchOutcome::NoCandidateMessage => "no_candidate",
            MatchOutcome::PatternDidNotCompile => "bad_pattern",
            MatchOutcome::NoMatchFound => "no_match",
            MatchOutcome::UndefinedGroupReference(_) => "undefined_group",
            MatchOutcome::OutputTooLong(_) => "too_long",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Group(usize),
}

/// A replacement string split into literal text and `$n` references.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    /// `$` + digit starts a reference; more digits are taken while the number
    /// stays within `group_count`. `$0` and a bare `$` are literal.
    ///
    /// Fails with the offending group number.
    fn parse(raw: &str, group_count: usize) -> Result<Self, usize> {
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '$' {
                literal.push(ch);
                continue;
            }
            let first = match chars.peek().and_then(|c| c.to_digit(10)) {
                Some(d) if d != 0 => d as usize,
                _ => {
                    literal.push(ch);
                    continue;
                }
            };
            chars.next();
            if first > group_count {
                return Err(first);
            }
            let mut index = first;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                let next = index * 10 + d as usize;
                if next > group_count {
                    break;
                }
                index = next;
                chars.next();
            }
            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Group(index));
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }
        Ok(Self { pieces })
    }

    fn expand_into(&self, m: &Match, out: &mut String) {
        for piece in &self.pieces {
            match piece {
                Piece::Literal(s) => out.push_str(s),
                Piece::Group(n) => out.push_str(m.group(*n).unwrap_or("")),
            }
        }
    }
}

/// The substitution engine.
///
/// Generic over the regex backend so callers can inject their own.
#[derive(Debug, Clone)]
pub struct Substituter<C = RegexCompiler> {
    compiler: C,
    max_output_length: usize,
}

impl Substituter<RegexCompiler> {
    pub fn new(max_output_length: usize) -> Self {
        Self::with_compiler(RegexCompiler, max_output_length)
    }
}

impl Default for Substituter<RegexCompiler> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_OUTPUT_LENGTH)
    }
}

impl<C: PatternCompiler> Substituter<C> {
    pub fn with_compiler(compiler: C, max_output_length: usize) -> Self {
        Self {
            compiler,
            max_output_length,
        }
    }

    /// Evaluate `request` against candidate history and render the result.
    ///
    /// `history` holds the messages the command may correct, oldest first: the
    /// author's own for `s`, everyone else's for `troll`.
    pub fn evaluate(&self, request: &SubstitutionRequest, history: &[MessageEvent]) -> Option<String> {
        self.outcome(request, history).render(request.flags.verbose)
    }

    /// Evaluate `request` without rendering.
    pub fn outcome(&self, request: &SubstitutionRequest, history: &[MessageEvent]) -> MatchOutcome {
        let outcome = self.outcome_inner(request, history);
        debug!(
            pattern = %request.pattern,
            outcome = outcome.label(),
            history_len = history.len(),
            "evaluated substitution"
        );
        outcome
    }

    fn outcome_inner(&self, request: &SubstitutionRequest, history: &[MessageEvent]) -> MatchOutcome {
        let pattern = match self.compiler.compile(&request.pattern, request.flags.case_insensitive) {
            Ok(pattern) => pattern,
            Err(e) => {
                debug!(pattern = %request.pattern, error = e.message(), "pattern did not compile");
                return MatchOutcome::PatternDidNotCompile;
            }
        };

        // Most recent first; earlier commands are never corrected.
        let candidate = history
            .iter()
            .rev()
            .filter(|ev| !is_substitution(&ev.text))
            .find(|ev| pattern.is_match(&ev.text));
        let Some(candidate) = candidate else {
            return MatchOutcome::NoCandidateMessage;
        };

        match self.substitute(&pattern, request, &candidate.text) {
            Ok(text) => MatchOutcome::Replaced(format!("<{}> {}", candidate.sender, text)),
            Err(outcome) => outcome,
        }
    }

    fn substitute(
        &self,
        pattern: &C::Pattern,
        request: &SubstitutionRequest,
        text: &str,
    ) -> Result<String, MatchOutcome> {
        let matches = pattern.find_all(text);
        let selected = select_occurrences(&matches, request.flags).ok_or(MatchOutcome::NoMatchFound)?;
        let template = Template::parse(&request.replacement, pattern.group_count())
            .map_err(MatchOutcome::UndefinedGroupReference)?;

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in selected {
            out.push_str(&text[last..m.start]);
            template.expand_into(m, &mut out);
            last = m.end;
        }
        out.push_str(&text[last..]);

        if out.chars().count() > self.max_output_length {
            return Err(MatchOutcome::OutputTooLong(self.max_output_length));
        }
        Ok(out)
    }
}

/// The `start_occurrence`-th match alone, or it and every later one when global.
fn select_occurrences(matches: &[Match], flags: FlagSet) -> Option<&[Match]> {
    let first = flags.start_occurrence.checked_sub(1)?;
    if first >= matches.len() {
        return None;
    }
    if flags.global {
        Some(&matches[first..])
    } else {
        Some(&matches[first..=first])
    }
}
