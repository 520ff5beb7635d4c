use crate::ParseError;

/// A fully parsed `s<SEP>pattern<SEP>replacement<SEP>flags` request.
///
/// `pattern` and `replacement` are already unescaped (`\SEP` became `SEP`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRequest {
    pub separator: char,
    pub pattern: String,
    pub replacement: String,
    pub flags: FlagSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSet {
    pub case_insensitive: bool,
    pub global: bool,
    /// 1-based index of the first occurrence to replace.
    pub start_occurrence: usize,
    pub verbose: bool,
}

impl Default for FlagSet {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            global: false,
            start_occurrence: 1,
            verbose: false,
        }
    }
}

/// The keyword that introduced a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `s/pat/rep/flags`: correct the author's own last matching message.
    Substitute,
    /// `troll/pat/rep/flags`: correct someone else's last matching message.
    Troll,
}

impl CommandKind {
    fn keyword(self) -> &'static str {
        match self {
            CommandKind::Substitute => "s",
            CommandKind::Troll => "troll",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    pub request: SubstitutionRequest,
}

/// Parse either command form from a raw chat line.
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let kind = if input.starts_with(CommandKind::Troll.keyword()) {
        CommandKind::Troll
    } else {
        CommandKind::Substitute
    };
    let request = parse_with_keyword(input, kind)?;
    Ok(Command { kind, request })
}

/// Parse a `s<SEP>pattern<SEP>replacement<SEP>flags` command.
pub fn parse_substitution(input: &str) -> Result<SubstitutionRequest, ParseError> {
    parse_with_keyword(input, CommandKind::Substitute)
}

/// True when `text` is a well-formed substitution command.
pub fn is_substitution(text: &str) -> bool {
    parse_substitution(text).is_ok()
}

fn parse_with_keyword(input: &str, kind: CommandKind) -> Result<SubstitutionRequest, ParseError> {
    let rest = input
        .strip_prefix(kind.keyword())
        .ok_or(ParseError::NotACommand)?;

    let mut chars = rest.chars();
    let separator = chars.next().ok_or(ParseError::MissingSeparator)?;
    if separator.is_alphanumeric() {
        // "sorry", "trolling": a plain word, not a command.
        return Err(ParseError::NotACommand);
    }
    if separator == '\\' {
        return Err(ParseError::InvalidSeparator(separator));
    }

    let fields = split_fields(chars.as_str(), separator);
    let [pattern, replacement, flags] = fields.as_slice() else {
        return Err(ParseError::FieldCount { found: fields.len() });
    };

    Ok(SubstitutionRequest {
        separator,
        pattern: unescape_field(pattern, separator),
        replacement: unescape_field(replacement, separator),
        flags: parse_flags(flags)?,
    })
}

/// Split `body` on every `sep` not immediately preceded by a backslash.
///
/// Fields are returned raw (still escaped).
fn split_fields(body: &str, sep: char) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut chars = body.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch == '\\' {
            if matches!(chars.peek(), Some(&(_, next)) if next == sep) {
                chars.next();
            }
            continue;
        }
        if ch == sep {
            fields.push(&body[start..idx]);
            start = idx + ch.len_utf8();
        }
    }
    fields.push(&body[start..]);
    fields
}

/// Turn every `\SEP` into a literal `SEP`. Other backslashes are kept as-is.
pub fn unescape_field(field: &str, sep: char) -> String {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.peek() == Some(&sep) {
            continue;
        }
        out.push(ch);
    }
    out
}

/// Inverse of [`unescape_field`]: prefix every `sep` with a backslash.
pub fn escape_field(text: &str, sep: char) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == sep {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// `[digits][g][i][v]`, letters in any order, each at most once. No whitespace.
fn parse_flags(raw: &str) -> Result<FlagSet, ParseError> {
    let digits_end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, letters) = raw.split_at(digits_end);

    let mut flags = FlagSet::default();
    if !digits.is_empty() {
        let n: usize = digits
            .parse()
            .map_err(|_| ParseError::InvalidOccurrence(digits.to_string()))?;
        if n == 0 {
            return Err(ParseError::InvalidOccurrence(digits.to_string()));
        }
        flags.start_occurrence = n;
    }

    for ch in letters.chars() {
        let slot = match ch {
            'g' => &mut flags.global,
            'i' => &mut flags.case_insensitive,
            'v' => &mut flags.verbose,
            _ => return Err(ParseError::UnknownFlag(ch)),
        };
        if *slot {
            return Err(ParseError::DuplicateFlag(ch));
        }
        *slot = true;
    }
    Ok(flags)
}
