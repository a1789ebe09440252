//! Line tokenizer for the assembly syntax.
//!
//! Tokenizing never fails: malformed numeric and section text comes back as
//! first-class invalid tokens carrying the exact column and length of the
//! offending run, so diagnostics can point at the source without aborting
//! the scan.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static INT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());
// Fractional digits are required after `.` and exponent digits after `e`;
// `808.9a`, `4.` and `-55e` all fall through to InvalidNumber.
static FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?([eE][+-]?\d+)?$").unwrap());

/// One token with its position in the source line.
///
/// `col` is 1-based; tabs count one column each. `col + len - 1` never
/// exceeds the line length.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub col: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Int(i64),
    Float(f32),
    Register(u8),
    Str(String),
    /// Label declaration, e.g. `150:`. Label ids are non-negative integers.
    Label(u32),
    Mnemonic(String),
    /// Section marker, e.g. `.code`.
    Section(String),
    InvalidNumber,
    InvalidSection,
}

impl TokenKind {
    /// Short description for diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Int(_) => "integer",
            TokenKind::Float(_) => "float",
            TokenKind::Register(_) => "register",
            TokenKind::Str(_) => "string",
            TokenKind::Label(_) => "label",
            TokenKind::Mnemonic(_) => "identifier",
            TokenKind::Section(_) => "section",
            TokenKind::InvalidNumber => "invalid number",
            TokenKind::InvalidSection => "invalid section",
        }
    }
}

fn is_delimiter(c: char) -> bool {
    c == ' ' || c == '\t' || c == ','
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '=' | '<' | '>' | '!')
}

/// Tokenize one source line. Total: every character run maps to a token,
/// whitespace, commas and `//` comments excepted.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if is_delimiter(c) {
            i += 1;
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            break;
        }

        let start = i;
        if c == '"' {
            tokens.push(scan_string(&chars, &mut i));
        } else if c.is_ascii_digit() || (c == '-' && next_is_digit(&chars, i)) {
            tokens.push(scan_run(&chars, &mut i, classify_numeric));
        } else {
            tokens.push(scan_run(&chars, &mut i, classify_word));
        }
        debug_assert!(i > start);
    }

    tokens
}

fn next_is_digit(chars: &[char], i: usize) -> bool {
    chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
}

/// Consume characters up to the next delimiter or comment and classify the
/// whole run with `classify`.
fn scan_run(chars: &[char], i: &mut usize, classify: fn(&str) -> TokenKind) -> Token {
    let start = *i;
    while *i < chars.len()
        && !is_delimiter(chars[*i])
        && chars[*i] != '"'
        && !(chars[*i] == '/' && chars.get(*i + 1) == Some(&'/'))
    {
        *i += 1;
    }
    let run: String = chars[start..*i].iter().collect();
    Token {
        kind: classify(&run),
        col: start + 1,
        len: *i - start,
    }
}

fn classify_numeric(run: &str) -> TokenKind {
    if let Some(name) = run.strip_suffix(':') {
        // Digit-run label declaration, e.g. `150:`.
        if !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) {
            return match name.parse::<u32>() {
                Ok(label) => TokenKind::Label(label),
                Err(_) => TokenKind::InvalidNumber,
            };
        }
        return TokenKind::InvalidNumber;
    }
    if INT_RE.is_match(run) {
        return match run.parse::<i64>() {
            Ok(value) => TokenKind::Int(value),
            Err(_) => TokenKind::InvalidNumber,
        };
    }
    if FLOAT_RE.is_match(run) {
        return match run.parse::<f32>() {
            Ok(value) => TokenKind::Float(value),
            Err(_) => TokenKind::InvalidNumber,
        };
    }
    TokenKind::InvalidNumber
}

fn classify_word(run: &str) -> TokenKind {
    let mut chars = run.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return TokenKind::InvalidNumber,
    };

    if first == '.' {
        let rest = &run[1..];
        if !rest.is_empty()
            && rest.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && rest.chars().all(is_ident_char)
        {
            return TokenKind::Section(rest.to_string());
        }
        // `.7429` looks like a section marker but is not one.
        return TokenKind::InvalidSection;
    }

    if run.ends_with(':') {
        // Label declarations must be numeric ids; digit-run labels are
        // handled by the numeric scan, so anything arriving here is bad.
        return TokenKind::InvalidNumber;
    }

    if first == 'r' && run.len() > 1 && run[1..].chars().all(|c| c.is_ascii_digit()) {
        return match run[1..].parse::<u8>() {
            Ok(register) => TokenKind::Register(register),
            Err(_) => TokenKind::InvalidNumber,
        };
    }

    if (first.is_ascii_alphabetic() || first == '_') && chars.all(is_ident_char) {
        return TokenKind::Mnemonic(run.to_string());
    }

    TokenKind::InvalidNumber
}

/// Quoted string literal with `\" \\ \n \r \t \0` escapes. An unterminated
/// literal extends to the end of the line.
fn scan_string(chars: &[char], i: &mut usize) -> Token {
    let start = *i;
    *i += 1; // opening quote
    let mut value = String::new();

    while *i < chars.len() {
        let c = chars[*i];
        *i += 1;
        match c {
            '"' => break,
            '\\' => {
                let escaped = if *i < chars.len() {
                    let e = chars[*i];
                    *i += 1;
                    e
                } else {
                    break;
                };
                match escaped {
                    'n' => value.push('\n'),
                    'r' => value.push('\r'),
                    't' => value.push('\t'),
                    '0' => value.push('\0'),
                    other => value.push(other),
                }
            }
            other => value.push(other),
        }
    }

    Token {
        kind: TokenKind::Str(value),
        col: start + 1,
        len: *i - start,
    }
}
