//! Parameter paths: tokenizing, joining and tolerant comparison
//!
//! A parameter path such as `ingress.hosts[0]."x.y/z"` is turned into a
//! sequence of tokens. Numeric indices collapse to the wildcard `[N]`,
//! `{{ ... }}` blocks become dynamic tokens, and quoted or parenthesised
//! fragments keep their separators and are flagged special.

use core::fmt;
use serde::{Serialize, Serializer};

/// Canonical name of every array element token
pub const INDEX_TOKEN: &str = "[N]";

/// What kind of path segment a token represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Plain identifier
    Key,
    /// Array element, always named `[N]`
    Index,
    /// Templating placeholder such as `{{ .name }}`
    Dynamic,
    /// Key carrying separators, parentheses or quotes, kept verbatim
    Special,
}

/// Markers that surrounded a special token in its textual form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Wrap {
    #[default]
    None,
    DoubleQuote,
    SingleQuote,
    Paren,
    Bracket,
}

/// One segment of a parameter path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    name: String,
    kind: TokenKind,
    wrap: Wrap,
}

impl Token {
    /// Build a token from a bare mapping key as it appears in a document.
    ///
    /// The kind is derived from the text: placeholders become dynamic, keys
    /// containing separators, parentheses or quotes become special.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        let kind = if key.contains("{{") {
            TokenKind::Dynamic
        } else if key == INDEX_TOKEN {
            TokenKind::Index
        } else if key.contains(['.', '/', '\\', '(', ')', '"', '\'']) {
            TokenKind::Special
        } else {
            TokenKind::Key
        };
        Self {
            name: key.to_owned(),
            kind,
            wrap: Wrap::None,
        }
    }

    /// The array element wildcard `[N]`
    #[must_use]
    pub fn index() -> Self {
        Self {
            name: INDEX_TOKEN.to_owned(),
            kind: TokenKind::Index,
            wrap: Wrap::None,
        }
    }

    /// A special token whose payload was enclosed in `wrap` markers
    #[must_use]
    pub fn special(payload: &str, wrap: Wrap) -> Self {
        Self {
            name: payload.to_owned(),
            kind: TokenKind::Special,
            wrap,
        }
    }

    fn dynamic(text: &str) -> Self {
        Self {
            name: text.to_owned(),
            kind: TokenKind::Dynamic,
            wrap: Wrap::None,
        }
    }

    fn plain(text: &str) -> Self {
        if text.contains(['(', ')']) {
            return Self::special(text, Wrap::None);
        }
        Self {
            name: text.to_owned(),
            kind: TokenKind::Key,
            wrap: Wrap::None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    #[must_use]
    pub const fn wrap(&self) -> Wrap {
        self.wrap
    }

    /// Tolerant comparison of two tokens: equal names, or either side is
    /// dynamic or special.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.name == other.name
            || matches!(self.kind, TokenKind::Dynamic | TokenKind::Special)
            || matches!(other.kind, TokenKind::Dynamic | TokenKind::Special)
    }

    fn render(&self, out: &mut String) {
        match (self.kind, self.wrap) {
            (TokenKind::Special, Wrap::DoubleQuote) => {
                out.push('"');
                out.push_str(&self.name.replace('\\', "\\\\").replace('"', "\\\""));
                out.push('"');
            }
            (TokenKind::Special, Wrap::SingleQuote) => {
                out.push('\'');
                out.push_str(&self.name.replace('\'', "\\'"));
                out.push('\'');
            }
            (TokenKind::Special, Wrap::Paren) => {
                out.push('(');
                out.push_str(&self.name);
                out.push(')');
            }
            (TokenKind::Special, Wrap::Bracket) => {
                out.push_str("[\"");
                out.push_str(&self.name);
                out.push_str("\"]");
            }
            _ => out.push_str(&self.name),
        }
    }

    const fn attaches_without_dot(&self) -> bool {
        matches!(self.kind, TokenKind::Index) || matches!(self.wrap, Wrap::Bracket)
    }
}

/// A tokenized parameter path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParamPath {
    tokens: Vec<Token>,
}

impl ParamPath {
    #[must_use]
    pub const fn root() -> Self {
        Self { tokens: Vec::new() }
    }

    /// Tokenize a textual path
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self {
            tokens: tokenize(path),
        }
    }

    #[must_use]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Token> {
        self.tokens.last()
    }

    /// Return a copy of this path extended by one token
    #[must_use]
    pub fn child(&self, token: Token) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token);
        Self { tokens }
    }

    /// Tolerant path comparison, see [`matches`]
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        matches(&self.tokens, &other.tokens)
    }
}

impl fmt::Display for ParamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join(&self.tokens))
    }
}

impl Serialize for ParamPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// True iff both token lists have the same length and every position
/// agrees on the name or has a dynamic or special token on either side.
#[must_use]
pub fn matches(template_path: &[Token], schema_path: &[Token]) -> bool {
    template_path.len() == schema_path.len()
        && template_path
            .iter()
            .zip(schema_path)
            .all(|(left, right)| left.matches(right))
}

/// Render tokens back into the dotted textual form
#[must_use]
pub fn join(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (position, token) in tokens.iter().enumerate() {
        if position > 0 && !token.attaches_without_dot() {
            out.push('.');
        }
        token.render(&mut out);
    }
    out
}

const fn is_separator(c: char) -> bool {
    matches!(c, '.' | '/' | '\\')
}

const fn ends_plain_run(c: char) -> bool {
    is_separator(c) || matches!(c, '[' | ']' | '{' | '}' | '"' | '\'')
}

/// Split a textual path into tokens.
///
/// Separators (`.`, `/`, `\`) outside quotes, brackets, parentheses and
/// placeholders split segments; a leading `/` therefore disappears.
/// Unbalanced markers swallow everything up to the next separator and
/// yield a special token carrying the raw fragment.
#[must_use]
pub fn tokenize(path: &str) -> Vec<Token> {
    let chars: Vec<char> = path.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(&c) = chars.get(pos) {
        if is_separator(c) {
            pos += 1;
            continue;
        }

        let (token, next) = match c {
            '"' | '\'' => scan_quoted(&chars, pos, c),
            '[' => scan_bracket(&chars, pos),
            '{' if chars.get(pos + 1) == Some(&'{') => scan_placeholder(&chars, pos),
            '(' => scan_paren(&chars, pos),
            ']' | '{' | '}' => scan_unbalanced(&chars, pos),
            _ => {
                let end = find_from(&chars, pos, ends_plain_run);
                let text: String = chars[pos..end].iter().collect();
                (Token::plain(&text), end)
            }
        };
        tokens.push(token);
        pos = next;
    }

    tokens
}

fn find_from(chars: &[char], start: usize, stop: impl Fn(char) -> bool) -> usize {
    chars[start..]
        .iter()
        .position(|&c| stop(c))
        .map_or(chars.len(), |offset| start + offset)
}

fn scan_unbalanced(chars: &[char], start: usize) -> (Token, usize) {
    let end = find_from(chars, start, is_separator).max(start + 1);
    let text: String = chars[start..end].iter().collect();
    (Token::special(&text, Wrap::None), end)
}

fn scan_quoted(chars: &[char], start: usize, quote: char) -> (Token, usize) {
    let mut payload = String::new();
    let mut pos = start + 1;
    while let Some(&c) = chars.get(pos) {
        if c == '\\' && let Some(&escaped) = chars.get(pos + 1) {
            payload.push(escaped);
            pos += 2;
            continue;
        }
        if c == quote {
            let wrap = if quote == '"' {
                Wrap::DoubleQuote
            } else {
                Wrap::SingleQuote
            };
            return (Token::special(&payload, wrap), pos + 1);
        }
        payload.push(c);
        pos += 1;
    }
    scan_unbalanced(chars, start)
}

fn scan_bracket(chars: &[char], start: usize) -> (Token, usize) {
    let Some(offset) = chars[start + 1..].iter().position(|&c| c == ']') else {
        return scan_unbalanced(chars, start);
    };
    let close = start + 1 + offset;
    let inner: String = chars[start + 1..close].iter().collect();
    let inner = inner.trim();
    let token = if inner == "N" || inner == "*" || (!inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit())) {
        Token::index()
    } else {
        let payload = inner
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .or_else(|| inner.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')))
            .unwrap_or(inner);
        Token::special(payload, Wrap::Bracket)
    };
    (token, close + 1)
}

fn scan_placeholder(chars: &[char], start: usize) -> (Token, usize) {
    let mut pos = start + 2;
    while pos + 1 < chars.len() {
        if chars[pos] == '}' && chars[pos + 1] == '}' {
            let text: String = chars[start..pos + 2].iter().collect();
            return (Token::dynamic(&text), pos + 2);
        }
        pos += 1;
    }
    scan_unbalanced(chars, start)
}

fn scan_paren(chars: &[char], start: usize) -> (Token, usize) {
    let mut depth = 0_usize;
    for (pos, &c) in chars.iter().enumerate().skip(start) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let payload: String = chars[start + 1..pos].iter().collect();
                    return (Token::special(&payload, Wrap::Paren), pos + 1);
                }
            }
            _ => {}
        }
    }
    scan_unbalanced(chars, start)
}
