//! Configurable tokenizer over raw text.
//!
//! The tokenizer knows nothing about grammar semantics. Callers configure
//! which punctuation, keywords and comment markers exist, then pull tokens one
//! at a time with [`Tokenizer::next_token`]. Tokens borrow from the input
//! buffer and own no text.
//!
//! Punctuation is matched in configuration order, so when one punct is a
//! prefix of another the longer one must come first (`==` before `=`).

use std::fmt;

use crate::diagnostics::{Diagnostic, Reporter, Severity, StderrReporter};

use super::span::{FileId, Location, Span};

/// Kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Invalid,
    End,
    Int,
    Symbol,
    Keyword,
    Punct,
    String,
}

impl TokenKind {
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Invalid => "Invalid",
            TokenKind::End => "End",
            TokenKind::Int => "Int",
            TokenKind::Symbol => "Symbol",
            TokenKind::Keyword => "Keyword",
            TokenKind::Punct => "Punct",
            TokenKind::String => "String",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token: a view into the tokenizer's input.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Source text covered by the token
    pub text: &'a str,
    pub span: Span,
    pub location: Location,
    /// Parsed value for `Int` tokens (wraps on overflow)
    pub int_value: u64,
    /// Index into the configured puncts for `Punct` tokens
    pub punct_index: usize,
    /// Index into the configured keywords for `Keyword` tokens
    pub keyword_index: usize,
}

impl<'a> Token<'a> {
    /// False exactly when the token is `End` or `Invalid`.
    pub fn is_ok(&self) -> bool {
        !matches!(self.kind, TokenKind::End | TokenKind::Invalid)
    }
}

/// Which punctuation, keywords and comments a tokenizer recognizes.
#[derive(Debug, Clone, Default)]
pub struct TokenizerConfig {
    pub puncts: Vec<String>,
    pub keywords: Vec<String>,
    pub line_comments: Vec<String>,
    pub block_comments: Vec<(String, String)>,
    /// Recognize `"..."` string literals (no escapes).
    pub strings: bool,
}

impl TokenizerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn puncts<I, S>(mut self, puncts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.puncts = puncts.into_iter().map(Into::into).collect();
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn line_comments<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line_comments = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn block_comments<I, S>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.block_comments = pairs
            .into_iter()
            .map(|(open, close)| (open.into(), close.into()))
            .collect();
        self
    }

    pub fn strings(mut self, enabled: bool) -> Self {
        self.strings = enabled;
        self
    }
}

/// Cursor position, usable with [`Tokenizer::save`] and [`Tokenizer::rewind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenizerState {
    cur: usize,
    bol: usize,
    row: usize,
}

impl TokenizerState {
    fn peek(&self, content: &str) -> Option<char> {
        content[self.cur..].chars().next()
    }

    fn starts_with(&self, content: &str, prefix: &str) -> bool {
        content[self.cur..].starts_with(prefix)
    }

    fn chop_char(&mut self, content: &str) -> bool {
        match self.peek(content) {
            Some(c) => {
                self.cur += c.len_utf8();
                if c == '\n' {
                    self.bol = self.cur;
                    self.row += 1;
                }
                true
            }
            None => false,
        }
    }

    /// Advance by `n` bytes, always stopping on a char boundary.
    fn chop_bytes(&mut self, content: &str, n: usize) {
        let target = (self.cur + n).min(content.len());
        while self.cur < target && self.chop_char(content) {}
    }

    fn chop_while(&mut self, content: &str, pred: impl Fn(char) -> bool) {
        while self.peek(content).is_some_and(&pred) {
            self.chop_char(content);
        }
    }

    fn drop_until_endline(&mut self, content: &str) {
        while let Some(c) = self.peek(content) {
            self.chop_char(content);
            if c == '\n' {
                break;
            }
        }
    }

    // Block comments do not nest.
    fn chop_until_prefix(&mut self, content: &str, prefix: &str) {
        while self.cur < content.len() && !self.starts_with(content, prefix) {
            self.chop_char(content);
        }
    }
}

/// Tokenizer over a single input buffer.
pub struct Tokenizer<'a> {
    file: FileId,
    content: &'a str,
    state: TokenizerState,
    config: TokenizerConfig,
    reporter: Box<dyn Reporter + 'a>,
    last_diagnostic: Option<Diagnostic>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer that reports to stderr.
    pub fn new(file: impl Into<FileId>, content: &'a str, config: TokenizerConfig) -> Self {
        Self {
            file: file.into(),
            content,
            state: TokenizerState::default(),
            config,
            reporter: Box::new(StderrReporter::new()),
            last_diagnostic: None,
        }
    }

    /// Replace the diagnostic reporter.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'a) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Text of the punct at `index`.
    pub fn punct(&self, index: usize) -> &str {
        self.config.puncts.get(index).map_or("?", String::as_str)
    }

    /// Text of the keyword at `index`.
    pub fn keyword(&self, index: usize) -> &str {
        self.config.keywords.get(index).map_or("?", String::as_str)
    }

    /// Current cursor location.
    pub fn location(&self) -> Location {
        Location {
            file: self.file.clone(),
            row: self.state.row as u32 + 1,
            column: (self.state.cur - self.state.bol) as u32 + 1,
        }
    }

    pub fn save(&self) -> TokenizerState {
        self.state
    }

    pub fn rewind(&mut self, state: TokenizerState) {
        self.state = state;
    }

    /// The most recent expectation failure, if any.
    pub fn take_diagnostic(&mut self) -> Option<Diagnostic> {
        self.last_diagnostic.take()
    }

    fn skip_trivia(&mut self) {
        let content = self.content;
        loop {
            self.state.chop_while(content, char::is_whitespace);

            if self
                .config
                .line_comments
                .iter()
                .any(|prefix| !prefix.is_empty() && self.state.starts_with(content, prefix))
            {
                self.state.drop_until_endline(content);
                continue;
            }

            let block = self
                .config
                .block_comments
                .iter()
                .find(|(open, _)| !open.is_empty() && self.state.starts_with(content, open));
            if let Some((open, close)) = block {
                self.state.chop_bytes(content, open.len());
                self.state.chop_until_prefix(content, close);
                self.state.chop_bytes(content, close.len());
                continue;
            }

            break;
        }
    }

    /// Read the next token.
    ///
    /// The success flag lives on the token: [`Token::is_ok`] is false exactly
    /// for `End` and `Invalid`.
    pub fn next_token(&mut self) -> Token<'a> {
        self.skip_trivia();

        let content = self.content;
        let begin = self.state.cur;
        let mut token = Token {
            kind: TokenKind::End,
            text: "",
            span: Span::new(begin, begin),
            location: self.location(),
            int_value: 0,
            punct_index: 0,
            keyword_index: 0,
        };

        let Some(first) = self.state.peek(content) else {
            return token;
        };

        let punct = self
            .config
            .puncts
            .iter()
            .position(|p| !p.is_empty() && self.state.starts_with(content, p));

        if let Some(index) = punct {
            let len = self.config.puncts[index].len();
            self.state.chop_bytes(content, len);
            token.kind = TokenKind::Punct;
            token.punct_index = index;
        } else if self.config.strings && first == '"' {
            self.state.chop_char(content);
            self.state.chop_while(content, |c| c != '"' && c != '\n');
            token.kind = if self.state.peek(content) == Some('"') {
                self.state.chop_char(content);
                TokenKind::String
            } else {
                TokenKind::Invalid
            };
        } else if first.is_ascii_digit() {
            token.kind = TokenKind::Int;
            while let Some(digit) = self.state.peek(content).and_then(|c| c.to_digit(10)) {
                token.int_value = token
                    .int_value
                    .wrapping_mul(10)
                    .wrapping_add(u64::from(digit));
                self.state.chop_char(content);
            }
        } else if is_symbol_start(first) {
            self.state.chop_while(content, is_symbol);
            token.kind = TokenKind::Symbol;
            let text = &content[begin..self.state.cur];
            if let Some(index) = self.config.keywords.iter().position(|k| k == text) {
                token.kind = TokenKind::Keyword;
                token.keyword_index = index;
            }
        } else {
            self.state.chop_char(content);
            token.kind = TokenKind::Invalid;
        }

        token.span = Span::new(begin, self.state.cur);
        token.text = &content[begin..self.state.cur];
        token
    }

    fn fail(&mut self, location: &Location, message: String) -> bool {
        self.reporter.report(location, Severity::Error, &message);
        self.last_diagnostic = Some(Diagnostic::error(location.clone(), message));
        false
    }

    pub fn expect_kind(&mut self, token: &Token<'_>, kind: TokenKind) -> bool {
        self.expect_one_of_kinds(token, &[kind])
    }

    pub fn expect_one_of_kinds(&mut self, token: &Token<'_>, kinds: &[TokenKind]) -> bool {
        if kinds.contains(&token.kind) {
            return true;
        }

        let expected = kinds
            .iter()
            .map(|k| k.name())
            .collect::<Vec<_>>()
            .join(", ");
        let message = if token.kind == TokenKind::End {
            format!("Expected {} but got {}", expected, token.kind)
        } else {
            format!("Expected {} but got {} `{}`", expected, token.kind, token.text)
        };
        self.fail(&token.location, message)
    }

    pub fn expect_punct(&mut self, token: &Token<'_>, punct_index: usize) -> bool {
        self.expect_one_of_puncts(token, &[punct_index])
    }

    pub fn expect_one_of_puncts(&mut self, token: &Token<'_>, punct_indices: &[usize]) -> bool {
        if !self.expect_kind(token, TokenKind::Punct) {
            return false;
        }
        if punct_indices.contains(&token.punct_index) {
            return true;
        }

        let expected = quoted(punct_indices.iter().map(|&i| self.punct(i)));
        let message = format!("Expected {} but got `{}`", expected, self.punct(token.punct_index));
        self.fail(&token.location, message)
    }

    pub fn expect_keyword(&mut self, token: &Token<'_>, keyword_index: usize) -> bool {
        self.expect_one_of_keywords(token, &[keyword_index])
    }

    pub fn expect_one_of_keywords(&mut self, token: &Token<'_>, keyword_indices: &[usize]) -> bool {
        if !self.expect_kind(token, TokenKind::Keyword) {
            return false;
        }
        if keyword_indices.contains(&token.keyword_index) {
            return true;
        }

        let expected = quoted(keyword_indices.iter().map(|&i| self.keyword(i)));
        let noun = if keyword_indices.len() == 1 { "keyword" } else { "keywords" };
        let message = format!(
            "Expected {} {} but got keyword `{}`",
            noun,
            expected,
            self.keyword(token.keyword_index)
        );
        self.fail(&token.location, message)
    }
}

fn quoted<'s>(items: impl Iterator<Item = &'s str>) -> String {
    items.map(|s| format!("`{}`", s)).collect::<Vec<_>>().join(", ")
}

fn is_symbol_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_symbol(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingReporter;
    use pretty_assertions::assert_eq;

    fn config() -> TokenizerConfig {
        TokenizerConfig::new()
            .puncts(["==", "=", "(", ")", ","])
            .keywords(["if", "else"])
            .line_comments(["//", "#"])
            .block_comments([("/*", "*/")])
    }

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        let mut tokenizer = Tokenizer::new("test", source, config()).with_reporter(CollectingReporter::new());
        let mut out = Vec::new();
        loop {
            let token = tokenizer.next_token();
            if token.kind == TokenKind::End {
                break;
            }
            out.push((token.kind, token.text.to_string()));
        }
        out
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("if foo == 42"),
            vec![
                (TokenKind::Keyword, "if".to_string()),
                (TokenKind::Symbol, "foo".to_string()),
                (TokenKind::Punct, "==".to_string()),
                (TokenKind::Int, "42".to_string()),
            ]
        );
    }

    #[test]
    fn test_punct_order_is_respected() {
        let mut tokenizer = Tokenizer::new("test", "= ==", config());
        let first = tokenizer.next_token();
        let second = tokenizer.next_token();
        assert_eq!(first.punct_index, 1);
        assert_eq!(second.punct_index, 0);
    }

    #[test]
    fn test_int_value() {
        let mut tokenizer = Tokenizer::new("test", "  1234", config());
        let token = tokenizer.next_token();
        assert_eq!(token.kind, TokenKind::Int);
        assert_eq!(token.int_value, 1234);
        assert_eq!(token.span, Span::new(2, 6));
    }

    #[test]
    fn test_int_overflow_wraps() {
        let mut tokenizer = Tokenizer::new("test", "99999999999999999999999", config());
        let token = tokenizer.next_token();
        assert_eq!(token.kind, TokenKind::Int);
        assert_eq!(token.text.len(), 23);
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// header\na /* inline\n comment */ b # trailing\n/* x */ /* y */c";
        assert_eq!(
            kinds(source),
            vec![
                (TokenKind::Symbol, "a".to_string()),
                (TokenKind::Symbol, "b".to_string()),
                (TokenKind::Symbol, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_block_comments_do_not_nest() {
        assert_eq!(
            kinds("/* a /* b */ c */"),
            vec![
                (TokenKind::Symbol, "c".to_string()),
                (TokenKind::Invalid, "*".to_string()),
                (TokenKind::Invalid, "/".to_string()),
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment_reaches_end() {
        let mut tokenizer = Tokenizer::new("test", "a /* never closed", config());
        assert_eq!(tokenizer.next_token().kind, TokenKind::Symbol);
        let end = tokenizer.next_token();
        assert_eq!(end.kind, TokenKind::End);
        assert!(!end.is_ok());
    }

    #[test]
    fn test_empty_comment_markers_are_ignored() {
        let config = TokenizerConfig::new()
            .line_comments([""])
            .block_comments([("", "*/")]);
        let mut tokenizer = Tokenizer::new("test", "a", config);
        let a = tokenizer.next_token();
        assert_eq!(a.kind, TokenKind::Symbol);
        assert_eq!(a.text, "a");
        assert_eq!(tokenizer.next_token().kind, TokenKind::End);
    }

    #[test]
    fn test_invalid_consumes_one_char() {
        let mut tokenizer = Tokenizer::new("test", "@é", config());
        let at = tokenizer.next_token();
        assert_eq!(at.kind, TokenKind::Invalid);
        assert!(!at.is_ok());
        assert_eq!(at.text, "@");
        let accent = tokenizer.next_token();
        assert_eq!(accent.kind, TokenKind::Invalid);
        assert_eq!(accent.text, "é");
    }

    #[test]
    fn test_locations_track_rows_and_columns() {
        let mut tokenizer = Tokenizer::new("g.bnf", "a\n  bb\n\n c", config());
        let a = tokenizer.next_token();
        let b = tokenizer.next_token();
        let c = tokenizer.next_token();
        assert_eq!(a.location, Location::new("g.bnf", 1, 1));
        assert_eq!(b.location, Location::new("g.bnf", 2, 3));
        assert_eq!(c.location, Location::new("g.bnf", 4, 2));
    }

    #[test]
    fn test_save_and_rewind() {
        let mut tokenizer = Tokenizer::new("test", "a\nb c", config());
        tokenizer.next_token();
        let state = tokenizer.save();
        let b = tokenizer.next_token();
        tokenizer.next_token();
        tokenizer.rewind(state);
        assert_eq!(tokenizer.next_token(), b);
    }

    #[test]
    fn test_strings_when_enabled() {
        let mut tokenizer = Tokenizer::new("test", "\"hi there\" \"open", config().strings(true));
        let s = tokenizer.next_token();
        assert_eq!(s.kind, TokenKind::String);
        assert_eq!(s.text, "\"hi there\"");
        assert_eq!(tokenizer.next_token().kind, TokenKind::Invalid);
    }

    #[test]
    fn test_expect_kind_reports_mismatch() {
        let reporter = CollectingReporter::new();
        let mut tokenizer = Tokenizer::new("test", "42", config()).with_reporter(reporter.clone());
        let token = tokenizer.next_token();

        assert!(tokenizer.expect_kind(&token, TokenKind::Int));
        assert!(!tokenizer.expect_one_of_kinds(&token, &[TokenKind::Symbol, TokenKind::Keyword]));

        let diagnostics = reporter.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Expected Symbol, Keyword but got Int `42`");
        assert_eq!(
            tokenizer.take_diagnostic().map(|d| d.message),
            Some("Expected Symbol, Keyword but got Int `42`".to_string())
        );
    }

    #[test]
    fn test_expect_kind_at_end() {
        let reporter = CollectingReporter::new();
        let mut tokenizer = Tokenizer::new("test", "", config()).with_reporter(reporter.clone());
        let token = tokenizer.next_token();
        assert!(!tokenizer.expect_kind(&token, TokenKind::Symbol));
        assert_eq!(reporter.diagnostics()[0].message, "Expected Symbol but got End");
    }

    #[test]
    fn test_expect_punct() {
        let reporter = CollectingReporter::new();
        let mut tokenizer = Tokenizer::new("test", "( ,", config()).with_reporter(reporter.clone());
        let open = tokenizer.next_token();
        let comma = tokenizer.next_token();

        assert!(tokenizer.expect_punct(&open, 2));
        assert!(!tokenizer.expect_one_of_puncts(&comma, &[2, 3]));
        assert_eq!(reporter.diagnostics()[0].message, "Expected `(`, `)` but got `,`");
    }

    #[test]
    fn test_expect_keyword() {
        let reporter = CollectingReporter::new();
        let mut tokenizer = Tokenizer::new("test", "else", config()).with_reporter(reporter.clone());
        let token = tokenizer.next_token();

        assert!(tokenizer.expect_keyword(&token, 1));
        assert!(!tokenizer.expect_keyword(&token, 0));
        assert_eq!(
            reporter.diagnostics()[0].message,
            "Expected keyword `if` but got keyword `else`"
        );
    }
}
