//! Grammar text parser.
//!
//! Reads rule definitions of the form
//!
//! ```text
//! name ::= [weight] expr ( '|' [weight] expr )* ';'
//! ```
//!
//! where `expr` is `x`, `y`, `t`, `random`, `true`, `false`, a number, a rule
//! name, a call `op(arg, ...)` with `op` one of `add mult mod gt sqrt triple if`,
//! or the tuple shorthand `(a, b, c)` for `triple(a, b, c)`.
//!
//! Numbers are `[-]digits[.digits]`. Exponent forms such as `1e-3` are not
//! accepted.

use std::num::NonZeroU32;

use crate::diagnostics::{Reporter, StderrReporter};
use crate::error::{ArtError, Result};
use crate::types::{Grammar, NodeId, NodeKind, Origin};

use super::tokenizer::{Token, TokenKind, Tokenizer, TokenizerConfig};

const PUNCTS: [&str; 8] = ["::=", "(", ")", ",", "|", ";", "-", "."];
const DEFINE: usize = 0;
const OPEN: usize = 1;
const CLOSE: usize = 2;
const COMMA: usize = 3;
const BAR: usize = 4;
const SEMI: usize = 5;
const MINUS: usize = 6;
const DOT: usize = 7;

/// Reserved words, in keyword-index order.
const KEYWORDS: [&str; 13] = [
    "x", "y", "t", "random", "true", "false", "add", "mult", "mod", "gt", "sqrt", "triple", "if",
];

/// Operators callable as `op(args)` with their arity.
const OPERATORS: [(&str, usize); 7] = [
    ("add", 2),
    ("mult", 2),
    ("mod", 2),
    ("gt", 2),
    ("sqrt", 1),
    ("triple", 3),
    ("if", 3),
];

/// Token kinds that may begin an expression.
const EXPR_START: [TokenKind; 4] = [
    TokenKind::Symbol,
    TokenKind::Keyword,
    TokenKind::Int,
    TokenKind::Punct,
];

/// Tokenizer configuration for grammar files.
pub fn grammar_tokenizer_config() -> TokenizerConfig {
    TokenizerConfig::new()
        .puncts(PUNCTS)
        .keywords(KEYWORDS)
        .line_comments(["//", "#"])
        .block_comments([("/*", "*/")])
}

/// Parse grammar text, reporting diagnostics to stderr.
pub fn parse_grammar(file: &str, source: &str) -> Result<Grammar> {
    parse_grammar_with(file, source, StderrReporter::new())
}

/// Parse grammar text with a custom diagnostic reporter.
pub fn parse_grammar_with<'a>(
    file: &str,
    source: &'a str,
    reporter: impl Reporter + 'a,
) -> Result<Grammar> {
    let tokenizer = Tokenizer::new(file, source, grammar_tokenizer_config()).with_reporter(reporter);
    GrammarParser {
        tokenizer,
        grammar: Grammar::new(),
    }
    .parse()
}

struct GrammarParser<'a> {
    tokenizer: Tokenizer<'a>,
    grammar: Grammar,
}

impl<'a> GrammarParser<'a> {
    fn parse(mut self) -> Result<Grammar> {
        loop {
            let name = self.next()?;
            if name.kind == TokenKind::End {
                break;
            }
            self.expect_kind(&name, TokenKind::Symbol)?;

            let define = self.next()?;
            self.expect_punct(&define, &[DEFINE])?;

            loop {
                let (weight, template) = self.parse_branch()?;
                self.grammar.add_branch(name.text, template, weight);

                let separator = self.next()?;
                self.expect_punct(&separator, &[BAR, SEMI])?;
                if separator.punct_index == SEMI {
                    break;
                }
            }
        }

        if let Some((name, origin)) = self.grammar.undefined_references().into_iter().next() {
            let location = match origin {
                Origin::Grammar(location) => location,
                Origin::Code { .. } => self.tokenizer.location(),
            };
            return Err(ArtError::Parse {
                location,
                message: format!("undefined rule `{}`", name),
                help: Some("Define the rule with `name ::= ...;`".to_string()),
            });
        }

        Ok(self.grammar)
    }

    /// Read a token, turning unrecognized input into a lex error.
    fn next(&mut self) -> Result<Token<'a>> {
        let token = self.tokenizer.next_token();
        if token.kind == TokenKind::Invalid {
            return Err(ArtError::Lex {
                location: token.location,
                text: token.text.to_string(),
            });
        }
        Ok(token)
    }

    /// Look at the next token without consuming it.
    fn peek(&mut self) -> Result<Token<'a>> {
        let state = self.tokenizer.save();
        let token = self.next();
        self.tokenizer.rewind(state);
        token
    }

    fn expectation_error(&mut self, token: &Token<'_>) -> ArtError {
        let (location, message) = match self.tokenizer.take_diagnostic() {
            Some(diagnostic) => (diagnostic.location, diagnostic.message),
            None => (token.location.clone(), format!("Unexpected `{}`", token.text)),
        };
        ArtError::Parse {
            location,
            message,
            help: None,
        }
    }

    fn expect_kind(&mut self, token: &Token<'_>, kind: TokenKind) -> Result<()> {
        if self.tokenizer.expect_kind(token, kind) {
            Ok(())
        } else {
            Err(self.expectation_error(token))
        }
    }

    fn expect_punct(&mut self, token: &Token<'_>, puncts: &[usize]) -> Result<()> {
        if self.tokenizer.expect_one_of_puncts(token, puncts) {
            Ok(())
        } else {
            Err(self.expectation_error(token))
        }
    }

    fn is_punct(token: &Token<'_>, punct: usize) -> bool {
        token.kind == TokenKind::Punct && token.punct_index == punct
    }

    /// An optional integer weight followed by an expression.
    ///
    /// A leading integer is a weight only when another expression follows it;
    /// `1;`, `1 |` and `1.5` are number templates.
    fn parse_branch(&mut self) -> Result<(NonZeroU32, NodeId)> {
        let start = self.tokenizer.save();
        let first = self.next()?;

        let mut weight = NonZeroU32::MIN;
        if first.kind == TokenKind::Int {
            let following = self.peek()?;
            let ends_expr = [BAR, SEMI, DOT].iter().any(|&p| Self::is_punct(&following, p));
            if ends_expr || following.kind == TokenKind::End || Self::is_exponent(first.span.end, &following) {
                self.tokenizer.rewind(start);
            } else {
                weight = u32::try_from(first.int_value)
                    .ok()
                    .and_then(NonZeroU32::new)
                    .ok_or_else(|| ArtError::Parse {
                        location: first.location.clone(),
                        message: format!("invalid branch weight `{}`", first.text),
                        help: Some("Weights are whole numbers of at least 1".to_string()),
                    })?;
            }
        } else {
            self.tokenizer.rewind(start);
        }

        Ok((weight, self.parse_expr()?))
    }

    fn parse_expr(&mut self) -> Result<NodeId> {
        let token = self.next()?;
        let origin = Origin::Grammar(token.location.clone());

        match token.kind {
            TokenKind::Keyword => match KEYWORDS[token.keyword_index] {
                "x" => Ok(self.leaf(NodeKind::X, origin)),
                "y" => Ok(self.leaf(NodeKind::Y, origin)),
                "t" => Ok(self.leaf(NodeKind::T, origin)),
                "random" => Ok(self.leaf(NodeKind::Random, origin)),
                "true" => Ok(self.leaf(NodeKind::Boolean(true), origin)),
                "false" => Ok(self.leaf(NodeKind::Boolean(false), origin)),
                op => self.parse_call(op, origin),
            },
            TokenKind::Symbol => {
                if Self::is_punct(&self.peek()?, OPEN) {
                    return Err(ArtError::Parse {
                        location: token.location.clone(),
                        message: format!("unknown operator `{}`", token.text),
                        help: Some(format!(
                            "Available operators: {}",
                            OPERATORS.map(|(name, _)| name).join(", ")
                        )),
                    });
                }
                Ok(self.leaf(NodeKind::Rule(token.text.to_string()), origin))
            }
            TokenKind::Int => {
                let value = self.parse_number(&token, false)?;
                Ok(self.leaf(NodeKind::Number(value), origin))
            }
            TokenKind::Punct if token.punct_index == MINUS => {
                let digits = self.next()?;
                self.expect_kind(&digits, TokenKind::Int)?;
                let value = self.parse_number(&digits, true)?;
                Ok(self.leaf(NodeKind::Number(value), origin))
            }
            TokenKind::Punct if token.punct_index == OPEN => {
                let args = self.parse_args(3)?;
                Ok(self.leaf(NodeKind::Triple(args[0], args[1], args[2]), origin))
            }
            TokenKind::Punct => {
                self.tokenizer.expect_one_of_puncts(&token, &[OPEN, MINUS]);
                Err(self.expectation_error(&token))
            }
            _ => {
                self.tokenizer.expect_one_of_kinds(&token, &EXPR_START);
                Err(self.expectation_error(&token))
            }
        }
    }

    fn leaf(&mut self, kind: NodeKind, origin: Origin) -> NodeId {
        self.grammar.nodes_mut().alloc(kind, origin)
    }

    fn parse_call(&mut self, op: &str, origin: Origin) -> Result<NodeId> {
        let arity = OPERATORS
            .iter()
            .find(|(name, _)| *name == op)
            .map_or(0, |&(_, arity)| arity);

        let open = self.next()?;
        self.expect_punct(&open, &[OPEN])?;
        let args = self.parse_args(arity)?;

        let kind = match op {
            "add" => NodeKind::Add(args[0], args[1]),
            "mult" => NodeKind::Mult(args[0], args[1]),
            "mod" => NodeKind::Mod(args[0], args[1]),
            "gt" => NodeKind::GreaterThan(args[0], args[1]),
            "sqrt" => NodeKind::Sqrt(args[0]),
            "triple" => NodeKind::Triple(args[0], args[1], args[2]),
            _ => NodeKind::If {
                cond: args[0],
                then: args[1],
                elze: args[2],
            },
        };
        Ok(self.leaf(kind, origin))
    }

    /// Exactly `arity` comma-separated expressions and the closing paren.
    fn parse_args(&mut self, arity: usize) -> Result<Vec<NodeId>> {
        let mut args = Vec::with_capacity(arity);
        for i in 0..arity {
            if i > 0 {
                let comma = self.next()?;
                self.expect_punct(&comma, &[COMMA])?;
            }
            args.push(self.parse_expr()?);
        }
        let close = self.next()?;
        self.expect_punct(&close, &[CLOSE])?;
        Ok(args)
    }

    /// `e`/`E` glued to digits ending at `end`, as in `1e` or `2E5`.
    fn is_exponent(end: usize, next: &Token<'_>) -> bool {
        next.kind == TokenKind::Symbol
            && next.span.begin == end
            && next.text.starts_with(['e', 'E'])
            && next.text[1..].bytes().all(|b| b.is_ascii_digit())
    }

    /// Digits with an optional `.fraction`, already past any leading minus.
    fn parse_number(&mut self, digits: &Token<'_>, negative: bool) -> Result<f32> {
        let mut text = String::new();
        if negative {
            text.push('-');
        }
        text.push_str(digits.text);

        let mut end = digits.span.end;
        let state = self.tokenizer.save();
        let dot = self.next()?;
        if Self::is_punct(&dot, DOT) {
            let fraction = self.next()?;
            self.expect_kind(&fraction, TokenKind::Int)?;
            text.push('.');
            text.push_str(fraction.text);
            end = fraction.span.end;
        } else {
            self.tokenizer.rewind(state);
        }

        let following = self.peek()?;
        if Self::is_exponent(end, &following) {
            return Err(ArtError::Parse {
                location: digits.location.clone(),
                message: format!("exponent notation is not supported: `{}{}`", text, following.text),
                help: Some("Write the number in decimal form, e.g. `0.001`".to_string()),
            });
        }

        text.parse::<f32>().map_err(|e| ArtError::Parse {
            location: digits.location.clone(),
            message: format!("invalid number `{}`: {}", text, e),
            help: None,
        })
    }
}
