//! Parsing for grammar files.
//!
//! A generic [`Tokenizer`] turns text into tokens; [`parse_grammar`] reads
//! rule definitions from those tokens into a [`Grammar`](crate::types::Grammar).
//!
//! # Usage
//!
//! ```ignore
//! use randomart::parser::parse_grammar;
//!
//! let source = std::fs::read_to_string("art.bnf")?;
//! let grammar = parse_grammar("art.bnf", &source)?;
//!
//! for rule in grammar.rules() {
//!     println!("{} has {} branches", rule.name(), rule.branches().len());
//! }
//! ```

mod grammar;
pub mod span;
pub mod tokenizer;

pub use grammar::{grammar_tokenizer_config, parse_grammar, parse_grammar_with};
pub use span::{FileId, Location, Span};
pub use tokenizer::{Token, TokenKind, Tokenizer, TokenizerConfig, TokenizerState};
