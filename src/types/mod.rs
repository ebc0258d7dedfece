//! Core domain types for randomart.
//!
//! - `NodeArena` / `NodeKind` - expression trees addressed by `NodeId`
//! - `Value` - results of evaluating a concrete tree
//! - `Grammar` - named rules of weighted branch templates
//! - `BuiltinGrammars` - grammars shipped with the binary

mod builtin;
mod grammar;
mod node;
mod value;

pub use builtin::BuiltinGrammars;
pub use grammar::{Branch, BranchSummary, Grammar, GrammarSummary, Rule, RuleSummary};
pub use node::{Node, NodeArena, NodeDisplay, NodeId, NodeKind, Origin};
pub use value::{Value, ValueKind};
