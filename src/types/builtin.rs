//! Grammars shipped with the binary, selectable by name.

use crate::diagnostics::SilentReporter;
use crate::parser::parse_grammar_with;

use super::Grammar;

const DEFAULT: &str = "\
E ::= triple(C, C, C);
A ::= random | x | y;
C ::= 2 A | 3 add(C, C) | 3 mult(C, C);
";

const GRAY: &str = "\
E ::= triple(x, x, x);
";

const COOL: &str = "\
E ::= if(gt(mult(x, y), 0), triple(x, y, 1), triple(mod(x, y), mod(x, y), mod(x, y)));
";

const BUILTINS: [(&str, &str); 3] = [("default", DEFAULT), ("gray", GRAY), ("cool", COOL)];

/// Access to the builtin grammars.
pub struct BuiltinGrammars;

impl BuiltinGrammars {
    /// Names of all builtin grammars.
    pub fn names() -> Vec<&'static str> {
        BUILTINS.iter().map(|(name, _)| *name).collect()
    }

    /// Grammar text of a builtin.
    pub fn source(name: &str) -> Option<&'static str> {
        BUILTINS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, source)| *source)
    }

    /// Get a builtin grammar by name.
    pub fn get(name: &str) -> Option<Grammar> {
        let source = Self::source(name)?;
        parse_grammar_with(&format!("<builtin:{}>", name), source, SilentReporter).ok()
    }

    /// The grammar used when none is configured.
    pub fn default_grammar() -> Grammar {
        Self::get("default").unwrap_or_default()
    }
}
