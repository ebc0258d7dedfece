//! Parse command implementation.
//!
//! Parses a grammar file and prints it back, either in grammar syntax or as
//! a JSON summary. Rules that can never terminate are reported as warnings.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::{ArtError, Result};
use crate::output::{display_path, plural, Printer};
use crate::diagnostics::SilentReporter;
use crate::parser::parse_grammar_with;
use crate::types::Grammar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Grammar syntax, one rule per line
    #[default]
    Text,
    /// Rules, weights, templates and minimum depths as JSON
    Json,
}

/// Parse a grammar file and print it back
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Grammar file to parse
    pub input: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

pub fn run(args: ParseArgs, printer: &Printer) -> Result<()> {
    let name = display_path(&args.input);

    let source = std::fs::read_to_string(&args.input).map_err(|e| ArtError::Io {
        path: args.input.clone(),
        message: format!("Failed to read grammar: {}", e),
    })?;
    let grammar = parse_grammar_with(&name, &source, SilentReporter)?;
    printer.status("Parsed", &format!("{} ({})", name, plural(grammar.len(), "rule", "rules")));

    for rule in non_terminating(&grammar) {
        printer.warning("Warning", &format!("rule `{}` can never terminate", rule));
    }

    print!("{}", render(&grammar, args.format)?);
    Ok(())
}

/// Names of rules with no finite expansion, in definition order.
pub fn non_terminating(grammar: &Grammar) -> Vec<&str> {
    grammar
        .rules()
        .iter()
        .zip(grammar.min_depths())
        .filter(|(_, depth)| depth.is_none())
        .map(|(rule, _)| rule.name())
        .collect()
}

/// Text printed to stdout for `format`.
pub fn render(grammar: &Grammar, format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(grammar.to_string()),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(&grammar.summary()).map_err(|e| ArtError::Render {
                message: format!("Failed to encode grammar as JSON: {}", e),
            })?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn grammar(source: &str) -> Grammar {
        parse_grammar_with("test.bnf", source, SilentReporter).unwrap()
    }

    #[test]
    fn test_render_text_normalizes_layout() {
        let g = grammar("# art\nE ::= (C,C,C) ;\nC ::= 1 x|2 y ;");
        assert_eq!(
            render(&g, Format::Text).unwrap(),
            "E ::= triple(C, C, C);\nC ::= x | 2 y;\n"
        );
    }

    #[test]
    fn test_render_json() {
        let g = grammar("E ::= triple(x, y, t) | 3 (A, A, A);\nA ::= random;");
        let json: serde_json::Value = serde_json::from_str(&render(&g, Format::Json).unwrap()).unwrap();

        assert_eq!(json["rules"][0]["name"], "E");
        assert_eq!(json["rules"][0]["weight_sum"], 4);
        assert_eq!(json["rules"][0]["min_depth"], 1);
        assert_eq!(json["rules"][0]["branches"][1]["weight"], 3);
        assert_eq!(json["rules"][0]["branches"][1]["template"], "triple(A, A, A)");
        assert_eq!(json["rules"][1]["branches"][0]["template"], "random");
    }

    #[test]
    fn test_non_terminating() {
        let g = grammar("E ::= triple(x, x, x) | L;\nL ::= add(L, x);\nM ::= L;");
        assert_eq!(non_terminating(&g), vec!["L", "M"]);
    }

    #[test]
    fn test_run_missing_file() {
        let args = ParseArgs {
            input: PathBuf::from("/nonexistent/grammar.bnf"),
            format: Format::Text,
        };
        assert!(matches!(run(args, &Printer::new()), Err(ArtError::Io { .. })));
    }
}
