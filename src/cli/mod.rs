pub mod completions;
pub mod file;
pub mod gui;
pub mod parse;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::Config;
use crate::error::{ArtError, Result};
use crate::generate::{ConcreteTree, Generator};
use crate::output::{display_path, plural, Printer};
use crate::diagnostics::SilentReporter;
use crate::parser::parse_grammar_with;
use crate::types::{BuiltinGrammars, Grammar};

/// randomart - Grammar-driven procedural art
#[derive(Parser, Debug)]
#[command(name = "randomart")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./randomart.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a generated image to a PNG file
    File(file::FileArgs),

    /// Compile a generated image to a fragment shader for a GPU host
    Gui(gui::GuiArgs),

    /// Parse a grammar file and print it back
    Parse(parse::ParseArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Options shared by every command that generates a tree.
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Builtin grammar name (default, gray, cool) or path to a grammar file
    #[arg(long)]
    pub grammar: Option<String>,

    /// Rule to start generation from
    #[arg(long)]
    pub entry: Option<String>,

    /// Depth budget for rule expansion
    #[arg(long, allow_negative_numbers = true)]
    pub depth: Option<i32>,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Rewrite single-dash long flags (`-depth 5`) to their `--` form.
///
/// Short flags, negative numbers and values are left alone.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            let is_legacy = i > 0
                && arg.len() > 2
                && arg.starts_with('-')
                && !arg.starts_with("--")
                && arg[1..].starts_with(|c: char| c.is_ascii_alphabetic());
            if is_legacy {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

/// Dispatch a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let printer = Printer::new().quiet(cli.quiet);
    let config = Config::discover(cli.config.as_deref(), Path::new("."))?;

    match cli.command {
        Commands::File(args) => file::run(args, &config, &printer),
        Commands::Gui(args) => gui::run(args, &config, &printer),
        Commands::Parse(args) => parse::run(args, &printer),
        Commands::Completions(args) => completions::run(args),
    }
}

/// Resolve a builtin grammar name or read and parse a grammar file.
pub fn load_grammar(name_or_path: &str) -> Result<Grammar> {
    if let Some(grammar) = BuiltinGrammars::get(name_or_path) {
        return Ok(grammar);
    }

    let path = Path::new(name_or_path);
    let source = std::fs::read_to_string(path).map_err(|e| ArtError::Io {
        path: path.to_path_buf(),
        message: format!(
            "Failed to read grammar: {} (builtins: {})",
            e,
            BuiltinGrammars::names().join(", ")
        ),
    })?;
    // The returned error carries the diagnostic; miette renders it once.
    parse_grammar_with(&display_path(path), &source, SilentReporter)
}

/// A seeded RNG, drawing the seed from entropy when none is given.
///
/// The seed is returned so the run can be reproduced.
pub fn make_rng(seed: Option<u64>) -> (StdRng, u64) {
    let seed = seed.unwrap_or_else(|| StdRng::from_entropy().gen());
    (StdRng::seed_from_u64(seed), seed)
}

/// Load the grammar and run one generation pass, flags taking precedence
/// over configuration.
pub fn generate(args: &GenerateArgs, config: &Config, printer: &Printer) -> Result<ConcreteTree> {
    let grammar_name = args.grammar.as_deref().unwrap_or(&config.grammar);
    let grammar = load_grammar(grammar_name)?;

    let entry = match args.entry.as_ref().or(config.entry.as_ref()) {
        Some(entry) => entry.clone(),
        None => grammar
            .entry()
            .map(|rule| rule.name().to_string())
            .ok_or_else(|| ArtError::UnknownRule {
                name: "<entry>".to_string(),
                help: Some(format!("`{}` defines no rules", grammar_name)),
            })?,
    };
    let depth = args.depth.unwrap_or(config.depth);
    let (mut rng, seed) = make_rng(args.seed.or(config.seed));

    printer.status(
        "Generating",
        &format!("{} from {} (depth {}, seed {})", entry, grammar_name, depth, seed),
    );
    let tree = Generator::new(&grammar, &mut rng).generate(&entry, depth)?;
    printer.info("Generated", &plural(tree.nodes().len(), "node", "nodes"));

    Ok(tree)
}
