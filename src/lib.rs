//! randomart - Grammar-driven procedural art
//!
//! A library for generating images from weighted grammars: a grammar is
//! parsed from text, expanded into a random expression tree, and the tree is
//! either evaluated per pixel into a PNG or compiled to a GLSL fragment shader.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod generate;
pub mod output;
pub mod parser;
pub mod render;
pub mod types;

pub use config::Config;
pub use diagnostics::{CollectingReporter, Diagnostic, Reporter, Severity, SilentReporter, StderrReporter};
pub use error::{ArtError, Result, EXIT_GENERATION_EXHAUSTED};
pub use generate::{ConcreteTree, Generator, MAX_ATTEMPTS};
pub use parser::{parse_grammar, parse_grammar_with, Location, Token, TokenKind, Tokenizer, TokenizerConfig};
pub use render::{
    compile, compile_program, evaluate, evaluate_color, present, render_raster, write_png, GpuContext, ImageSink,
    PngSink, Raster, ShaderExport,
};
pub use types::{BuiltinGrammars, Grammar, NodeArena, NodeId, NodeKind, Origin, Value, ValueKind};
