use miette::Diagnostic;
use thiserror::Error;

use crate::parser::Location;
use crate::types::{Origin, ValueKind};

/// Exit code reported when no terminating expansion exists within the depth budget.
pub const EXIT_GENERATION_EXHAUSTED: u8 = 69;

/// Main error type for randomart operations
#[derive(Error, Diagnostic, Debug)]
pub enum ArtError {
    #[error("IO error: {0}")]
    #[diagnostic(code(randomart::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(randomart::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("{location}: unrecognized input `{text}`")]
    #[diagnostic(code(randomart::lex))]
    Lex { location: Location, text: String },

    #[error("{location}: {message}")]
    #[diagnostic(code(randomart::parse))]
    Parse {
        location: Location,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Unknown rule: {name}")]
    #[diagnostic(code(randomart::rule))]
    UnknownRule {
        name: String,
        #[help]
        help: Option<String>,
    },

    #[error("Rule `{rule}` could not terminate within depth {depth} after {attempts} attempts")]
    #[diagnostic(
        code(randomart::exhausted),
        help("Give every recursive rule a terminal branch or raise --depth")
    )]
    GenerationExhausted {
        rule: String,
        depth: i32,
        attempts: usize,
    },

    #[error("{origin}: type error: expected {expected} but got {found}")]
    #[diagnostic(code(randomart::type_error))]
    Type {
        origin: Origin,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("{origin}: cannot evaluate `{construct}`, it is only valid in grammar definitions")]
    #[diagnostic(code(randomart::invalid_construct))]
    InvalidConstruct {
        origin: Origin,
        construct: &'static str,
    },

    #[error("Config error: {message}")]
    #[diagnostic(code(randomart::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Render error: {message}")]
    #[diagnostic(code(randomart::render))]
    Render { message: String },
}

impl ArtError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ArtError::GenerationExhausted { .. } => EXIT_GENERATION_EXHAUSTED,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArtError>;
