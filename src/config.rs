//! Project configuration (randomart.yaml).
//!
//! Every field is optional. Command-line flags override whatever is set here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArtError, Result};

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILENAME: &str = "randomart.yaml";

/// Settings loaded from randomart.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output image width in pixels.
    pub width: u32,

    /// Output image height in pixels.
    pub height: u32,

    /// Depth budget for rule expansion.
    pub depth: i32,

    /// RNG seed. Fresh entropy is used when absent.
    pub seed: Option<u64>,

    /// Builtin grammar name or path to a grammar file.
    pub grammar: String,

    /// Rule to start from. Defaults to the first rule of the grammar.
    pub entry: Option<String>,

    /// Value of `t` for still images.
    pub time: f32,

    /// Worker threads for raster rendering.
    pub threads: usize,

    /// Default PNG path for the `file` command.
    pub output: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            depth: 10,
            seed: None,
            grammar: "default".to_string(),
            entry: None,
            time: 0.0,
            threads: 1,
            output: PathBuf::from("randomart.png"),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ArtError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read config: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ArtError::Config {
            message: format!("Invalid config: {}", e),
            help: Some(format!("Check {} syntax", CONFIG_FILENAME)),
        })
    }

    /// Load `explicit` if given, else `randomart.yaml` in `dir` if present,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let implicit = dir.join(CONFIG_FILENAME);
        if implicit.is_file() {
            Self::load(&implicit)
        } else {
            Ok(Self::default())
        }
    }
}
