//! Gui command implementation.
//!
//! Generates a tree, compiles it to a fragment shader and hands the program
//! to a GPU context. The shipped context exports the shader source for an
//! external GL host.

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::render::{compile_program, present, ShaderExport};

use super::GenerateArgs;

/// Compile a generated image to a fragment shader for a GPU host
#[derive(Args, Debug)]
pub struct GuiArgs {
    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Write the shader to this file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: GuiArgs, config: &Config, printer: &Printer) -> Result<()> {
    let tree = super::generate(&args.generate, config, printer)?;

    let program = compile_program(&tree)?;
    printer.status("Compiled", &format!("fragment shader ({} bytes)", program.len()));

    let frames = match &args.output {
        Some(path) => {
            let frames = present(&mut ShaderExport::create(path)?, &program)?;
            printer.success("Wrote", &display_path(path));
            frames
        }
        None => present(&mut ShaderExport::stdout(), &program)?,
    };
    printer.info("Presented", &plural(frames, "frame", "frames"));

    Ok(())
}
