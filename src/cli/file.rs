//! File command implementation.
//!
//! Generates a tree and renders it through the CPU evaluator to a PNG.

use std::path::PathBuf;

use clap::Args;

use crate::config::Config;
use crate::error::Result;
use crate::output::{display_path, Printer};
use crate::render::{render_raster, write_png};

use super::GenerateArgs;

/// Render a generated image to a PNG file
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Output PNG path (defaults to the configured output)
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub generate: GenerateArgs,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Value of `t` for the still image
    #[arg(long, allow_negative_numbers = true)]
    pub time: Option<f32>,

    /// Worker threads for rendering
    #[arg(long)]
    pub threads: Option<usize>,

    /// Print the generated expression to stdout
    #[arg(long)]
    pub print: bool,
}

pub fn run(args: FileArgs, config: &Config, printer: &Printer) -> Result<()> {
    let tree = super::generate(&args.generate, config, printer)?;

    if args.print {
        println!("{}", tree);
    }

    let width = args.width.unwrap_or(config.width);
    let height = args.height.unwrap_or(config.height);
    let time = args.time.unwrap_or(config.time);
    let threads = args.threads.unwrap_or(config.threads);
    let output = args.output.unwrap_or_else(|| config.output.clone());

    printer.status("Rendering", &format!("{}x{} (t = {})", width, height, time));
    let raster = render_raster(&tree, width, height, time, threads)?;
    write_png(&raster, &output)?;
    printer.success("Wrote", &display_path(&output));

    Ok(())
}
