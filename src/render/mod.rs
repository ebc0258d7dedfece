//! Rendering of generated trees.
//!
//! Trees are either evaluated on the CPU pixel by pixel ([`render_raster`])
//! or compiled to a GLSL fragment shader ([`compile_program`]) for a GPU host.

mod eval;
mod png;
mod raster;
mod shader;

pub use eval::{evaluate, evaluate_color};
pub use png::{write_png, ImageSink, PngSink};
pub use raster::{channel, normalize, render_raster, Raster};
pub use shader::{compile, compile_program, fragment_program, present, GpuContext, ShaderExport, TIME_UNIFORM};
