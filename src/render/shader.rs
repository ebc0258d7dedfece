//! Compilation of concrete trees to GLSL fragment shaders.
//!
//! [`compile`] turns a tree into a single GLSL expression over the floats `x`,
//! `y` and `t`. [`fragment_program`] embeds such an expression in a complete
//! fragment shader that maps the colour from `[-1, 1]` to `[0, 1]` and derives
//! `t` from the [`TIME_UNIFORM`] uniform.
//!
//! Note that GLSL `mod` is floored while the CPU evaluator's remainder is
//! truncated, so the two differ for operands of opposite sign. A triple is
//! also stricter here: `vec3` only holds floats, so a triple with a boolean
//! component compiles to a type error although the evaluator accepts it.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use crate::error::{ArtError, Result};
use crate::generate::ConcreteTree;
use crate::types::{NodeArena, NodeId, NodeKind, ValueKind};

/// Name of the float uniform holding elapsed seconds.
pub const TIME_UNIFORM: &str = "time";

/// Compile the tree under `id` to a GLSL expression.
pub fn compile(nodes: &NodeArena, id: NodeId) -> Result<String> {
    Ok(Compiler { nodes }.expr(id)?.0)
}

/// Compile a tree whose root is a triple into a full fragment shader.
pub fn compile_program(tree: &ConcreteTree) -> Result<String> {
    let compiler = Compiler { nodes: tree.nodes() };
    let (expr, kind) = compiler.expr(tree.root())?;
    if kind != ValueKind::Triple {
        return Err(compiler.type_error(tree.root(), ValueKind::Triple, kind));
    }
    Ok(fragment_program(&expr))
}

/// Fragment shader source around a `vec3` colour expression.
pub fn fragment_program(expr: &str) -> String {
    format!(
        "#version 330

in vec2 fragTexCoord;
out vec4 finalColor;

uniform float {TIME_UNIFORM};

vec4 map_color(vec3 rgb)
{{
    return vec4((rgb + 1.0)/2.0, 1.0);
}}

void main()
{{
    float x = fragTexCoord.x*2.0 - 1.0;
    float y = fragTexCoord.y*2.0 - 1.0;
    float t = sin({TIME_UNIFORM});
    finalColor = map_color({expr});
}}
"
    )
}

struct Compiler<'a> {
    nodes: &'a NodeArena,
}

impl Compiler<'_> {
    /// Source text and static kind of the tree under `id`.
    fn expr(&self, id: NodeId) -> Result<(String, ValueKind)> {
        let node = &self.nodes[id];
        let compiled = match node.kind {
            NodeKind::X => ("x".to_string(), ValueKind::Number),
            NodeKind::Y => ("y".to_string(), ValueKind::Number),
            NodeKind::T => ("t".to_string(), ValueKind::Number),
            NodeKind::Number(n) if n < 0.0 => (format!("({:.6})", n), ValueKind::Number),
            NodeKind::Number(n) => (format!("{:.6}", n), ValueKind::Number),
            NodeKind::Boolean(b) => (b.to_string(), ValueKind::Boolean),
            NodeKind::Sqrt(a) => (format!("sqrt({})", self.number(a)?), ValueKind::Number),
            NodeKind::Add(a, b) => (format!("({}+{})", self.number(a)?, self.number(b)?), ValueKind::Number),
            NodeKind::Mult(a, b) => (format!("({}*{})", self.number(a)?, self.number(b)?), ValueKind::Number),
            NodeKind::Mod(a, b) => (format!("mod({},{})", self.number(a)?, self.number(b)?), ValueKind::Number),
            NodeKind::GreaterThan(a, b) => {
                (format!("({}>{})", self.number(a)?, self.number(b)?), ValueKind::Boolean)
            }
            NodeKind::Triple(a, b, c) => (
                format!("vec3({},{},{})", self.number(a)?, self.number(b)?, self.number(c)?),
                ValueKind::Triple,
            ),
            NodeKind::If { cond, then, elze } => {
                let (cond_src, cond_kind) = self.expr(cond)?;
                if cond_kind != ValueKind::Boolean {
                    return Err(self.type_error(cond, ValueKind::Boolean, cond_kind));
                }
                let (then_src, then_kind) = self.expr(then)?;
                let (elze_src, elze_kind) = self.expr(elze)?;
                if then_kind != elze_kind {
                    return Err(self.type_error(elze, then_kind, elze_kind));
                }
                (format!("({}?{}:{})", cond_src, then_src, elze_src), then_kind)
            }
            NodeKind::Rule(_) | NodeKind::Random => {
                return Err(ArtError::InvalidConstruct {
                    origin: node.origin.clone(),
                    construct: node.kind.name(),
                })
            }
        };
        Ok(compiled)
    }

    // `vec3` only holds floats, so triple components must be numbers here.
    fn number(&self, id: NodeId) -> Result<String> {
        let (src, kind) = self.expr(id)?;
        if kind != ValueKind::Number {
            return Err(self.type_error(id, ValueKind::Number, kind));
        }
        Ok(src)
    }

    fn type_error(&self, id: NodeId, expected: ValueKind, found: ValueKind) -> ArtError {
        ArtError::Type {
            origin: self.nodes[id].origin.clone(),
            expected,
            found,
        }
    }
}

/// A host able to run a fragment shader over a full-screen quad.
pub trait GpuContext {
    /// Compile and bind `source`, exposing the float uniform named `uniform`.
    fn load_program(&mut self, source: &str, uniform: &str) -> Result<()>;

    /// Draw one frame with the uniform set to `value`.
    ///
    /// Returns `false` once the host wants to stop (window closed).
    fn draw_frame(&mut self, value: f32) -> Result<bool>;
}

/// Load `source` into `context` and draw frames until it asks to stop.
///
/// The uniform receives the seconds elapsed since the first frame.
/// Returns the number of frames drawn.
pub fn present(context: &mut impl GpuContext, source: &str) -> Result<usize> {
    context.load_program(source, TIME_UNIFORM)?;

    let start = Instant::now();
    let mut frames = 0;
    loop {
        let keep_going = context.draw_frame(start.elapsed().as_secs_f32())?;
        frames += 1;
        if !keep_going {
            return Ok(frames);
        }
    }
}

/// A [`GpuContext`] that hands the program to an external GL host.
///
/// Loading writes the complete shader source to the wrapped writer; the
/// first frame then ends the session.
pub struct ShaderExport<W: Write> {
    out: W,
}

impl<W: Write> ShaderExport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ShaderExport<File> {
    /// Export to a file, replacing any existing one.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).map_err(|e| ArtError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to create shader file: {}", e),
        })?;
        Ok(Self::new(file))
    }
}

impl ShaderExport<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> GpuContext for ShaderExport<W> {
    fn load_program(&mut self, source: &str, _uniform: &str) -> Result<()> {
        self.out.write_all(source.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn draw_frame(&mut self, _value: f32) -> Result<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_mult() {
        let mut n = NodeArena::new();
        let (x, y) = (n.x(), n.y());
        let root = n.mult(x, y);
        assert_eq!(compile(&n, root).unwrap(), "(x*y)");
    }

    #[test]
    fn test_compile_all_forms() {
        let mut n = NodeArena::new();
        let (x, y, t) = (n.x(), n.y(), n.t());
        let half = n.number(0.5);
        let neg = n.number(-0.25);
        let sum = n.add(x, neg);
        let root_t = n.sqrt(t);
        let m = n.modulo(y, half);
        let cond = n.gt(sum, half);
        let then = n.triple(x, root_t, m);
        let elze = n.triple(y, y, half);
        let root = n.if_else(cond, then, elze);

        assert_eq!(
            compile(&n, root).unwrap(),
            "(((x+(-0.250000))>0.500000)?vec3(x,sqrt(t),mod(y,0.500000)):vec3(y,y,0.500000))"
        );
    }

    #[test]
    fn test_compile_boolean_if() {
        let mut n = NodeArena::new();
        let (a, b, c) = (n.boolean(true), n.boolean(false), n.boolean(true));
        let root = n.if_else(a, b, c);
        assert_eq!(compile(&n, root).unwrap(), "(true?false:true)");
    }

    #[test]
    fn test_compile_type_errors() {
        let mut n = NodeArena::new();
        let (x, b) = (n.x(), n.boolean(true));
        let bad_add = n.add(x, b);
        let bad_if = n.if_else(x, x, x);
        let bad_vec = n.triple(x, b, x);

        for root in [bad_add, bad_if, bad_vec] {
            assert!(matches!(compile(&n, root), Err(ArtError::Type { .. })));
        }
    }

    #[test]
    fn test_boolean_triple_component_only_evaluates_on_cpu() {
        let mut n = NodeArena::new();
        let (x, b) = (n.x(), n.boolean(true));
        let mixed = n.triple(x, b, x);

        assert!(crate::render::evaluate(&n, mixed, 0.0, 0.0, 0.0).is_ok());
        match compile(&n, mixed) {
            Err(ArtError::Type { expected, found, .. }) => {
                assert_eq!((expected, found), (ValueKind::Number, ValueKind::Boolean));
            }
            other => panic!("Expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_compile_rejects_grammar_only() {
        let mut n = NodeArena::new();
        let r = n.random();
        match compile(&n, r) {
            Err(ArtError::InvalidConstruct { origin, construct }) => {
                assert_eq!(construct, "random");
                assert!(matches!(origin, Origin::Code { .. }));
            }
            other => panic!("Expected invalid construct, got {:?}", other),
        }
    }

    #[test]
    fn test_fragment_program() {
        insta::assert_snapshot!(fragment_program("vec3(x,y,t)"), @r"
        #version 330

        in vec2 fragTexCoord;
        out vec4 finalColor;

        uniform float time;

        vec4 map_color(vec3 rgb)
        {
            return vec4((rgb + 1.0)/2.0, 1.0);
        }

        void main()
        {
            float x = fragTexCoord.x*2.0 - 1.0;
            float y = fragTexCoord.y*2.0 - 1.0;
            float t = sin(time);
            finalColor = map_color(vec3(x,y,t));
        }
        ");
    }

    struct CountingContext {
        loaded: Option<(String, String)>,
        frames_left: usize,
        values: Vec<f32>,
    }

    impl GpuContext for CountingContext {
        fn load_program(&mut self, source: &str, uniform: &str) -> Result<()> {
            self.loaded = Some((source.to_string(), uniform.to_string()));
            Ok(())
        }

        fn draw_frame(&mut self, value: f32) -> Result<bool> {
            self.values.push(value);
            self.frames_left -= 1;
            Ok(self.frames_left > 0)
        }
    }

    #[test]
    fn test_present_runs_until_context_stops() {
        let mut context = CountingContext {
            loaded: None,
            frames_left: 3,
            values: Vec::new(),
        };
        assert_eq!(present(&mut context, "void main() {}").unwrap(), 3);
        assert_eq!(
            context.loaded,
            Some(("void main() {}".to_string(), TIME_UNIFORM.to_string()))
        );
        assert!(context.values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_shader_export_writes_source_once() {
        let mut export = ShaderExport::new(Vec::new());
        assert_eq!(present(&mut export, "source").unwrap(), 1);
        assert_eq!(export.into_inner(), b"source".to_vec());
    }
}
