//! Evaluation of concrete trees at a single point.

use crate::error::{ArtError, Result};
use crate::types::{NodeArena, NodeId, NodeKind, Value, ValueKind};

/// Reduce the tree under `id` to a value at `(x, y, t)`.
///
/// Both arms of an `if` are evaluated and must agree in kind.
pub fn evaluate(nodes: &NodeArena, id: NodeId, x: f32, y: f32, t: f32) -> Result<Value> {
    Evaluator { nodes, x, y, t }.eval(id)
}

/// Evaluate a tree whose root must be a triple of numbers.
pub fn evaluate_color(nodes: &NodeArena, id: NodeId, x: f32, y: f32, t: f32) -> Result<[f32; 3]> {
    let evaluator = Evaluator { nodes, x, y, t };
    let value = evaluator.eval(id)?;
    let found = value.kind();
    let Value::Triple(parts) = value else {
        return Err(evaluator.type_error(id, ValueKind::Triple, found));
    };

    let mut rgb = [0.0; 3];
    for (channel, part) in rgb.iter_mut().zip(parts.iter()) {
        *channel = part
            .as_number()
            .ok_or_else(|| evaluator.type_error(id, ValueKind::Number, part.kind()))?;
    }
    Ok(rgb)
}

struct Evaluator<'a> {
    nodes: &'a NodeArena,
    x: f32,
    y: f32,
    t: f32,
}

impl Evaluator<'_> {
    fn eval(&self, id: NodeId) -> Result<Value> {
        let node = &self.nodes[id];
        match node.kind {
            NodeKind::X => Ok(Value::Number(self.x)),
            NodeKind::Y => Ok(Value::Number(self.y)),
            NodeKind::T => Ok(Value::Number(self.t)),
            NodeKind::Number(n) => Ok(Value::Number(n)),
            NodeKind::Boolean(b) => Ok(Value::Boolean(b)),
            NodeKind::Sqrt(a) => Ok(Value::Number(self.number(a)?.sqrt())),
            NodeKind::Add(a, b) => Ok(Value::Number(self.number(a)? + self.number(b)?)),
            NodeKind::Mult(a, b) => Ok(Value::Number(self.number(a)? * self.number(b)?)),
            NodeKind::Mod(a, b) => Ok(Value::Number(self.number(a)? % self.number(b)?)),
            NodeKind::GreaterThan(a, b) => Ok(Value::Boolean(self.number(a)? > self.number(b)?)),
            NodeKind::Triple(a, b, c) => Ok(Value::triple(self.eval(a)?, self.eval(b)?, self.eval(c)?)),
            NodeKind::If { cond, then, elze } => {
                let cond_value = self.eval(cond)?;
                let selected = cond_value
                    .as_bool()
                    .ok_or_else(|| self.type_error(cond, ValueKind::Boolean, cond_value.kind()))?;
                let then_value = self.eval(then)?;
                let elze_value = self.eval(elze)?;
                if then_value.kind() != elze_value.kind() {
                    return Err(self.type_error(elze, then_value.kind(), elze_value.kind()));
                }
                Ok(if selected { then_value } else { elze_value })
            }
            NodeKind::Rule(_) | NodeKind::Random => Err(ArtError::InvalidConstruct {
                origin: node.origin.clone(),
                construct: node.kind.name(),
            }),
        }
    }

    fn number(&self, id: NodeId) -> Result<f32> {
        let value = self.eval(id)?;
        value
            .as_number()
            .ok_or_else(|| self.type_error(id, ValueKind::Number, value.kind()))
    }

    fn type_error(&self, id: NodeId, expected: ValueKind, found: ValueKind) -> ArtError {
        ArtError::Type {
            origin: self.nodes[id].origin.clone(),
            expected,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_numbers() {
        let mut n = NodeArena::new();
        let (a, b) = (n.number(0.5), n.number(0.25));
        let sum = n.add(a, b);
        assert_eq!(evaluate(&n, sum, 0.9, -0.3, 0.1).unwrap(), Value::Number(0.75));
    }

    #[test]
    fn test_inputs() {
        let mut n = NodeArena::new();
        let (x, y, t) = (n.x(), n.y(), n.t());
        let root = n.triple(x, y, t);
        assert_eq!(
            evaluate(&n, root, 0.5, -0.5, 0.25).unwrap(),
            Value::triple(Value::Number(0.5), Value::Number(-0.5), Value::Number(0.25))
        );
    }

    #[test]
    fn test_mod_keeps_dividend_sign() {
        let mut n = NodeArena::new();
        let (a, b) = (n.number(-0.75), n.number(0.5));
        let m = n.modulo(a, b);
        assert_eq!(evaluate(&n, m, 0.0, 0.0, 0.0).unwrap(), Value::Number(-0.25));
    }

    #[test]
    fn test_sqrt_of_negative_is_nan() {
        let mut n = NodeArena::new();
        let a = n.number(-1.0);
        let s = n.sqrt(a);
        let value = evaluate(&n, s, 0.0, 0.0, 0.0).unwrap();
        assert!(value.as_number().unwrap().is_nan());
    }

    #[test]
    fn test_if_selects_branch() {
        let mut n = NodeArena::new();
        let (x, zero) = (n.x(), n.number(0.0));
        let cond = n.gt(x, zero);
        let (one, minus) = (n.number(1.0), n.number(-1.0));
        let root = n.if_else(cond, one, minus);

        assert_eq!(evaluate(&n, root, 0.5, 0.0, 0.0).unwrap(), Value::Number(1.0));
        assert_eq!(evaluate(&n, root, -0.5, 0.0, 0.0).unwrap(), Value::Number(-1.0));
    }

    #[test]
    fn test_if_requires_boolean_condition() {
        let mut n = NodeArena::new();
        let (x, y, t) = (n.x(), n.y(), n.t());
        let root = n.if_else(x, y, t);
        match evaluate(&n, root, 0.0, 0.0, 0.0) {
            Err(ArtError::Type { expected, found, .. }) => {
                assert_eq!(expected, ValueKind::Boolean);
                assert_eq!(found, ValueKind::Number);
            }
            other => panic!("Expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_if_branches_must_match() {
        let mut n = NodeArena::new();
        let cond = n.boolean(true);
        let (x, b) = (n.x(), n.boolean(false));
        let root = n.if_else(cond, x, b);
        assert!(matches!(
            evaluate(&n, root, 0.0, 0.0, 0.0),
            Err(ArtError::Type {
                expected: ValueKind::Number,
                found: ValueKind::Boolean,
                ..
            })
        ));
    }

    #[test]
    fn test_add_rejects_boolean() {
        let mut n = NodeArena::new();
        let (x, b) = (n.x(), n.boolean(true));
        let root = n.add(x, b);
        match evaluate(&n, root, 0.0, 0.0, 0.0) {
            Err(ArtError::Type { origin, .. }) => assert_eq!(origin, n[b].origin),
            other => panic!("Expected type error, got {:?}", other),
        }
    }

    #[test]
    fn test_grammar_only_nodes_rejected() {
        let mut n = NodeArena::new();
        let r = n.random();
        let c = n.rule("C");
        assert!(matches!(
            evaluate(&n, r, 0.0, 0.0, 0.0),
            Err(ArtError::InvalidConstruct { construct: "random", .. })
        ));
        assert!(matches!(
            evaluate(&n, c, 0.0, 0.0, 0.0),
            Err(ArtError::InvalidConstruct { construct: "rule", .. })
        ));
    }

    #[test]
    fn test_evaluate_color() {
        let mut n = NodeArena::new();
        let (x, y) = (n.x(), n.y());
        let root = n.triple(x, y, x);
        assert_eq!(evaluate_color(&n, root, 0.5, -0.5, 0.0).unwrap(), [0.5, -0.5, 0.5]);

        let b = n.boolean(true);
        let bad = n.triple(x, b, x);
        assert!(evaluate_color(&n, bad, 0.0, 0.0, 0.0).is_err());
        assert!(evaluate_color(&n, x, 0.0, 0.0, 0.0).is_err());
    }
}
