//! Stochastic generation of concrete trees from a grammar.
//!
//! Each call to [`Generator::generate`] is one generation pass: it allocates a
//! fresh [`NodeArena`], expands the entry rule into it and hands the arena back
//! inside a [`ConcreteTree`]. The grammar itself is only read.
//!
//! Depth is spent only when a rule reference is expanded. A rule asked to
//! expand with a budget of zero or less fails, and so does every template that
//! contains it; the enclosing rule then retries with a fresh draw, up to
//! [`MAX_ATTEMPTS`] times.

use std::fmt;

use rand::Rng;

use crate::error::{ArtError, Result};
use crate::types::{Grammar, NodeArena, NodeId, NodeKind};

/// Draws per rule expansion before the rule gives up.
pub const MAX_ATTEMPTS: usize = 10;

/// A generated tree with no rule references or `random` left in it.
#[derive(Debug, Clone)]
pub struct ConcreteTree {
    arena: NodeArena,
    root: NodeId,
}

impl ConcreteTree {
    pub fn nodes(&self) -> &NodeArena {
        &self.arena
    }

    pub fn root(&self) -> NodeId {
        self.root
    }
}

impl fmt::Display for ConcreteTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.arena.display(self.root))
    }
}

/// Expands grammar rules using a caller-supplied random stream.
pub struct Generator<'a, R: Rng> {
    grammar: &'a Grammar,
    rng: &'a mut R,
    max_attempts: usize,
    /// Per-rule minimum budgets, `None` when pruning is off.
    min_depths: Option<Vec<Option<u32>>>,
}

impl<'a, R: Rng> Generator<'a, R> {
    pub fn new(grammar: &'a Grammar, rng: &'a mut R) -> Self {
        Self {
            grammar,
            rng,
            max_attempts: MAX_ATTEMPTS,
            min_depths: Some(grammar.min_depths()),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Skip the min-depth shortcut and always spend every attempt.
    ///
    /// Results are distributed the same either way; only the work differs.
    pub fn exhaustive(mut self) -> Self {
        self.min_depths = None;
        self
    }

    /// Run one generation pass from `entry` with the given depth budget.
    pub fn generate(&mut self, entry: &str, depth: i32) -> Result<ConcreteTree> {
        if self.grammar.rule(entry).is_none() {
            return Err(ArtError::UnknownRule {
                name: entry.to_string(),
                help: Some(format!(
                    "Defined rules: {}",
                    self.grammar
                        .rules()
                        .iter()
                        .map(|r| r.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            });
        }

        let mut arena = NodeArena::new();
        match self.generate_rule(&mut arena, entry, depth) {
            Some(root) => Ok(ConcreteTree { arena, root }),
            None => Err(ArtError::GenerationExhausted {
                rule: entry.to_string(),
                depth,
                attempts: self.max_attempts,
            }),
        }
    }

    /// Expand rule `name` into `arena`, or `None` if no attempt terminated.
    ///
    /// On failure the arena is left exactly as it was.
    pub fn generate_rule(&mut self, arena: &mut NodeArena, name: &str, depth: i32) -> Option<NodeId> {
        if depth <= 0 {
            return None;
        }

        let grammar = self.grammar;
        let index = grammar.rule_index(name)?;
        if let Some(min_depths) = &self.min_depths {
            let reachable = min_depths[index].is_some_and(|min| i64::from(depth) >= i64::from(min));
            if !reachable {
                return None;
            }
        }

        let rule = &grammar.rules()[index];
        if rule.weight_sum() == 0 {
            return None;
        }

        for _ in 0..self.max_attempts {
            let p = self.rng.gen_range(0..rule.weight_sum());
            let mut cumulative = 0u64;
            let branch = rule.branches().iter().find(|b| {
                cumulative += u64::from(b.weight.get());
                cumulative > p
            })?;

            let mark = arena.len();
            if let Some(node) = self.generate_node(arena, branch.template, depth) {
                return Some(node);
            }
            arena.truncate(mark);
        }

        None
    }

    /// Instantiate a grammar template into `arena`.
    ///
    /// Children share the caller's budget; only rule references spend depth.
    pub fn generate_node(&mut self, arena: &mut NodeArena, template: NodeId, depth: i32) -> Option<NodeId> {
        let grammar = self.grammar;
        let node = &grammar.nodes()[template];
        let origin = node.origin.clone();

        let kind = match &node.kind {
            NodeKind::X => NodeKind::X,
            NodeKind::Y => NodeKind::Y,
            NodeKind::T => NodeKind::T,
            NodeKind::Number(value) => NodeKind::Number(*value),
            NodeKind::Boolean(value) => NodeKind::Boolean(*value),
            NodeKind::Random => NodeKind::Number(self.rng.gen_range(-1.0f32..=1.0)),
            NodeKind::Rule(name) => return self.generate_rule(arena, name, depth.saturating_sub(1)),
            NodeKind::Sqrt(a) => NodeKind::Sqrt(self.generate_node(arena, *a, depth)?),
            NodeKind::Add(a, b) => {
                let (a, b) = self.generate_pair(arena, *a, *b, depth)?;
                NodeKind::Add(a, b)
            }
            NodeKind::Mult(a, b) => {
                let (a, b) = self.generate_pair(arena, *a, *b, depth)?;
                NodeKind::Mult(a, b)
            }
            NodeKind::Mod(a, b) => {
                let (a, b) = self.generate_pair(arena, *a, *b, depth)?;
                NodeKind::Mod(a, b)
            }
            NodeKind::GreaterThan(a, b) => {
                let (a, b) = self.generate_pair(arena, *a, *b, depth)?;
                NodeKind::GreaterThan(a, b)
            }
            NodeKind::Triple(a, b, c) => {
                let (a, b, c) = (*a, *b, *c);
                let a = self.generate_node(arena, a, depth)?;
                let b = self.generate_node(arena, b, depth)?;
                let c = self.generate_node(arena, c, depth)?;
                NodeKind::Triple(a, b, c)
            }
            NodeKind::If { cond, then, elze } => {
                let (cond, then, elze) = (*cond, *then, *elze);
                NodeKind::If {
                    cond: self.generate_node(arena, cond, depth)?,
                    then: self.generate_node(arena, then, depth)?,
                    elze: self.generate_node(arena, elze, depth)?,
                }
            }
        };

        Some(arena.alloc(kind, origin))
    }

    fn generate_pair(&mut self, arena: &mut NodeArena, a: NodeId, b: NodeId, depth: i32) -> Option<(NodeId, NodeId)> {
        let a = self.generate_node(arena, a, depth)?;
        let b = self.generate_node(arena, b, depth)?;
        Some((a, b))
    }
}
