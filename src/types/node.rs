//! Expression tree nodes and the arena that owns them.
//!
//! Nodes are addressed by [`NodeId`] handles into a [`NodeArena`]. One arena
//! holds the templates of a grammar; every generation pass gets a fresh arena
//! of its own, and dropping it releases the whole tree at once.

use std::fmt;
use std::ops::Index;

use crate::parser::Location;

/// Handle to a node inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a node was defined. Diagnostic only, never affects evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Parsed from grammar text.
    Grammar(Location),
    /// Built directly from Rust code.
    Code { file: &'static str, line: u32 },
}

impl Origin {
    /// Origin of the calling code.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Origin::Code {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Grammar(location) => write!(f, "{}", location),
            Origin::Code { file, line } => write!(f, "{}:{}", file, line),
        }
    }
}

/// The kind of a node and its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    X,
    Y,
    T,
    Number(f32),
    Boolean(bool),
    Sqrt(NodeId),
    Add(NodeId, NodeId),
    Mult(NodeId, NodeId),
    Mod(NodeId, NodeId),
    GreaterThan(NodeId, NodeId),
    Triple(NodeId, NodeId, NodeId),
    If {
        cond: NodeId,
        then: NodeId,
        elze: NodeId,
    },
    /// Reference to a grammar rule by name (grammar templates only).
    Rule(String),
    /// A number drawn from [-1, 1] at generation time (grammar templates only).
    Random,
}

impl NodeKind {
    /// Name used in grammar text and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::X => "x",
            NodeKind::Y => "y",
            NodeKind::T => "t",
            NodeKind::Number(_) => "number",
            NodeKind::Boolean(_) => "boolean",
            NodeKind::Sqrt(_) => "sqrt",
            NodeKind::Add(..) => "add",
            NodeKind::Mult(..) => "mult",
            NodeKind::Mod(..) => "mod",
            NodeKind::GreaterThan(..) => "gt",
            NodeKind::Triple(..) => "triple",
            NodeKind::If { .. } => "if",
            NodeKind::Rule(_) => "rule",
            NodeKind::Random => "random",
        }
    }

    /// Whether this kind may only appear inside grammar templates.
    pub fn is_grammar_only(&self) -> bool {
        matches!(self, NodeKind::Rule(_) | NodeKind::Random)
    }

    /// Child handles in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        match *self {
            NodeKind::Sqrt(a) => vec![a],
            NodeKind::Add(a, b)
            | NodeKind::Mult(a, b)
            | NodeKind::Mod(a, b)
            | NodeKind::GreaterThan(a, b) => vec![a, b],
            NodeKind::Triple(a, b, c) => vec![a, b, c],
            NodeKind::If { cond, then, elze } => vec![cond, then, elze],
            _ => Vec::new(),
        }
    }
}

/// A node: its kind plus the place it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub origin: Origin,
}

/// Bump arena of nodes. Nodes are never freed individually.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: NodeKind, origin: Origin) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, origin });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node allocated after the arena had `len` nodes.
    ///
    /// Handles at or past `len` become dangling and must not be used again.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    /// Whether the tree under `id` is free of `Rule` and `Random` nodes.
    pub fn is_concrete(&self, id: NodeId) -> bool {
        let kind = &self[id].kind;
        !kind.is_grammar_only() && kind.children().into_iter().all(|c| self.is_concrete(c))
    }

    /// Nesting depth of the tree under `id` (a leaf has depth 1).
    pub fn depth(&self, id: NodeId) -> usize {
        1 + self[id]
            .kind
            .children()
            .into_iter()
            .map(|c| self.depth(c))
            .max()
            .unwrap_or(0)
    }

    /// Structural equality with a tree in another arena, ignoring origins.
    pub fn same_tree(&self, id: NodeId, other: &NodeArena, other_id: NodeId) -> bool {
        let (a, b) = (&self[id].kind, &other[other_id].kind);
        let shallow = match (a, b) {
            (NodeKind::Number(x), NodeKind::Number(y)) => x == y,
            (NodeKind::Boolean(x), NodeKind::Boolean(y)) => x == y,
            (NodeKind::Rule(x), NodeKind::Rule(y)) => x == y,
            _ => std::mem::discriminant(a) == std::mem::discriminant(b),
        };
        shallow
            && a.children()
                .into_iter()
                .zip(b.children())
                .all(|(x, y)| self.same_tree(x, other, y))
    }

    /// Printable view of the tree under `id`, in grammar template syntax.
    pub fn display(&self, id: NodeId) -> NodeDisplay<'_> {
        NodeDisplay { arena: self, id }
    }

    #[track_caller]
    pub fn x(&mut self) -> NodeId {
        self.alloc(NodeKind::X, Origin::caller())
    }

    #[track_caller]
    pub fn y(&mut self) -> NodeId {
        self.alloc(NodeKind::Y, Origin::caller())
    }

    #[track_caller]
    pub fn t(&mut self) -> NodeId {
        self.alloc(NodeKind::T, Origin::caller())
    }

    #[track_caller]
    pub fn number(&mut self, value: f32) -> NodeId {
        self.alloc(NodeKind::Number(value), Origin::caller())
    }

    #[track_caller]
    pub fn boolean(&mut self, value: bool) -> NodeId {
        self.alloc(NodeKind::Boolean(value), Origin::caller())
    }

    #[track_caller]
    pub fn sqrt(&mut self, value: NodeId) -> NodeId {
        self.alloc(NodeKind::Sqrt(value), Origin::caller())
    }

    #[track_caller]
    pub fn add(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(NodeKind::Add(lhs, rhs), Origin::caller())
    }

    #[track_caller]
    pub fn mult(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(NodeKind::Mult(lhs, rhs), Origin::caller())
    }

    #[track_caller]
    pub fn modulo(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(NodeKind::Mod(lhs, rhs), Origin::caller())
    }

    #[track_caller]
    pub fn gt(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(NodeKind::GreaterThan(lhs, rhs), Origin::caller())
    }

    #[track_caller]
    pub fn triple(&mut self, first: NodeId, second: NodeId, third: NodeId) -> NodeId {
        self.alloc(NodeKind::Triple(first, second, third), Origin::caller())
    }

    #[track_caller]
    pub fn if_else(&mut self, cond: NodeId, then: NodeId, elze: NodeId) -> NodeId {
        self.alloc(NodeKind::If { cond, then, elze }, Origin::caller())
    }

    #[track_caller]
    pub fn rule(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Rule(name.into()), Origin::caller())
    }

    #[track_caller]
    pub fn random(&mut self) -> NodeId {
        self.alloc(NodeKind::Random, Origin::caller())
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// See [`NodeArena::display`].
pub struct NodeDisplay<'a> {
    arena: &'a NodeArena,
    id: NodeId,
}

impl NodeDisplay<'_> {
    fn child(&self, id: NodeId) -> Self {
        NodeDisplay {
            arena: self.arena,
            id,
        }
    }
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = &self.arena[self.id].kind;
        match kind {
            NodeKind::X | NodeKind::Y | NodeKind::T | NodeKind::Random => f.write_str(kind.name()),
            NodeKind::Number(value) => write!(f, "{}", value),
            NodeKind::Boolean(value) => write!(f, "{}", value),
            NodeKind::Rule(name) => f.write_str(name),
            _ => {
                write!(f, "{}(", kind.name())?;
                for (i, child) in kind.children().into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", self.child(child))?;
                }
                f.write_str(")")
            }
        }
    }
}
