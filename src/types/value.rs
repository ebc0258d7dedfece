//! Values produced by evaluating a concrete tree.

use std::fmt;

/// A terminal evaluation result.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f32),
    Boolean(bool),
    Triple(Box<[Value; 3]>),
}

/// The kind of a [`Value`], used in type errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Boolean,
    Triple,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Number => write!(f, "Number"),
            ValueKind::Boolean => write!(f, "Boolean"),
            ValueKind::Triple => write!(f, "Triple"),
        }
    }
}

impl Value {
    pub fn triple(first: Value, second: Value, third: Value) -> Self {
        Value::Triple(Box::new([first, second, third]))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Triple(_) => ValueKind::Triple,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Triple(parts) => write!(f, "({}, {}, {})", parts[0], parts[1], parts[2]),
        }
    }
}
