// mox_ast/types - Spans, literals, operators, and qualifier annotations
use serde::{Deserialize, Serialize};

/// Position information for AST nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Span {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    pub fn dummy() -> Self {
        Self::default()
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Number(String), // Keep as string for precision
    Boolean(bool),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    Greater,
    And,
    Or,
}

/// Concrete per-axis outcome of qualifier resolution.
///
/// `Safe` reads as `const` on the constness axis and `atomic` on the
/// atomicity axis; `Unsafe` reads as `mutable` and `volatile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Safety {
    Safe,
    Unsafe,
}

/// Per-axis annotation state at a declaration site. `Unset` means no
/// explicit token was written there and the qualifier is inherited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Qualifier {
    #[default]
    Unset,
    Safe,
    Unsafe,
}

impl Qualifier {
    pub fn is_safe(self) -> bool {
        matches!(self, Qualifier::Safe)
    }

    pub fn is_explicit(self) -> bool {
        !matches!(self, Qualifier::Unset)
    }
}

/// The two annotation axes packaged together, as written at a binding,
/// field, or parameter declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QualifierPair {
    #[serde(default)]
    pub constness: Qualifier,
    #[serde(default)]
    pub atomicity: Qualifier,
}

impl QualifierPair {
    pub fn unset() -> Self {
        Self::default()
    }

    /// Pair produced by a `const` declaration prefix.
    pub fn const_binding() -> Self {
        Self {
            constness: Qualifier::Safe,
            atomicity: Qualifier::Unset,
        }
    }

    /// Pair produced by an `atomic` declaration prefix.
    pub fn atomic_binding() -> Self {
        Self {
            constness: Qualifier::Unset,
            atomicity: Qualifier::Safe,
        }
    }

    /// Pair produced by a `mutable` declaration prefix (explicit opt-out).
    pub fn mutable_binding() -> Self {
        Self {
            constness: Qualifier::Unsafe,
            atomicity: Qualifier::Unset,
        }
    }

    /// Pair produced by a `volatile` declaration prefix.
    pub fn volatile_binding() -> Self {
        Self {
            constness: Qualifier::Unset,
            atomicity: Qualifier::Unsafe,
        }
    }
}

/// Explicit per-access override tokens (`mutable`, `volatile`, `const`,
/// `atomic` written at a single use site). An override forces the
/// interpretation of that one access and never alters the underlying
/// binding or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OverrideTokens {
    #[serde(default)]
    pub constness: Option<Safety>,
    #[serde(default)]
    pub atomicity: Option<Safety>,
}

impl OverrideTokens {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn force_mutable() -> Self {
        Self {
            constness: Some(Safety::Unsafe),
            atomicity: None,
        }
    }

    pub fn force_volatile() -> Self {
        Self {
            constness: None,
            atomicity: Some(Safety::Unsafe),
        }
    }

    pub fn force_const() -> Self {
        Self {
            constness: Some(Safety::Safe),
            atomicity: None,
        }
    }

    pub fn force_atomic() -> Self {
        Self {
            constness: None,
            atomicity: Some(Safety::Safe),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constness.is_none() && self.atomicity.is_none()
    }
}
