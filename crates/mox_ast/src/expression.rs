// mox_ast/expression - Expression types and related constructs
use crate::types::*;
use serde::{Deserialize, Serialize};

/// AST Expression node for the typed tree the qualifier engine consumes.
///
/// Qualifier prefixes and override tokens are ordinary unary decorator
/// nodes (`Qualify`, `Override`) rather than syntax-level special cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    // Literals (always value-type results)
    Literal(Literal, Span),

    // Identifiers
    Identifier(String, Span),

    // `self` inside a method body
    SelfRef(Span),

    // Array literals: [1, 2]
    Array {
        elements: Vec<Expression>,
        span: Span,
    },

    // Object construction: Foo.new(args)
    Construct {
        class: String,
        args: Vec<Expression>,
        span: Span,
    },

    // Binary operations
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
        span: Span,
    },

    // Field access: obj.field
    FieldAccess {
        object: Box<Expression>,
        field: String,
        span: Span,
    },

    // Method or free-function call. `receiver` is `None` for free calls.
    Call {
        receiver: Option<Box<Expression>>,
        method: String,
        args: Vec<Expression>,
        span: Span,
    },

    // Assignment as an expression. With an atomic target the result is
    // the previously referenced value; otherwise the newly stored one.
    Assign {
        target: Box<Expression>,
        value: Box<Expression>,
        span: Span,
    },

    // Value-constructor qualifier prefix: `const [1, 2]`, `atomic Foo.new`.
    // Sets the flags on the value the wrapped expression produces.
    Qualify {
        constness: bool,
        atomicity: bool,
        expr: Box<Expression>,
        span: Span,
    },

    // Per-access override token(s): `mutable x`, `atomic (expr)` at a use
    // site. Forces interpretation of this single access only.
    Override {
        tokens: OverrideTokens,
        expr: Box<Expression>,
        span: Span,
    },
}

impl Expression {
    pub fn span(&self) -> &Span {
        match self {
            Expression::Literal(_, span)
            | Expression::Identifier(_, span)
            | Expression::SelfRef(span) => span,
            Expression::Array { span, .. }
            | Expression::Construct { span, .. }
            | Expression::Binary { span, .. }
            | Expression::FieldAccess { span, .. }
            | Expression::Call { span, .. }
            | Expression::Assign { span, .. }
            | Expression::Qualify { span, .. }
            | Expression::Override { span, .. } => span,
        }
    }
}
