// mox_ast/statement - Statement types
use crate::expression::Expression;
use crate::types::{QualifierPair, Span};
use serde::{Deserialize, Serialize};

/// Statements appearing at the top level and inside bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Binding declaration: `name = expr`, optionally prefixed with
    /// `const`/`atomic`/`mutable`/`volatile` tokens captured in
    /// `qualifiers`. The pair is fixed for the binding's lifetime.
    Declaration {
        name: String,
        #[serde(default)]
        qualifiers: QualifierPair,
        initializer: Expression,
        span: Span,
    },

    /// Bare expression statement (includes reassignments, which are
    /// `Expression::Assign` nodes).
    Expression { expr: Expression, span: Span },

    /// Return from the enclosing function or method body.
    Return {
        value: Option<Expression>,
        span: Span,
    },
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Declaration { span, .. }
            | Statement::Expression { span, .. }
            | Statement::Return { span, .. } => span,
        }
    }
}
