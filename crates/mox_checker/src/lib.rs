// mox_checker - Qualifier resolution for the mox language
//! Static analysis that tracks constness and atomicity through every
//! binding and value of a typed program, propagates them across
//! assignment, aliasing, member access, and call boundaries, and selects
//! method variants per qualifier context. Qualifiers have no runtime
//! representation; every failure here is a compile-time diagnostic.

use mox_ast::{Program, Qualifier, Safety, Span};
use serde::Serialize;
use thiserror::Error;

pub mod arena;
pub mod diagnostics;
pub mod env;
pub mod lattice;
pub mod propagate;
pub mod registry;
pub mod resolve;

pub use lattice::{Axis, EffectivePair};

/// Qualifier violations reported by the engine. Each carries the
/// offending source location and the qualifier values in conflict.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("const violation: `{name}` is const here and cannot be written without an override")]
    ConstViolation {
        name: String,
        binding: Qualifier,
        value: Safety,
        span: Span,
    },

    #[error("no const variant: method `{method}` has no implementation callable through a const receiver")]
    NoConstVariant {
        method: String,
        required: Safety,
        span: Span,
    },

    #[error("no atomic variant: method `{method}` has no implementation callable through an atomic receiver")]
    NoAtomicVariant {
        method: String,
        required: Safety,
        span: Span,
    },

    #[error("qualifier mismatch: parameter `{parameter}` is declared unsafe on the {axis} axis but the argument is effectively safe")]
    QualifierMismatch {
        parameter: String,
        axis: Axis,
        declared: Qualifier,
        argument: Safety,
        span: Span,
    },

    #[error("unsupported qualifier: `atomic` cannot apply to value-type `{type_name}`")]
    UnsupportedQualifier { type_name: String, span: Span },

    #[error("invalid override: the {axis} override restates the effective qualifier of this access")]
    InvalidOverride {
        axis: Axis,
        effective: Safety,
        span: Span,
    },

    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String, span: Span },

    #[error("validation error: {message}")]
    ValidationError { message: String, span: Span },
}

impl CheckError {
    pub fn span(&self) -> &Span {
        match self {
            CheckError::ConstViolation { span, .. }
            | CheckError::NoConstVariant { span, .. }
            | CheckError::NoAtomicVariant { span, .. }
            | CheckError::QualifierMismatch { span, .. }
            | CheckError::UnsupportedQualifier { span, .. }
            | CheckError::InvalidOverride { span, .. }
            | CheckError::UndefinedVariable { span, .. }
            | CheckError::ValidationError { span, .. } => span,
        }
    }
}

/// Final binding-level pair for one declared binding, usable by codegen
/// to decide how stores through it must be emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingSummary {
    pub name: String,
    pub is_const: bool,
    pub is_atomic: bool,
    pub span: Span,
}

/// How a store site must be lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StoreKind {
    Plain,
    /// Single atomic exchange; the expression result is the previous
    /// referenced value.
    AtomicExchange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSite {
    pub target: String,
    pub kind: StoreKind,
    pub span: Span,
}

/// Concrete method variant selected for one call site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResolution {
    pub class: String,
    pub method: String,
    /// Index into the method's variant list.
    pub variant: usize,
    /// Qualifier context forwarded into the variant body.
    pub constness: Safety,
    pub atomicity: Safety,
    /// A mutable-context call silently served by the const-only body.
    pub const_fallback: bool,
    /// A volatile-context call silently served by the atomic body.
    pub atomic_fallback: bool,
    pub span: Span,
}

/// Everything the engine exposes downstream: tables for codegen plus the
/// batch of diagnostics for the unit. Warnings never fail a build.
#[derive(Debug, Default)]
pub struct Analysis {
    pub bindings: Vec<BindingSummary>,
    pub stores: Vec<StoreSite>,
    pub calls: Vec<CallResolution>,
    pub diagnostics: Vec<CheckError>,
    pub warnings: Vec<CheckError>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Entry point for downstream consumers.
pub struct QualifierChecker;

impl QualifierChecker {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a complete unit. Reporting is batched: the walk never
    /// stops at the first violation.
    pub fn check_program(&self, program: &Program) -> Analysis {
        propagate::PropagationEngine::run(program)
    }
}

impl Default for QualifierChecker {
    fn default() -> Self {
        Self::new()
    }
}
