//! Stable diagnostic codes shared by CLI/LSP-style consumers.

use crate::CheckError;
use mox_ast::Span;

/// Descriptor pairing a diagnostic code with remediation guidance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticDescriptor {
    pub code: &'static str,
    pub title: &'static str,
    pub help: &'static str,
}

/// Diagnostic record rendered by downstream tooling.
#[derive(Debug, Clone)]
pub struct ToolingDiagnostic {
    pub code: &'static str,
    pub title: &'static str,
    pub message: String,
    pub help: &'static str,
    pub span: Option<Span>,
}

const DIAGNOSTICS: &[DiagnosticDescriptor] = &[
    DiagnosticDescriptor {
        code: "MOX4001",
        title: "write through a const binding or receiver",
        help: "Remove the write, declare the binding mutable, or force this single access with an explicit `mutable` override.",
    },
    DiagnosticDescriptor {
        code: "MOX4002",
        title: "no const method variant",
        help: "Add a const or const-agnostic variant of the method, or relax the receiver with an explicit `mutable` override.",
    },
    DiagnosticDescriptor {
        code: "MOX4003",
        title: "no atomic method variant",
        help: "Add an atomic or `atomic?` variant of the method; atomic receivers never fall back to an unsynchronized body.",
    },
    DiagnosticDescriptor {
        code: "MOX4004",
        title: "safe argument passed to an unsafe parameter",
        help: "Pass a mutable/volatile value, or apply the unchecked override token to the argument at the call site.",
    },
    DiagnosticDescriptor {
        code: "MOX4005",
        title: "atomic applied to a value type",
        help: "Only reference values can be atomic; value-type instances have no shared identity to protect.",
    },
    DiagnosticDescriptor {
        code: "MOX4006",
        title: "redundant override token",
        help: "The access already resolves to this qualifier; drop the override token.",
    },
    DiagnosticDescriptor {
        code: "MOX4007",
        title: "undefined variable",
        help: "Declare the binding before its first use.",
    },
    DiagnosticDescriptor {
        code: "MOX4008",
        title: "malformed input program",
        help: "The typed tree violates the upstream parser/typer contract; re-run the frontend.",
    },
];

/// Look up the descriptor for a diagnostic code.
pub fn lookup(code: &str) -> Option<&'static DiagnosticDescriptor> {
    DIAGNOSTICS.iter().find(|descriptor| descriptor.code == code)
}

fn descriptor_for(error: &CheckError) -> &'static DiagnosticDescriptor {
    let code = match error {
        CheckError::ConstViolation { .. } => "MOX4001",
        CheckError::NoConstVariant { .. } => "MOX4002",
        CheckError::NoAtomicVariant { .. } => "MOX4003",
        CheckError::QualifierMismatch { .. } => "MOX4004",
        CheckError::UnsupportedQualifier { .. } => "MOX4005",
        CheckError::InvalidOverride { .. } => "MOX4006",
        CheckError::UndefinedVariable { .. } => "MOX4007",
        CheckError::ValidationError { .. } => "MOX4008",
    };
    // the table above covers every code emitted here
    lookup(code).unwrap_or(&DIAGNOSTICS[0])
}

/// Convert an engine error into the shared tooling form.
pub fn from_check_error(error: &CheckError) -> ToolingDiagnostic {
    let descriptor = descriptor_for(error);
    ToolingDiagnostic {
        code: descriptor.code,
        title: descriptor.title,
        message: error.to_string(),
        help: descriptor.help,
        span: Some(error.span().clone()),
    }
}
