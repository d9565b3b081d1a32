// mox_cli - CLI functionality (library interface for testing)
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use mox_ast::Program;
use mox_checker::diagnostics::{from_check_error, ToolingDiagnostic};
use mox_checker::{Analysis, QualifierChecker};

#[derive(Parser)]
#[command(name = "mox")]
#[command(about = "Qualifier checker for mox programs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Check a program for qualifier violations
    Check {
        /// Input program (JSON syntax tree)
        input: String,
        /// Print the binding qualifier table
        #[arg(long)]
        emit_bindings: bool,
        /// Print resolved call sites and fallbacks
        #[arg(long)]
        emit_calls: bool,
        /// Print store-site classification (plain vs atomic exchange)
        #[arg(long)]
        emit_stores: bool,
    },
    /// Show version information
    Version,
}

pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Load and deserialize a program from disk.
pub fn load_program(path: &Path) -> Result<Program> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&source)
        .with_context(|| format!("Failed to parse program in {}", path.display()))
}

pub fn check_program(program: &Program) -> Analysis {
    QualifierChecker::new().check_program(program)
}

/// Render one diagnostic in the `severity[CODE]: message` form.
pub fn render_diagnostic(diagnostic: &ToolingDiagnostic, severity: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{severity}[{}]: {}",
        diagnostic.code, diagnostic.message
    );
    if let Some(span) = &diagnostic.span {
        let _ = writeln!(out, "  --> {}:{}", span.start_line, span.start_column);
    }
    let _ = writeln!(out, "  help: {}", diagnostic.help);
    out
}

/// Render the full analysis report: warnings first, then errors, then a
/// one-line summary.
pub fn render_report(analysis: &Analysis) -> String {
    let mut out = String::new();
    for warning in &analysis.warnings {
        out.push_str(&render_diagnostic(&from_check_error(warning), "warning"));
    }
    for error in &analysis.diagnostics {
        out.push_str(&render_diagnostic(&from_check_error(error), "error"));
    }
    if analysis.has_errors() {
        let _ = writeln!(
            out,
            "check failed: {} error(s), {} warning(s)",
            analysis.diagnostics.len(),
            analysis.warnings.len()
        );
    } else {
        let _ = writeln!(out, "check passed: {} warning(s)", analysis.warnings.len());
    }
    out
}

pub fn render_bindings(analysis: &Analysis) -> String {
    let mut out = String::from("bindings:\n");
    for binding in &analysis.bindings {
        let constness = if binding.is_const { "const" } else { "mutable" };
        let atomicity = if binding.is_atomic { "atomic" } else { "volatile" };
        let _ = writeln!(out, "  {} [{constness}, {atomicity}]", binding.name);
    }
    out
}

pub fn render_calls(analysis: &Analysis) -> String {
    let mut out = String::from("calls:\n");
    for call in &analysis.calls {
        let mut notes = Vec::new();
        if call.const_fallback {
            notes.push("const fallback");
        }
        if call.atomic_fallback {
            notes.push("atomic fallback");
        }
        let notes = if notes.is_empty() {
            String::new()
        } else {
            format!(" ({})", notes.join(", "))
        };
        let _ = writeln!(
            out,
            "  {}.{} -> variant {}{notes}",
            call.class, call.method, call.variant
        );
    }
    out
}

pub fn render_stores(analysis: &Analysis) -> String {
    let mut out = String::from("stores:\n");
    for store in &analysis.stores {
        let _ = writeln!(out, "  {} = {:?}", store.target, store.kind);
    }
    out
}
