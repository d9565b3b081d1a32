// mox_ast - Abstract Syntax Tree definitions for the mox language
//! Typed program representation consumed by the mox qualifier engine.
//!
//! The tree arrives from an upstream parser/typer with qualifier tokens
//! attached at binding and value-constructor positions, method variant
//! tags on every method body, and per-access override tokens represented
//! as decorator nodes.

// Module declarations
pub mod declaration;
pub mod expression;
pub mod statement;
pub mod types;

// Re-export all public types for convenient access
pub use declaration::*;
pub use expression::*;
pub use statement::*;
pub use types::*;
