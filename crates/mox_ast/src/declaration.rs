// mox_ast/declaration - Classes, methods, functions, and the program root
use crate::statement::Statement;
use crate::types::{QualifierPair, Span};
use serde::{Deserialize, Serialize};

/// Whether instances of a class have reference identity or are plain
/// value-type data. Atomicity can only be attached to reference values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeCategory {
    Reference,
    Value,
}

/// Per-axis variant tag of a method implementation.
///
/// `SafeOnly` bodies are valid only under the const/atomic view of
/// `self`, `UnsafeOnly` only under the mutable/volatile view, and `Both`
/// bodies are valid under either and forward the caller's effective
/// qualifier into nested calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariantTag {
    SafeOnly,
    UnsafeOnly,
    Both,
}

/// One qualifier-specific implementation of a method. A method with two
/// separate const/mutable bodies is two variants under the same name.
/// `None` on an axis means the declaration carried no tag there; the
/// checker resolves the default (class atomic default, else unsafe) once
/// at registry construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodVariant {
    #[serde(default)]
    pub constness: Option<VariantTag>,
    #[serde(default)]
    pub atomicity: Option<VariantTag>,
    pub params: Vec<ParameterDeclaration>,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,
    pub variants: Vec<MethodVariant>,
    pub span: Span,
}

/// Instance field. Unset axes inherit the enclosing receiver's effective
/// qualifier at each access; an explicit `mutable` axis opts out of that
/// inheritance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(default)]
    pub qualifiers: QualifierPair,
    /// Class of the field's initial value, when it is a known class.
    #[serde(default)]
    pub class: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDeclaration {
    pub name: String,
    #[serde(default)]
    pub qualifiers: QualifierPair,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration {
    pub name: String,
    pub category: TypeCategory,
    /// Class-level `atomic` declaration: unmarked methods default to
    /// the safe tag on the atomicity axis. Never implied for constness.
    #[serde(default)]
    pub atomic_default: bool,
    pub fields: Vec<FieldDeclaration>,
    pub methods: Vec<MethodDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub params: Vec<ParameterDeclaration>,
    pub body: Vec<Statement>,
    pub span: Span,
}

/// A fully parsed and type-checked compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub classes: Vec<ClassDeclaration>,
    #[serde(default)]
    pub functions: Vec<FunctionDeclaration>,
    pub statements: Vec<Statement>,
    pub span: Span,
}
