//! Lexical scope stack of bindings.
//!
//! Bindings are created at declaration and discarded at scope exit;
//! parameter bindings are created fresh per call. The annotation pair is
//! immutable for the binding's lifetime, only the referenced value may
//! change (and only when the binding is not const).

use crate::arena::ValueId;
use mox_ast::{OverrideTokens, QualifierPair, Span};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct BindingData {
    pub qualifiers: QualifierPair,
    /// Per-axis effective qualifier forced onto this binding: used for
    /// parameter pass-through and the unchecked escape hatch. Never set
    /// for ordinary declarations.
    pub forced: OverrideTokens,
    pub value: ValueId,
    pub span: Span,
}

impl BindingData {
    pub fn new(qualifiers: QualifierPair, value: ValueId, span: Span) -> Self {
        Self {
            qualifiers,
            forced: OverrideTokens::none(),
            value,
            span,
        }
    }
}

#[derive(Debug)]
pub struct Environment {
    scopes: Vec<HashMap<String, BindingData>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn exit_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn declare(&mut self, name: String, binding: BindingData) {
        if let Some(current) = self.scopes.last_mut() {
            current.insert(name, binding);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&BindingData> {
        for scope in self.scopes.iter().rev() {
            if let Some(binding) = scope.get(name) {
                return Some(binding);
            }
        }
        None
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut BindingData> {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(binding) = scope.get_mut(name) {
                return Some(binding);
            }
        }
        None
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
