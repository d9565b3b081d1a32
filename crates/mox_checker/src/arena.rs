//! Value arena: every runtime-identity object the analysis reasons about.
//!
//! A value's `(is_const, is_atomic)` pair is fixed at the expression that
//! constructs or qualifies it and never changes afterwards. Qualifying an
//! already-constructed value therefore allocates a fresh entry instead of
//! mutating the original.

use mox_ast::{QualifierPair, Span};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub usize);

/// Reference identity vs plain data. Atomicity is meaningless on value
/// types because they have no shared identity to protect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCategory {
    Reference,
    Value,
}

/// Field slot owned by a reference value: the field's declared annotation
/// pair plus the value it currently references.
#[derive(Debug, Clone)]
pub struct FieldSlot {
    pub qualifiers: QualifierPair,
    pub value: ValueId,
}

#[derive(Debug, Clone)]
pub struct ValueData {
    pub is_const: bool,
    pub is_atomic: bool,
    pub category: ValueCategory,
    pub class: Option<String>,
    pub fields: HashMap<String, FieldSlot>,
    pub span: Span,
}

/// Raised when `atomic` is applied to a value-type construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomicOnValueType;

#[derive(Debug, Default)]
pub struct ValueArena {
    values: Vec<ValueData>,
}

impl ValueArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, category: ValueCategory, class: Option<String>, span: Span) -> ValueId {
        let id = ValueId(self.values.len());
        self.values.push(ValueData {
            is_const: false,
            is_atomic: false,
            category,
            class,
            fields: HashMap::new(),
            span,
        });
        id
    }

    /// Fresh value-type temporary (literal or operator result).
    pub fn alloc_scalar(&mut self, span: Span) -> ValueId {
        self.alloc(ValueCategory::Value, None, span)
    }

    pub fn get(&self, id: ValueId) -> &ValueData {
        &self.values[id.0]
    }

    pub fn get_mut(&mut self, id: ValueId) -> &mut ValueData {
        &mut self.values[id.0]
    }

    /// Apply construction-site qualifier flags to a value this very
    /// expression produced. `const` applies to any category; `atomic`
    /// only to reference values.
    pub fn qualify(
        &mut self,
        id: ValueId,
        constness: bool,
        atomicity: bool,
    ) -> Result<(), AtomicOnValueType> {
        let data = self.get_mut(id);
        if constness {
            data.is_const = true;
        }
        if atomicity {
            if data.category == ValueCategory::Value {
                return Err(AtomicOnValueType);
            }
            data.is_atomic = true;
        }
        Ok(())
    }

    /// Qualify an already-constructed value: the original is left
    /// untouched and a new entry carrying the widened flags (and the
    /// same field snapshot) is returned.
    pub fn qualified_clone(
        &mut self,
        id: ValueId,
        constness: bool,
        atomicity: bool,
    ) -> Result<ValueId, AtomicOnValueType> {
        if atomicity && self.get(id).category == ValueCategory::Value {
            return Err(AtomicOnValueType);
        }
        let mut data = self.get(id).clone();
        data.is_const |= constness;
        data.is_atomic |= atomicity;
        let new_id = ValueId(self.values.len());
        self.values.push(data);
        Ok(new_id)
    }
}
