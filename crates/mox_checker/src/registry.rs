//! Class and method registry.
//!
//! Variant tags left unmarked in the source are resolved here, once, at
//! construction time: an unmarked axis defaults to `UnsafeOnly`, except
//! that a class-level `atomic` declaration flips the default of the
//! atomicity axis (and only that axis) to `SafeOnly`.

use mox_ast::{Program, TypeCategory, VariantTag};
use std::collections::HashMap;

pub const ARRAY_CLASS: &str = "Array";

/// Where a resolved variant's body lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantSource {
    /// Built-in method with an opaque body.
    Builtin,
    /// Indices into `program.classes[class].methods[method].variants[variant]`.
    Declared {
        class: usize,
        method: usize,
        variant: usize,
    },
}

#[derive(Debug, Clone)]
pub struct VariantInfo {
    pub constness: VariantTag,
    pub atomicity: VariantTag,
    pub source: VariantSource,
}

#[derive(Debug, Clone)]
pub struct ClassInfo {
    pub category: TypeCategory,
    pub atomic_default: bool,
    /// Index into `program.classes` for declared classes.
    pub decl: Option<usize>,
    pub methods: HashMap<String, Vec<VariantInfo>>,
}

#[derive(Debug)]
pub struct Registry {
    classes: HashMap<String, ClassInfo>,
}

impl Registry {
    pub fn build(program: &Program) -> Self {
        let mut classes = HashMap::new();
        classes.insert(ARRAY_CLASS.to_string(), builtin_array());

        for (class_index, class) in program.classes.iter().enumerate() {
            let mut methods: HashMap<String, Vec<VariantInfo>> = HashMap::new();
            for (method_index, method) in class.methods.iter().enumerate() {
                let variants = method
                    .variants
                    .iter()
                    .enumerate()
                    .map(|(variant_index, variant)| VariantInfo {
                        constness: variant.constness.unwrap_or(VariantTag::UnsafeOnly),
                        atomicity: variant.atomicity.unwrap_or(if class.atomic_default {
                            VariantTag::SafeOnly
                        } else {
                            VariantTag::UnsafeOnly
                        }),
                        source: VariantSource::Declared {
                            class: class_index,
                            method: method_index,
                            variant: variant_index,
                        },
                    })
                    .collect();
                methods.insert(method.name.clone(), variants);
            }
            classes.insert(
                class.name.clone(),
                ClassInfo {
                    category: class.category,
                    atomic_default: class.atomic_default,
                    decl: Some(class_index),
                    methods,
                },
            );
        }

        Self { classes }
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn method(&self, class: &str, name: &str) -> Option<&[VariantInfo]> {
        self.classes
            .get(class)
            .and_then(|info| info.methods.get(name))
            .map(Vec::as_slice)
    }
}

fn builtin_array() -> ClassInfo {
    let mutating = VariantInfo {
        constness: VariantTag::UnsafeOnly,
        atomicity: VariantTag::Both,
        source: VariantSource::Builtin,
    };
    let reading = VariantInfo {
        constness: VariantTag::SafeOnly,
        atomicity: VariantTag::Both,
        source: VariantSource::Builtin,
    };

    let mut methods = HashMap::new();
    methods.insert("push".to_string(), vec![mutating.clone()]);
    methods.insert("pop".to_string(), vec![mutating]);
    methods.insert("len".to_string(), vec![reading.clone()]);
    methods.insert("first".to_string(), vec![reading]);

    ClassInfo {
        category: TypeCategory::Reference,
        atomic_default: false,
        decl: None,
        methods,
    }
}
