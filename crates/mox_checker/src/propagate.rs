//! Bottom-up qualifier propagation over the typed tree.
//!
//! For every binding declaration the engine fixes an annotation pair,
//! for every expression it computes the resulting effective qualifiers,
//! and for every call it consults overload resolution. Method bodies are
//! analyzed once per concrete qualifier context actually reached at
//! their call sites (monomorphization over the 2x2 space), with the
//! forwarded pair acting as the effective qualifier of `self`.

use std::collections::HashMap;
use std::mem;

use mox_ast::{
    Expression, OverrideTokens, ParameterDeclaration, Program, Qualifier, QualifierPair, Safety,
    Span, Statement, TypeCategory,
};

use crate::arena::{FieldSlot, ValueArena, ValueCategory, ValueId};
use crate::env::{BindingData, Environment};
use crate::lattice::{effective_axis, Axis, EffectivePair};
use crate::registry::{Registry, VariantSource, ARRAY_CLASS};
use crate::resolve::resolve_variant;
use crate::{Analysis, BindingSummary, CallResolution, CheckError, StoreKind, StoreSite};

/// Where an access can be written back to.
#[derive(Debug, Clone)]
enum Place {
    Local(String),
    Field { object: ValueId, field: String },
}

/// One evaluated access: the referenced value plus everything the
/// lattice needs to answer "is this access safe" per axis.
#[derive(Debug, Clone)]
struct Access {
    value: ValueId,
    binding: QualifierPair,
    forced: OverrideTokens,
    overrides: OverrideTokens,
    place: Option<Place>,
    /// The value was constructed by this very expression, so a
    /// construction-site qualifier prefix may still set its flags.
    fresh: bool,
}

impl Access {
    fn fresh_value(value: ValueId) -> Self {
        Self {
            value,
            binding: QualifierPair::unset(),
            forced: OverrideTokens::none(),
            overrides: OverrideTokens::none(),
            place: None,
            fresh: true,
        }
    }

    fn carried_value(value: ValueId) -> Self {
        Self {
            fresh: false,
            ..Self::fresh_value(value)
        }
    }
}

/// Memo key for monomorphized method-body analysis.
type MethodKey = (String, String, usize, Safety, Safety);

pub struct PropagationEngine<'p> {
    program: &'p Program,
    registry: Registry,
    arena: ValueArena,
    env: Environment,
    analysis: Analysis,
    /// Body analyses already performed, keyed by qualifier context,
    /// mapped to the value the body returned (if any). Only the body
    /// walk is memoized; argument binding runs at every call site.
    analyzed_methods: HashMap<MethodKey, Option<ValueId>>,
    active_functions: Vec<String>,
}

impl<'p> PropagationEngine<'p> {
    pub fn run(program: &'p Program) -> Analysis {
        let mut engine = Self {
            program,
            registry: Registry::build(program),
            arena: ValueArena::new(),
            env: Environment::new(),
            analysis: Analysis::default(),
            analyzed_methods: HashMap::new(),
            active_functions: Vec::new(),
        };
        engine.check_statements(&program.statements);
        engine.analysis
    }

    fn error(&mut self, error: CheckError) {
        self.analysis.diagnostics.push(error);
    }

    fn warn(&mut self, warning: CheckError) {
        self.analysis.warnings.push(warning);
    }

    /// Bodies may be walked once per qualifier context and call sites
    /// re-bind parameters every time; a repeat walk must not duplicate
    /// summary rows.
    fn record_binding_summary(&mut self, summary: BindingSummary) {
        if !self.analysis.bindings.contains(&summary) {
            self.analysis.bindings.push(summary);
        }
    }

    fn poisoned(&mut self, span: &Span) -> Access {
        Access::fresh_value(self.arena.alloc_scalar(span.clone()))
    }

    fn effective(&self, access: &Access) -> EffectivePair {
        let data = self.arena.get(access.value);
        EffectivePair {
            constness: effective_axis(
                access.binding.constness,
                data.is_const,
                access.forced.constness,
                access.overrides.constness,
            ),
            atomicity: effective_axis(
                access.binding.atomicity,
                data.is_atomic,
                access.forced.atomicity,
                access.overrides.atomicity,
            ),
        }
    }

    // ---- statements -----------------------------------------------------

    /// Walk a statement list, returning the access produced by the first
    /// `return` (used as the body result of functions and methods).
    fn check_statements(&mut self, statements: &[Statement]) -> Option<Access> {
        let mut result: Option<Access> = None;
        for statement in statements {
            match statement {
                Statement::Declaration {
                    name,
                    qualifiers,
                    initializer,
                    span,
                } => {
                    let access = self.eval(initializer);
                    self.record_binding_summary(BindingSummary {
                        name: name.clone(),
                        is_const: qualifiers.constness.is_safe(),
                        is_atomic: qualifiers.atomicity.is_safe(),
                        span: span.clone(),
                    });
                    self.env.declare(
                        name.clone(),
                        BindingData::new(*qualifiers, access.value, span.clone()),
                    );
                }
                Statement::Expression { expr, .. } => {
                    self.eval(expr);
                }
                Statement::Return { value, .. } => {
                    let access = value.as_ref().map(|expr| self.eval(expr));
                    if result.is_none() {
                        result = access;
                    }
                }
            }
        }
        result
    }

    // ---- expressions ----------------------------------------------------

    fn eval(&mut self, expression: &Expression) -> Access {
        match expression {
            Expression::Literal(_, span) => {
                Access::fresh_value(self.arena.alloc_scalar(span.clone()))
            }
            Expression::Identifier(name, span) => match self.env.lookup(name) {
                Some(binding) => Access {
                    value: binding.value,
                    binding: binding.qualifiers,
                    forced: binding.forced,
                    overrides: OverrideTokens::none(),
                    place: Some(Place::Local(name.clone())),
                    fresh: false,
                },
                None => {
                    self.error(CheckError::UndefinedVariable {
                        name: name.clone(),
                        span: span.clone(),
                    });
                    self.poisoned(span)
                }
            },
            Expression::SelfRef(span) => match self.env.lookup("self") {
                Some(binding) => Access {
                    value: binding.value,
                    binding: binding.qualifiers,
                    forced: binding.forced,
                    overrides: OverrideTokens::none(),
                    place: None,
                    fresh: false,
                },
                None => {
                    self.error(CheckError::ValidationError {
                        message: "`self` used outside of a method body".to_string(),
                        span: span.clone(),
                    });
                    self.poisoned(span)
                }
            },
            Expression::Array { elements, span } => {
                for element in elements {
                    self.eval(element);
                }
                let value = self.arena.alloc(
                    ValueCategory::Reference,
                    Some(ARRAY_CLASS.to_string()),
                    span.clone(),
                );
                Access::fresh_value(value)
            }
            Expression::Binary { left, right, span, .. } => {
                self.eval(left);
                self.eval(right);
                Access::fresh_value(self.arena.alloc_scalar(span.clone()))
            }
            Expression::Construct { class, args, span } => {
                for arg in args {
                    self.eval(arg);
                }
                self.eval_construct(class, span)
            }
            Expression::Qualify {
                constness,
                atomicity,
                expr,
                span,
            } => self.eval_qualify(*constness, *atomicity, expr, span),
            Expression::Override { tokens, expr, span } => {
                self.eval_override(*tokens, expr, span)
            }
            Expression::FieldAccess {
                object,
                field,
                span,
            } => self.eval_field_access(object, field, span),
            Expression::Call {
                receiver,
                method,
                args,
                span,
            } => match receiver {
                Some(receiver) => self.eval_method_call(receiver, method, args, span),
                None => self.eval_function_call(method, args, span),
            },
            Expression::Assign {
                target,
                value,
                span,
            } => self.eval_assign(target, value, span),
        }
    }

    fn eval_construct(&mut self, class: &str, span: &Span) -> Access {
        let Some(info) = self.registry.class(class) else {
            self.error(CheckError::ValidationError {
                message: format!("unknown class `{class}`"),
                span: span.clone(),
            });
            return self.poisoned(span);
        };
        let category = match info.category {
            TypeCategory::Reference => ValueCategory::Reference,
            TypeCategory::Value => ValueCategory::Value,
        };
        // Field slots are created lazily on first access.
        let value = self
            .arena
            .alloc(category, Some(class.to_string()), span.clone());
        Access::fresh_value(value)
    }

    fn eval_qualify(
        &mut self,
        constness: bool,
        atomicity: bool,
        expr: &Expression,
        span: &Span,
    ) -> Access {
        let inner = self.eval(expr);
        let result = if inner.fresh {
            self.arena
                .qualify(inner.value, constness, atomicity)
                .map(|()| inner.value)
        } else {
            self.arena.qualified_clone(inner.value, constness, atomicity)
        };
        match result {
            Ok(value) => Access::fresh_value(value),
            Err(_) => {
                let type_name = self
                    .arena
                    .get(inner.value)
                    .class
                    .clone()
                    .unwrap_or_else(|| "value".to_string());
                self.error(CheckError::UnsupportedQualifier {
                    type_name,
                    span: span.clone(),
                });
                // const still applies; only the atomic flag is rejected
                let value = if constness {
                    if inner.fresh {
                        let _ = self.arena.qualify(inner.value, true, false);
                        inner.value
                    } else {
                        self.arena
                            .qualified_clone(inner.value, true, false)
                            .unwrap_or(inner.value)
                    }
                } else {
                    inner.value
                };
                Access {
                    fresh: inner.fresh,
                    ..Access::fresh_value(value)
                }
            }
        }
    }

    fn eval_override(
        &mut self,
        tokens: OverrideTokens,
        expr: &Expression,
        span: &Span,
    ) -> Access {
        let mut inner = self.eval(expr);
        let effective = self.effective(&inner);

        // An override that restates the effective qualifier resolves no
        // ambiguity; report it on the warning stream.
        if let Some(token) = tokens.constness {
            if token == effective.constness {
                self.warn(CheckError::InvalidOverride {
                    axis: Axis::Constness,
                    effective: effective.constness,
                    span: span.clone(),
                });
            }
        }
        if let Some(token) = tokens.atomicity {
            if token == effective.atomicity {
                self.warn(CheckError::InvalidOverride {
                    axis: Axis::Atomicity,
                    effective: effective.atomicity,
                    span: span.clone(),
                });
            }
        }

        // Outer tokens win over inner ones on the same axis.
        inner.overrides = OverrideTokens {
            constness: tokens.constness.or(inner.overrides.constness),
            atomicity: tokens.atomicity.or(inner.overrides.atomicity),
        };
        inner
    }

    /// Find or lazily create the field slot, returning its declared pair
    /// and current value.
    fn field_slot(&mut self, object: ValueId, field: &str) -> Option<(QualifierPair, ValueId)> {
        if let Some(slot) = self.arena.get(object).fields.get(field) {
            return Some((slot.qualifiers, slot.value));
        }

        let class = self.arena.get(object).class.clone()?;
        let decl_index = self.registry.class(&class)?.decl?;
        let field_decl = self.program.classes[decl_index]
            .fields
            .iter()
            .find(|decl| decl.name == field)?
            .clone();

        let initial = match field_decl
            .class
            .as_deref()
            .and_then(|name| self.registry.class(name).map(|info| (name, info.category)))
        {
            Some((name, TypeCategory::Reference)) => self.arena.alloc(
                ValueCategory::Reference,
                Some(name.to_string()),
                field_decl.span.clone(),
            ),
            _ => self.arena.alloc_scalar(field_decl.span.clone()),
        };
        let slot = FieldSlot {
            qualifiers: field_decl.qualifiers,
            value: initial,
        };
        self.arena
            .get_mut(object)
            .fields
            .insert(field.to_string(), slot);
        Some((field_decl.qualifiers, initial))
    }

    fn eval_field_access(&mut self, object: &Expression, field: &str, span: &Span) -> Access {
        let receiver = self.eval(object);
        let receiver_effective = self.effective(&receiver);

        let Some((declared, value)) = self.field_slot(receiver.value, field) else {
            let class = self
                .arena
                .get(receiver.value)
                .class
                .clone()
                .unwrap_or_else(|| "value".to_string());
            self.error(CheckError::ValidationError {
                message: format!("no field `{field}` on `{class}`"),
                span: span.clone(),
            });
            return self.poisoned(span);
        };

        // Unset field axes inherit the receiver's effective qualifier;
        // an explicit mutable/volatile axis opts out of inheriting.
        let inherit = |axis: Qualifier, receiver_axis: Safety| -> Qualifier {
            match axis {
                Qualifier::Unset if receiver_axis == Safety::Safe => Qualifier::Safe,
                other => other,
            }
        };
        let binding = QualifierPair {
            constness: inherit(declared.constness, receiver_effective.constness),
            atomicity: inherit(declared.atomicity, receiver_effective.atomicity),
        };

        Access {
            value,
            binding,
            forced: OverrideTokens::none(),
            overrides: OverrideTokens::none(),
            place: Some(Place::Field {
                object: receiver.value,
                field: field.to_string(),
            }),
            fresh: false,
        }
    }

    // ---- assignment -----------------------------------------------------

    fn eval_assign(&mut self, target: &Expression, value: &Expression, span: &Span) -> Access {
        let new_value = self.eval(value);
        let diagnostics_before = self.analysis.diagnostics.len();
        let target_access = self.eval(target);

        let Some(place) = target_access.place.clone() else {
            // an undefined target already produced its own diagnostic
            if self.analysis.diagnostics.len() == diagnostics_before {
                self.error(CheckError::ValidationError {
                    message: "invalid assignment target".to_string(),
                    span: span.clone(),
                });
            }
            return Access::carried_value(new_value.value);
        };

        let target_name = match &place {
            Place::Local(name) => name.clone(),
            Place::Field { field, .. } => field.clone(),
        };

        // Reassignment is blocked by binding-level constness only (the
        // referenced value's own const flag never blocks rebinding the
        // slot), and an explicit mutable override unblocks this one
        // access.
        let binding_const = target_access.binding.constness.is_safe()
            || target_access.forced.constness == Some(Safety::Safe);
        let overridden_mutable = target_access.overrides.constness == Some(Safety::Unsafe);
        if binding_const && !overridden_mutable {
            let value_flag = if self.arena.get(target_access.value).is_const {
                Safety::Safe
            } else {
                Safety::Unsafe
            };
            self.error(CheckError::ConstViolation {
                name: target_name,
                binding: target_access.binding.constness,
                value: value_flag,
                span: span.clone(),
            });
            return Access::carried_value(new_value.value);
        }

        // Atomic bindings store via a single atomic exchange evaluating
        // to the previous referenced value.
        let binding_atomic = target_access.binding.atomicity.is_safe()
            || target_access.forced.atomicity == Some(Safety::Safe);
        let kind = match target_access.overrides.atomicity {
            Some(Safety::Unsafe) => StoreKind::Plain,
            Some(Safety::Safe) => StoreKind::AtomicExchange,
            None if binding_atomic => StoreKind::AtomicExchange,
            None => StoreKind::Plain,
        };
        self.analysis.stores.push(StoreSite {
            target: target_name,
            kind,
            span: span.clone(),
        });

        let previous = target_access.value;
        match place {
            Place::Local(name) => {
                if let Some(binding) = self.env.lookup_mut(&name) {
                    binding.value = new_value.value;
                }
            }
            Place::Field { object, field } => {
                if let Some(slot) = self.arena.get_mut(object).fields.get_mut(&field) {
                    slot.value = new_value.value;
                }
            }
        }

        match kind {
            StoreKind::AtomicExchange => Access::carried_value(previous),
            StoreKind::Plain => Access::carried_value(new_value.value),
        }
    }

    // ---- calls ----------------------------------------------------------

    /// Bind one callee parameter from a caller-side argument access.
    /// Scope-local: never alters the caller's binding or value.
    fn bind_parameter(
        &mut self,
        param: &ParameterDeclaration,
        argument: &Access,
        call_span: &Span,
    ) -> BindingData {
        let argument_effective = self.effective(argument);
        let mut binding = BindingData::new(QualifierPair::unset(), argument.value, param.span.clone());

        // A parameter with an explicit safe axis detaches its unset
        // companion axis from the caller's binding: only the argument
        // value's own flag travels into the callee scope.
        let has_safe_axis = param.qualifiers.constness == Qualifier::Safe
            || param.qualifiers.atomicity == Qualifier::Safe;

        let axes = [
            (
                Axis::Constness,
                param.qualifiers.constness,
                argument_effective.constness,
                argument.overrides.constness,
            ),
            (
                Axis::Atomicity,
                param.qualifiers.atomicity,
                argument_effective.atomicity,
                argument.overrides.atomicity,
            ),
        ];

        for (axis, declared, effective, override_token) in axes {
            let (qualifier, forced) = match declared {
                // Explicit safe parameter: fresh constraint for the
                // callee scope; the value-side flag still travels.
                Qualifier::Safe => (Qualifier::Safe, None),
                // Explicit unsafe parameter: reject effectively-safe
                // arguments unless the call site forces the unsafe
                // reading (unchecked escape hatch). The forced token
                // persists into the callee scope, where the value-side
                // flag would otherwise resurface.
                Qualifier::Unsafe => {
                    if override_token == Some(Safety::Unsafe) {
                        (Qualifier::Unsafe, Some(Safety::Unsafe))
                    } else if effective == Safety::Safe {
                        self.error(CheckError::QualifierMismatch {
                            parameter: param.name.clone(),
                            axis,
                            declared,
                            argument: effective,
                            span: call_span.clone(),
                        });
                        (Qualifier::Unsafe, None)
                    } else {
                        (Qualifier::Unsafe, None)
                    }
                }
                // Transparent pass-through of the caller-side effective
                // qualifier: no new constraint, no relaxation. Next to
                // an explicit safe axis the caller binding is out of
                // the picture and the value flag alone decides.
                Qualifier::Unset => {
                    if has_safe_axis {
                        (Qualifier::Unset, None)
                    } else {
                        (Qualifier::Unset, Some(effective))
                    }
                }
            };
            match axis {
                Axis::Constness => {
                    binding.qualifiers.constness = qualifier;
                    binding.forced.constness = forced;
                }
                Axis::Atomicity => {
                    binding.qualifiers.atomicity = qualifier;
                    binding.forced.atomicity = forced;
                }
            }
        }

        binding
    }

    fn record_parameter_summary(&mut self, binding: &BindingData, name: &str) {
        self.record_binding_summary(BindingSummary {
            name: name.to_string(),
            is_const: binding.qualifiers.constness.is_safe()
                || binding.forced.constness == Some(Safety::Safe),
            is_atomic: binding.qualifiers.atomicity.is_safe()
                || binding.forced.atomicity == Some(Safety::Safe),
            span: binding.span.clone(),
        });
    }

    /// Bind every callee parameter from its caller-side argument.
    /// Runs at every call site, memo hit or not, so qualifier
    /// mismatches are reported per site.
    fn bind_parameters(
        &mut self,
        params: &[ParameterDeclaration],
        arguments: &[Access],
        call_span: &Span,
    ) -> Vec<(String, BindingData)> {
        params
            .iter()
            .zip(arguments)
            .map(|(param, argument)| {
                let binding = self.bind_parameter(param, argument, call_span);
                self.record_parameter_summary(&binding, &param.name);
                (param.name.clone(), binding)
            })
            .collect()
    }

    fn eval_function_call(&mut self, name: &str, args: &[Expression], span: &Span) -> Access {
        let program = self.program;
        let Some(function) = program.functions.iter().find(|function| function.name == name)
        else {
            self.error(CheckError::ValidationError {
                message: format!("unknown function `{name}`"),
                span: span.clone(),
            });
            return self.poisoned(span);
        };

        let arguments: Vec<Access> = args.iter().map(|arg| self.eval(arg)).collect();
        if arguments.len() != function.params.len() {
            self.error(CheckError::ValidationError {
                message: format!(
                    "function `{name}` expects {} argument(s), got {}",
                    function.params.len(),
                    arguments.len()
                ),
                span: span.clone(),
            });
            return self.poisoned(span);
        }

        let bindings = self.bind_parameters(&function.params, &arguments, span);

        if self.active_functions.iter().any(|active| active == name) {
            // recursion: parameters were checked, the body is already
            // being analyzed further up the stack
            return self.poisoned(span);
        }

        self.active_functions.push(name.to_string());
        let result = self.run_body(None, bindings, &function.body);
        self.active_functions.pop();

        match result {
            Some(access) => Access::carried_value(access.value),
            None => self.poisoned(span),
        }
    }

    /// Analyze a function or method body in a fresh environment.
    /// `self_binding` carries the receiver for method bodies.
    fn run_body(
        &mut self,
        self_binding: Option<BindingData>,
        bindings: Vec<(String, BindingData)>,
        body: &[Statement],
    ) -> Option<Access> {
        let saved = mem::replace(&mut self.env, Environment::new());
        if let Some(binding) = self_binding {
            self.env.declare("self".to_string(), binding);
        }
        for (name, binding) in bindings {
            self.env.declare(name, binding);
        }
        let result = self.check_statements(body);
        self.env = saved;
        result
    }

    fn eval_method_call(
        &mut self,
        receiver: &Expression,
        method: &str,
        args: &[Expression],
        span: &Span,
    ) -> Access {
        let receiver_access = self.eval(receiver);
        // Overrides on the receiver already flowed into the effective
        // pair, so the required tags are exactly this pair.
        let required = self.effective(&receiver_access);

        let Some(class) = self.arena.get(receiver_access.value).class.clone() else {
            self.error(CheckError::ValidationError {
                message: format!("method `{method}` called on a classless value"),
                span: span.clone(),
            });
            return self.poisoned(span);
        };

        let Some(variants) = self.registry.method(&class, method).map(<[_]>::to_vec) else {
            self.error(CheckError::ValidationError {
                message: format!("unknown method `{method}` on `{class}`"),
                span: span.clone(),
            });
            return self.poisoned(span);
        };

        let resolution = match resolve_variant(method, &variants, required, span) {
            Ok(resolution) => resolution,
            Err(error) => {
                self.error(error);
                for arg in args {
                    self.eval(arg);
                }
                return self.poisoned(span);
            }
        };

        self.analysis.calls.push(CallResolution {
            class: class.clone(),
            method: method.to_string(),
            variant: resolution.variant,
            constness: resolution.context.constness,
            atomicity: resolution.context.atomicity,
            const_fallback: resolution.const_fallback,
            atomic_fallback: resolution.atomic_fallback,
            span: span.clone(),
        });

        let arguments: Vec<Access> = args.iter().map(|arg| self.eval(arg)).collect();

        match variants[resolution.variant].source {
            VariantSource::Builtin => {
                // opaque body: mutating builtins route through the
                // atomic primitive collaborator when resolved atomic
                self.poisoned(span)
            }
            VariantSource::Declared {
                class: class_index,
                method: method_index,
                variant: variant_index,
            } => {
                let program = self.program;
                let variant =
                    &program.classes[class_index].methods[method_index].variants[variant_index];
                if arguments.len() != variant.params.len() {
                    self.error(CheckError::ValidationError {
                        message: format!(
                            "method `{method}` expects {} argument(s), got {}",
                            variant.params.len(),
                            arguments.len()
                        ),
                        span: span.clone(),
                    });
                    return self.poisoned(span);
                }

                // Argument binding is per call site; only the body walk
                // and the return qualifiers are memoized per context.
                let bindings = self.bind_parameters(&variant.params, &arguments, span);

                let key: MethodKey = (
                    class.clone(),
                    method.to_string(),
                    resolution.variant,
                    resolution.context.constness,
                    resolution.context.atomicity,
                );
                if let Some(returned) = self.analyzed_methods.get(&key).copied() {
                    return match returned {
                        Some(value) => Access::carried_value(value),
                        None => self.poisoned(span),
                    };
                }
                // placeholder guards recursive re-entry in this context
                self.analyzed_methods.insert(key.clone(), None);

                // The resolved context pair is the effective qualifier of
                // `self` for the whole body; inner calls re-resolve
                // against it statically.
                let mut self_binding = BindingData::new(
                    QualifierPair::unset(),
                    receiver_access.value,
                    variant.span.clone(),
                );
                self_binding.forced = OverrideTokens {
                    constness: Some(resolution.context.constness),
                    atomicity: Some(resolution.context.atomicity),
                };

                let result = self.run_body(Some(self_binding), bindings, &variant.body);
                let returned = result.as_ref().map(|access| access.value);
                self.analyzed_methods.insert(key, returned);

                match result {
                    Some(access) => Access::carried_value(access.value),
                    None => self.poisoned(span),
                }
            }
        }
    }
}
