// End-to-end qualifier propagation and overload resolution scenarios.
use mox_ast::{
    ClassDeclaration, Expression, FieldDeclaration, FunctionDeclaration, Literal,
    MethodDeclaration, MethodVariant, OverrideTokens, ParameterDeclaration, Program, QualifierPair,
    Span, Statement, TypeCategory, VariantTag,
};
use mox_checker::{Analysis, CheckError, QualifierChecker, StoreKind};

fn span() -> Span {
    Span::dummy()
}

fn num(text: &str) -> Expression {
    Expression::Literal(Literal::Number(text.to_string()), span())
}

fn ident(name: &str) -> Expression {
    Expression::Identifier(name.to_string(), span())
}

fn array(elements: Vec<Expression>) -> Expression {
    Expression::Array {
        elements,
        span: span(),
    }
}

fn qualify_const(expr: Expression) -> Expression {
    Expression::Qualify {
        constness: true,
        atomicity: false,
        expr: Box::new(expr),
        span: span(),
    }
}

fn qualify_atomic(expr: Expression) -> Expression {
    Expression::Qualify {
        constness: false,
        atomicity: true,
        expr: Box::new(expr),
        span: span(),
    }
}

fn override_tokens(tokens: OverrideTokens, expr: Expression) -> Expression {
    Expression::Override {
        tokens,
        expr: Box::new(expr),
        span: span(),
    }
}

fn construct(class: &str) -> Expression {
    Expression::Construct {
        class: class.to_string(),
        args: vec![],
        span: span(),
    }
}

fn call(receiver: Expression, method: &str, args: Vec<Expression>) -> Expression {
    Expression::Call {
        receiver: Some(Box::new(receiver)),
        method: method.to_string(),
        args,
        span: span(),
    }
}

fn free_call(function: &str, args: Vec<Expression>) -> Expression {
    Expression::Call {
        receiver: None,
        method: function.to_string(),
        args,
        span: span(),
    }
}

fn assign(target: Expression, value: Expression) -> Expression {
    Expression::Assign {
        target: Box::new(target),
        value: Box::new(value),
        span: span(),
    }
}

fn field(object: Expression, name: &str) -> Expression {
    Expression::FieldAccess {
        object: Box::new(object),
        field: name.to_string(),
        span: span(),
    }
}

fn decl(name: &str, qualifiers: QualifierPair, initializer: Expression) -> Statement {
    Statement::Declaration {
        name: name.to_string(),
        qualifiers,
        initializer,
        span: span(),
    }
}

fn stmt(expr: Expression) -> Statement {
    Statement::Expression { expr, span: span() }
}

fn param(name: &str, qualifiers: QualifierPair) -> ParameterDeclaration {
    ParameterDeclaration {
        name: name.to_string(),
        qualifiers,
        span: span(),
    }
}

fn function(name: &str, params: Vec<ParameterDeclaration>, body: Vec<Statement>) -> FunctionDeclaration {
    FunctionDeclaration {
        name: name.to_string(),
        params,
        body,
        span: span(),
    }
}

fn variant(
    constness: Option<VariantTag>,
    atomicity: Option<VariantTag>,
    body: Vec<Statement>,
) -> MethodVariant {
    MethodVariant {
        constness,
        atomicity,
        params: vec![],
        body,
        span: span(),
    }
}

fn method(name: &str, variants: Vec<MethodVariant>) -> MethodDeclaration {
    MethodDeclaration {
        name: name.to_string(),
        variants,
        span: span(),
    }
}

fn class(name: &str, fields: Vec<FieldDeclaration>, methods: Vec<MethodDeclaration>) -> ClassDeclaration {
    ClassDeclaration {
        name: name.to_string(),
        category: TypeCategory::Reference,
        atomic_default: false,
        fields,
        methods,
        span: span(),
    }
}

fn field_decl(name: &str, qualifiers: QualifierPair, class: Option<&str>) -> FieldDeclaration {
    FieldDeclaration {
        name: name.to_string(),
        qualifiers,
        class: class.map(str::to_string),
        span: span(),
    }
}

fn check(classes: Vec<ClassDeclaration>, functions: Vec<FunctionDeclaration>, statements: Vec<Statement>) -> Analysis {
    QualifierChecker::new().check_program(&Program {
        classes,
        functions,
        statements,
        span: span(),
    })
}

// --- scenario A ---------------------------------------------------------

#[test]
fn reassigning_a_const_binding_is_a_const_violation() {
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("x", QualifierPair::const_binding(), num("2")),
            stmt(assign(ident("x"), num("3"))),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::ConstViolation { name, .. } if name == "x"
    ));
    // the rejected store is not classified
    assert!(analysis.stores.is_empty());
}

#[test]
fn const_binding_blocks_reassignment_regardless_of_value_qualifiers() {
    // The referenced value is plain mutable; the binding alone blocks.
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("xs", QualifierPair::const_binding(), array(vec![num("1")])),
            stmt(assign(ident("xs"), array(vec![]))),
        ],
    );
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::ConstViolation { .. }
    ));
}

// --- scenario B / aliasing law ------------------------------------------

#[test]
fn const_value_blocks_mutating_calls_identically_through_every_alias() {
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("x", QualifierPair::unset(), qualify_const(array(vec![num("1"), num("2")]))),
            decl("y", QualifierPair::unset(), ident("x")),
            stmt(call(ident("y"), "push", vec![num("3")])),
            stmt(call(ident("x"), "push", vec![num("3")])),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 2);
    for diagnostic in &analysis.diagnostics {
        assert!(matches!(
            diagnostic,
            CheckError::NoConstVariant { method, .. } if method == "push"
        ));
    }
    // the alias's own binding pair stayed unset
    let alias = analysis
        .bindings
        .iter()
        .find(|binding| binding.name == "y")
        .expect("alias summary");
    assert!(!alias.is_const);
    assert!(!alias.is_atomic);
}

#[test]
fn qualifying_an_existing_value_never_mutates_the_original() {
    // y = const x leaves x fully mutable; only y's value is const.
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("x", QualifierPair::unset(), array(vec![num("1")])),
            decl("y", QualifierPair::unset(), qualify_const(ident("x"))),
            stmt(call(ident("x"), "push", vec![num("2")])),
            stmt(call(ident("y"), "push", vec![num("2")])),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::NoConstVariant { .. }
    ));
}

#[test]
fn reading_methods_fall_back_to_the_const_body_from_mutable_contexts() {
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("xs", QualifierPair::unset(), array(vec![num("1")])),
            stmt(call(ident("xs"), "len", vec![])),
        ],
    );
    assert!(analysis.diagnostics.is_empty());
    let len = &analysis.calls[0];
    assert_eq!(len.method, "len");
    assert!(len.const_fallback);
}

// --- scenario C ---------------------------------------------------------

#[test]
fn atomic_bindings_store_via_atomic_exchange() {
    // atomic a = 42; b = (a = a + 1)
    let increment = assign(
        ident("a"),
        Expression::Binary {
            left: Box::new(ident("a")),
            op: mox_ast::BinaryOp::Add,
            right: Box::new(num("1")),
            span: span(),
        },
    );
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("a", QualifierPair::atomic_binding(), num("42")),
            decl("b", QualifierPair::unset(), increment),
        ],
    );
    assert!(analysis.diagnostics.is_empty());
    assert_eq!(analysis.stores.len(), 1);
    assert_eq!(analysis.stores[0].kind, StoreKind::AtomicExchange);
    let a = analysis
        .bindings
        .iter()
        .find(|binding| binding.name == "a")
        .expect("binding summary");
    assert!(a.is_atomic);
    // binding-level atomic on a value type is legal and does not imply
    // a value-level atomic qualifier, which would be rejected
    assert!(!analysis
        .diagnostics
        .iter()
        .any(|d| matches!(d, CheckError::UnsupportedQualifier { .. })));
}

#[test]
fn plain_bindings_store_plainly() {
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("a", QualifierPair::unset(), num("1")),
            stmt(assign(ident("a"), num("2"))),
        ],
    );
    assert_eq!(analysis.stores[0].kind, StoreKind::Plain);
}

// --- scenario D / scoping law -------------------------------------------

#[test]
fn const_parameter_constrains_the_callee_without_touching_the_caller() {
    let f = function(
        "f",
        vec![param("ary", QualifierPair::const_binding())],
        vec![stmt(call(ident("ary"), "push", vec![num("1")]))],
    );
    let analysis = check(
        vec![],
        vec![f],
        vec![
            decl("arr", QualifierPair::unset(), array(vec![num("1"), num("2")])),
            stmt(free_call("f", vec![ident("arr")])),
            // the same array is still freely mutable in the caller
            stmt(call(ident("arr"), "push", vec![num("3")])),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::NoConstVariant { method, .. } if method == "push"
    ));
    // the caller-side push resolved successfully
    assert!(analysis
        .calls
        .iter()
        .any(|call| call.method == "push" && !call.const_fallback));
}

#[test]
fn plain_parameters_pass_the_caller_effective_pair_through() {
    let f = function(
        "f",
        vec![param("ary", QualifierPair::unset())],
        vec![stmt(call(ident("ary"), "push", vec![num("1")]))],
    );
    // mutable argument: push inside succeeds
    let clean = check(
        vec![],
        vec![f.clone()],
        vec![
            decl("arr", QualifierPair::unset(), array(vec![])),
            stmt(free_call("f", vec![ident("arr")])),
        ],
    );
    assert!(clean.diagnostics.is_empty());

    // const binding in the caller travels into the callee view
    let blocked = check(
        vec![],
        vec![f],
        vec![
            decl("arr", QualifierPair::const_binding(), array(vec![])),
            stmt(free_call("f", vec![ident("arr")])),
        ],
    );
    assert_eq!(blocked.diagnostics.len(), 1);
    assert!(matches!(
        &blocked.diagnostics[0],
        CheckError::NoConstVariant { .. }
    ));
}

// --- explicit unsafe parameters and the escape hatch ---------------------

#[test]
fn unsafe_parameter_rejects_effectively_safe_arguments() {
    let g = function(
        "g",
        vec![param("ary", QualifierPair::mutable_binding())],
        vec![stmt(call(ident("ary"), "push", vec![num("1")]))],
    );
    let analysis = check(
        vec![],
        vec![g],
        vec![
            decl("xs", QualifierPair::unset(), qualify_const(array(vec![num("1")]))),
            stmt(free_call("g", vec![ident("xs")])),
        ],
    );
    assert!(analysis
        .diagnostics
        .iter()
        .any(|d| matches!(d, CheckError::QualifierMismatch { parameter, .. } if parameter == "ary")));
}

#[test]
fn call_site_override_is_an_unchecked_escape_hatch() {
    let g = function(
        "g",
        vec![param("ary", QualifierPair::mutable_binding())],
        vec![stmt(call(ident("ary"), "push", vec![num("1")]))],
    );
    let analysis = check(
        vec![],
        vec![g],
        vec![
            decl("xs", QualifierPair::unset(), qualify_const(array(vec![num("1")]))),
            stmt(free_call(
                "g",
                vec![override_tokens(OverrideTokens::force_mutable(), ident("xs"))],
            )),
        ],
    );
    // no mismatch, and the callee body mutates without complaint
    assert!(analysis.diagnostics.is_empty());
}

#[test]
fn redundant_override_tokens_are_warned_not_rejected() {
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("xs", QualifierPair::unset(), array(vec![])),
            stmt(call(
                override_tokens(OverrideTokens::force_mutable(), ident("xs")),
                "push",
                vec![num("1")],
            )),
        ],
    );
    assert!(analysis.diagnostics.is_empty());
    assert_eq!(analysis.warnings.len(), 1);
    assert!(matches!(
        &analysis.warnings[0],
        CheckError::InvalidOverride { .. }
    ));
}

// --- atomicity axis ------------------------------------------------------

#[test]
fn atomic_on_a_value_type_construction_is_unsupported() {
    let analysis = check(
        vec![],
        vec![],
        vec![decl("a", QualifierPair::unset(), qualify_atomic(num("42")))],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::UnsupportedQualifier { .. }
    ));
}

#[test]
fn volatile_context_silently_pays_for_the_atomic_body() {
    let counter = class(
        "Counter",
        vec![],
        vec![method(
            "bump",
            vec![variant(Some(VariantTag::Both), Some(VariantTag::SafeOnly), vec![])],
        )],
    );
    let analysis = check(
        vec![counter],
        vec![],
        vec![
            decl("c", QualifierPair::unset(), construct("Counter")),
            stmt(call(ident("c"), "bump", vec![])),
        ],
    );
    assert!(analysis.diagnostics.is_empty());
    assert!(analysis.calls[0].atomic_fallback);
}

#[test]
fn atomic_receiver_never_falls_back_to_a_volatile_body() {
    let counter = class(
        "Counter",
        vec![],
        vec![method(
            "bump",
            vec![variant(Some(VariantTag::Both), Some(VariantTag::UnsafeOnly), vec![])],
        )],
    );
    let analysis = check(
        vec![counter],
        vec![],
        vec![
            decl("c", QualifierPair::unset(), qualify_atomic(construct("Counter"))),
            stmt(call(ident("c"), "bump", vec![])),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::NoAtomicVariant { method, .. } if method == "bump"
    ));
}

#[test]
fn atomic_default_classes_mark_unannotated_methods_atomic() {
    let mut gauge = class(
        "Gauge",
        vec![],
        vec![method("read", vec![variant(None, None, vec![])])],
    );
    gauge.atomic_default = true;
    let analysis = check(
        vec![gauge],
        vec![],
        vec![
            decl("g", QualifierPair::unset(), construct("Gauge")),
            stmt(call(ident("g"), "read", vec![])),
        ],
    );
    // the atomicity axis defaulted to the atomic body; the constness
    // axis still defaulted to mutable
    assert!(analysis.diagnostics.is_empty());
    assert!(analysis.calls[0].atomic_fallback);
    assert!(!analysis.calls[0].const_fallback);
}

// --- field writes --------------------------------------------------------

fn point_class() -> ClassDeclaration {
    class(
        "Point",
        vec![
            field_decl("x", QualifierPair::unset(), None),
            field_decl("m", QualifierPair::mutable_binding(), None),
            field_decl("c", QualifierPair::const_binding(), None),
        ],
        vec![],
    )
}

#[test]
fn fields_inherit_the_receiver_effective_constness() {
    let analysis = check(
        vec![point_class()],
        vec![],
        vec![
            decl("p", QualifierPair::unset(), qualify_const(construct("Point"))),
            stmt(assign(field(ident("p"), "x"), num("1"))),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::ConstViolation { name, .. } if name == "x"
    ));
}

#[test]
fn explicit_mutable_fields_opt_out_of_const_inheritance() {
    let analysis = check(
        vec![point_class()],
        vec![],
        vec![
            decl("p", QualifierPair::unset(), qualify_const(construct("Point"))),
            stmt(assign(field(ident("p"), "m"), num("1"))),
        ],
    );
    assert!(analysis.diagnostics.is_empty());
}

#[test]
fn const_fields_reject_writes_even_through_mutable_receivers() {
    let analysis = check(
        vec![point_class()],
        vec![],
        vec![
            decl("p", QualifierPair::unset(), construct("Point")),
            stmt(assign(field(ident("p"), "c"), num("1"))),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::ConstViolation { name, .. } if name == "c"
    ));
}

#[test]
fn chained_writes_check_the_immediate_receiver_not_the_root() {
    let inner = class("Inner", vec![field_decl("n", QualifierPair::unset(), None)], vec![]);
    let outer = class(
        "Outer",
        // the link itself opts out of inheritance, so a const root does
        // not freeze the inner object
        vec![field_decl("inner", QualifierPair::mutable_binding(), Some("Inner"))],
        vec![],
    );
    let analysis = check(
        vec![inner.clone(), outer.clone()],
        vec![],
        vec![
            decl("o", QualifierPair::unset(), qualify_const(construct("Outer"))),
            stmt(assign(field(field(ident("o"), "inner"), "n"), num("1"))),
        ],
    );
    assert!(analysis.diagnostics.is_empty());

    // mirror: mutable root, const inner value
    let analysis = check(
        vec![inner, outer],
        vec![],
        vec![
            decl("o", QualifierPair::unset(), construct("Outer")),
            stmt(assign(field(ident("o"), "inner"), qualify_const(construct("Inner")))),
            stmt(assign(field(field(ident("o"), "inner"), "n"), num("2"))),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::ConstViolation { name, .. } if name == "n"
    ));
}

// --- qualifier forwarding through Both variants --------------------------

#[test]
fn both_variants_forward_the_receiver_qualifier_into_their_body() {
    let holder = class(
        "Holder",
        vec![field_decl("n", QualifierPair::unset(), None)],
        vec![method(
            "touch",
            vec![variant(
                Some(VariantTag::Both),
                Some(VariantTag::Both),
                vec![stmt(assign(
                    field(Expression::SelfRef(span()), "n"),
                    num("1"),
                ))],
            )],
        )],
    );
    let analysis = check(
        vec![holder],
        vec![],
        vec![
            decl("h", QualifierPair::unset(), construct("Holder")),
            stmt(call(ident("h"), "touch", vec![])),
            decl("hc", QualifierPair::unset(), qualify_const(construct("Holder"))),
            stmt(call(ident("hc"), "touch", vec![])),
        ],
    );
    // the mutable monomorphization is clean; the const one rejects the
    // field write inside the same body
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::ConstViolation { name, .. } if name == "n"
    ));
    assert_eq!(analysis.calls.len(), 2);
}

#[test]
fn const_fallback_analyzes_the_body_under_the_const_view() {
    // A const-only body that writes self is broken no matter how it is
    // reached; reaching it via fallback from a mutable receiver must
    // still report the violation.
    let holder = class(
        "Holder",
        vec![field_decl("n", QualifierPair::unset(), None)],
        vec![method(
            "frozen_touch",
            vec![variant(
                Some(VariantTag::SafeOnly),
                Some(VariantTag::Both),
                vec![stmt(assign(
                    field(Expression::SelfRef(span()), "n"),
                    num("1"),
                ))],
            )],
        )],
    );
    let analysis = check(
        vec![holder],
        vec![],
        vec![
            decl("h", QualifierPair::unset(), construct("Holder")),
            stmt(call(ident("h"), "frozen_touch", vec![])),
        ],
    );
    assert!(analysis.calls[0].const_fallback);
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::ConstViolation { .. }
    ));
}

// --- return values -------------------------------------------------------

#[test]
fn returned_values_carry_their_qualifiers_to_the_caller() {
    let mk = function(
        "mk",
        vec![],
        vec![Statement::Return {
            value: Some(qualify_const(array(vec![num("1")]))),
            span: span(),
        }],
    );
    let analysis = check(
        vec![],
        vec![mk],
        vec![
            decl("v", QualifierPair::unset(), free_call("mk", vec![])),
            stmt(call(ident("v"), "push", vec![num("2")])),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::NoConstVariant { .. }
    ));
}

#[test]
fn every_call_site_with_a_mismatched_argument_gets_its_own_diagnostic() {
    let sink = class(
        "Sink",
        vec![],
        vec![method(
            "put",
            vec![MethodVariant {
                constness: Some(VariantTag::Both),
                atomicity: Some(VariantTag::Both),
                params: vec![param("item", QualifierPair::mutable_binding())],
                body: vec![],
                span: span(),
            }],
        )],
    );
    let analysis = check(
        vec![sink],
        vec![],
        vec![
            decl("s", QualifierPair::unset(), construct("Sink")),
            decl(
                "frozen",
                QualifierPair::unset(),
                qualify_const(array(vec![num("1")])),
            ),
            stmt(call(ident("s"), "put", vec![ident("frozen")])),
            stmt(call(ident("s"), "put", vec![ident("frozen")])),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 2);
    for diagnostic in &analysis.diagnostics {
        assert!(matches!(
            diagnostic,
            CheckError::QualifierMismatch { parameter, .. } if parameter == "item"
        ));
    }
}

#[test]
fn memoized_call_results_keep_their_return_qualifiers() {
    let maker = class(
        "Maker",
        vec![],
        vec![method(
            "make",
            vec![variant(
                Some(VariantTag::Both),
                Some(VariantTag::Both),
                vec![Statement::Return {
                    value: Some(qualify_const(array(vec![num("1")]))),
                    span: span(),
                }],
            )],
        )],
    );
    let analysis = check(
        vec![maker],
        vec![],
        vec![
            decl("m", QualifierPair::unset(), construct("Maker")),
            decl("a", QualifierPair::unset(), call(ident("m"), "make", vec![])),
            decl("b", QualifierPair::unset(), call(ident("m"), "make", vec![])),
            stmt(call(ident("a"), "push", vec![num("2")])),
            stmt(call(ident("b"), "push", vec![num("2")])),
        ],
    );
    // the second `make` reuses the analyzed body but its result still
    // carries the const value
    assert_eq!(analysis.diagnostics.len(), 2);
    for diagnostic in &analysis.diagnostics {
        assert!(matches!(
            diagnostic,
            CheckError::NoConstVariant { method, .. } if method == "push"
        ));
    }
}

#[test]
fn const_parameter_atomicity_tracks_the_argument_value_not_the_caller_binding() {
    let chime = class(
        "Chime",
        vec![],
        vec![method(
            "ding",
            vec![variant(
                Some(VariantTag::SafeOnly),
                Some(VariantTag::UnsafeOnly),
                vec![],
            )],
        )],
    );
    let f = function(
        "f",
        vec![param("x", QualifierPair::const_binding())],
        vec![stmt(call(ident("x"), "ding", vec![]))],
    );

    // atomic caller binding over a non-atomic value: the slot-level
    // atomicity stays with the caller
    let clean = check(
        vec![chime.clone()],
        vec![f.clone()],
        vec![
            decl("c", QualifierPair::atomic_binding(), construct("Chime")),
            stmt(free_call("f", vec![ident("c")])),
        ],
    );
    assert!(clean.diagnostics.is_empty());

    // a value-level atomic argument still rules out the volatile body
    let blocked = check(
        vec![chime],
        vec![f],
        vec![
            decl("c", QualifierPair::unset(), qualify_atomic(construct("Chime"))),
            stmt(free_call("f", vec![ident("c")])),
        ],
    );
    assert_eq!(blocked.diagnostics.len(), 1);
    assert!(matches!(
        &blocked.diagnostics[0],
        CheckError::NoAtomicVariant { method, .. } if method == "ding"
    ));
}

#[test]
fn assignment_to_an_undefined_name_is_a_single_diagnostic() {
    let analysis = check(vec![], vec![], vec![stmt(assign(ident("ghost"), num("1")))]);
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(matches!(
        &analysis.diagnostics[0],
        CheckError::UndefinedVariable { name, .. } if name == "ghost"
    ));
}

#[test]
fn bodies_walked_in_two_contexts_do_not_duplicate_binding_rows() {
    let holder = class(
        "Holder",
        vec![],
        vec![method(
            "tally",
            vec![variant(
                Some(VariantTag::Both),
                Some(VariantTag::Both),
                vec![decl("t", QualifierPair::unset(), num("1"))],
            )],
        )],
    );
    let analysis = check(
        vec![holder],
        vec![],
        vec![
            decl("h", QualifierPair::unset(), construct("Holder")),
            stmt(call(ident("h"), "tally", vec![])),
            decl("hc", QualifierPair::unset(), qualify_const(construct("Holder"))),
            stmt(call(ident("hc"), "tally", vec![])),
        ],
    );
    assert!(analysis.diagnostics.is_empty());
    assert_eq!(
        analysis
            .bindings
            .iter()
            .filter(|binding| binding.name == "t")
            .count(),
        1
    );
}

// --- batch reporting ------------------------------------------------------

#[test]
fn all_violations_in_a_unit_are_reported_together() {
    let analysis = check(
        vec![],
        vec![],
        vec![
            decl("x", QualifierPair::const_binding(), num("1")),
            stmt(assign(ident("x"), num("2"))),
            decl("xs", QualifierPair::unset(), qualify_const(array(vec![]))),
            stmt(call(ident("xs"), "push", vec![num("1")])),
            decl("a", QualifierPair::unset(), qualify_atomic(num("3"))),
        ],
    );
    assert_eq!(analysis.diagnostics.len(), 3);
}
