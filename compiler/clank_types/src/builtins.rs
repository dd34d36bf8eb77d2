//! Built-in types and functions.
//!
//! Registered once into the root scope of every fresh context. Polymorphic
//! signatures quantify by name; instantiation happens at each use site.

use crate::{
    type_app, type_array, type_con, type_fn, type_fn_effects, type_tuple, Binding, EffectSet,
    Type, TypeContext, TypeDef, TypeScheme, VariantInfo,
};
use clank_ir::Span;

fn t(name: &str) -> Type {
    type_con(name)
}

fn poly1(param: &str, params: Vec<Type>, ret: Type) -> TypeScheme {
    TypeScheme::poly([param], type_fn(params, ret))
}

fn poly2(p1: &str, p2: &str, params: Vec<Type>, ret: Type) -> TypeScheme {
    TypeScheme::poly([p1, p2], type_fn(params, ret))
}

/// Populate `ctx`'s root scope with built-in types and functions.
pub fn register_builtins(ctx: &mut TypeContext) {
    register_builtin_types(ctx);
    register_array_fns(ctx);
    register_string_fns(ctx);
    register_io_fns(ctx);
    register_misc_fns(ctx);
}

fn register_builtin_types(ctx: &mut TypeContext) {
    // Option[T] = Some(T) | None
    ctx.define_type(
        "Option",
        TypeDef::Sum {
            params: vec!["T".to_string()],
            variants: vec![
                VariantInfo {
                    name: "Some".to_string(),
                    fields: vec![t("T")],
                    field_names: None,
                },
                VariantInfo {
                    name: "None".to_string(),
                    fields: vec![],
                    field_names: None,
                },
            ],
            span: Span::DUMMY,
        },
    );
    ctx.define(
        "Some",
        Binding::external(poly1(
            "T",
            vec![t("T")],
            type_app("Option", vec![t("T")]),
        )),
    );
    ctx.define(
        "None",
        Binding::external(TypeScheme::poly(["T"], type_app("Option", vec![t("T")]))),
    );

    // Result[T, E] = Ok(T) | Err(E)
    ctx.define_type(
        "Result",
        TypeDef::Sum {
            params: vec!["T".to_string(), "E".to_string()],
            variants: vec![
                VariantInfo {
                    name: "Ok".to_string(),
                    fields: vec![t("T")],
                    field_names: None,
                },
                VariantInfo {
                    name: "Err".to_string(),
                    fields: vec![t("E")],
                    field_names: None,
                },
            ],
            span: Span::DUMMY,
        },
    );
    ctx.define(
        "Ok",
        Binding::external(TypeScheme::poly(
            ["T", "E"],
            type_fn(vec![t("T")], type_app("Result", vec![t("T"), t("E")])),
        )),
    );
    ctx.define(
        "Err",
        Binding::external(TypeScheme::poly(
            ["T", "E"],
            type_fn(vec![t("E")], type_app("Result", vec![t("T"), t("E")])),
        )),
    );

    // Ordering = Less | Equal | Greater
    ctx.define_type(
        "Ordering",
        TypeDef::Sum {
            params: vec![],
            variants: ["Less", "Equal", "Greater"]
                .into_iter()
                .map(|name| VariantInfo {
                    name: name.to_string(),
                    fields: vec![],
                    field_names: None,
                })
                .collect(),
            span: Span::DUMMY,
        },
    );
    for name in ["Less", "Equal", "Greater"] {
        ctx.define(
            name,
            Binding::external(TypeScheme::mono(type_con("Ordering"))),
        );
    }
}

fn register_array_fns(ctx: &mut TypeContext) {
    let arr = |elem: Type| type_array(elem);
    let pred = |elem: Type| type_fn(vec![elem], Type::bool());

    ctx.define(
        "len",
        Binding::external(poly1("T", vec![arr(t("T"))], Type::nat())),
    );
    ctx.define(
        "is_empty",
        Binding::external(poly1("T", vec![arr(t("T"))], Type::bool())),
    );
    ctx.define(
        "push",
        Binding::external(poly1("T", vec![arr(t("T")), t("T")], arr(t("T")))),
    );
    ctx.define(
        "map",
        Binding::external(poly2(
            "T",
            "U",
            vec![arr(t("T")), type_fn(vec![t("T")], t("U"))],
            arr(t("U")),
        )),
    );
    ctx.define(
        "filter",
        Binding::external(poly1("T", vec![arr(t("T")), pred(t("T"))], arr(t("T")))),
    );
    ctx.define(
        "fold",
        Binding::external(poly2(
            "T",
            "U",
            vec![arr(t("T")), t("U"), type_fn(vec![t("U"), t("T")], t("U"))],
            t("U"),
        )),
    );
    ctx.define(
        "reduce",
        Binding::external(poly1(
            "T",
            vec![arr(t("T")), type_fn(vec![t("T"), t("T")], t("T"))],
            type_app("Option", vec![t("T")]),
        )),
    );
    ctx.define(
        "get",
        Binding::external(poly1(
            "T",
            vec![arr(t("T")), Type::int()],
            type_app("Option", vec![t("T")]),
        )),
    );
    ctx.define(
        "find",
        Binding::external(poly1(
            "T",
            vec![arr(t("T")), pred(t("T"))],
            type_app("Option", vec![t("T")]),
        )),
    );
    ctx.define(
        "any",
        Binding::external(poly1("T", vec![arr(t("T")), pred(t("T"))], Type::bool())),
    );
    ctx.define(
        "all",
        Binding::external(poly1("T", vec![arr(t("T")), pred(t("T"))], Type::bool())),
    );
    ctx.define(
        "contains",
        Binding::external(poly1("T", vec![arr(t("T")), t("T")], Type::bool())),
    );
    ctx.define(
        "concat",
        Binding::external(poly1("T", vec![arr(t("T")), arr(t("T"))], arr(t("T")))),
    );
    ctx.define(
        "reverse",
        Binding::external(poly1("T", vec![arr(t("T"))], arr(t("T")))),
    );
    ctx.define(
        "take",
        Binding::external(poly1("T", vec![arr(t("T")), Type::int()], arr(t("T")))),
    );
    ctx.define(
        "drop",
        Binding::external(poly1("T", vec![arr(t("T")), Type::int()], arr(t("T")))),
    );
    ctx.define(
        "zip",
        Binding::external(poly2(
            "T",
            "U",
            vec![arr(t("T")), arr(t("U"))],
            arr(type_tuple(vec![t("T"), t("U")])),
        )),
    );
}

fn register_string_fns(ctx: &mut TypeContext) {
    ctx.define(
        "str_len",
        Binding::external(TypeScheme::mono(type_fn(vec![Type::str()], Type::nat()))),
    );
    ctx.define(
        "trim",
        Binding::external(TypeScheme::mono(type_fn(vec![Type::str()], Type::str()))),
    );
    ctx.define(
        "split",
        Binding::external(TypeScheme::mono(type_fn(
            vec![Type::str(), Type::str()],
            type_array(Type::str()),
        ))),
    );
    ctx.define(
        "join",
        Binding::external(TypeScheme::mono(type_fn(
            vec![type_array(Type::str()), Type::str()],
            Type::str(),
        ))),
    );
    ctx.define(
        "to_string",
        Binding::external(poly1("T", vec![t("T")], Type::str())),
    );
}

fn register_io_fns(ctx: &mut TypeContext) {
    for name in ["print", "println"] {
        ctx.define(
            name,
            Binding::external(TypeScheme::mono(type_fn_effects(
                vec![Type::str()],
                Type::unit(),
                EffectSet::singleton("IO"),
            ))),
        );
    }
}

fn register_misc_fns(ctx: &mut TypeContext) {
    ctx.define(
        "panic",
        Binding::external(TypeScheme::mono(type_fn(vec![Type::str()], Type::Never))),
    );
    ctx.define(
        "unreachable",
        Binding::external(TypeScheme::mono(type_fn(vec![], Type::Never))),
    );
    ctx.define(
        "int_to_float",
        Binding::external(TypeScheme::mono(type_fn(vec![Type::int()], Type::float()))),
    );
    // Truncating conversion.
    ctx.define(
        "float_to_int",
        Binding::external(TypeScheme::mono(type_fn(vec![Type::float()], Type::int()))),
    );
    ctx.define(
        "abs",
        Binding::external(TypeScheme::mono(type_fn(vec![Type::int()], Type::int()))),
    );
    ctx.define(
        "min",
        Binding::external(poly1("T", vec![t("T"), t("T")], t("T"))),
    );
    ctx.define(
        "max",
        Binding::external(poly1("T", vec![t("T"), t("T")], t("T"))),
    );
}
