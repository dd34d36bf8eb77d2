//! Scoped typing context.
//!
//! A stack of scopes: function entry, blocks, and branch arms push a scope;
//! exit pops it. Lookup walks the stack from the innermost scope outward, so
//! shadowing works and children never mutate their parents. Popping a scope
//! reports its unused bindings for the unused-variable analysis.

use rustc_hash::{FxHashMap, FxHashSet};

use clank_ir::Span;

use crate::{Type, TypeScheme};

/// Where a binding came from, for diagnostics and repair targeting.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BindingSource {
    Parameter,
    Let,
    Function,
    External,
}

/// A name binding.
#[derive(Clone, Debug)]
pub struct Binding {
    pub scheme: TypeScheme,
    pub mutable: bool,
    pub span: Span,
    pub source: BindingSource,
    /// AST node of the declaring `let`, when there is one.
    pub decl_node: Option<clank_ir::NodeId>,
}

impl Binding {
    /// An immutable monomorphic binding.
    pub fn mono(ty: Type, span: Span, source: BindingSource) -> Self {
        Binding {
            scheme: TypeScheme::mono(ty),
            mutable: false,
            span,
            source,
            decl_node: None,
        }
    }

    /// A built-in binding.
    pub fn external(scheme: TypeScheme) -> Self {
        Binding {
            scheme,
            mutable: false,
            span: Span::DUMMY,
            source: BindingSource::External,
            decl_node: None,
        }
    }

    #[must_use]
    pub fn mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    #[must_use]
    pub fn with_decl_node(mut self, node: clank_ir::NodeId) -> Self {
        self.decl_node = Some(node);
        self
    }
}

/// A variant of a sum type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantInfo {
    pub name: String,
    pub fields: Vec<Type>,
    /// Present for variants declared with named fields. Pattern binding is
    /// positional regardless; names feed diagnostics and repairs.
    pub field_names: Option<Vec<String>>,
}

/// A registered type definition.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeDef {
    Alias {
        params: Vec<String>,
        ty: Type,
        span: Span,
    },
    Record {
        params: Vec<String>,
        fields: Vec<(String, Type)>,
        span: Span,
    },
    Sum {
        params: Vec<String>,
        variants: Vec<VariantInfo>,
        span: Span,
    },
}

impl TypeDef {
    pub fn span(&self) -> &Span {
        match self {
            TypeDef::Alias { span, .. }
            | TypeDef::Record { span, .. }
            | TypeDef::Sum { span, .. } => span,
        }
    }

    pub fn params(&self) -> &[String] {
        match self {
            TypeDef::Alias { params, .. }
            | TypeDef::Record { params, .. }
            | TypeDef::Sum { params, .. } => params,
        }
    }
}

#[derive(Default)]
struct Scope {
    bindings: FxHashMap<String, Binding>,
    types: FxHashMap<String, TypeDef>,
    type_params: FxHashMap<String, Type>,
    used: FxHashSet<String>,
}

/// The scoped typing context.
pub struct TypeContext {
    scopes: Vec<Scope>,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeContext {
    /// An empty context with a single root scope.
    pub fn new() -> Self {
        TypeContext {
            scopes: vec![Scope::default()],
        }
    }

    /// Enter a child scope.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Leave the innermost scope, returning its unused bindings
    /// (underscore-prefixed names are exempt).
    pub fn pop_scope(&mut self) -> Vec<(String, Binding)> {
        let scope = self.scopes.pop().unwrap_or_default();
        debug_assert!(!self.scopes.is_empty(), "popped the root scope");
        let used = scope.used;
        scope
            .bindings
            .into_iter()
            .filter(|(name, _)| !name.starts_with('_') && !used.contains(name))
            .collect()
    }

    /// Bind a name in the innermost scope. Returns the previous binding if
    /// the name was already defined *in this scope* (shadowing an outer
    /// scope is fine).
    pub fn define(&mut self, name: impl Into<String>, binding: Binding) -> Option<Binding> {
        self.innermost().bindings.insert(name.into(), binding)
    }

    /// Look up a name, walking the scope stack outward. Marks it used.
    pub fn lookup(&mut self, name: &str) -> Option<&Binding> {
        let idx = self
            .scopes
            .iter()
            .rposition(|scope| scope.bindings.contains_key(name))?;
        self.scopes[idx].used.insert(name.to_string());
        self.scopes[idx].bindings.get(name)
    }

    /// Look up without marking used (for diagnostics about the binding).
    pub fn peek(&self, name: &str) -> Option<&Binding> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.bindings.get(name))
    }

    /// Register a type definition in the innermost scope. Returns the
    /// previous definition on a same-scope duplicate.
    pub fn define_type(&mut self, name: impl Into<String>, def: TypeDef) -> Option<TypeDef> {
        self.innermost().types.insert(name.into(), def)
    }

    pub fn lookup_type(&self, name: &str) -> Option<&TypeDef> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.types.get(name))
    }

    /// Bind a type parameter name to a type variable for the current scope.
    pub fn bind_type_param(&mut self, name: impl Into<String>, var: Type) {
        self.innermost().type_params.insert(name.into(), var);
    }

    pub fn lookup_type_param(&self, name: &str) -> Option<&Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.type_params.get(name))
    }

    /// Every visible binding name, innermost first (for suggestions).
    pub fn visible_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for scope in self.scopes.iter().rev() {
            for name in scope.bindings.keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    /// Every visible type name (for suggestions).
    pub fn visible_type_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for scope in self.scopes.iter().rev() {
            for name in scope.types.keys() {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }
        names
    }

    fn innermost(&mut self) -> &mut Scope {
        self.scopes
            .last_mut()
            .unwrap_or_else(|| unreachable!("context always has a root scope"))
    }
}

/// The fields of a record-shaped type: a structural record, or a named
/// type whose definition is a record (type arguments substituted).
pub fn find_fields(ty: &Type, ctx: &TypeContext) -> Option<Vec<(String, Type)>> {
    match ty {
        Type::Record { fields, .. } => Some(
            fields
                .iter()
                .map(|(name, field)| (name.clone(), field.clone()))
                .collect(),
        ),
        Type::Con { name } => match ctx.lookup_type(name)? {
            TypeDef::Record { fields, .. } => Some(fields.clone()),
            _ => None,
        },
        Type::App { ctor, args } => match ctx.lookup_type(ctor)? {
            TypeDef::Record { params, fields, .. } => Some(
                fields
                    .iter()
                    .map(|(name, field)| {
                        (name.clone(), crate::substitute_params(field, params, args))
                    })
                    .collect(),
            ),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bind_int() -> Binding {
        Binding::mono(Type::int(), Span::DUMMY, BindingSource::Let)
    }

    #[test]
    fn lookup_walks_scopes() {
        let mut ctx = TypeContext::new();
        ctx.define("x", bind_int());
        ctx.push_scope();
        assert!(ctx.lookup("x").is_some());
        assert!(ctx.lookup("y").is_none());
    }

    #[test]
    fn shadowing_in_child_scope() {
        let mut ctx = TypeContext::new();
        ctx.define("x", bind_int());
        ctx.push_scope();
        let prev = ctx.define(
            "x",
            Binding::mono(Type::str(), Span::DUMMY, BindingSource::Let),
        );
        // Shadowing an outer scope is not a same-scope duplicate.
        assert!(prev.is_none());
        assert_eq!(ctx.lookup("x").unwrap().scheme.ty, Type::str());
        ctx.pop_scope();
        assert_eq!(ctx.lookup("x").unwrap().scheme.ty, Type::int());
    }

    #[test]
    fn same_scope_duplicate_detected() {
        let mut ctx = TypeContext::new();
        assert!(ctx.define("x", bind_int()).is_none());
        assert!(ctx.define("x", bind_int()).is_some());
    }

    #[test]
    fn pop_reports_unused_bindings() {
        let mut ctx = TypeContext::new();
        ctx.push_scope();
        ctx.define("used", bind_int());
        ctx.define("unused", bind_int());
        ctx.define("_ignored", bind_int());
        ctx.lookup("used");
        let unused = ctx.pop_scope();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].0, "unused");
    }

    #[test]
    fn type_definitions_scope() {
        let mut ctx = TypeContext::new();
        ctx.define_type(
            "Meters",
            TypeDef::Alias {
                params: vec![],
                ty: Type::int(),
                span: Span::DUMMY,
            },
        );
        assert!(ctx.lookup_type("Meters").is_some());
        assert!(ctx.lookup_type("Feet").is_none());
    }
}
