//! Dot-access resolution through struct field tables
//!
//! `a.b.c` parses as `(a.b).c`, so resolving the outer node first resolves
//! its base. Each link hands the next one an [`Access`] saying where the
//! following field name should be looked up. Once a link fails, every
//! later link in the same chain stays silent.

use crate::error::ResolveErrorKind;
use crate::resolver::NameResolver;
use crate::symbol::SymbolId;
use wb_ast::{Expr, ExprId, IdentId};

/// Outcome of resolving one link of a dot-access chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    /// Value of a struct type; the next field is searched in this
    /// [`Symbol::StructDef`](crate::Symbol::StructDef)
    Struct(SymbolId),
    /// Resolved, but not to a struct value
    Opaque,
    /// An earlier link already reported an error
    Poisoned,
}

/// Resolve `base.field`
pub(crate) fn resolve_dot(
    resolver: &mut NameResolver<'_>,
    base: ExprId,
    field: IdentId,
) -> Access {
    let ast = resolver.ast;

    let context = match &ast.exprs[base] {
        Expr::Ident(ident) => resolver
            .resolve_use(*ident)
            .and_then(|symbol| resolver.symbols.struct_def_of(symbol))
            .map_or(Access::Opaque, Access::Struct),
        Expr::DotAccess {
            base: inner,
            field: inner_field,
        } => resolve_dot(resolver, *inner, *inner_field),
        _ => {
            resolver.resolve_expr(base);
            Access::Opaque
        }
    };

    match context {
        Access::Struct(def) => lookup_field(resolver, def, field),
        Access::Opaque => {
            resolver.report(ast.ident_pos(field), ResolveErrorKind::DotAccessNonStruct);
            Access::Poisoned
        }
        Access::Poisoned => Access::Poisoned,
    }
}

/// Look `field` up in the field table of `def`
fn lookup_field(resolver: &mut NameResolver<'_>, def: SymbolId, field: IdentId) -> Access {
    let ident = resolver.ast.idents[field];
    let found = resolver
        .symbols
        .fields_of(def)
        .and_then(|fields| fields.lookup_innermost(ident.name));

    let Some(symbol) = found else {
        resolver.report(ident.pos, ResolveErrorKind::InvalidFieldName);
        return Access::Poisoned;
    };

    resolver.bind(field, symbol);
    resolver
        .symbols
        .struct_def_of(symbol)
        .map_or(Access::Opaque, Access::Struct)
}

#[cfg(test)]
#[allow(
    clippy::min_ident_chars,
    reason = "test bindings mirror the one-letter Wumbo names they build"
)]
mod tests {
    use crate::{NameResolver, PrimitiveType, ResolutionResult, Symbol};
    use wb_ast::{Ast, AstBuilder, Decl, Expr, ExprId, IdentId, Stmt, TypeRef, block};
    use wb_diagnostics::{DiagnosticBag, DiagnosticSink as _};
    use wb_span::Position;

    fn pos(line: u32, column: u32) -> Position {
        Position::new(line, column)
    }

    /// `struct Inner { int n; }; struct Outer { struct Inner i; }; struct Outer o;`
    fn nested_structs(builder: &mut AstBuilder) -> Vec<Decl> {
        let n = builder.var_decl(TypeRef::Int, "n", pos(1, 20));
        let inner = builder.struct_decl("Inner", pos(1, 8), vec![n]);
        let inner_ty = builder.struct_ty("Inner", pos(2, 23));
        let i = builder.var_decl(inner_ty, "i", pos(2, 29));
        let outer = builder.struct_decl("Outer", pos(2, 8), vec![i]);
        let outer_ty = builder.struct_ty("Outer", pos(3, 8));
        let o = builder.var(outer_ty, "o", pos(3, 14));
        vec![inner, outer, o]
    }

    /// Wrap `expr` as `expr++;` inside `void main() { ... }`
    fn in_main(builder: &mut AstBuilder, mut decls: Vec<Decl>, expr: ExprId) -> Vec<Decl> {
        let stmt = builder.stmt(Stmt::PostInc(expr));
        let main = builder.function(
            TypeRef::Void,
            "main",
            pos(4, 6),
            Vec::new(),
            block(Vec::new(), vec![stmt]),
        );
        decls.push(main);
        decls
    }

    fn run(ast: &Ast) -> (ResolutionResult, Vec<String>) {
        let mut diagnostics = DiagnosticBag::new();
        let result = NameResolver::resolve(ast, &mut diagnostics).unwrap();
        assert_eq!(diagnostics.had_fatal(), !diagnostics.is_empty());
        let messages = diagnostics.iter().map(ToString::to_string).collect();
        (result, messages)
    }

    fn field_ident(ast: &Ast, expr: ExprId) -> IdentId {
        match &ast.exprs[expr] {
            Expr::DotAccess { field, .. } => *field,
            other => panic!("expected dot access, found {other:?}"),
        }
    }

    #[test]
    fn test_chain_binds_every_field() {
        let mut builder = AstBuilder::new();
        let decls = nested_structs(&mut builder);
        let o = builder.name("o", pos(5, 5));
        let o_i = builder.dot(o, "i", pos(5, 7));
        let o_i_n = builder.dot(o_i, "n", pos(5, 9));
        let decls = in_main(&mut builder, decls, o_i_n);
        let ast = builder.finish(decls);

        let (result, messages) = run(&ast);
        assert!(messages.is_empty(), "{messages:?}");

        let i = field_ident(&ast, o_i);
        let n = field_ident(&ast, o_i_n);
        assert!(matches!(result.symbol_of(i), Some(Symbol::StructInstance(_))));
        assert!(matches!(
            result.symbol_of(n),
            Some(Symbol::Primitive(PrimitiveType::Int))
        ));
    }

    #[test]
    fn test_bad_link_reports_once() {
        let mut builder = AstBuilder::new();
        let decls = nested_structs(&mut builder);
        let o = builder.name("o", pos(5, 5));
        let bogus = builder.dot(o, "bogus", pos(5, 7));
        let n = builder.dot(bogus, "n", pos(5, 13));
        let decls = in_main(&mut builder, decls, n);
        let ast = builder.finish(decls);

        let (result, messages) = run(&ast);
        assert_eq!(messages, ["5:7 ***ERROR*** Invalid struct field name"]);
        assert!(!result.is_bound(field_ident(&ast, n)));
    }

    #[test]
    fn test_access_past_scalar_field() {
        let mut builder = AstBuilder::new();
        let decls = nested_structs(&mut builder);
        let o = builder.name("o", pos(5, 5));
        let o_i = builder.dot(o, "i", pos(5, 7));
        let o_i_n = builder.dot(o_i, "n", pos(5, 9));
        let deeper = builder.dot(o_i_n, "x", pos(5, 11));
        let further = builder.dot(deeper, "y", pos(5, 13));
        let decls = in_main(&mut builder, decls, further);
        let ast = builder.finish(decls);

        let (result, messages) = run(&ast);
        assert_eq!(messages, ["5:11 ***ERROR*** Dot-access of non-struct type"]);
        assert!(result.is_bound(field_ident(&ast, o_i_n)));
    }

    #[test]
    fn test_non_struct_base() {
        let mut builder = AstBuilder::new();
        let count = builder.var(TypeRef::Int, "count", pos(1, 5));
        let base = builder.name("count", pos(5, 5));
        let access = builder.dot(base, "n", pos(5, 11));
        let decls = in_main(&mut builder, vec![count], access);
        let ast = builder.finish(decls);

        let (_, messages) = run(&ast);
        assert_eq!(messages, ["5:11 ***ERROR*** Dot-access of non-struct type"]);
    }

    #[test]
    fn test_undeclared_base() {
        let mut builder = AstBuilder::new();
        let base = builder.name("ghost", pos(5, 5));
        let access = builder.dot(base, "n", pos(5, 11));
        let decls = in_main(&mut builder, Vec::new(), access);
        let ast = builder.finish(decls);

        let (_, messages) = run(&ast);
        assert_eq!(
            messages,
            [
                "5:5 ***ERROR*** Undeclared identifier",
                "5:11 ***ERROR*** Dot-access of non-struct type",
            ]
        );
    }

    #[test]
    fn test_struct_definition_is_not_a_value() {
        let mut builder = AstBuilder::new();
        let decls = nested_structs(&mut builder);
        let base = builder.name("Inner", pos(5, 5));
        let access = builder.dot(base, "n", pos(5, 11));
        let decls = in_main(&mut builder, decls, access);
        let ast = builder.finish(decls);

        let (_, messages) = run(&ast);
        assert_eq!(messages, ["5:11 ***ERROR*** Dot-access of non-struct type"]);
    }

    #[test]
    fn test_call_base_is_resolved() {
        let mut builder = AstBuilder::new();
        let call = builder.call("missing", pos(5, 5), Vec::new());
        let access = builder.dot(call, "n", pos(5, 15));
        let decls = in_main(&mut builder, Vec::new(), access);
        let ast = builder.finish(decls);

        let (_, messages) = run(&ast);
        assert_eq!(
            messages,
            [
                "5:5 ***ERROR*** Undeclared identifier",
                "5:15 ***ERROR*** Dot-access of non-struct type",
            ]
        );
    }

    #[test]
    fn test_fields_do_not_leak_into_scope() {
        let mut builder = AstBuilder::new();
        let a_value = builder.var_decl(TypeRef::Int, "value", pos(1, 16));
        let a = builder.struct_decl("A", pos(1, 8), vec![a_value]);
        let b_value = builder.var_decl(TypeRef::Bool, "value", pos(2, 17));
        let b = builder.struct_decl("B", pos(2, 8), vec![b_value]);
        let stray = builder.name("value", pos(5, 5));
        let decls = in_main(&mut builder, vec![a, b], stray);
        let ast = builder.finish(decls);

        let (_, messages) = run(&ast);
        assert_eq!(messages, ["5:5 ***ERROR*** Undeclared identifier"]);
    }
}
