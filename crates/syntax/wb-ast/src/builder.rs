//! Incremental construction of syntax trees
//!
//! Parsers (and tests) allocate nodes through [`AstBuilder`] and hand the
//! finished top-level declarations to [`AstBuilder::finish`]. Every call to
//! [`AstBuilder::ident`] creates a distinct identifier occurrence, even when
//! the text repeats.

use crate::{
    Ast, BinaryOp, Block, Decl, Expr, ExprId, FnDecl, Formal, Ident, IdentId, Program, Stmt,
    StmtId, StructDecl, TypeRef, UnaryOp, VarDecl,
};
use wb_arena::Arena;
use wb_intern::Interner;
use wb_span::Position;

/// Builder for [`Ast`]
#[derive(Debug, Default)]
pub struct AstBuilder {
    idents: Arena<Ident>,
    exprs: Arena<Expr>,
    stmts: Arena<Stmt>,
    interner: Interner,
}

impl AstBuilder {
    /// Create a builder with a fresh interner
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an identifier occurrence
    pub fn ident(&mut self, text: &str, pos: Position) -> IdentId {
        let name = self.interner.intern(text);
        self.idents.alloc(Ident { name, pos })
    }

    /// Allocate an expression
    pub fn expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    /// Allocate a statement
    pub fn stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmts.alloc(stmt)
    }

    /// Identifier use expression
    pub fn name(&mut self, text: &str, pos: Position) -> ExprId {
        let ident = self.ident(text, pos);
        self.expr(Expr::Ident(ident))
    }

    /// `base.field`
    pub fn dot(&mut self, base: ExprId, field: &str, pos: Position) -> ExprId {
        let field = self.ident(field, pos);
        self.expr(Expr::DotAccess { base, field })
    }

    /// Integer literal
    pub fn int(&mut self, value: i64, pos: Position) -> ExprId {
        self.expr(Expr::IntLit { value, pos })
    }

    /// String literal; `text` includes the quotes
    pub fn string(&mut self, text: &str, pos: Position) -> ExprId {
        self.expr(Expr::StrLit {
            text: text.to_string(),
            pos,
        })
    }

    /// Boolean literal
    pub fn boolean(&mut self, value: bool, pos: Position) -> ExprId {
        if value {
            self.expr(Expr::True { pos })
        } else {
            self.expr(Expr::False { pos })
        }
    }

    /// `lhs = rhs`
    pub fn assign(&mut self, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.expr(Expr::Assign { lhs, rhs })
    }

    /// `callee(args)`
    pub fn call(&mut self, callee: &str, pos: Position, args: Vec<ExprId>) -> ExprId {
        let callee = self.ident(callee, pos);
        self.expr(Expr::Call { callee, args })
    }

    /// Unary operation
    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(Expr::Unary { op, operand })
    }

    /// Binary operation
    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId) -> ExprId {
        self.expr(Expr::Binary { op, lhs, rhs })
    }

    /// `lhs = rhs;`
    pub fn assign_stmt(&mut self, lhs: ExprId, rhs: ExprId) -> StmtId {
        let assign = self.assign(lhs, rhs);
        self.stmt(Stmt::Assign(assign))
    }

    /// `callee(args);`
    pub fn call_stmt(&mut self, callee: &str, pos: Position, args: Vec<ExprId>) -> StmtId {
        let call = self.call(callee, pos, args);
        self.stmt(Stmt::Call(call))
    }

    /// `struct Name` as a type
    pub fn struct_ty(&mut self, name: &str, pos: Position) -> TypeRef {
        TypeRef::Struct(self.ident(name, pos))
    }

    /// Variable (or field) declaration
    pub fn var_decl(&mut self, ty: TypeRef, name: &str, pos: Position) -> VarDecl {
        let name = self.ident(name, pos);
        VarDecl { ty, name }
    }

    /// Variable declaration wrapped as a [`Decl`]
    pub fn var(&mut self, ty: TypeRef, name: &str, pos: Position) -> Decl {
        Decl::Var(self.var_decl(ty, name, pos))
    }

    /// Formal parameter
    pub fn formal(&mut self, ty: TypeRef, name: &str, pos: Position) -> Formal {
        let name = self.ident(name, pos);
        Formal { ty, name }
    }

    /// Function declaration
    pub fn function(
        &mut self,
        ret: TypeRef,
        name: &str,
        pos: Position,
        formals: Vec<Formal>,
        body: Block,
    ) -> Decl {
        let name = self.ident(name, pos);
        Decl::Fn(FnDecl {
            ret,
            name,
            formals,
            body,
        })
    }

    /// Struct declaration
    pub fn struct_decl(&mut self, name: &str, pos: Position, fields: Vec<VarDecl>) -> Decl {
        let name = self.ident(name, pos);
        Decl::Struct(StructDecl { name, fields })
    }

    /// Finish the tree with the given top-level declarations
    pub fn finish(self, decls: Vec<Decl>) -> Ast {
        Ast {
            idents: self.idents,
            exprs: self.exprs,
            stmts: self.stmts,
            program: Program { decls },
            interner: self.interner,
        }
    }
}

/// Shorthand for building a [`Block`]
pub fn block(decls: Vec<Decl>, stmts: Vec<StmtId>) -> Block {
    Block { decls, stmts }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers_are_distinct_occurrences() {
        let mut builder = AstBuilder::new();
        let first = builder.ident("x", Position::new(1, 5));
        let second = builder.ident("x", Position::new(2, 1));
        let ast = builder.finish(Vec::new());

        assert_ne!(first, second);
        assert_eq!(ast.idents[first].name, ast.idents[second].name);
        assert_eq!(ast.ident_text(second), "x");
        assert_eq!(ast.ident_pos(second), Position::new(2, 1));
    }

    #[test]
    fn test_finish_keeps_declaration_order() {
        let mut builder = AstBuilder::new();
        let first = builder.var(TypeRef::Int, "a", Position::new(1, 5));
        let second = builder.var(TypeRef::Bool, "b", Position::new(2, 6));
        let ast = builder.finish(vec![first.clone(), second.clone()]);

        assert_eq!(ast.program.decls, vec![first, second]);
    }

    #[test]
    fn test_boolean_literals() {
        let mut builder = AstBuilder::new();
        let yes = builder.boolean(true, Position::new(1, 1));
        let no = builder.boolean(false, Position::new(1, 6));
        let ast = builder.finish(Vec::new());

        assert!(matches!(ast.exprs[yes], Expr::True { .. }));
        assert!(matches!(ast.exprs[no], Expr::False { .. }));
    }
}
