//! Name resolution pass

use crate::error::{ResolveErrorKind, ScopeError};
use crate::field::resolve_dot;
use crate::scope::ScopeTable;
use crate::symbol::{
    FunctionSig, PrimitiveType, StructDef, StructInstance, Symbol, SymbolId, Symbols,
};
use rustc_hash::FxHashMap;
use wb_ast::{
    Annotations, Ast, Block, Decl, Expr, ExprId, FnDecl, Ident, IdentId, Stmt, StmtId,
    StructDecl, TypeRef, VarDecl,
};
use wb_diagnostics::{Diagnostic, DiagnosticSink};
use wb_intern::Interner;
use wb_span::Position;

/// Result of name resolution
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// Every symbol created during the pass
    pub symbols: Symbols,
    /// Identifier use -> bound symbol; unbound uses are absent
    pub bindings: FxHashMap<IdentId, SymbolId>,
    /// Program-level scope as it stood after the last declaration
    pub globals: ScopeTable,
}

impl ResolutionResult {
    /// Symbol bound to an identifier occurrence
    pub fn binding(&self, ident: IdentId) -> Option<SymbolId> {
        self.bindings.get(&ident).copied()
    }

    /// Whether an identifier occurrence was bound
    pub fn is_bound(&self, ident: IdentId) -> bool {
        self.bindings.contains_key(&ident)
    }

    /// Symbol data bound to an identifier occurrence
    pub fn symbol_of(&self, ident: IdentId) -> Option<&Symbol> {
        self.binding(ident).map(|id| &self.symbols[id])
    }

    /// Annotation source for [`wb_ast::unparse`]
    pub fn annotations<'ast>(&'ast self, ast: &'ast Ast) -> SymbolAnnotations<'ast> {
        SymbolAnnotations {
            result: self,
            interner: &ast.interner,
        }
    }
}

/// Prints each bound identifier's symbol in unparsed output
pub struct SymbolAnnotations<'ast> {
    result: &'ast ResolutionResult,
    interner: &'ast Interner,
}

impl Annotations for SymbolAnnotations<'_> {
    fn annotation(&self, ident: IdentId) -> Option<String> {
        self.result
            .binding(ident)
            .map(|symbol| self.result.symbols.display(symbol, self.interner).to_string())
    }
}

/// Name resolver for a whole program
pub struct NameResolver<'ast> {
    /// Tree being resolved
    pub(crate) ast: &'ast Ast,
    /// Symbols created so far
    pub(crate) symbols: Symbols,
    /// Lexical scope stack
    scopes: ScopeTable,
    /// Identifier use -> symbol
    bindings: FxHashMap<IdentId, SymbolId>,
    /// Where diagnostics go
    sink: &'ast mut dyn DiagnosticSink,
}

impl<'ast> NameResolver<'ast> {
    /// Create a new name resolver
    fn new(ast: &'ast Ast, sink: &'ast mut dyn DiagnosticSink) -> Self {
        Self {
            ast,
            symbols: Symbols::new(),
            scopes: ScopeTable::new(),
            bindings: FxHashMap::default(),
            sink,
        }
    }

    /// Main entry point for name resolution
    ///
    /// Walks the program once, reporting every violation to `sink` and
    /// continuing past it.
    ///
    /// # Errors
    ///
    /// Returns a [`ScopeError`] only if the scope stack is driven
    /// inconsistently, which indicates a bug in the resolver rather than in
    /// the program.
    pub fn resolve(
        ast: &'ast Ast,
        sink: &'ast mut dyn DiagnosticSink,
    ) -> Result<ResolutionResult, ScopeError> {
        let mut resolver = Self::new(ast, sink);
        log::debug!(
            "resolving program with {} top-level declarations",
            ast.program.decls.len()
        );

        for decl in &ast.program.decls {
            resolver.resolve_decl(decl)?;
        }

        log::debug!(
            "resolution finished: {} symbols, {} bindings",
            resolver.symbols.len(),
            resolver.bindings.len()
        );

        Ok(ResolutionResult {
            symbols: resolver.symbols,
            bindings: resolver.bindings,
            globals: resolver.scopes,
        })
    }

    /// Report a diagnostic at `pos`
    pub(crate) fn report(&mut self, pos: Position, kind: ResolveErrorKind) {
        log::debug!("{pos}: {kind}");
        self.sink.report(Diagnostic::error(pos, kind.to_string()));
    }

    /// Record the symbol an identifier use resolved to
    pub(crate) fn bind(&mut self, ident: IdentId, symbol: SymbolId) {
        let previous = self.bindings.insert(ident, symbol);
        debug_assert!(previous.is_none(), "identifier bound twice");
    }

    fn enter_scope(&mut self) {
        self.scopes.push_scope();
        log::trace!("enter scope (depth {})", self.scopes.depth());
    }

    fn exit_scope(&mut self) -> Result<(), ScopeError> {
        log::trace!("exit scope (depth {})", self.scopes.depth());
        self.scopes.pop_scope()
    }

    fn resolve_decl(&mut self, decl: &Decl) -> Result<(), ScopeError> {
        match decl {
            Decl::Var(var) => self.resolve_var_decl(*var, None).map(|_| ()),
            Decl::Fn(function) => self.resolve_fn_decl(function),
            Decl::Struct(struct_decl) => self.resolve_struct_decl(struct_decl),
        }
    }

    /// Declare a variable, field or formal
    ///
    /// Declares into `fields` when given, otherwise into the innermost
    /// lexical frame. Returns `true` if the name was declared.
    fn resolve_var_decl(
        &mut self,
        var: VarDecl,
        fields: Option<&mut ScopeTable>,
    ) -> Result<bool, ScopeError> {
        match self.var_symbol(var) {
            Some(symbol) => self.declare(var.name, symbol, fields),
            None => Ok(false),
        }
    }

    /// Symbol for a declaration of type `var.ty`, or `None` after reporting
    fn var_symbol(&mut self, var: VarDecl) -> Option<SymbolId> {
        let pos = self.ast.ident_pos(var.name);

        let primitive = match var.ty {
            TypeRef::Void => {
                self.report(pos, ResolveErrorKind::VoidDeclaration);
                return None;
            }
            TypeRef::Struct(type_name) => return self.struct_instance(type_name, pos),
            TypeRef::Int => PrimitiveType::Int,
            TypeRef::Bool => PrimitiveType::Bool,
        };

        Some(self.symbols.alloc(Symbol::Primitive(primitive)))
    }

    /// Instance symbol for `struct type_name`, or `None` after reporting
    fn struct_instance(&mut self, type_name: IdentId, pos: Position) -> Option<SymbolId> {
        let name = self.ast.idents[type_name].name;

        let Some(def) = self.scopes.resolve(name) else {
            self.report(pos, ResolveErrorKind::Undeclared);
            return None;
        };

        if !matches!(self.symbols[def], Symbol::StructDef(_)) {
            self.report(pos, ResolveErrorKind::InvalidStructType);
            return None;
        }

        Some(self.symbols.alloc(Symbol::StructInstance(StructInstance {
            def,
            type_name: name,
        })))
    }

    /// Bind a declared name, reporting duplicates
    fn declare(
        &mut self,
        ident: IdentId,
        symbol: SymbolId,
        fields: Option<&mut ScopeTable>,
    ) -> Result<bool, ScopeError> {
        let name = self.ast.idents[ident].name;
        let table = match fields {
            Some(table) => table,
            None => &mut self.scopes,
        };

        match table.declare(name, symbol) {
            Ok(()) => Ok(true),
            Err(ScopeError::DuplicateName { .. }) => {
                self.report(self.ast.ident_pos(ident), ResolveErrorKind::MultiplyDeclared);
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    fn resolve_fn_decl(&mut self, function: &FnDecl) -> Result<(), ScopeError> {
        // Declared before the body so the function can call itself
        let sig = FunctionSig::new(PrimitiveType::from(function.ret));
        let symbol = self.symbols.alloc(Symbol::Function(sig));
        self.declare(function.name, symbol, None)?;

        self.enter_scope();
        for formal in &function.formals {
            let var = VarDecl {
                ty: formal.ty,
                name: formal.name,
            };
            if self.resolve_var_decl(var, None)? {
                self.symbols
                    .push_formal(symbol, PrimitiveType::from(formal.ty));
            }
        }
        self.resolve_block_contents(&function.body)?;
        self.exit_scope()
    }

    fn resolve_struct_decl(&mut self, decl: &StructDecl) -> Result<(), ScopeError> {
        let mut fields = ScopeTable::new();
        for field in &decl.fields {
            self.resolve_var_decl(*field, Some(&mut fields))?;
        }

        let symbol = self.symbols.alloc(Symbol::StructDef(StructDef { fields }));
        self.declare(decl.name, symbol, None).map(|_| ())
    }

    fn resolve_block_contents(&mut self, block: &Block) -> Result<(), ScopeError> {
        for decl in &block.decls {
            self.resolve_decl(decl)?;
        }
        for &stmt in &block.stmts {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    /// Resolve a block in a fresh frame
    fn resolve_scoped_block(&mut self, block: &Block) -> Result<(), ScopeError> {
        self.enter_scope();
        self.resolve_block_contents(block)?;
        self.exit_scope()
    }

    fn resolve_stmt(&mut self, stmt_id: StmtId) -> Result<(), ScopeError> {
        let ast = self.ast;

        match &ast.stmts[stmt_id] {
            Stmt::Assign(expr)
            | Stmt::PostInc(expr)
            | Stmt::PostDec(expr)
            | Stmt::Read(expr)
            | Stmt::Write(expr)
            | Stmt::Call(expr) => self.resolve_expr(*expr),

            Stmt::Return(value) => {
                if let Some(expr) = value {
                    self.resolve_expr(*expr);
                }
            }

            // The condition is resolved before the block's frame exists
            Stmt::If { cond, then } => {
                self.resolve_expr(*cond);
                self.resolve_scoped_block(then)?;
            }

            Stmt::IfElse {
                cond,
                then,
                otherwise,
            } => {
                self.resolve_expr(*cond);
                self.resolve_scoped_block(then)?;
                self.resolve_scoped_block(otherwise)?;
            }

            Stmt::While { cond, body } => {
                self.resolve_expr(*cond);
                self.resolve_scoped_block(body)?;
            }

            Stmt::Repeat { count, body } => {
                self.resolve_expr(*count);
                self.resolve_scoped_block(body)?;
            }
        }

        Ok(())
    }

    /// Resolve a single expression
    pub(crate) fn resolve_expr(&mut self, expr_id: ExprId) {
        let ast = self.ast;

        match &ast.exprs[expr_id] {
            Expr::Ident(ident) => {
                self.resolve_use(*ident);
            }

            Expr::DotAccess { base, field } => {
                resolve_dot(self, *base, *field);
            }

            Expr::Assign { lhs, rhs } => {
                self.resolve_expr(*lhs);
                self.resolve_expr(*rhs);
            }

            Expr::Call { callee, args } => {
                self.resolve_use(*callee);
                for &arg in args {
                    self.resolve_expr(arg);
                }
            }

            Expr::Unary { operand, .. } => self.resolve_expr(*operand),

            Expr::Binary { lhs, rhs, .. } => {
                self.resolve_expr(*lhs);
                self.resolve_expr(*rhs);
            }

            Expr::IntLit { .. } | Expr::StrLit { .. } | Expr::True { .. } | Expr::False { .. } => {
                // Literals have no names to resolve
            }
        }
    }

    /// Resolve an identifier use against the lexical scopes
    pub(crate) fn resolve_use(&mut self, ident: IdentId) -> Option<SymbolId> {
        let Ident { name, pos } = self.ast.idents[ident];

        if let Some(symbol) = self.scopes.resolve(name) {
            self.bind(ident, symbol);
            Some(symbol)
        } else {
            self.report(pos, ResolveErrorKind::Undeclared);
            None
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::min_ident_chars,
    reason = "test bindings mirror the one-letter Wumbo names they build"
)]
mod tests {
    use super::*;
    use expect_test::expect;
    use wb_ast::{AstBuilder, block};
    use wb_diagnostics::{DiagnosticBag, render_plain};

    fn pos(line: u32, column: u32) -> Position {
        Position::new(line, column)
    }

    fn run(ast: &Ast) -> (ResolutionResult, DiagnosticBag) {
        let mut diagnostics = DiagnosticBag::new();
        let result = NameResolver::resolve(ast, &mut diagnostics).unwrap();
        (result, diagnostics)
    }

    fn messages(diagnostics: &DiagnosticBag) -> Vec<String> {
        diagnostics.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_program() {
        let ast = AstBuilder::new().finish(Vec::new());
        let (result, diagnostics) = run(&ast);

        assert!(diagnostics.is_empty());
        assert!(result.bindings.is_empty());
        assert!(result.symbols.is_empty());
    }

    #[test]
    fn test_inner_declaration_shadows_outer() {
        let mut builder = AstBuilder::new();
        let outer = builder.var(TypeRef::Int, "x", pos(1, 5));
        let cond = builder.boolean(true, pos(3, 9));
        let inner = builder.var(TypeRef::Bool, "x", pos(4, 14));
        let inner_use = builder.ident("x", pos(5, 9));
        let inner_expr = builder.expr(Expr::Ident(inner_use));
        let inner_stmt = builder.stmt(Stmt::Write(inner_expr));
        let if_stmt = builder.stmt(Stmt::If {
            cond,
            then: block(vec![inner], vec![inner_stmt]),
        });
        let outer_use = builder.ident("x", pos(7, 5));
        let outer_expr = builder.expr(Expr::Ident(outer_use));
        let outer_stmt = builder.stmt(Stmt::Write(outer_expr));
        let main = builder.function(
            TypeRef::Void,
            "main",
            pos(2, 6),
            Vec::new(),
            block(Vec::new(), vec![if_stmt, outer_stmt]),
        );
        let ast = builder.finish(vec![outer, main]);

        let (result, diagnostics) = run(&ast);
        assert!(diagnostics.is_empty());
        assert!(matches!(
            result.symbol_of(inner_use),
            Some(Symbol::Primitive(PrimitiveType::Bool))
        ));
        assert!(matches!(
            result.symbol_of(outer_use),
            Some(Symbol::Primitive(PrimitiveType::Int))
        ));
    }

    #[test]
    fn test_duplicate_keeps_first_binding() {
        let mut builder = AstBuilder::new();
        let first = builder.var(TypeRef::Int, "x", pos(2, 9));
        let second = builder.var(TypeRef::Bool, "x", pos(3, 10));
        let use_x = builder.ident("x", pos(4, 5));
        let x_expr = builder.expr(Expr::Ident(use_x));
        let stmt = builder.stmt(Stmt::PostInc(x_expr));
        let main = builder.function(
            TypeRef::Void,
            "main",
            pos(1, 6),
            Vec::new(),
            block(vec![first, second], vec![stmt]),
        );
        let ast = builder.finish(vec![main]);

        let (result, diagnostics) = run(&ast);
        assert_eq!(
            messages(&diagnostics),
            ["3:10 ***ERROR*** Multiply declared identifier"]
        );
        assert!(matches!(
            result.symbol_of(use_x),
            Some(Symbol::Primitive(PrimitiveType::Int))
        ));
    }

    #[test]
    fn test_void_variable_is_not_declared() {
        let mut builder = AstBuilder::new();
        let decl = builder.var(TypeRef::Void, "x", pos(1, 6));
        let ast = builder.finish(vec![decl]);

        let (result, diagnostics) = run(&ast);
        assert_eq!(
            messages(&diagnostics),
            ["1:6 ***ERROR*** Non-function declared void"]
        );
        let x = ast.interner.get("x").unwrap();
        assert_eq!(result.globals.resolve(x), None);
        assert!(diagnostics.had_fatal());
    }

    #[test]
    fn test_recursive_call() {
        let mut builder = AstBuilder::new();
        let n = builder.formal(TypeRef::Int, "n", pos(1, 14));
        let arg = builder.name("n", pos(2, 12));
        let callee = builder.ident("fact", pos(2, 7));
        let call = builder.expr(Expr::Call {
            callee,
            args: vec![arg],
        });
        let ret = builder.stmt(Stmt::Return(Some(call)));
        let fact = builder.function(
            TypeRef::Int,
            "fact",
            pos(1, 5),
            vec![n],
            block(Vec::new(), vec![ret]),
        );
        let ast = builder.finish(vec![fact]);

        let (result, diagnostics) = run(&ast);
        assert!(diagnostics.is_empty());
        let annotations = result.annotations(&ast);
        assert_eq!(annotations.annotation(callee).as_deref(), Some("int->int"));
    }

    #[test]
    fn test_struct_type_errors() {
        let mut builder = AstBuilder::new();
        let count = builder.var(TypeRef::Int, "count", pos(1, 5));
        let missing_ty = builder.struct_ty("Missing", pos(2, 8));
        let missing = builder.var(missing_ty, "a", pos(2, 16));
        let not_struct_ty = builder.struct_ty("count", pos(3, 8));
        let not_struct = builder.var(not_struct_ty, "b", pos(3, 14));
        let ast = builder.finish(vec![count, missing, not_struct]);

        let (_, diagnostics) = run(&ast);
        assert_eq!(
            messages(&diagnostics),
            [
                "2:16 ***ERROR*** Undeclared identifier",
                "3:14 ***ERROR*** Invalid name of struct type",
            ]
        );
    }

    #[test]
    fn test_condition_does_not_see_block_locals() {
        let mut builder = AstBuilder::new();
        let cond = builder.name("flag", pos(2, 12));
        let local = builder.var(TypeRef::Bool, "flag", pos(3, 14));
        let body_use = builder.ident("flag", pos(4, 9));
        let body_expr = builder.expr(Expr::Ident(body_use));
        let write = builder.stmt(Stmt::Write(body_expr));
        let while_stmt = builder.stmt(Stmt::While {
            cond,
            body: block(vec![local], vec![write]),
        });
        let main = builder.function(
            TypeRef::Void,
            "main",
            pos(1, 6),
            Vec::new(),
            block(Vec::new(), vec![while_stmt]),
        );
        let ast = builder.finish(vec![main]);

        let (result, diagnostics) = run(&ast);
        assert_eq!(
            messages(&diagnostics),
            ["2:12 ***ERROR*** Undeclared identifier"]
        );
        assert!(result.is_bound(body_use));
    }

    #[test]
    fn test_branches_have_independent_frames() {
        let mut builder = AstBuilder::new();
        let cond = builder.boolean(true, pos(2, 9));
        let then_local = builder.var(TypeRef::Int, "t", pos(3, 13));
        let else_use = builder.ident("t", pos(6, 9));
        let else_expr = builder.expr(Expr::Ident(else_use));
        let else_stmt = builder.stmt(Stmt::PostDec(else_expr));
        let branch = builder.stmt(Stmt::IfElse {
            cond,
            then: block(vec![then_local], Vec::new()),
            otherwise: block(Vec::new(), vec![else_stmt]),
        });
        let main = builder.function(
            TypeRef::Void,
            "main",
            pos(1, 6),
            Vec::new(),
            block(Vec::new(), vec![branch]),
        );
        let ast = builder.finish(vec![main]);

        let (result, diagnostics) = run(&ast);
        assert_eq!(
            messages(&diagnostics),
            ["6:9 ***ERROR*** Undeclared identifier"]
        );
        assert!(!result.is_bound(else_use));
    }

    #[test]
    fn test_formal_signature_skips_rejected_formals() {
        let mut builder = AstBuilder::new();
        let a = builder.formal(TypeRef::Int, "a", pos(1, 12));
        let v = builder.formal(TypeRef::Void, "v", pos(1, 20));
        let dup = builder.formal(TypeRef::Bool, "a", pos(1, 28));
        let b = builder.formal(TypeRef::Bool, "b", pos(1, 36));
        let f = builder.function(
            TypeRef::Bool,
            "f",
            pos(1, 6),
            vec![a, v, dup, b],
            block(Vec::new(), Vec::new()),
        );
        let call_stmt = builder.call_stmt("f", pos(3, 5), Vec::new());
        let main = builder.function(
            TypeRef::Void,
            "main",
            pos(2, 6),
            Vec::new(),
            block(Vec::new(), vec![call_stmt]),
        );
        let ast = builder.finish(vec![f, main]);

        let (result, diagnostics) = run(&ast);
        let annotations = result.annotations(&ast);
        let output = format!(
            "{}{}",
            wb_ast::unparse(&ast, Some(&annotations)),
            render_plain(&diagnostics)
        );

        expect![[r#"
            bool f(int a, void v, bool a, bool b) {
            }

            void main() {
                f(int,bool->bool)();
            }

            1:20 ***ERROR*** Non-function declared void
            1:28 ***ERROR*** Multiply declared identifier
        "#]]
        .assert_eq(&output);
    }

    #[test]
    fn test_repeat_body_has_own_frame() {
        let mut builder = AstBuilder::new();
        let times = builder.var(TypeRef::Int, "times", pos(2, 9));
        let count = builder.name("times", pos(3, 13));
        let local = builder.var(TypeRef::Int, "r", pos(4, 13));
        let inner_use = builder.ident("r", pos(5, 9));
        let inner_expr = builder.expr(Expr::Ident(inner_use));
        let inner_inc = builder.stmt(Stmt::PostInc(inner_expr));
        let repeat = builder.stmt(Stmt::Repeat {
            count,
            body: block(vec![local], vec![inner_inc]),
        });
        let after_use = builder.ident("r", pos(7, 5));
        let after_expr = builder.expr(Expr::Ident(after_use));
        let after_inc = builder.stmt(Stmt::PostInc(after_expr));
        let main = builder.function(
            TypeRef::Void,
            "main",
            pos(1, 6),
            Vec::new(),
            block(vec![times], vec![repeat, after_inc]),
        );
        let ast = builder.finish(vec![main]);

        let (result, diagnostics) = run(&ast);
        assert_eq!(
            messages(&diagnostics),
            ["7:5 ***ERROR*** Undeclared identifier"]
        );
        let Expr::Ident(count_ident) = &ast.exprs[count] else {
            panic!("repeat count is an identifier");
        };
        assert!(result.is_bound(*count_ident));
        assert!(result.is_bound(inner_use));
        assert!(!result.is_bound(after_use));
    }

    #[test]
    fn test_repeat_count_does_not_see_body_locals() {
        let mut builder = AstBuilder::new();
        let count = builder.name("r", pos(2, 13));
        let local = builder.var(TypeRef::Int, "r", pos(3, 13));
        let repeat = builder.stmt(Stmt::Repeat {
            count,
            body: block(vec![local], Vec::new()),
        });
        let main = builder.function(
            TypeRef::Void,
            "main",
            pos(1, 6),
            Vec::new(),
            block(Vec::new(), vec![repeat]),
        );
        let ast = builder.finish(vec![main]);

        let (_, diagnostics) = run(&ast);
        assert_eq!(
            messages(&diagnostics),
            ["2:13 ***ERROR*** Undeclared identifier"]
        );
    }

    #[test]
    fn test_duplicate_function_body_is_still_resolved() {
        let mut builder = AstBuilder::new();
        let global = builder.var(TypeRef::Int, "f", pos(1, 5));
        let missing = builder.name("nowhere", pos(3, 5));
        let stmt = builder.stmt(Stmt::PostInc(missing));
        let f = builder.function(
            TypeRef::Void,
            "f",
            pos(2, 6),
            Vec::new(),
            block(Vec::new(), vec![stmt]),
        );
        let ast = builder.finish(vec![global, f]);

        let (_, diagnostics) = run(&ast);
        assert_eq!(
            messages(&diagnostics),
            [
                "2:6 ***ERROR*** Multiply declared identifier",
                "3:5 ***ERROR*** Undeclared identifier",
            ]
        );
    }
}
