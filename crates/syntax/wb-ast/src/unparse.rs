//! Tree-to-text rendering
//!
//! The unparser is stateless with respect to the tree: it reads nodes and
//! writes text. When given [`Annotations`], identifier uses that carry a
//! resolved symbol are printed as `name(symbol)`, which is how resolution
//! results are inspected in golden tests.

use crate::{Ast, Block, Decl, Expr, ExprId, Formal, IdentId, Stmt, StmtId, TypeRef, VarDecl};

const INDENT_WIDTH: usize = 4;

/// Source of per-identifier annotations
pub trait Annotations {
    /// Text to print after the identifier, if any
    fn annotation(&self, ident: IdentId) -> Option<String>;
}

/// Render `ast` as source text, optionally annotating identifiers
pub fn unparse(ast: &Ast, annotations: Option<&dyn Annotations>) -> String {
    let mut unparser = Unparser {
        ast,
        annotations,
        out: String::new(),
    };
    for decl in &ast.program.decls {
        unparser.decl(decl, 0);
    }
    unparser.out
}

struct Unparser<'ast> {
    ast: &'ast Ast,
    annotations: Option<&'ast dyn Annotations>,
    out: String,
}

impl Unparser<'_> {
    fn indent(&mut self, indent: usize) {
        for _ in 0..indent {
            self.out.push(' ');
        }
    }

    fn ident(&mut self, id: IdentId) {
        self.out.push_str(self.ast.ident_text(id));
        if let Some(annotation) = self.annotations.and_then(|notes| notes.annotation(id)) {
            self.out.push('(');
            self.out.push_str(&annotation);
            self.out.push(')');
        }
    }

    fn ty(&mut self, ty: TypeRef) {
        match ty {
            TypeRef::Int => self.out.push_str("int"),
            TypeRef::Bool => self.out.push_str("bool"),
            TypeRef::Void => self.out.push_str("void"),
            TypeRef::Struct(name) => {
                self.out.push_str("struct ");
                self.ident(name);
            }
        }
    }

    fn decl(&mut self, decl: &Decl, indent: usize) {
        match decl {
            Decl::Var(var) => self.var_decl(*var, indent),
            Decl::Fn(function) => {
                self.indent(indent);
                self.ty(function.ret);
                self.out.push(' ');
                self.ident(function.name);
                self.out.push('(');
                self.formals(&function.formals);
                self.out.push_str(") {\n");
                self.block(&function.body, indent + INDENT_WIDTH);
                self.out.push_str("}\n\n");
            }
            Decl::Struct(struct_decl) => {
                self.indent(indent);
                self.out.push_str("struct ");
                self.ident(struct_decl.name);
                self.out.push_str("{\n");
                for field in &struct_decl.fields {
                    self.var_decl(*field, indent + INDENT_WIDTH);
                }
                self.indent(indent);
                self.out.push_str("};\n\n");
            }
        }
    }

    fn var_decl(&mut self, var: VarDecl, indent: usize) {
        self.indent(indent);
        self.ty(var.ty);
        self.out.push(' ');
        self.ident(var.name);
        self.out.push_str(";\n");
    }

    fn formals(&mut self, formals: &[Formal]) {
        for (idx, formal) in formals.iter().enumerate() {
            if idx > 0 {
                self.out.push_str(", ");
            }
            self.ty(formal.ty);
            self.out.push(' ');
            self.ident(formal.name);
        }
    }

    fn block(&mut self, block: &Block, indent: usize) {
        for decl in &block.decls {
            self.decl(decl, indent);
        }
        for &stmt in &block.stmts {
            self.stmt(stmt, indent);
        }
    }

    fn guarded(&mut self, keyword: &str, cond: ExprId, body: &Block, indent: usize) {
        self.indent(indent);
        self.out.push_str(keyword);
        self.out.push_str(" (");
        self.expr(cond);
        self.out.push_str(") {\n");
        self.block(body, indent + INDENT_WIDTH);
        self.indent(indent);
        self.out.push_str("}\n");
    }

    fn simple(&mut self, prefix: &str, expr: ExprId, suffix: &str, indent: usize) {
        self.indent(indent);
        self.out.push_str(prefix);
        self.expr(expr);
        self.out.push_str(suffix);
    }

    fn stmt(&mut self, stmt: StmtId, indent: usize) {
        let ast = self.ast;
        match &ast.stmts[stmt] {
            Stmt::Assign(assign) => {
                self.indent(indent);
                self.assign_bare(*assign);
                self.out.push_str(";\n");
            }
            Stmt::PostInc(expr) => self.simple("", *expr, "++;\n", indent),
            Stmt::PostDec(expr) => self.simple("", *expr, "--;\n", indent),
            Stmt::Read(expr) => self.simple("cin >> ", *expr, ";\n", indent),
            Stmt::Write(expr) => self.simple("cout << ", *expr, ";\n", indent),
            Stmt::Call(call) => self.simple("", *call, ";\n", indent),
            Stmt::If { cond, then } => self.guarded("if", *cond, then, indent),
            Stmt::IfElse {
                cond,
                then,
                otherwise,
            } => {
                self.guarded("if", *cond, then, indent);
                self.indent(indent);
                self.out.push_str("else {\n");
                self.block(otherwise, indent + INDENT_WIDTH);
                self.indent(indent);
                self.out.push_str("}\n");
            }
            Stmt::While { cond, body } => self.guarded("while", *cond, body, indent),
            Stmt::Repeat { count, body } => self.guarded("repeat", *count, body, indent),
            Stmt::Return(value) => {
                self.indent(indent);
                self.out.push_str("return");
                if let Some(value) = value {
                    self.out.push(' ');
                    self.expr(*value);
                }
                self.out.push_str(";\n");
            }
        }
    }

    /// Assignment without surrounding parentheses, as in statement position
    fn assign_bare(&mut self, expr: ExprId) {
        let ast = self.ast;
        if let Expr::Assign { lhs, rhs } = &ast.exprs[expr] {
            self.expr(*lhs);
            self.out.push_str(" = ");
            self.expr(*rhs);
        } else {
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: ExprId) {
        let ast = self.ast;
        match &ast.exprs[expr] {
            Expr::IntLit { value, .. } => self.out.push_str(&value.to_string()),
            Expr::StrLit { text, .. } => self.out.push_str(text),
            Expr::True { .. } => self.out.push_str("true"),
            Expr::False { .. } => self.out.push_str("false"),
            Expr::Ident(ident) => self.ident(*ident),
            Expr::DotAccess { base, field } => {
                self.out.push('(');
                self.expr(*base);
                self.out.push_str(").");
                self.ident(*field);
            }
            Expr::Assign { .. } => {
                self.out.push('(');
                self.assign_bare(expr);
                self.out.push(')');
            }
            Expr::Call { callee, args } => {
                self.ident(*callee);
                self.out.push('(');
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        self.out.push_str(", ");
                    }
                    self.expr(*arg);
                }
                self.out.push(')');
            }
            Expr::Unary { op, operand } => {
                self.out.push('(');
                self.out.push_str(&op.to_string());
                self.expr(*operand);
                self.out.push(')');
            }
            Expr::Binary { op, lhs, rhs } => {
                self.out.push('(');
                self.expr(*lhs);
                self.out.push(' ');
                self.out.push_str(&op.to_string());
                self.out.push(' ');
                self.expr(*rhs);
                self.out.push(')');
            }
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
    use crate::builder::block;
    use crate::{AstBuilder, BinaryOp, UnaryOp};
    use expect_test::expect;
    use wb_span::Position;

    fn pos(line: u32, column: u32) -> Position {
        Position::new(line, column)
    }

    struct Everything;

    impl Annotations for Everything {
        fn annotation(&self, _ident: IdentId) -> Option<String> {
            Some("int".to_string())
        }
    }

    #[test]
    fn test_unparse_declarations() {
        let mut builder = AstBuilder::new();
        let count = builder.var_decl(TypeRef::Int, "count", pos(2, 9));
        let flag = builder.var_decl(TypeRef::Bool, "flag", pos(3, 10));
        let point = builder.struct_decl("Point", pos(1, 8), vec![count, flag]);
        let point_ty = builder.struct_ty("Point", pos(5, 8));
        let origin = builder.var(point_ty, "origin", pos(5, 14));
        let ast = builder.finish(vec![point, origin]);

        expect![[r#"
            struct Point{
                int count;
                bool flag;
            };

            struct Point origin;
        "#]]
        .assert_eq(&unparse(&ast, None));
    }

    #[test]
    fn test_unparse_function_with_statements() {
        let mut builder = AstBuilder::new();
        let a = builder.formal(TypeRef::Int, "a", pos(1, 14));
        let b = builder.formal(TypeRef::Bool, "b", pos(1, 22));

        let local = builder.var(TypeRef::Int, "t", pos(2, 9));
        let lhs = builder.name("t", pos(3, 5));
        let one = builder.int(1, pos(3, 13));
        let a_use = builder.name("a", pos(3, 9));
        let sum = builder.binary(BinaryOp::Add, a_use, one);
        let assign = builder.assign_stmt(lhs, sum);

        let cond = builder.name("b", pos(4, 9));
        let not = builder.unary(UnaryOp::Not, cond);
        let out = builder.string("\"neg\"", pos(5, 17));
        let write = builder.stmt(Stmt::Write(out));
        let t_inc = builder.name("t", pos(7, 9));
        let inc = builder.stmt(Stmt::PostInc(t_inc));
        let branch = builder.stmt(Stmt::IfElse {
            cond: not,
            then: block(Vec::new(), vec![write]),
            otherwise: block(Vec::new(), vec![inc]),
        });

        let t_ret = builder.name("t", pos(9, 12));
        let ret = builder.stmt(Stmt::Return(Some(t_ret)));
        let function = builder.function(
            TypeRef::Int,
            "f",
            pos(1, 5),
            vec![a, b],
            block(vec![local], vec![assign, branch, ret]),
        );
        let ast = builder.finish(vec![function]);

        expect![[r#"
            int f(int a, bool b) {
                int t;
                t = (a + 1);
                if ((!b)) {
                    cout << "neg";
                }
                else {
                    t++;
                }
                return t;
            }

        "#]]
        .assert_eq(&unparse(&ast, None));
    }

    #[test]
    fn test_unparse_expressions() {
        let mut builder = AstBuilder::new();
        let o = builder.name("o", pos(1, 1));
        let inner = builder.dot(o, "i", pos(1, 3));
        let chain = builder.dot(inner, "n", pos(1, 5));
        let x = builder.name("x", pos(1, 9));
        let nested = builder.assign(x, chain);
        let y = builder.name("y", pos(1, 1));
        let stmt = builder.assign_stmt(y, nested);
        let arg = builder.int(3, pos(2, 3));
        let call = builder.call_stmt("g", pos(2, 1), vec![arg]);
        let ret = builder.stmt(Stmt::Return(None));
        let function = builder.function(
            TypeRef::Void,
            "main",
            pos(1, 6),
            Vec::new(),
            block(Vec::new(), vec![stmt, call, ret]),
        );
        let ast = builder.finish(vec![function]);

        expect![[r#"
            void main() {
                y = (x = ((o).i).n);
                g(3);
                return;
            }

        "#]]
        .assert_eq(&unparse(&ast, None));
    }

    #[test]
    fn test_unparse_with_annotations() {
        let mut builder = AstBuilder::new();
        let x = builder.name("x", pos(1, 1));
        let read = builder.stmt(Stmt::Read(x));
        let count = builder.name("x", pos(2, 9));
        let loop_stmt = builder.stmt(Stmt::Repeat {
            count,
            body: block(Vec::new(), vec![read]),
        });
        let function = builder.function(
            TypeRef::Void,
            "main",
            pos(1, 6),
            Vec::new(),
            block(Vec::new(), vec![loop_stmt]),
        );
        let ast = builder.finish(vec![function]);

        expect![[r#"
            void main(int)() {
                repeat (x(int)) {
                    cin >> x(int);
                }
            }

        "#]]
        .assert_eq(&unparse(&ast, Some(&Everything)));
    }
}
