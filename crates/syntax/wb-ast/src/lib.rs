//! Abstract syntax tree for Wumbo programs
//!
//! The tree is built once (by a parser or by [`AstBuilder`]) and is never
//! reshaped afterwards. Identifiers, statements and expressions live in
//! arenas so that analysis passes can attach results out of band, keyed by
//! node ID, without touching the tree itself.

pub mod builder;
pub mod unparse;

pub use builder::{AstBuilder, block};
pub use unparse::{Annotations, unparse};

use derive_more::Display;
use wb_arena::{Arena, Idx};
use wb_intern::{Interner, Name};
use wb_span::Position;

/// Identifier occurrence ID
pub type IdentId = Idx<Ident>;
/// Expression ID
pub type ExprId = Idx<Expr>;
/// Statement ID
pub type StmtId = Idx<Stmt>;

/// A complete, immutable syntax tree
#[derive(Debug, Clone)]
pub struct Ast {
    /// Identifier occurrences
    pub idents: Arena<Ident>,
    /// Expression arena
    pub exprs: Arena<Expr>,
    /// Statement arena
    pub stmts: Arena<Stmt>,
    /// Top-level program
    pub program: Program,
    /// Interner owning identifier text
    pub interner: Interner,
}

impl Ast {
    /// Text of an identifier occurrence
    pub fn ident_text(&self, id: IdentId) -> &str {
        self.interner.resolve(&self.idents[id].name)
    }

    /// Source position of an identifier occurrence
    pub fn ident_pos(&self, id: IdentId) -> Position {
        self.idents[id].pos
    }
}

/// Root node: the ordered top-level declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Declarations in source order
    pub decls: Vec<Decl>,
}

/// One occurrence of an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    /// Interned identifier text
    pub name: Name,
    /// Source location
    pub pos: Position,
}

/// Declared type of a variable, field, formal or function result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    /// `int`
    Int,
    /// `bool`
    Bool,
    /// `void`
    Void,
    /// `struct Name`
    Struct(IdentId),
}

/// Declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// Variable declaration
    Var(VarDecl),
    /// Function declaration
    Fn(FnDecl),
    /// Struct type declaration
    Struct(StructDecl),
}

/// `type name;`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarDecl {
    /// Declared type
    pub ty: TypeRef,
    /// Declared name
    pub name: IdentId,
}

/// A function formal parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formal {
    /// Parameter type
    pub ty: TypeRef,
    /// Parameter name
    pub name: IdentId,
}

/// `type name(formals) { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnDecl {
    /// Return type
    pub ret: TypeRef,
    /// Function name
    pub name: IdentId,
    /// Formal parameters in declaration order
    pub formals: Vec<Formal>,
    /// Function body
    pub body: Block,
}

/// `struct Name { fields };`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    /// Struct type name
    pub name: IdentId,
    /// Field declarations
    pub fields: Vec<VarDecl>,
}

/// Local declarations followed by statements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// Declarations local to the block
    pub decls: Vec<Decl>,
    /// Statements in order
    pub stmts: Vec<StmtId>,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `lhs = rhs;` (the expression is always [`Expr::Assign`])
    Assign(ExprId),
    /// `e++;`
    PostInc(ExprId),
    /// `e--;`
    PostDec(ExprId),
    /// `cin >> e;`
    Read(ExprId),
    /// `cout << e;`
    Write(ExprId),
    /// `if (cond) { then }`
    If {
        /// Condition
        cond: ExprId,
        /// Guarded block
        then: Block,
    },
    /// `if (cond) { then } else { otherwise }`
    IfElse {
        /// Condition
        cond: ExprId,
        /// Block taken when the condition holds
        then: Block,
        /// Block taken otherwise
        otherwise: Block,
    },
    /// `while (cond) { body }`
    While {
        /// Loop condition
        cond: ExprId,
        /// Loop body
        body: Block,
    },
    /// `repeat (count) { body }`
    Repeat {
        /// Iteration count
        count: ExprId,
        /// Loop body
        body: Block,
    },
    /// `f(args);` (the expression is always [`Expr::Call`])
    Call(ExprId),
    /// `return;` or `return e;`
    Return(Option<ExprId>),
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Integer literal
    IntLit {
        /// Literal value
        value: i64,
        /// Source location
        pos: Position,
    },
    /// String literal, stored with its quotes
    StrLit {
        /// Literal text
        text: String,
        /// Source location
        pos: Position,
    },
    /// `true`
    True {
        /// Source location
        pos: Position,
    },
    /// `false`
    False {
        /// Source location
        pos: Position,
    },
    /// Identifier use
    Ident(IdentId),
    /// `base.field`
    DotAccess {
        /// Expression being accessed
        base: ExprId,
        /// Field name
        field: IdentId,
    },
    /// `lhs = rhs`
    Assign {
        /// Assigned location
        lhs: ExprId,
        /// Assigned value
        rhs: ExprId,
    },
    /// `callee(args)`
    Call {
        /// Called function name
        callee: IdentId,
        /// Arguments in order
        args: Vec<ExprId>,
    },
    /// Unary operation
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: ExprId,
    },
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: ExprId,
        /// Right operand
        rhs: ExprId,
    },
}

/// Binary operators
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition (+)
    #[display("+")]
    Add,
    /// Subtraction (-)
    #[display("-")]
    Sub,
    /// Multiplication (*)
    #[display("*")]
    Mul,
    /// Division (/)
    #[display("/")]
    Div,
    /// Logical AND (&&)
    #[display("&&")]
    And,
    /// Logical OR (||)
    #[display("||")]
    Or,
    /// Equality (==)
    #[display("==")]
    Eq,
    /// Inequality (!=)
    #[display("!=")]
    Ne,
    /// Less than (<)
    #[display("<")]
    Lt,
    /// Greater than (>)
    #[display(">")]
    Gt,
    /// Less than or equal (<=)
    #[display("<=")]
    Le,
    /// Greater than or equal (>=)
    #[display(">=")]
    Ge,
}

/// Unary operators
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Negation (-)
    #[display("-")]
    Neg,
    /// Logical NOT (!)
    #[display("!")]
    Not,
}
