//! Name resolution for Wumbo
//!
//! This crate binds every identifier use in a syntax tree to the
//! declaration it names, and reports declaration-site violations. It runs
//! after parsing and before any type checking.
//!
//! # Architecture
//!
//! The name resolution pass consists of:
//! - **Symbols**: what a name denotes (primitive type, function signature,
//!   struct definition, struct-typed instance), stored in an arena
//! - **Scope table**: a stack of frames with shadowing; struct definitions
//!   own a separate table for their fields
//! - **Name resolver**: a single pre-order walk that declares names, binds
//!   uses, and resolves `a.b.c` chains through struct field tables
//! - **Errors**: user diagnostics go to a [`wb_diagnostics::DiagnosticSink`]
//!   and never stop the walk; scope-stack contract violations abort it
//!
//! # Usage
//!
//! ```rust,ignore
//! use wb_diagnostics::DiagnosticBag;
//! use wb_resolve::NameResolver;
//!
//! let mut diagnostics = DiagnosticBag::new();
//! let result = NameResolver::resolve(&ast, &mut diagnostics)?;
//! let text = wb_ast::unparse(&ast, Some(&result.annotations(&ast)));
//! ```

pub mod error;
mod field;
pub mod resolver;
pub mod scope;
pub mod symbol;

pub use error::{ResolveErrorKind, ScopeError};
pub use resolver::{NameResolver, ResolutionResult, SymbolAnnotations};
pub use scope::ScopeTable;
pub use symbol::{
    FunctionSig, PrimitiveType, StructDef, StructInstance, Symbol, SymbolId, Symbols,
};
