//! Integration test utilities for Wumbo name resolution

use anyhow::Result;
use wb_ast::Ast;
use wb_driver::{Driver, DriverConfig};
use wb_span::Position;

/// Shorthand for a source position
pub fn pos(line: u32, column: u32) -> Position {
    Position::new(line, column)
}

/// Resolve `ast` and print the annotated program, a `--` separator, and the
/// plain diagnostics
///
/// # Errors
///
/// Returns an error if resolution aborts
pub fn snapshot(ast: &Ast) -> Result<String> {
    let report = Driver::new(DriverConfig::default()).run(ast, None)?;
    Ok(format!("{}--\n{}", report.unparsed, report.rendered_diagnostics))
}

/// Unparse `ast` without annotations
pub fn plain_text(ast: &Ast) -> String {
    wb_ast::unparse(ast, None)
}
