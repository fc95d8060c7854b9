//! Resolution driver
//!
//! Runs name resolution over an already-parsed tree and packages the
//! printable results: the unparsed (optionally annotated) program and the
//! rendered diagnostics.

pub mod config;

pub use config::{DiagnosticFormat, DriverConfig};

use anyhow::{Context, Result};
use wb_ast::{Annotations, Ast};
use wb_diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSink as _};
use wb_resolve::NameResolver;

/// Everything a front end prints after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The program printed back as source text
    pub unparsed: String,
    /// Diagnostics in the order they were reported
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics rendered per [`DriverConfig::format`]
    pub rendered_diagnostics: String,
    /// Whether any diagnostic rejects the program
    pub had_fatal: bool,
}

/// Resolution driver
#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: DriverConfig,
}

impl Driver {
    /// Create a driver with the given configuration
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Resolve `ast` and build a [`Report`]
    ///
    /// `source` is the text `ast` was parsed from; rich rendering falls
    /// back to plain output without it.
    ///
    /// # Errors
    ///
    /// Fails if the resolver's scope stack is mis-sequenced or rich
    /// rendering cannot map a diagnostic onto `source`.
    pub fn run(&self, ast: &Ast, source: Option<&str>) -> Result<Report> {
        let mut diagnostics = DiagnosticBag::new();
        let result =
            NameResolver::resolve(ast, &mut diagnostics).context("Name resolution aborted")?;

        let annotations = result.annotations(ast);
        let unparsed = wb_ast::unparse(
            ast,
            self.config
                .annotate
                .then_some::<&dyn Annotations>(&annotations),
        );

        let rendered_diagnostics = match (self.config.format, source) {
            (DiagnosticFormat::Rich, Some(source)) => {
                wb_diagnostics::render_rich(&diagnostics, &self.config.file_name, source)
                    .context("Failed to render diagnostics")?
            }
            (DiagnosticFormat::Rich, None) => {
                log::debug!("no source text for rich diagnostics, rendering plain");
                wb_diagnostics::render_plain(&diagnostics)
            }
            (DiagnosticFormat::Plain, _) => wb_diagnostics::render_plain(&diagnostics),
        };

        let had_fatal = diagnostics.had_fatal();
        Ok(Report {
            unparsed,
            diagnostics: diagnostics.into_vec(),
            rendered_diagnostics,
            had_fatal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wb_ast::{AstBuilder, Expr, Stmt, TypeRef, block};
    use wb_span::Position;

    /// `int x;` then `void main() { y = x; }` with `y` undeclared
    fn sample() -> Ast {
        let mut builder = AstBuilder::new();
        let x = builder.var(TypeRef::Int, "x", Position::new(1, 5));
        let y = builder.name("y", Position::new(3, 5));
        let x_use = builder.ident("x", Position::new(3, 9));
        let x_expr = builder.expr(Expr::Ident(x_use));
        let assign = builder.assign_stmt(y, x_expr);
        let main = builder.function(
            TypeRef::Void,
            "main",
            Position::new(2, 6),
            Vec::new(),
            block(Vec::new(), vec![assign]),
        );
        builder.finish(vec![x, main])
    }

    const SOURCE: &str = "int x;\nvoid main() {\n    y = x;\n}\n";

    #[test]
    fn test_plain_report() {
        let report = Driver::default().run(&sample(), None).unwrap();

        assert!(report.had_fatal);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.rendered_diagnostics,
            "3:5 ***ERROR*** Undeclared identifier\n"
        );
        assert!(report.unparsed.contains("y = x(int);"), "{}", report.unparsed);
    }

    #[test]
    fn test_annotations_disabled() {
        let config = DriverConfig {
            annotate: false,
            ..DriverConfig::default()
        };
        let report = Driver::new(config).run(&sample(), None).unwrap();
        assert!(report.unparsed.contains("y = x;"), "{}", report.unparsed);
    }

    #[test]
    fn test_rich_report_points_at_source() {
        let config = DriverConfig {
            format: DiagnosticFormat::Rich,
            file_name: "sample.wb".to_string(),
            ..DriverConfig::default()
        };
        let report = Driver::new(config).run(&sample(), Some(SOURCE)).unwrap();

        assert!(report.rendered_diagnostics.contains("Undeclared identifier"));
        assert!(report.rendered_diagnostics.contains("sample.wb:3:5"));
    }

    #[test]
    fn test_rich_without_source_falls_back() {
        let config = DriverConfig {
            format: DiagnosticFormat::Rich,
            ..DriverConfig::default()
        };
        let report = Driver::new(config).run(&sample(), None).unwrap();
        assert_eq!(
            report.rendered_diagnostics,
            "3:5 ***ERROR*** Undeclared identifier\n"
        );
    }

    #[test]
    fn test_clean_program() {
        let mut builder = AstBuilder::new();
        let ret = builder.stmt(Stmt::Return(None));
        let main = builder.function(
            TypeRef::Void,
            "main",
            Position::new(1, 6),
            Vec::new(),
            block(Vec::new(), vec![ret]),
        );
        let ast = builder.finish(vec![main]);

        let report = Driver::default().run(&ast, None).unwrap();
        assert!(!report.had_fatal);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.rendered_diagnostics, "");
    }
}
