//! Post pass: add the `use` imports queued by the importing passes.
//!
//! New imports are inserted sorted, right after the last existing `use` of
//! the body (or at its top). Imports that are already present are dropped.

use crate::ast::{Program, Stmt};
use crate::context::FileContext;
use crate::error::PassError;
use crate::post::USE_ADDING;
use crate::rule::Rule;
use crate::visit::{for_each_body_mut, Scope};

#[derive(Debug, Default, Clone, Copy)]
pub struct UseAddingPostPass;

impl Rule for UseAddingPostPass {
    fn id(&self) -> &'static str {
        USE_ADDING
    }

    fn should_traverse(&self, _program: &Program, ctx: &FileContext) -> bool {
        ctx.has_pending_imports()
    }

    fn apply(&self, mut program: Program, ctx: &mut FileContext) -> Result<Program, PassError> {
        for_each_body_mut(&mut program, &mut |stmts, namespace| {
            // Imports belong inside the namespace blocks, not above them.
            if stmts.iter().any(|s| matches!(s, Stmt::Namespace { .. })) {
                return;
            }
            let scope = Scope::for_body(namespace, stmts);
            let pending = ctx.take_pending_imports(scope.namespace_key());
            let imports: Vec<Stmt> = pending
                .iter()
                .filter(|fqn| !scope.imports_class(fqn))
                .map(|fqn| Stmt::use_import(fqn))
                .collect();
            if imports.is_empty() {
                return;
            }

            tracing::debug!(
                namespace = scope.namespace_key(),
                count = imports.len(),
                "adding use imports"
            );
            let position = stmts
                .iter()
                .rposition(|s| matches!(s, Stmt::Use(_)))
                .map_or(0, |last| last + 1);
            stmts.splice(position..position, imports);
        });

        Ok(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Name};
    use pretty_assertions::assert_eq;

    fn call(function: &str) -> Stmt {
        Stmt::Expr {
            expr: Expr::Call {
                function: Name::new(function),
                args: vec![],
            },
        }
    }

    #[test]
    fn test_inserts_sorted_after_existing_imports() {
        let program = Program::new(vec![Stmt::Namespace {
            name: Some("App".to_string()),
            stmts: vec![Stmt::use_import("Lib\\Existing"), call("boot")],
        }]);
        let mut ctx = FileContext::new("a.php");
        ctx.queue_import("App", "Lib\\Zeta");
        ctx.queue_import("App", "Lib\\Alpha");
        ctx.queue_import("App", "Lib\\Existing");

        let result = UseAddingPostPass.apply(program, &mut ctx).unwrap();

        assert_eq!(
            result,
            Program::new(vec![Stmt::Namespace {
                name: Some("App".to_string()),
                stmts: vec![
                    Stmt::use_import("Lib\\Existing"),
                    Stmt::use_import("Lib\\Alpha"),
                    Stmt::use_import("Lib\\Zeta"),
                    call("boot"),
                ],
            }])
        );
        assert!(!ctx.has_pending_imports());
    }

    #[test]
    fn test_global_code_gets_imports_at_top() {
        let program = Program::new(vec![call("boot")]);
        let mut ctx = FileContext::new("a.php");
        ctx.queue_import("", "Lib\\Mailer");

        let result = UseAddingPostPass.apply(program, &mut ctx).unwrap();
        assert_eq!(
            result,
            Program::new(vec![Stmt::use_import("Lib\\Mailer"), call("boot")])
        );
    }

    #[test]
    fn test_nothing_queued_means_no_traversal() {
        let ctx = FileContext::new("a.php");
        assert!(!UseAddingPostPass.should_traverse(&Program::default(), &ctx));
    }
}
