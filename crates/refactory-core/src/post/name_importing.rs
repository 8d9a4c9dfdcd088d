//! Post pass: replace fully qualified class references by short names.
//!
//! `\Lib\Mail\Mailer` becomes `Mailer` and `Lib\Mail\Mailer` is queued for
//! `use-adding`. Single-segment global names (`\DateTime`) and function
//! names are left alone. Collisions keep the fully qualified form.

use crate::ast::{short_name, Name, Program};
use crate::context::FileContext;
use crate::error::PassError;
use crate::post::imports::{ImportDecision, ImportPlanner};
use crate::post::NAME_IMPORTING;
use crate::rule::Rule;
use crate::visit::{any_name, walk_names_mut, NameKind};

#[derive(Debug, Default, Clone, Copy)]
pub struct NameImportingPostPass;

impl Rule for NameImportingPostPass {
    fn id(&self) -> &'static str {
        NAME_IMPORTING
    }

    fn should_traverse(&self, program: &Program, _ctx: &FileContext) -> bool {
        any_name(program, |name, kind, _| is_importable(name, kind))
    }

    fn apply(&self, mut program: Program, ctx: &mut FileContext) -> Result<Program, PassError> {
        let planner = ImportPlanner::for_program(&program);

        walk_names_mut(&mut program, &mut |name, kind, scope| {
            if !is_importable(name, kind) {
                return;
            }
            let fqn = name.unqualified().to_string();
            match planner.plan(&fqn, scope, ctx) {
                ImportDecision::Queue => {
                    ctx.queue_import(scope.namespace_key(), &fqn);
                    *name = Name::new(short_name(&fqn));
                }
                ImportDecision::SameNamespace | ImportDecision::AlreadyImported => {
                    *name = Name::new(short_name(&fqn));
                }
                ImportDecision::Conflict => {
                    tracing::debug!(name = %fqn, "short name is taken, keeping fully qualified name");
                }
            }
        });

        Ok(program)
    }
}

fn is_importable(name: &Name, kind: NameKind) -> bool {
    kind == NameKind::Class && name.is_fully_qualified() && name.is_qualified()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Stmt};
    use pretty_assertions::assert_eq;

    fn new_expr(class: &str) -> Stmt {
        Stmt::Expr {
            expr: Expr::New {
                class: Name::new(class),
                args: vec![],
            },
        }
    }

    fn namespaced(stmts: Vec<Stmt>) -> Program {
        Program::new(vec![Stmt::Namespace {
            name: Some("App".to_string()),
            stmts,
        }])
    }

    #[test]
    fn test_should_traverse_requires_qualified_fqn() {
        let ctx = FileContext::new("a.php");
        let pass = NameImportingPostPass;
        assert!(!pass.should_traverse(&namespaced(vec![new_expr("\\DateTime")]), &ctx));
        assert!(!pass.should_traverse(&namespaced(vec![new_expr("Lib\\Mailer")]), &ctx));
        assert!(pass.should_traverse(&namespaced(vec![new_expr("\\Lib\\Mailer")]), &ctx));
    }

    #[test]
    fn test_shortens_and_queues_import() {
        let mut ctx = FileContext::new("a.php");
        let result = NameImportingPostPass
            .apply(
                namespaced(vec![new_expr("\\Lib\\Mailer"), new_expr("\\App\\Local")]),
                &mut ctx,
            )
            .unwrap();

        assert_eq!(
            result,
            namespaced(vec![new_expr("Mailer"), new_expr("Local")])
        );
        assert_eq!(ctx.queued_import_for_short("App", "Mailer"), Some("Lib\\Mailer"));
        assert_eq!(ctx.queued_import_for_short("App", "Local"), None);
    }

    #[test]
    fn test_second_class_with_same_short_name_stays_qualified() {
        let mut ctx = FileContext::new("a.php");
        let result = NameImportingPostPass
            .apply(
                namespaced(vec![new_expr("\\Lib\\Mailer"), new_expr("\\Other\\Mailer")]),
                &mut ctx,
            )
            .unwrap();

        assert_eq!(
            result,
            namespaced(vec![new_expr("Mailer"), new_expr("\\Other\\Mailer")])
        );
    }
}
