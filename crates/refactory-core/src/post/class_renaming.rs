//! Post pass: finish class renames recorded by `rename-class`.
//!
//! Main rules rename the references they understand. This pass catches the
//! rest for every class recorded in the [`FileContext`]:
//! 1. References still resolving to an old class become `\New\Class`
//! 2. Docblock tokens resolving to an old class become `\New\Class`
//! 3. `use Old\Class` imports are rewritten, dropping duplicates
//!
//! References are rewritten before imports so they still resolve through
//! the old imports.

use std::collections::BTreeMap;

use crate::ast::{Name, Program, Stmt};
use crate::context::FileContext;
use crate::error::PassError;
use crate::post::docblock::rewrite_class_tokens;
use crate::post::CLASS_RENAMING;
use crate::rule::Rule;
use crate::visit::{for_each_body_mut, walk_docs_mut, walk_names_mut, NameKind};

#[derive(Debug, Default, Clone, Copy)]
pub struct ClassRenamingPostPass;

impl Rule for ClassRenamingPostPass {
    fn id(&self) -> &'static str {
        CLASS_RENAMING
    }

    fn should_traverse(&self, _program: &Program, ctx: &FileContext) -> bool {
        !ctx.renamed_classes().is_empty()
    }

    fn apply(&self, mut program: Program, ctx: &mut FileContext) -> Result<Program, PassError> {
        let renames = ctx.renamed_classes();

        walk_names_mut(&mut program, &mut |name, kind, scope| {
            if kind != NameKind::Class {
                return;
            }
            if let Some(new) = renames.get(&scope.resolve(name, kind)) {
                tracing::trace!(old = %name, new = %new, "renaming class reference");
                *name = Name::fully_qualified(new);
            }
        });

        walk_docs_mut(&mut program, &mut |doc, scope| {
            let rewritten = rewrite_class_tokens(doc, |token| {
                let resolved = scope.resolve(&Name::new(token), NameKind::Class);
                renames.get(&resolved).map(|new| format!("\\{}", new))
            });
            if let Some(rewritten) = rewritten {
                *doc = rewritten;
            }
        });

        for_each_body_mut(&mut program, &mut |stmts, _| rename_imports(stmts, renames));

        Ok(program)
    }
}

fn rename_imports(stmts: &mut Vec<Stmt>, renames: &BTreeMap<String, String>) {
    let mut renamed_any = false;
    for stmt in stmts.iter_mut() {
        if let Stmt::Use(import) = stmt {
            if let Some(new) = renames.get(&import.name) {
                import.name = new.clone();
                renamed_any = true;
            }
        }
    }
    if !renamed_any {
        return;
    }

    let mut seen = Vec::new();
    stmts.retain(|stmt| match stmt {
        Stmt::Use(import) => {
            let key = (import.name.clone(), import.alias.clone());
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        }
        _ => true,
    });
}
