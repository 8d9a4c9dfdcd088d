//! Post pass: remove `use` imports that nothing in their body refers to.
//!
//! A reference is any relative class name or qualified function name whose
//! first segment is the import's local name, or a docblock token starting
//! with it.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{Program, Stmt};
use crate::context::FileContext;
use crate::error::PassError;
use crate::post::docblock::class_tokens;
use crate::post::UNUSED_IMPORT_REMOVING;
use crate::rule::Rule;
use crate::visit::{for_each_body, for_each_body_mut, for_each_doc, for_each_name, NameKind};

#[derive(Debug, Default, Clone, Copy)]
pub struct UnusedImportRemovingPostPass;

impl Rule for UnusedImportRemovingPostPass {
    fn id(&self) -> &'static str {
        UNUSED_IMPORT_REMOVING
    }

    fn should_traverse(&self, program: &Program, _ctx: &FileContext) -> bool {
        let mut has_imports = false;
        for_each_body(program, &mut |stmts, _| {
            has_imports = has_imports || stmts.iter().any(|s| s.as_use().is_some());
        });
        has_imports
    }

    fn apply(&self, mut program: Program, _ctx: &mut FileContext) -> Result<Program, PassError> {
        let used = referenced_heads(&program);
        let nothing = BTreeSet::new();

        for_each_body_mut(&mut program, &mut |stmts, namespace| {
            let used = used
                .get(namespace.unwrap_or("").trim_start_matches('\\'))
                .unwrap_or(&nothing);
            stmts.retain(|stmt| match stmt {
                Stmt::Use(import) if !used.contains(import.local_name()) => {
                    tracing::debug!(import = %import.name, "removing unused import");
                    false
                }
                _ => true,
            });
        });

        Ok(program)
    }
}

/// Namespace key → first segments referenced in that body.
fn referenced_heads(program: &Program) -> BTreeMap<String, BTreeSet<String>> {
    let mut heads: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for_each_name(program, &mut |name, kind, scope| {
        let through_import = kind == NameKind::Class || name.is_qualified();
        if through_import && !name.is_fully_qualified() {
            heads
                .entry(scope.namespace_key().to_string())
                .or_default()
                .insert(name.first_segment().to_string());
        }
    });

    for_each_doc(program, &mut |doc, scope| {
        let entry = heads.entry(scope.namespace_key().to_string()).or_default();
        for token in class_tokens(doc).filter(|t| !t.starts_with('\\')) {
            let head = token.split('\\').next().unwrap_or(token);
            entry.insert(head.to_string());
        }
    });

    heads
}
