//! Post pass: import fully qualified class names found in docblocks.

use crate::ast::{short_name, Program};
use crate::context::FileContext;
use crate::error::PassError;
use crate::post::docblock::{class_tokens, is_qualified_fqn, rewrite_class_tokens};
use crate::post::imports::{ImportDecision, ImportPlanner};
use crate::post::DOCBLOCK_NAME_IMPORTING;
use crate::rule::Rule;
use crate::visit::{for_each_doc, walk_docs_mut};

#[derive(Debug, Default, Clone, Copy)]
pub struct DocblockNameImportingPostPass;

impl Rule for DocblockNameImportingPostPass {
    fn id(&self) -> &'static str {
        DOCBLOCK_NAME_IMPORTING
    }

    fn should_traverse(&self, program: &Program, _ctx: &FileContext) -> bool {
        let mut found = false;
        for_each_doc(program, &mut |doc, _| {
            found = found || class_tokens(doc).any(is_qualified_fqn);
        });
        found
    }

    fn apply(&self, mut program: Program, ctx: &mut FileContext) -> Result<Program, PassError> {
        let planner = ImportPlanner::for_program(&program);

        walk_docs_mut(&mut program, &mut |doc, scope| {
            let rewritten = rewrite_class_tokens(doc, |token| {
                if !is_qualified_fqn(token) {
                    return None;
                }
                let fqn = token.trim_start_matches('\\');
                match planner.plan(fqn, scope, ctx) {
                    ImportDecision::Queue => {
                        ctx.queue_import(scope.namespace_key(), fqn);
                        Some(short_name(fqn).to_string())
                    }
                    ImportDecision::SameNamespace | ImportDecision::AlreadyImported => {
                        Some(short_name(fqn).to_string())
                    }
                    ImportDecision::Conflict => None,
                }
            });
            if let Some(rewritten) = rewritten {
                *doc = rewritten;
            }
        });

        Ok(program)
    }
}
