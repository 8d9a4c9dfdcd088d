//! Decides whether a fully qualified class can be referenced by its short name.
//!
//! Shared by `name-importing` and `docblock-name-importing` so both passes
//! agree on collisions.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{short_name, Program};
use crate::context::FileContext;
use crate::visit::{for_each_name, NameKind, Scope};

/// How a fully qualified class may be referenced in a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportDecision {
    /// The class lives in the body's namespace; the short name works as is.
    SameNamespace,
    /// A `use` already binds the short name to this class.
    AlreadyImported,
    /// Shorten and queue a `use` import.
    Queue,
    /// The short name means something else here; keep the full name.
    Conflict,
}

#[derive(Debug, Default)]
pub struct ImportPlanner {
    /// Namespace key → first segments of relative class names and qualified
    /// function names in that body.
    relative_heads: BTreeMap<String, BTreeSet<String>>,
}

impl ImportPlanner {
    pub fn for_program(program: &Program) -> Self {
        let mut relative_heads: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for_each_name(program, &mut |name, kind, scope| {
            let through_import = kind == NameKind::Class || name.is_qualified();
            if through_import && !name.is_fully_qualified() {
                relative_heads
                    .entry(scope.namespace_key().to_string())
                    .or_default()
                    .insert(name.first_segment().to_string());
            }
        });
        Self { relative_heads }
    }

    pub fn plan(&self, fqn: &str, scope: &Scope, ctx: &FileContext) -> ImportDecision {
        let short = short_name(fqn);

        match scope.imported(short) {
            Some(existing) if existing == fqn => return ImportDecision::AlreadyImported,
            Some(_) => return ImportDecision::Conflict,
            None => {}
        }
        if scope.qualify(short) == fqn {
            return ImportDecision::SameNamespace;
        }
        if scope.declares(short) || self.is_relative_head(scope, short) {
            return ImportDecision::Conflict;
        }
        match ctx.queued_import_for_short(scope.namespace_key(), short) {
            Some(queued) if queued != fqn => ImportDecision::Conflict,
            _ => ImportDecision::Queue,
        }
    }

    /// A relative name in the body already starts with `short`; importing
    /// another class under that name would change its meaning.
    fn is_relative_head(&self, scope: &Scope, short: &str) -> bool {
        self.relative_heads
            .get(scope.namespace_key())
            .is_some_and(|heads| heads.contains(short))
    }
}
