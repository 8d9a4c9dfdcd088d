//! Rename namespaces: `{"Old\\Ns": "New\\Ns"}`.
//!
//! Rewrites namespace declarations, `use` imports and fully qualified
//! references whose namespace starts with an old prefix. Relative names are
//! left untouched: they resolve through the renamed namespace or imports.

use std::collections::BTreeMap;

use crate::ast::{Name, Program, Stmt};
use crate::context::FileContext;
use crate::error::{ConfigureError, PassError};
use crate::rule::{string_map, Configurable, Params, Rule};
use crate::rules::RENAME_NAMESPACE;
use crate::visit::{any_name, for_each_body, for_each_body_mut, walk_names_mut};

#[derive(Debug, Default, Clone)]
pub struct RenameNamespaceRule {
    renames: BTreeMap<String, String>,
}

impl RenameNamespaceRule {
    /// Replace the longest matching old prefix of `name`, if any.
    fn rename(&self, name: &str) -> Option<String> {
        self.renames
            .iter()
            .filter(|(old, _)| {
                name == old.as_str()
                    || name
                        .strip_prefix(old.as_str())
                        .is_some_and(|rest| rest.starts_with('\\'))
            })
            .max_by_key(|(old, _)| old.len())
            .map(|(old, new)| format!("{}{}", new, &name[old.len()..]))
    }

    /// `true` if a declaration, import or fully qualified name would change.
    fn touches(&self, program: &Program) -> bool {
        if any_name(program, |name, _, _| {
            name.is_fully_qualified() && self.rename(name.unqualified()).is_some()
        }) {
            return true;
        }
        let mut found = false;
        for_each_body(program, &mut |stmts, _| {
            found = found
                || stmts.iter().any(|stmt| match stmt {
                    Stmt::Namespace {
                        name: Some(namespace),
                        ..
                    } => self.rename(namespace).is_some(),
                    Stmt::Use(import) => self.rename(&import.name).is_some(),
                    _ => false,
                });
        });
        found
    }
}

impl Rule for RenameNamespaceRule {
    fn id(&self) -> &'static str {
        RENAME_NAMESPACE
    }

    fn should_traverse(&self, program: &Program, _ctx: &FileContext) -> bool {
        !self.renames.is_empty() && self.touches(program)
    }

    fn apply(&self, mut program: Program, _ctx: &mut FileContext) -> Result<Program, PassError> {
        walk_names_mut(&mut program, &mut |name, _, _| {
            if !name.is_fully_qualified() {
                return;
            }
            if let Some(renamed) = self.rename(name.unqualified()) {
                *name = Name::fully_qualified(&renamed);
            }
        });

        for_each_body_mut(&mut program, &mut |stmts, _| {
            for stmt in stmts.iter_mut() {
                match stmt {
                    Stmt::Namespace {
                        name: Some(namespace),
                        ..
                    } => {
                        if let Some(renamed) = self.rename(namespace) {
                            *namespace = renamed;
                        }
                    }
                    Stmt::Use(import) => {
                        if let Some(renamed) = self.rename(&import.name) {
                            import.name = renamed;
                        }
                    }
                    _ => {}
                }
            }
        });

        Ok(program)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for RenameNamespaceRule {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigureError> {
        let renames = string_map(params)?;
        self.renames.extend(renames.into_iter().map(|(old, new)| {
            (
                old.trim_end_matches('\\').to_string(),
                new.trim_end_matches('\\').to_string(),
            )
        }));
        Ok(())
    }
}
