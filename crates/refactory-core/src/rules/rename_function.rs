//! Rename function calls: `{"old_function": "new_function"}`.

use std::collections::BTreeMap;

use crate::ast::{Name, Program};
use crate::context::FileContext;
use crate::error::{ConfigureError, PassError};
use crate::rule::{string_map, Configurable, Params, Rule};
use crate::rules::RENAME_FUNCTION;
use crate::visit::{any_name, walk_names_mut, NameKind};

#[derive(Debug, Default, Clone)]
pub struct RenameFunctionRule {
    renames: BTreeMap<String, String>,
}

impl Rule for RenameFunctionRule {
    fn id(&self) -> &'static str {
        RENAME_FUNCTION
    }

    fn should_traverse(&self, program: &Program, _ctx: &FileContext) -> bool {
        !self.renames.is_empty()
            && any_name(program, |name, kind, scope| {
                kind == NameKind::Function && self.renames.contains_key(&scope.resolve(name, kind))
            })
    }

    fn apply(&self, mut program: Program, _ctx: &mut FileContext) -> Result<Program, PassError> {
        walk_names_mut(&mut program, &mut |name, kind, scope| {
            if kind != NameKind::Function {
                return;
            }
            if let Some(new) = self.renames.get(&scope.resolve(name, kind)) {
                *name = if new.contains('\\') {
                    Name::fully_qualified(new)
                } else {
                    Name::new(new.as_str())
                };
            }
        });
        Ok(program)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for RenameFunctionRule {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigureError> {
        self.renames.extend(string_map(params)?);
        Ok(())
    }
}
