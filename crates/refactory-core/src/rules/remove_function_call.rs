//! Remove standalone calls to the configured functions:
//! `{"functions": ["var_dump", "dd"]}`.
//!
//! Only expression statements are removed; calls used as values are kept.

use std::collections::BTreeSet;

use crate::ast::{Expr, Program, Stmt};
use crate::context::FileContext;
use crate::error::{ConfigureError, PassError};
use crate::rule::{string_list, Configurable, Params, Rule};
use crate::rules::REMOVE_FUNCTION_CALL;
use crate::visit::{any_name, walk_stmt_lists_mut, NameKind, Scope};

#[derive(Debug, Default, Clone)]
pub struct RemoveFunctionCallRule {
    functions: BTreeSet<String>,
}

impl RemoveFunctionCallRule {
    fn is_removed_call(&self, stmt: &Stmt, scope: &Scope) -> bool {
        match stmt {
            Stmt::Expr {
                expr: Expr::Call { function, .. },
            } => self
                .functions
                .contains(&scope.resolve(function, NameKind::Function)),
            _ => false,
        }
    }
}

impl Rule for RemoveFunctionCallRule {
    fn id(&self) -> &'static str {
        REMOVE_FUNCTION_CALL
    }

    fn should_traverse(&self, program: &Program, _ctx: &FileContext) -> bool {
        !self.functions.is_empty()
            && any_name(program, |name, kind, scope| {
                kind == NameKind::Function && self.functions.contains(&scope.resolve(name, kind))
            })
    }

    fn apply(&self, mut program: Program, _ctx: &mut FileContext) -> Result<Program, PassError> {
        walk_stmt_lists_mut(&mut program, &mut |stmts, scope| {
            stmts.retain(|stmt| !self.is_removed_call(stmt, scope));
        });
        Ok(program)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for RemoveFunctionCallRule {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigureError> {
        let functions = string_list(params, "functions")?;
        self.functions.extend(
            functions
                .into_iter()
                .map(|f| f.trim_start_matches('\\').to_string()),
        );
        Ok(())
    }
}
