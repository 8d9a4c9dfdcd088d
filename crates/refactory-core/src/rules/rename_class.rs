//! Rename classes: `{"Old\\Class": "New\\Class"}`.
//!
//! References in code are rewritten to the fully qualified new name. Every
//! old class the file refers to (in code, a `use` import or a docblock) is
//! recorded in the [`FileContext`] so the `class-renaming` post pass can fix
//! imports and docblocks afterwards.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{Name, Program, Stmt};
use crate::context::FileContext;
use crate::error::{ConfigureError, PassError};
use crate::post::docblock::class_tokens;
use crate::rule::{string_map, Configurable, Params, Rule};
use crate::rules::RENAME_CLASS;
use crate::visit::{for_each_body, for_each_doc, for_each_name, walk_names_mut, NameKind};

#[derive(Debug, Default, Clone)]
pub struct RenameClassRule {
    renames: BTreeMap<String, String>,
}

impl RenameClassRule {
    pub fn new<I, S>(renames: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let renames = renames
            .into_iter()
            .map(|(old, new)| {
                (
                    old.as_ref().trim_start_matches('\\').to_string(),
                    new.as_ref().trim_start_matches('\\').to_string(),
                )
            })
            .collect();
        Self { renames }
    }

    pub fn renames(&self) -> &BTreeMap<String, String> {
        &self.renames
    }

    /// Old class names that `program` refers to.
    fn referenced(&self, program: &Program) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        if self.renames.is_empty() {
            return found;
        }
        let mut note = |fqn: String| {
            if self.renames.contains_key(&fqn) {
                found.insert(fqn);
            }
        };

        for_each_name(program, &mut |name, kind, scope| {
            if kind == NameKind::Class {
                note(scope.resolve(name, kind));
            }
        });
        for_each_doc(program, &mut |doc, scope| {
            for token in class_tokens(doc) {
                note(scope.resolve(&Name::new(token), NameKind::Class));
            }
        });
        for_each_body(program, &mut |stmts, _| {
            for import in stmts.iter().filter_map(Stmt::as_use) {
                note(import.name.clone());
            }
        });

        found
    }
}

impl Rule for RenameClassRule {
    fn id(&self) -> &'static str {
        RENAME_CLASS
    }

    fn should_traverse(&self, program: &Program, _ctx: &FileContext) -> bool {
        !self.referenced(program).is_empty()
    }

    fn apply(&self, mut program: Program, ctx: &mut FileContext) -> Result<Program, PassError> {
        for old in self.referenced(&program) {
            if let Some(new) = self.renames.get(&old) {
                ctx.record_renamed_class(&old, new);
            }
        }

        walk_names_mut(&mut program, &mut |name, kind, scope| {
            if kind != NameKind::Class {
                return;
            }
            if let Some(new) = self.renames.get(&scope.resolve(name, kind)) {
                *name = Name::fully_qualified(new);
            }
        });

        Ok(program)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for RenameClassRule {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigureError> {
        self.renames.extend(string_map(params)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassDecl, Expr};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn instanceof(class: &str) -> Stmt {
        Stmt::Return {
            expr: Some(Expr::Instanceof {
                expr: Box::new(Expr::Variable {
                    name: "mailer".to_string(),
                }),
                class: Name::new(class),
            }),
        }
    }

    #[test]
    fn test_configure_then_apply() {
        let mut rule = RenameClassRule::default();
        let params = json!({ "Old\\Mailer": "New\\Mailer" });
        rule.configure(params.as_object().unwrap()).unwrap();

        let program = Program::new(vec![
            Stmt::use_import("Old\\Mailer"),
            instanceof("Mailer"),
            instanceof("\\Unrelated\\Mailer"),
        ]);
        let mut ctx = FileContext::new("a.php");
        let result = rule.apply(program, &mut ctx).unwrap();

        assert_eq!(
            result,
            Program::new(vec![
                Stmt::use_import("Old\\Mailer"),
                instanceof("\\New\\Mailer"),
                instanceof("\\Unrelated\\Mailer"),
            ])
        );
        assert_eq!(ctx.renamed_class("Old\\Mailer"), Some("New\\Mailer"));
    }

    #[test]
    fn test_traverses_only_files_that_refer_to_an_old_class() {
        let ctx = FileContext::new("a.php");
        let rule = RenameClassRule::new([("A\\B", "C\\D")]);
        let unrelated = Program::new(vec![instanceof("\\A\\Other")]);

        assert!(!RenameClassRule::default().should_traverse(&unrelated, &ctx));
        assert!(!rule.should_traverse(&unrelated, &ctx));
        assert!(rule.should_traverse(&Program::new(vec![instanceof("\\A\\B")]), &ctx));
        assert!(rule.should_traverse(&Program::new(vec![Stmt::use_import("A\\B")]), &ctx));
    }

    #[test]
    fn test_records_only_referenced_renames() {
        let rule = RenameClassRule::new([
            ("Old\\Mailer", "New\\Mailer"),
            ("Old\\Logger", "New\\Logger"),
            ("Old\\Unused", "New\\Unused"),
        ]);
        let program = Program::new(vec![Stmt::Namespace {
            name: Some("App".to_string()),
            stmts: vec![
                Stmt::use_import("Old\\Logger"),
                Stmt::Class(ClassDecl {
                    name: "Service".to_string(),
                    extends: None,
                    implements: vec![],
                    doc: Some("@var \\Old\\Mailer".to_string()),
                    body: vec![],
                }),
            ],
        }]);
        let mut ctx = FileContext::new("a.php");
        rule.apply(program, &mut ctx).unwrap();

        assert_eq!(ctx.renamed_class("Old\\Mailer"), Some("New\\Mailer"));
        assert_eq!(ctx.renamed_class("Old\\Logger"), Some("New\\Logger"));
        assert_eq!(ctx.renamed_class("Old\\Unused"), None);
    }

    #[test]
    fn test_configure_rejects_non_string_values() {
        let mut rule = RenameClassRule::default();
        let params = json!({ "Old\\Mailer": ["New\\Mailer"] });
        assert!(rule.configure(params.as_object().unwrap()).is_err());
    }
}
