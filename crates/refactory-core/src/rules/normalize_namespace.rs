//! Put a file in the namespace its path implies under PSR-4.
//!
//! Configuration is forwarded to the PSR-4 matcher: `{"App\\": "src/"}`.
//! Files without a namespace are wrapped in one; files declaring several
//! namespaces cannot be normalized and fail.

use crate::ast::{Program, Stmt};
use crate::context::FileContext;
use crate::error::{ConfigureError, PassError};
use crate::rule::{Configurable, Params, Rule};
use crate::rules::psr4::{NamespaceMatcher, Psr4AutoloadMatcher};
use crate::rules::NORMALIZE_NAMESPACE_BY_PSR4;

#[derive(Debug)]
pub struct NormalizeNamespaceByPsr4Rule {
    matcher: Box<dyn NamespaceMatcher>,
    configured: bool,
}

impl Default for NormalizeNamespaceByPsr4Rule {
    fn default() -> Self {
        Self {
            matcher: Box::new(Psr4AutoloadMatcher::default()),
            configured: false,
        }
    }
}

impl NormalizeNamespaceByPsr4Rule {
    pub fn with_matcher(matcher: Box<dyn NamespaceMatcher>) -> Self {
        Self {
            matcher,
            configured: true,
        }
    }
}

impl Rule for NormalizeNamespaceByPsr4Rule {
    fn id(&self) -> &'static str {
        NORMALIZE_NAMESPACE_BY_PSR4
    }

    fn should_traverse(&self, program: &Program, _ctx: &FileContext) -> bool {
        self.configured && !program.is_empty()
    }

    fn apply(&self, mut program: Program, ctx: &mut FileContext) -> Result<Program, PassError> {
        let Some(expected) = self.matcher.expected_namespace(ctx.file_path()) else {
            return Ok(program);
        };

        let namespaces = program
            .stmts
            .iter()
            .filter(|s| matches!(s, Stmt::Namespace { .. }))
            .count();

        match namespaces {
            0 => {
                tracing::debug!(namespace = %expected, "wrapping file in namespace");
                let stmts = std::mem::take(&mut program.stmts);
                program.stmts.push(Stmt::Namespace {
                    name: Some(expected),
                    stmts,
                });
            }
            1 => {
                for stmt in &mut program.stmts {
                    if let Stmt::Namespace { name, .. } = stmt {
                        if name.as_deref() != Some(expected.as_str()) {
                            tracing::debug!(from = ?name, to = %expected, "normalizing namespace");
                            *name = Some(expected.clone());
                        }
                    }
                }
            }
            n => {
                return Err(PassError::new(
                    NORMALIZE_NAMESPACE_BY_PSR4,
                    format!(
                        "{} declares {} namespaces, expected at most one",
                        ctx.file_path().display(),
                        n
                    ),
                ))
            }
        }

        Ok(program)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for NormalizeNamespaceByPsr4Rule {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigureError> {
        let mut matcher = Psr4AutoloadMatcher::default();
        matcher.configure(params)?;
        self.configured = !matcher.is_empty();
        self.matcher = Box::new(matcher);
        Ok(())
    }
}
