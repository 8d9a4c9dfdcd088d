//! Turn rule-set declarations into configured, validated rule instances.

use std::path::Path;

use crate::declaration::{DeclarationLoader, RuleReference, RuleSetDeclaration};
use crate::error::ResolveError;
use crate::registry::RuleRegistry;
use crate::rule::Rule;

/// A rule instance that passed resolution: configured and contract-checked.
pub type ResolvedRule = Box<dyn Rule>;

/// Resolves rule references against a [`RuleRegistry`].
///
/// Resolution is all-or-nothing: the first failing reference aborts the
/// whole declaration and no partial list is returned. Declared order and
/// duplicates are preserved.
#[derive(Debug, Clone, Copy)]
pub struct RuleSetResolver<'r> {
    registry: &'r RuleRegistry,
    loader: DeclarationLoader,
}

impl<'r> RuleSetResolver<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            loader: DeclarationLoader::new(),
        }
    }

    /// Load the declaration at `path`, flatten its includes and resolve it.
    pub fn resolve_from_declaration(&self, path: &Path) -> Result<Vec<ResolvedRule>, ResolveError> {
        let set = self.loader.load_flattened(path)?;
        let rules = self.resolve(&set.references)?;
        tracing::debug!(set = %set.name, rules = rules.len(), "resolved rule set");
        Ok(rules)
    }

    /// Resolve an in-memory declaration whose includes are relative to `base_dir`.
    pub fn resolve_declaration(
        &self,
        declaration: &RuleSetDeclaration,
        base_dir: &Path,
    ) -> Result<Vec<ResolvedRule>, ResolveError> {
        let set = self.loader.flatten(declaration, base_dir)?;
        self.resolve(&set.references)
    }

    /// Resolve an already flattened list of references.
    pub fn resolve(&self, references: &[RuleReference]) -> Result<Vec<ResolvedRule>, ResolveError> {
        references
            .iter()
            .map(|reference| self.resolve_reference(reference))
            .collect()
    }

    /// Instantiate, configure, then validate one reference.
    pub fn resolve_reference(&self, reference: &RuleReference) -> Result<ResolvedRule, ResolveError> {
        let identifier = reference.identifier.as_str();
        let mut instance =
            self.registry
                .instantiate(identifier)
                .ok_or_else(|| ResolveError::UnknownRule {
                    identifier: identifier.to_string(),
                })?;

        if let Some(params) = &reference.config {
            let configurable =
                instance
                    .as_configurable()
                    .ok_or_else(|| ResolveError::NotConfigurable {
                        identifier: identifier.to_string(),
                    })?;
            configurable
                .configure(params)
                .map_err(|err| ResolveError::InvalidConfiguration {
                    identifier: identifier.to_string(),
                    reason: err.0,
                })?;
            tracing::trace!(identifier, params = params.len(), "configured rule");
        }

        instance
            .into_rule()
            .ok_or_else(|| ResolveError::ContractViolation {
                identifier: identifier.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::{CLASS_RENAMING, USE_ADDING};
    use crate::rules::{PSR4_AUTOLOAD_MATCHER, REMOVE_FUNCTION_CALL, RENAME_CLASS};
    use serde_json::json;

    fn configured(identifier: &str, config: serde_json::Value) -> RuleReference {
        RuleReference::with_config(identifier, config.as_object().cloned().unwrap())
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let registry = RuleRegistry::with_default_rules();
        let resolver = RuleSetResolver::new(&registry);
        let rules = resolver
            .resolve(&[
                RuleReference::new(REMOVE_FUNCTION_CALL),
                RuleReference::new(RENAME_CLASS),
                RuleReference::new(REMOVE_FUNCTION_CALL),
            ])
            .unwrap();

        let ids: Vec<_> = rules.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![REMOVE_FUNCTION_CALL, RENAME_CLASS, REMOVE_FUNCTION_CALL]);
    }

    #[test]
    fn test_failure_aborts_whole_list() {
        let registry = RuleRegistry::with_default_rules();
        let err = RuleSetResolver::new(&registry)
            .resolve(&[RuleReference::new(RENAME_CLASS), RuleReference::new("nope")])
            .unwrap_err();
        assert_eq!(err.identifier(), Some("nope"));
        assert!(matches!(err, ResolveError::UnknownRule { .. }));
    }

    #[test]
    fn test_configuration_errors() {
        let registry = RuleRegistry::with_default_rules();
        let resolver = RuleSetResolver::new(&registry);

        let err = resolver
            .resolve_reference(&configured(USE_ADDING, json!({ "x": "y" })))
            .unwrap_err();
        assert!(matches!(err, ResolveError::NotConfigurable { .. }));

        let err = resolver
            .resolve_reference(&configured(RENAME_CLASS, json!({ "Old": 1 })))
            .unwrap_err();
        match err {
            ResolveError::InvalidConfiguration { identifier, reason } => {
                assert_eq!(identifier, RENAME_CLASS);
                assert!(reason.contains("must be a string"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_post_pass_violates_contract() {
        let registry = RuleRegistry::with_default_rules();
        let err = RuleSetResolver::new(&registry)
            .resolve(&[RuleReference::new(RENAME_CLASS), RuleReference::new(CLASS_RENAMING)])
            .unwrap_err();
        match err {
            ResolveError::ContractViolation { identifier } => {
                assert_eq!(identifier, CLASS_RENAMING)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_service_violates_contract_even_when_configured() {
        let registry = RuleRegistry::with_default_rules();
        let err = RuleSetResolver::new(&registry)
            .resolve_reference(&configured(PSR4_AUTOLOAD_MATCHER, json!({ "App\\": "src" })))
            .unwrap_err();
        assert!(matches!(err, ResolveError::ContractViolation { .. }));
    }
}
