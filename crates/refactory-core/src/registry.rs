//! Rule identifier → factory.
//!
//! Typed registration (`register_rule`) can only produce [`Rule`]s, so its
//! contract holds by construction. Post passes and services are addressable
//! by identifier but are not main rules: naming one in a rule set fails
//! validation. Dynamic registration (`register`) may produce any of the
//! three and is validated at resolution time.

use std::collections::BTreeMap;
use std::fmt;

use crate::post::{
    ClassRenamingPostPass, DocblockNameImportingPostPass, NameImportingPostPass,
    UnusedImportRemovingPostPass, UseAddingPostPass,
};
use crate::rule::{Configurable, Rule};
use crate::rules::{
    NormalizeNamespaceByPsr4Rule, Psr4AutoloadMatcher, RemoveFunctionCallRule, RenameClassRule,
    RenameFunctionRule, RenameNamespaceRule,
};

/// A registered component that is not a rule (a matcher, a collector, ...).
pub trait Service: Send + Sync + fmt::Debug {
    fn id(&self) -> &'static str;

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }
}

/// A freshly instantiated component.
#[derive(Debug)]
pub enum Instance {
    Rule(Box<dyn Rule>),
    /// Runs only inside the flag-gated post pipeline.
    PostPass(Box<dyn Rule>),
    Service(Box<dyn Service>),
}

impl Instance {
    pub fn id(&self) -> &'static str {
        match self {
            Instance::Rule(rule) | Instance::PostPass(rule) => rule.id(),
            Instance::Service(service) => service.id(),
        }
    }

    pub fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        match self {
            Instance::Rule(rule) | Instance::PostPass(rule) => rule.as_configurable(),
            Instance::Service(service) => service.as_configurable(),
        }
    }

    /// The instance as a main rule, or `None` if it does not satisfy the
    /// contract.
    pub fn into_rule(self) -> Option<Box<dyn Rule>> {
        match self {
            Instance::Rule(rule) => Some(rule),
            Instance::PostPass(_) | Instance::Service(_) => None,
        }
    }
}

type Factory = Box<dyn Fn() -> Instance + Send + Sync>;

/// Maps rule identifiers to factories returning fresh instances.
#[derive(Default)]
pub struct RuleRegistry {
    factories: BTreeMap<String, Factory>,
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("ids", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in rule, post pass and service.
    pub fn with_default_rules() -> Self {
        let mut registry = Self::new();
        registry.register_post_pass::<ClassRenamingPostPass>();
        registry.register_post_pass::<NameImportingPostPass>();
        registry.register_post_pass::<DocblockNameImportingPostPass>();
        registry.register_post_pass::<UseAddingPostPass>();
        registry.register_post_pass::<UnusedImportRemovingPostPass>();
        registry.register_rule::<RenameClassRule>();
        registry.register_rule::<RenameFunctionRule>();
        registry.register_rule::<RenameNamespaceRule>();
        registry.register_rule::<RemoveFunctionCallRule>();
        registry.register_rule::<NormalizeNamespaceByPsr4Rule>();
        registry.register_service::<Psr4AutoloadMatcher>();
        registry
    }

    /// Register a rule type under its own identifier.
    pub fn register_rule<R>(&mut self) -> &mut Self
    where
        R: Rule + Default + 'static,
    {
        let id = R::default().id();
        self.register(id, || Instance::Rule(Box::new(R::default())))
    }

    /// Register a post pass under its own identifier. It can be looked up but
    /// never resolves as a main rule.
    pub fn register_post_pass<P>(&mut self) -> &mut Self
    where
        P: Rule + Default + 'static,
    {
        let id = P::default().id();
        self.register(id, || Instance::PostPass(Box::new(P::default())))
    }

    /// Register a non-rule component under its own identifier.
    pub fn register_service<S>(&mut self) -> &mut Self
    where
        S: Service + Default + 'static,
    {
        let id = S::default().id();
        self.register(id, || Instance::Service(Box::new(S::default())))
    }

    /// Register an arbitrary factory. Replaces any previous registration.
    pub fn register<F>(&mut self, id: &str, factory: F) -> &mut Self
    where
        F: Fn() -> Instance + Send + Sync + 'static,
    {
        if self
            .factories
            .insert(id.to_string(), Box::new(factory))
            .is_some()
        {
            tracing::debug!(id, "replacing registered factory");
        }
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Build a fresh instance, or `None` for unknown identifiers.
    pub fn instantiate(&self, id: &str) -> Option<Instance> {
        self.factories.get(id).map(|factory| factory())
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
