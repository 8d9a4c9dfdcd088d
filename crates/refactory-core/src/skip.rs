//! Per-(rule, file) skip decisions.
//!
//! Patterns are shell-style globs matched against the file path as given
//! (`*` also crosses `/`). A pattern additionally matches everything below
//! it, so `src/Legacy` skips `src/Legacy/Foo.php`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::SkipConfig;
use crate::error::ConfigError;
use crate::post::CLASS_RENAMING;
use crate::rules::RENAME_CLASS;

/// Built-in entailments: skipping the companion (right) also skips the
/// dependent (left).
pub const DEFAULT_COMPANIONS: &[(&str, &str)] = &[(CLASS_RENAMING, RENAME_CLASS)];

#[derive(Debug, Clone)]
enum RuleSkip {
    Everywhere,
    Paths(GlobSet),
}

/// Answers whether a rule must be skipped for a file.
///
/// Lookups that find no directive answer "not skipped".
#[derive(Debug, Clone)]
pub struct SkipPolicy {
    paths: GlobSet,
    rules: HashMap<String, RuleSkip>,
    /// Dependent rule → companion rule.
    companions: HashMap<String, String>,
}

impl Default for SkipPolicy {
    /// No skip directives, built-in companion table.
    fn default() -> Self {
        Self {
            paths: GlobSet::empty(),
            rules: HashMap::new(),
            companions: DEFAULT_COMPANIONS
                .iter()
                .map(|(dependent, companion)| (dependent.to_string(), companion.to_string()))
                .collect(),
        }
    }
}

impl SkipPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a policy from configuration, on top of the built-in companions.
    pub fn from_config(config: &SkipConfig) -> Result<Self, ConfigError> {
        let mut policy = Self::new();
        policy.paths = build_globs(&config.paths)?;
        for (rule, patterns) in &config.rules {
            policy.skip_rule_in(rule, patterns)?;
        }
        for (dependent, companion) in &config.companions {
            policy.set_companion(dependent, companion);
        }
        Ok(policy)
    }

    /// Skip `rule` for every file.
    pub fn skip_rule(&mut self, rule: &str) -> &mut Self {
        self.rules.insert(rule.to_string(), RuleSkip::Everywhere);
        self
    }

    /// Skip `rule` for files matching any of `patterns`. An empty list means
    /// every file.
    pub fn skip_rule_in<S: AsRef<str>>(
        &mut self,
        rule: &str,
        patterns: &[S],
    ) -> Result<&mut Self, ConfigError> {
        let entry = if patterns.is_empty() {
            RuleSkip::Everywhere
        } else {
            RuleSkip::Paths(build_globs(patterns)?)
        };
        self.rules.insert(rule.to_string(), entry);
        Ok(self)
    }

    /// Declare that skipping `companion` also skips `dependent`.
    pub fn set_companion(&mut self, dependent: &str, companion: &str) -> &mut Self {
        self.companions
            .insert(dependent.to_string(), companion.to_string());
        self
    }

    pub fn companion_of(&self, rule: &str) -> Option<&str> {
        self.companions.get(rule).map(String::as_str)
    }

    /// Direct lookup: global path skips and the rule's own directive.
    pub fn should_skip(&self, rule: &str, file_path: &Path) -> bool {
        if self.paths.is_match(file_path) {
            return true;
        }
        match self.rules.get(rule) {
            Some(RuleSkip::Everywhere) => true,
            Some(RuleSkip::Paths(globs)) => globs.is_match(file_path),
            None => false,
        }
    }

    /// `true` if some rule up `rule`'s companion chain is skipped.
    ///
    /// One-directional: the companion's own status never depends on its
    /// dependents. A cyclic chain stops at the first repeated rule.
    pub fn companion_skipped(&self, rule: &str, file_path: &Path) -> bool {
        let mut visited = HashSet::from([rule]);
        let mut current = rule;
        while let Some(companion) = self.companion_of(current) {
            if !visited.insert(companion) {
                return false;
            }
            if self.should_skip(companion, file_path) {
                return true;
            }
            current = companion;
        }
        false
    }
}

fn build_globs<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let trimmed = pattern.trim_end_matches('/');
        for candidate in [trimmed.to_string(), format!("{}/**", trimmed)] {
            let glob = Glob::new(&candidate).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
    }
    builder.build().map_err(|source| ConfigError::InvalidPattern {
        pattern: patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(", "),
        source,
    })
}
