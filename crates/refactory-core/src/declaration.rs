//! Rule-set declarations and their loader.
//!
//! A rule set is a JSON file:
//!
//! ```json
//! {
//!   "name": "legacy-upgrade",
//!   "include": ["renames.json"],
//!   "rules": [
//!     { "rule": "remove-function-call", "config": { "functions": ["dd"] } },
//!     { "rule": "rename-function", "config": { "mysql_query": "mysqli_query" } }
//!   ]
//! }
//! ```
//!
//! `include` paths are relative to the including file. Flattening yields the
//! included references first, in include order, then the file's own rules.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::DeclarationError;
use crate::rule::Params;

/// One entry of a rule set as written: a bare identifier or a configured one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleEntry {
    Bare(String),
    Configured {
        rule: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        config: Option<Params>,
    },
}

impl RuleEntry {
    pub fn identifier(&self) -> &str {
        match self {
            RuleEntry::Bare(identifier) => identifier,
            RuleEntry::Configured { rule, .. } => rule,
        }
    }

    pub fn to_reference(&self) -> RuleReference {
        match self {
            RuleEntry::Bare(identifier) => RuleReference::new(identifier),
            RuleEntry::Configured { rule, config } => RuleReference {
                identifier: rule.clone(),
                config: config.clone(),
            },
        }
    }
}

/// A declared rule set, before includes are flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetDeclaration {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

/// A rule identifier plus optional configuration parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleReference {
    pub identifier: String,
    pub config: Option<Params>,
}

impl RuleReference {
    pub fn new(identifier: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            config: None,
        }
    }

    pub fn with_config(identifier: &str, config: Params) -> Self {
        Self {
            identifier: identifier.to_string(),
            config: Some(config),
        }
    }
}

/// A rule set with all includes flattened into one ordered list.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRuleSet {
    pub name: String,
    pub references: Vec<RuleReference>,
}

/// Reads rule-set files and flattens their includes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclarationLoader;

impl DeclarationLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parse one declaration file without following includes.
    ///
    /// A missing `name` defaults to the file stem.
    pub fn load(&self, path: &Path) -> Result<RuleSetDeclaration, DeclarationError> {
        let content = fs::read_to_string(path).map_err(|source| DeclarationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut declaration: RuleSetDeclaration =
            serde_json::from_str(&content).map_err(|source| DeclarationError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if declaration.name.is_empty() {
            declaration.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(declaration)
    }

    /// Load a declaration file and flatten its includes.
    pub fn load_flattened(&self, path: &Path) -> Result<FlatRuleSet, DeclarationError> {
        let mut stack = Vec::new();
        let mut references = Vec::new();
        let name = self.flatten_file(path, &mut stack, &mut references)?;
        tracing::debug!(
            path = %path.display(),
            name = %name,
            rules = references.len(),
            "flattened rule set"
        );
        Ok(FlatRuleSet { name, references })
    }

    /// Flatten an in-memory declaration whose includes are relative to `base_dir`.
    pub fn flatten(
        &self,
        declaration: &RuleSetDeclaration,
        base_dir: &Path,
    ) -> Result<FlatRuleSet, DeclarationError> {
        let mut stack = Vec::new();
        let mut references = Vec::new();
        self.flatten_declaration(declaration, base_dir, &mut stack, &mut references)?;
        Ok(FlatRuleSet {
            name: declaration.name.clone(),
            references,
        })
    }

    fn flatten_file(
        &self,
        path: &Path,
        stack: &mut Vec<PathBuf>,
        out: &mut Vec<RuleReference>,
    ) -> Result<String, DeclarationError> {
        let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        if stack.contains(&key) {
            return Err(DeclarationError::IncludeCycle {
                path: path.to_path_buf(),
            });
        }

        let declaration = self.load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        stack.push(key);
        self.flatten_declaration(&declaration, base_dir, stack, out)?;
        stack.pop();

        Ok(declaration.name)
    }

    fn flatten_declaration(
        &self,
        declaration: &RuleSetDeclaration,
        base_dir: &Path,
        stack: &mut Vec<PathBuf>,
        out: &mut Vec<RuleReference>,
    ) -> Result<(), DeclarationError> {
        for include in &declaration.include {
            self.flatten_file(&base_dir.join(include), stack, out)?;
        }
        out.extend(declaration.rules.iter().map(RuleEntry::to_reference));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, value.to_string()).unwrap();
        path
    }

    #[test]
    fn test_entry_forms() {
        let entries: Vec<RuleEntry> = serde_json::from_value(json!([
            "remove-function-call",
            { "rule": "rename-class", "config": { "A": "B" } },
            { "rule": "rename-function" }
        ]))
        .unwrap();

        assert_eq!(entries[0].to_reference(), RuleReference::new("remove-function-call"));
        let configured = entries[1].to_reference();
        assert_eq!(configured.identifier, "rename-class");
        assert_eq!(configured.config.unwrap()["A"], json!("B"));
        assert_eq!(entries[2].identifier(), "rename-function");
        assert_eq!(entries[2].to_reference().config, None);
    }

    #[test]
    fn test_includes_come_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "base.json", json!({ "name": "base", "rules": ["a", "b"] }));
        let top = write(
            dir.path(),
            "top.json",
            json!({ "name": "top", "include": ["base.json"], "rules": ["c"] }),
        );

        let flat = DeclarationLoader::new().load_flattened(&top).unwrap();
        assert_eq!(flat.name, "top");
        let ids: Vec<_> = flat.references.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_missing_name_defaults_to_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "cleanup.json", json!({ "rules": [] }));
        assert_eq!(DeclarationLoader::new().load(&path).unwrap().name, "cleanup");
    }

    #[test]
    fn test_include_cycle_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", json!({ "include": ["b.json"] }));
        let b = write(dir.path(), "b.json", json!({ "include": ["a.json"] }));

        let err = DeclarationLoader::new().load_flattened(&b).unwrap_err();
        assert!(matches!(err, DeclarationError::IncludeCycle { .. }));
    }

    #[test]
    fn test_diamond_includes_are_not_cycles() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "shared.json", json!({ "rules": ["shared"] }));
        write(dir.path(), "left.json", json!({ "include": ["shared.json"] }));
        write(dir.path(), "right.json", json!({ "include": ["shared.json"] }));
        let top = write(
            dir.path(),
            "top.json",
            json!({ "include": ["left.json", "right.json"] }),
        );

        let flat = DeclarationLoader::new().load_flattened(&top).unwrap();
        assert_eq!(flat.references.len(), 2);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "typo.json", json!({ "rulez": ["a"] }));
        let err = DeclarationLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, DeclarationError::Json { .. }));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = DeclarationLoader::new()
            .load(Path::new("/definitely/not/here.json"))
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
