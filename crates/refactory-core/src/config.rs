//! Project configuration: feature flags, skip directives and rule sets.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::declaration::{RuleEntry, RuleSetDeclaration};
use crate::error::ConfigError;

/// Named boolean options consulted when building the post-pass list.
///
/// Absent options are `false`. Serializes as a plain `{"name": bool}` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureFlags(BTreeMap<String, bool>);

impl FeatureFlags {
    /// Shorten fully qualified class names and import them.
    pub const AUTO_IMPORT_NAMES: &'static str = "auto-import-names";
    /// Same as [`Self::AUTO_IMPORT_NAMES`], inside docblocks.
    pub const AUTO_IMPORT_DOCBLOCK_NAMES: &'static str = "auto-import-docblock-names";
    /// Drop `use` imports nothing refers to.
    pub const REMOVE_UNUSED_IMPORTS: &'static str = "remove-unused-imports";

    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: &str, enabled: bool) -> Self {
        self.set(name, enabled);
        self
    }

    pub fn set(&mut self, name: &str, enabled: bool) {
        self.0.insert(name.to_string(), enabled);
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn auto_import_names(&self) -> bool {
        self.is_enabled(Self::AUTO_IMPORT_NAMES)
    }

    pub fn auto_import_docblock_names(&self) -> bool {
        self.is_enabled(Self::AUTO_IMPORT_DOCBLOCK_NAMES)
    }

    pub fn remove_unused_imports(&self) -> bool {
        self.is_enabled(Self::REMOVE_UNUSED_IMPORTS)
    }
}

/// Skip directives as written in the configuration file.
///
/// ```json
/// {
///   "paths": ["vendor/*"],
///   "rules": { "rename-class": ["src/Legacy/*"], "name-importing": [] },
///   "companions": { "class-renaming": "rename-class" }
/// }
/// ```
///
/// An empty pattern list skips the rule for every file. Companions are added
/// on top of the built-in table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SkipConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rules: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub companions: BTreeMap<String, String>,
}

/// A project configuration file.
///
/// ## Serialization Format
///
/// Fields are `kebab-case`. `sets` are rule-set declaration files, relative
/// to the configuration file; `rules` are inline entries resolved after the
/// sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    #[serde(default)]
    pub options: FeatureFlags,
    #[serde(default)]
    pub skip: SkipConfig,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleEntry>,
}

impl ProjectConfig {
    /// Load a configuration file, anchoring `sets` at its directory.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ProjectConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for set in &mut config.sets {
            *set = base.join(&*set);
        }
        tracing::debug!(
            path = %path.display(),
            sets = config.sets.len(),
            rules = config.rules.len(),
            "loaded project configuration"
        );
        Ok(config)
    }

    /// The configured rules as one declaration: all sets, then inline rules.
    pub fn declaration(&self) -> RuleSetDeclaration {
        RuleSetDeclaration {
            name: "project".to_string(),
            include: self.sets.clone(),
            rules: self.rules.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_absent_flags_default_to_false() {
        let flags = FeatureFlags::new();
        assert!(!flags.auto_import_names());
        assert!(!flags.auto_import_docblock_names());
        assert!(!flags.remove_unused_imports());
        assert!(!flags.is_enabled("unknown-option"));
    }

    #[test]
    fn test_flags_serde_round_trip() {
        let flags = FeatureFlags::new()
            .with(FeatureFlags::AUTO_IMPORT_NAMES, true)
            .with(FeatureFlags::REMOVE_UNUSED_IMPORTS, false);

        let json = serde_json::to_string(&flags).unwrap();
        assert!(json.contains("\"auto-import-names\":true"));

        let back: FeatureFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
        assert!(back.auto_import_names());
        assert!(!back.remove_unused_imports());
    }

    #[test]
    fn test_project_config_kebab_case() {
        let config: ProjectConfig = serde_json::from_str(
            r#"{
                "options": { "auto-import-names": true },
                "skip": {
                    "paths": ["vendor/*"],
                    "rules": { "rename-class": ["src/Legacy/*"] }
                },
                "rules": ["remove-function-call", { "rule": "rename-class", "config": { "A": "B" } }]
            }"#,
        )
        .unwrap();

        assert!(config.options.auto_import_names());
        assert_eq!(config.skip.paths, vec!["vendor/*".to_string()]);
        assert_eq!(config.rules.len(), 2);
        assert!(config.sets.is_empty());
    }

    #[test]
    fn test_from_path_anchors_sets_at_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refactory.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{ "sets": ["sets/cleanup.json"] }}"#).unwrap();

        let config = ProjectConfig::from_path(&path).unwrap();
        assert_eq!(config.sets, vec![dir.path().join("sets/cleanup.json")]);

        let declaration = config.declaration();
        assert_eq!(declaration.name, "project");
        assert_eq!(declaration.include, config.sets);
    }

    #[test]
    fn test_from_path_reports_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refactory.json");
        fs::write(&path, "{ not json").unwrap();

        let err = ProjectConfig::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }
}
