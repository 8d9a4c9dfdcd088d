//! Per-file state shared by the rules and post passes of one run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::ast::short_name;

/// Mutable state of a single file's run.
///
/// Main rules record what they did here (renamed classes); post passes read
/// it and queue follow-up work (imports to add). A context is created per
/// run and never shared between files.
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    file_path: PathBuf,
    /// Old fully qualified class name → new one (no leading `\`).
    renamed_classes: BTreeMap<String, String>,
    /// Namespace key (`""` for global code) → classes to import.
    pending_imports: BTreeMap<String, BTreeSet<String>>,
}

impl FileContext {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn record_renamed_class(&mut self, old: &str, new: &str) {
        self.renamed_classes.insert(
            old.trim_start_matches('\\').to_string(),
            new.trim_start_matches('\\').to_string(),
        );
    }

    pub fn renamed_classes(&self) -> &BTreeMap<String, String> {
        &self.renamed_classes
    }

    pub fn renamed_class(&self, old: &str) -> Option<&str> {
        self.renamed_classes.get(old).map(String::as_str)
    }

    /// Queue `fqn` for import into the body keyed by `namespace`.
    ///
    /// Returns `false` if the import was already queued.
    pub fn queue_import(&mut self, namespace: &str, fqn: &str) -> bool {
        self.pending_imports
            .entry(namespace.to_string())
            .or_default()
            .insert(fqn.trim_start_matches('\\').to_string())
    }

    /// A queued import for `namespace` binding the short name `short`.
    pub fn queued_import_for_short(&self, namespace: &str, short: &str) -> Option<&str> {
        self.pending_imports
            .get(namespace)?
            .iter()
            .map(String::as_str)
            .find(|fqn| short_name(fqn) == short)
    }

    pub fn has_pending_imports(&self) -> bool {
        self.pending_imports.values().any(|set| !set.is_empty())
    }

    /// Remove and return the imports queued for `namespace`, sorted.
    pub fn take_pending_imports(&mut self, namespace: &str) -> BTreeSet<String> {
        self.pending_imports.remove(namespace).unwrap_or_default()
    }
}
