//! PSR-4 autoload matching: which namespace a file's path implies.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::ConfigureError;
use crate::registry::Service;
use crate::rule::{string_map, Configurable, Params};
use crate::rules::PSR4_AUTOLOAD_MATCHER;

/// Computes the namespace a file is expected to declare.
pub trait NamespaceMatcher: Send + Sync + fmt::Debug {
    fn expected_namespace(&self, file_path: &Path) -> Option<String>;
}

/// Matches file paths against PSR-4 prefixes: `{"App\\": "src/"}` maps
/// `src/Http/Kernel.php` to `App\Http`.
///
/// Registered as a service, not a rule: naming it in a rule set is a
/// contract violation.
#[derive(Debug, Default, Clone)]
pub struct Psr4AutoloadMatcher {
    /// (namespace prefix, directory), longest directory first.
    prefixes: Vec<(String, PathBuf)>,
}

impl Psr4AutoloadMatcher {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut matcher = Self::default();
        for (namespace, directory) in prefixes {
            matcher.add_prefix(namespace.as_ref(), directory.as_ref());
        }
        matcher
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    fn add_prefix(&mut self, namespace: &str, directory: &str) {
        let namespace = namespace.trim_matches('\\').to_string();
        let directory = PathBuf::from(directory.trim_end_matches('/'));
        self.prefixes.push((namespace, directory));
        self.prefixes
            .sort_by(|a, b| b.1.components().count().cmp(&a.1.components().count()));
    }
}

impl NamespaceMatcher for Psr4AutoloadMatcher {
    fn expected_namespace(&self, file_path: &Path) -> Option<String> {
        let (namespace, relative) = self.prefixes.iter().find_map(|(namespace, directory)| {
            file_path
                .strip_prefix(directory)
                .ok()
                .map(|relative| (namespace, relative))
        })?;

        let mut segments: Vec<&str> = Vec::new();
        if !namespace.is_empty() {
            segments.push(namespace);
        }
        if let Some(parent) = relative.parent() {
            for component in parent.components() {
                match component {
                    Component::Normal(segment) => segments.push(segment.to_str()?),
                    _ => return None,
                }
            }
        }
        Some(segments.join("\\"))
    }
}

impl Service for Psr4AutoloadMatcher {
    fn id(&self) -> &'static str {
        PSR4_AUTOLOAD_MATCHER
    }

    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

impl Configurable for Psr4AutoloadMatcher {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigureError> {
        for (namespace, directory) in string_map(params)? {
            self.add_prefix(&namespace, &directory);
        }
        Ok(())
    }
}
