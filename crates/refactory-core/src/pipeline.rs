//! The post-pass pipeline: which post passes run, and in what order.
//!
//! The order is fixed; feature flags only decide membership:
//!
//! 1. `class-renaming` (always)
//! 2. `name-importing` if `auto-import-names`
//! 3. `docblock-name-importing` if `auto-import-docblock-names`
//! 4. `use-adding` (always)
//! 5. `unused-import-removing` if `remove-unused-imports`

use std::sync::{Arc, OnceLock};

use crate::config::FeatureFlags;
use crate::post::PostPasses;
use crate::rule::Rule;

/// Build the ordered post-pass list for a flag snapshot.
pub fn build_enabled_passes(flags: &FeatureFlags, passes: &PostPasses) -> Vec<Arc<dyn Rule>> {
    let mut enabled = vec![Arc::clone(&passes.class_renaming)];
    if flags.auto_import_names() {
        enabled.push(Arc::clone(&passes.name_importing));
    }
    if flags.auto_import_docblock_names() {
        enabled.push(Arc::clone(&passes.docblock_name_importing));
    }
    enabled.push(Arc::clone(&passes.use_adding));
    if flags.remove_unused_imports() {
        enabled.push(Arc::clone(&passes.unused_import_removing));
    }
    enabled
}

/// Lazily built, cached post-pass list.
///
/// The list is computed from the flags on the first call to
/// [`enabled_passes`](Self::enabled_passes) and reused afterwards. Changing
/// flags with [`set_flags`](Self::set_flags) does not touch the cache until
/// [`reset`](Self::reset) is called.
#[derive(Debug)]
pub struct PassPipeline {
    flags: FeatureFlags,
    passes: PostPasses,
    enabled: OnceLock<Vec<Arc<dyn Rule>>>,
}

impl Default for PassPipeline {
    fn default() -> Self {
        Self::new(FeatureFlags::default())
    }
}

impl PassPipeline {
    pub fn new(flags: FeatureFlags) -> Self {
        Self::with_passes(flags, PostPasses::default())
    }

    pub fn with_passes(flags: FeatureFlags, passes: PostPasses) -> Self {
        Self {
            flags,
            passes,
            enabled: OnceLock::new(),
        }
    }

    pub fn flags(&self) -> &FeatureFlags {
        &self.flags
    }

    /// The enabled post passes, in execution order.
    pub fn enabled_passes(&self) -> &[Arc<dyn Rule>] {
        self.enabled.get_or_init(|| {
            let enabled = build_enabled_passes(&self.flags, &self.passes);
            tracing::debug!(
                passes = ?enabled.iter().map(|p| p.id()).collect::<Vec<_>>(),
                "built post-pass pipeline"
            );
            enabled
        })
    }

    /// Whether the list has been built since construction or the last reset.
    pub fn is_cached(&self) -> bool {
        self.enabled.get().is_some()
    }

    /// Drop the cached list; the next query rebuilds it from the current flags.
    pub fn reset(&mut self) {
        self.enabled.take();
    }

    /// Replace the flags. The cached list, if any, is left as is.
    pub fn set_flags(&mut self, flags: FeatureFlags) {
        self.flags = flags;
    }

    /// Replace the flags and rebuild the list from them.
    pub fn rebuild(&mut self, flags: FeatureFlags) -> &[Arc<dyn Rule>] {
        self.set_flags(flags);
        self.reset();
        self.enabled_passes()
    }
}
