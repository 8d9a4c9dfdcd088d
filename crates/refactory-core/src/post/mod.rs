//! Post passes.
//!
//! Post passes run after the main rules of a file, in a fixed order chosen
//! by [`crate::pipeline`]. Each pass assumes the output of the previous ones:
//! imports are queued by the importing passes, added by `use-adding`, and
//! only then pruned by `unused-import-removing`.
//! Shared helpers live in `docblock` and `imports`.

pub(crate) mod docblock;
pub(crate) mod imports;

pub mod class_renaming;
pub mod docblock_name_importing;
pub mod name_importing;
pub mod unused_import_removing;
pub mod use_adding;

use std::sync::Arc;

use crate::rule::Rule;

pub use class_renaming::ClassRenamingPostPass;
pub use docblock_name_importing::DocblockNameImportingPostPass;
pub use name_importing::NameImportingPostPass;
pub use unused_import_removing::UnusedImportRemovingPostPass;
pub use use_adding::UseAddingPostPass;

pub const CLASS_RENAMING: &str = "class-renaming";
pub const NAME_IMPORTING: &str = "name-importing";
pub const DOCBLOCK_NAME_IMPORTING: &str = "docblock-name-importing";
pub const USE_ADDING: &str = "use-adding";
pub const UNUSED_IMPORT_REMOVING: &str = "unused-import-removing";

/// The post-pass singletons a pipeline picks from.
///
/// Tests swap individual passes for instrumented ones.
#[derive(Debug, Clone)]
pub struct PostPasses {
    pub class_renaming: Arc<dyn Rule>,
    pub name_importing: Arc<dyn Rule>,
    pub docblock_name_importing: Arc<dyn Rule>,
    pub use_adding: Arc<dyn Rule>,
    pub unused_import_removing: Arc<dyn Rule>,
}

impl Default for PostPasses {
    fn default() -> Self {
        Self {
            class_renaming: Arc::new(ClassRenamingPostPass),
            name_importing: Arc::new(NameImportingPostPass),
            docblock_name_importing: Arc::new(DocblockNameImportingPostPass),
            use_adding: Arc::new(UseAddingPostPass),
            unused_import_removing: Arc::new(UnusedImportRemovingPostPass),
        }
    }
}
