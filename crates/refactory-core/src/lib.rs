//! # refactory-core
//!
//! Rule-set resolution and ordered post-processing for source-to-source
//! refactoring.
//!
//! A run over one file has two halves:
//!
//! 1. **Main rules**, resolved from rule-set declarations by
//!    [`RuleSetResolver`] against a [`RuleRegistry`].
//! 2. **Post passes**, chosen from [`FeatureFlags`] by [`PassPipeline`] and
//!    applied by [`PipelineRunner`] under a [`SkipPolicy`].
//!
//! [`FileProcessor`] chains both over a shared [`FileContext`].
//!
//! ```no_run
//! use std::path::Path;
//! use refactory_core::{
//!     set_list, FeatureFlags, FileProcessor, PassPipeline, PipelineRunner, Program,
//!     RuleRegistry, RuleSetResolver, SkipPolicy,
//! };
//!
//! let registry = RuleRegistry::with_default_rules();
//! let rules = RuleSetResolver::new(&registry)
//!     .resolve_from_declaration(Path::new(set_list::LEGACY_UPGRADE))
//!     .unwrap();
//!
//! let pipeline = PassPipeline::new(FeatureFlags::new().with(FeatureFlags::AUTO_IMPORT_NAMES, true));
//! let skip = SkipPolicy::default();
//! let runner = PipelineRunner::new(&pipeline, &skip);
//!
//! let result = FileProcessor::new(&rules, &runner, &skip)
//!     .process(Program::default(), Path::new("src/Kernel.php"))
//!     .unwrap();
//! println!("{:?}", result.applied);
//! ```

pub mod ast;
pub mod config;
pub mod context;
pub mod declaration;
pub mod error;
pub mod pipeline;
pub mod post;
pub mod processor;
pub mod registry;
pub mod resolver;
pub mod rule;
pub mod rules;
pub mod runner;
pub mod set_list;
pub mod skip;
pub mod visit;

pub use ast::{Expr, Name, Program, Stmt};
pub use config::{FeatureFlags, ProjectConfig, SkipConfig};
pub use context::FileContext;
pub use declaration::{DeclarationLoader, RuleEntry, RuleReference, RuleSetDeclaration};
pub use error::{ConfigError, ConfigureError, DeclarationError, ErrorCode, PassError, ResolveError};
pub use pipeline::{build_enabled_passes, PassPipeline};
pub use post::PostPasses;
pub use processor::{FileProcessor, ProcessResult};
pub use registry::{Instance, RuleRegistry, Service};
pub use resolver::{ResolvedRule, RuleSetResolver};
pub use rule::{Configurable, Params, Rule};
pub use runner::PipelineRunner;
pub use skip::SkipPolicy;
