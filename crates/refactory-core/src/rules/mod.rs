//! Built-in main rules and services.
//!
//! Main rules are named in rule-set declarations and run before the post
//! passes. `psr4-autoload-matcher` is a service, not a rule.

pub mod normalize_namespace;
pub mod psr4;
pub mod remove_function_call;
pub mod rename_class;
pub mod rename_function;
pub mod rename_namespace;

pub use normalize_namespace::NormalizeNamespaceByPsr4Rule;
pub use psr4::{NamespaceMatcher, Psr4AutoloadMatcher};
pub use remove_function_call::RemoveFunctionCallRule;
pub use rename_class::RenameClassRule;
pub use rename_function::RenameFunctionRule;
pub use rename_namespace::RenameNamespaceRule;

pub const RENAME_CLASS: &str = "rename-class";
pub const RENAME_FUNCTION: &str = "rename-function";
pub const RENAME_NAMESPACE: &str = "rename-namespace";
pub const REMOVE_FUNCTION_CALL: &str = "remove-function-call";
pub const NORMALIZE_NAMESPACE_BY_PSR4: &str = "normalize-namespace-by-psr4";
pub const PSR4_AUTOLOAD_MATCHER: &str = "psr4-autoload-matcher";
