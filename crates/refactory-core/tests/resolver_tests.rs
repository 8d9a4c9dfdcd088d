//! Integration tests for rule-set resolution: bundled sets, configuration,
//! contract validation and declaration files.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use refactory_core::declaration::RuleReference;
use refactory_core::post::{UNUSED_IMPORT_REMOVING, USE_ADDING};
use refactory_core::rules::{
    PSR4_AUTOLOAD_MATCHER, REMOVE_FUNCTION_CALL, RENAME_CLASS, RENAME_FUNCTION,
};
use refactory_core::{
    set_list, ErrorCode, Expr, FileContext, Instance, Name, PassError, Program, ResolveError, Rule,
    RuleRegistry, RuleSetResolver, Service, Stmt,
};
use serde_json::json;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/sets")
        .join(name)
}

fn write_set(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    path
}

// ── Bundled sets ────────────────────────────────────────────────────────────

#[test]
fn test_legacy_upgrade_set_resolves_ten_rules() {
    let registry = RuleRegistry::with_default_rules();
    let rules = RuleSetResolver::new(&registry)
        .resolve_from_declaration(Path::new(set_list::LEGACY_UPGRADE))
        .expect("bundled set should resolve");

    assert_eq!(rules.len(), 10);
    let ids: Vec<_> = rules.iter().map(|r| r.id()).collect();
    assert_eq!(
        ids,
        vec![
            "rename-function",
            "remove-function-call",
            "rename-function",
            "rename-class",
            "rename-class",
            "rename-namespace",
            "rename-namespace",
            "remove-function-call",
            "remove-function-call",
            "rename-class",
        ]
    );
}

#[test]
fn test_post_pass_in_a_set_violates_contract() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_set(
        dir.path(),
        "post.json",
        json!({ "rules": ["rename-class", "unused-import-removing"] }),
    );

    let registry = RuleRegistry::with_default_rules();
    let err = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&path)
        .err()
        .expect("post passes must not resolve as main rules");
    assert_eq!(err.error_code(), ErrorCode::ContractViolation);
    assert_eq!(err.identifier(), Some(UNUSED_IMPORT_REMOVING));
}

#[test]
fn test_every_bundled_set_resolves() {
    let registry = RuleRegistry::with_default_rules();
    let resolver = RuleSetResolver::new(&registry);
    for (name, path) in set_list::ALL {
        let rules = resolver
            .resolve_from_declaration(Path::new(path))
            .unwrap_or_else(|e| panic!("set {name} failed: {e}"));
        assert!(!rules.is_empty(), "set {name} is empty");
    }
}

// ── Resolution errors ───────────────────────────────────────────────────────

#[test]
fn test_unknown_identifier_yields_no_rules() {
    let registry = RuleRegistry::with_default_rules();
    let result = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&fixture("unknown_rule.json"));

    let err = result.err().expect("unknown identifier must fail");
    assert!(err.is_resolution_error());
    assert_eq!(err.error_code(), ErrorCode::UnknownRule);
    assert_eq!(err.identifier(), Some("no-such-rule"));
}

#[test]
fn test_service_reference_violates_contract() {
    let registry = RuleRegistry::with_default_rules();
    let err = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&fixture("service_reference.json"))
        .err()
        .expect("service must not resolve as a rule");

    assert_eq!(err.error_code(), ErrorCode::ContractViolation);
    assert_eq!(err.identifier(), Some(PSR4_AUTOLOAD_MATCHER));
    assert!(!err.is_resolution_error());
}

#[test]
fn test_configuration_on_plain_rule_is_rejected() {
    let registry = RuleRegistry::with_default_rules();
    let reference = RuleReference::with_config(
        USE_ADDING,
        json!({ "sorted": true }).as_object().cloned().unwrap(),
    );
    let err = RuleSetResolver::new(&registry)
        .resolve(&[reference])
        .err()
        .unwrap();
    assert_eq!(err.error_code(), ErrorCode::NotConfigurable);
}

#[test]
fn test_invalid_configuration_reports_reason() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_set(
        dir.path(),
        "bad.json",
        json!({ "rules": [{ "rule": "remove-function-call", "config": { "functions": "dd" } }] }),
    );

    let registry = RuleRegistry::with_default_rules();
    let err = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&path)
        .err()
        .unwrap();
    match &err {
        ResolveError::InvalidConfiguration { identifier, reason } => {
            assert_eq!(identifier, "remove-function-call");
            assert!(reason.contains("must be an array"), "reason: {reason}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_json()["code"], json!("invalid_configuration"));
}

#[test]
fn test_malformed_declaration_is_a_declaration_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"rules\": [").unwrap();

    let registry = RuleRegistry::with_default_rules();
    let err = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&path)
        .err()
        .unwrap();
    assert_eq!(err.error_code(), ErrorCode::DeclarationError);
    assert_eq!(err.identifier(), None);
}

// ── Configuration is applied ────────────────────────────────────────────────

#[test]
fn test_configured_rule_behaves_as_configured() {
    let registry = RuleRegistry::with_default_rules();
    let rules = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&fixture("configured.json"))
        .unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].id(), RENAME_FUNCTION);

    let program = Program::new(vec![Stmt::Expr {
        expr: Expr::Call {
            function: Name::new("mysql_query"),
            args: vec![],
        },
    }]);
    let mut ctx = FileContext::new("src/db.php");
    assert!(rules[0].should_traverse(&program, &ctx));
    let result = rules[0].apply(program, &mut ctx).unwrap();
    assert_eq!(
        result,
        Program::new(vec![Stmt::Expr {
            expr: Expr::Call {
                function: Name::new("mysqli_query"),
                args: vec![],
            },
        }])
    );
}

#[test]
fn test_each_reference_gets_a_fresh_instance() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_set(
        dir.path(),
        "twice.json",
        json!({ "rules": [
            { "rule": "rename-class", "config": { "A": "B" } },
            "rename-class"
        ] }),
    );

    let registry = RuleRegistry::with_default_rules();
    let rules = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&path)
        .unwrap();

    let program = Program::new(vec![Stmt::Expr {
        expr: Expr::New {
            class: Name::new("\\A"),
            args: vec![],
        },
    }]);
    let mut ctx = FileContext::new("a.php");
    assert!(rules[0].should_traverse(&program, &ctx));
    assert!(
        !rules[1].should_traverse(&program, &ctx),
        "second reference must not share the first one's configuration"
    );
    rules[0].apply(program, &mut ctx).unwrap();
    assert_eq!(ctx.renamed_class("A"), Some("B"));
}

#[test]
fn test_psr4_configuration_reaches_the_matcher() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_set(
        dir.path(),
        "psr4.json",
        json!({ "rules": [
            { "rule": "normalize-namespace-by-psr4", "config": { "App\\": "src/" } }
        ] }),
    );

    let registry = RuleRegistry::with_default_rules();
    let rules = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&path)
        .unwrap();

    let mut ctx = FileContext::new("src/Mail/Sender.php");
    let program = Program::new(vec![Stmt::Namespace {
        name: Some("Wrong".to_string()),
        stmts: vec![],
    }]);
    let result = rules[0].apply(program, &mut ctx).unwrap();
    assert_eq!(
        result,
        Program::new(vec![Stmt::Namespace {
            name: Some("App\\Mail".to_string()),
            stmts: vec![],
        }])
    );
}

// ── Includes ────────────────────────────────────────────────────────────────

#[test]
fn test_included_rules_come_first() {
    let registry = RuleRegistry::with_default_rules();
    let rules = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&fixture("with_include.json"))
        .unwrap();
    let ids: Vec<_> = rules.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![RENAME_FUNCTION, REMOVE_FUNCTION_CALL, RENAME_CLASS]);
}

#[test]
fn test_include_cycle_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_set(dir.path(), "a.json", json!({ "include": ["b.json"], "rules": ["rename-class"] }));
    let b = write_set(dir.path(), "b.json", json!({ "include": ["a.json"] }));

    let registry = RuleRegistry::with_default_rules();
    let err = RuleSetResolver::new(&registry)
        .resolve_from_declaration(&b)
        .err()
        .unwrap();
    assert_eq!(err.error_code(), ErrorCode::DeclarationError);
    assert!(err.to_string().contains("includes itself"));
}

// ── Dynamic registration ────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct NoopRule;

impl Rule for NoopRule {
    fn id(&self) -> &'static str {
        "noop"
    }

    fn apply(&self, program: Program, _ctx: &mut FileContext) -> Result<Program, PassError> {
        Ok(program)
    }
}

#[derive(Debug, Default)]
struct Collector;

impl Service for Collector {
    fn id(&self) -> &'static str {
        "collector"
    }
}

#[test]
fn test_dynamically_registered_components() {
    let mut registry = RuleRegistry::new();
    registry
        .register_rule::<NoopRule>()
        .register("collector", || Instance::Service(Box::new(Collector)));
    let resolver = RuleSetResolver::new(&registry);

    let rules = resolver
        .resolve(&[RuleReference::new("noop")])
        .unwrap();
    assert_eq!(rules[0].id(), "noop");

    let err = resolver
        .resolve(&[RuleReference::new("collector")])
        .err()
        .unwrap();
    assert!(matches!(err, ResolveError::ContractViolation { .. }));

    let err = resolver
        .resolve(&[RuleReference::new(RENAME_CLASS)])
        .err()
        .unwrap();
    assert!(matches!(err, ResolveError::UnknownRule { .. }));
}
