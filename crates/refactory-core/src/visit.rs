//! Shared tree traversal.
//!
//! Rules never walk the tree by hand; they hand a closure to one of the
//! walkers here and receive every class/function reference, docblock or
//! statement list together with the [`Scope`] it lives in.
//!
//! A *body* is the root statement list or the statement list of one
//! `namespace` block. Imports and declared classes are collected per body,
//! which is also the granularity at which `use` statements are added and
//! removed.
//!
//! ## Cross-Reference
//!
//! `walk_names_mut` and `for_each_name` must visit the same positions. When
//! adding a new name-bearing node to `ast.rs`, update both.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{Expr, Name, Program, Stmt};

/// What a visited name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Class,
    Function,
}

/// Name-resolution context of one body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    namespace: Option<String>,
    /// Local alias → fully qualified name (without leading `\`).
    imports: BTreeMap<String, String>,
    /// Short names of classes declared in the body.
    declared: BTreeSet<String>,
}

impl Scope {
    /// Collect the imports and class declarations of a body.
    pub fn for_body(namespace: Option<&str>, stmts: &[Stmt]) -> Self {
        let mut scope = Scope {
            namespace: namespace
                .filter(|ns| !ns.is_empty())
                .map(|ns| ns.trim_start_matches('\\').to_string()),
            ..Default::default()
        };
        for stmt in stmts {
            match stmt {
                Stmt::Use(import) => {
                    scope
                        .imports
                        .insert(import.local_name().to_string(), import.name.clone());
                }
                Stmt::Class(class) => {
                    scope.declared.insert(class.name.clone());
                }
                _ => {}
            }
        }
        scope
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Key under which imports for this body are queued (`""` for global code).
    pub fn namespace_key(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// Fully qualified name bound to a local alias.
    pub fn imported(&self, local: &str) -> Option<&str> {
        self.imports.get(local).map(String::as_str)
    }

    /// `true` if some `use` in this body already imports `fqn`.
    pub fn imports_class(&self, fqn: &str) -> bool {
        self.imports.values().any(|imported| imported == fqn)
    }

    pub fn declares(&self, short: &str) -> bool {
        self.declared.contains(short)
    }

    /// Prefix a relative name with the body's namespace.
    pub fn qualify(&self, relative: &str) -> String {
        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, relative),
            None => relative.to_string(),
        }
    }

    /// Resolve a name to its fully qualified form (without leading `\`).
    ///
    /// Class names and qualified function names go through the imports
    /// first, then the namespace. Unqualified function names fall back to
    /// the global function.
    pub fn resolve(&self, name: &Name, kind: NameKind) -> String {
        if name.is_fully_qualified() {
            return name.unqualified().to_string();
        }
        let raw = name.as_str();
        if kind == NameKind::Function && !name.is_qualified() {
            return raw.to_string();
        }
        let first = name.first_segment();
        match self.imports.get(first) {
            Some(target) => format!("{}{}", target, &raw[first.len()..]),
            None => self.qualify(raw),
        }
    }
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// Call `f` for the root body and then for every top-level namespace block.
///
/// The root body still contains the `namespace` statements themselves;
/// callbacks must leave them alone.
pub fn for_each_body_mut<F>(program: &mut Program, f: &mut F)
where
    F: FnMut(&mut Vec<Stmt>, Option<&str>),
{
    f(&mut program.stmts, None);
    for stmt in &mut program.stmts {
        if let Stmt::Namespace { name, stmts } = stmt {
            f(stmts, name.as_deref());
        }
    }
}

pub fn for_each_body<F>(program: &Program, f: &mut F)
where
    F: FnMut(&[Stmt], Option<&str>),
{
    f(&program.stmts, None);
    for stmt in &program.stmts {
        if let Stmt::Namespace { name, stmts } = stmt {
            f(stmts, name.as_deref());
        }
    }
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

/// Visit every class and function reference, allowing in-place rewrites.
///
/// `use` statements are declarations, not references, and are not visited.
/// Builtin types (`string`, `self`, ...) are skipped.
pub fn walk_names_mut<F>(program: &mut Program, f: &mut F)
where
    F: FnMut(&mut Name, NameKind, &Scope),
{
    for_each_body_mut(program, &mut |stmts, namespace| {
        let scope = Scope::for_body(namespace, stmts);
        for stmt in stmts.iter_mut() {
            stmt_names_mut(stmt, &scope, f);
        }
    });
}

fn stmt_names_mut<F>(stmt: &mut Stmt, scope: &Scope, f: &mut F)
where
    F: FnMut(&mut Name, NameKind, &Scope),
{
    match stmt {
        Stmt::Namespace { .. } | Stmt::Use(_) => {}
        Stmt::Class(class) => {
            if let Some(parent) = &mut class.extends {
                class_name_mut(parent, scope, f);
            }
            for interface in &mut class.implements {
                class_name_mut(interface, scope, f);
            }
            for child in &mut class.body {
                stmt_names_mut(child, scope, f);
            }
        }
        Stmt::Function(function) => {
            for ty in function.params.iter_mut().filter_map(|p| p.ty.as_mut()) {
                class_name_mut(ty, scope, f);
            }
            if let Some(returns) = &mut function.returns {
                class_name_mut(returns, scope, f);
            }
            for child in &mut function.body {
                stmt_names_mut(child, scope, f);
            }
        }
        Stmt::Expr { expr } => expr_names_mut(expr, scope, f),
        Stmt::Return { expr } => {
            if let Some(expr) = expr {
                expr_names_mut(expr, scope, f);
            }
        }
    }
}

fn expr_names_mut<F>(expr: &mut Expr, scope: &Scope, f: &mut F)
where
    F: FnMut(&mut Name, NameKind, &Scope),
{
    match expr {
        Expr::New { class, args } | Expr::StaticCall { class, args, .. } => {
            class_name_mut(class, scope, f);
            for arg in args {
                expr_names_mut(arg, scope, f);
            }
        }
        Expr::Call { function, args } => {
            f(function, NameKind::Function, scope);
            for arg in args {
                expr_names_mut(arg, scope, f);
            }
        }
        Expr::ClassConst { class, .. } => class_name_mut(class, scope, f),
        Expr::Instanceof { expr, class } => {
            expr_names_mut(expr, scope, f);
            class_name_mut(class, scope, f);
        }
        Expr::Variable { .. } | Expr::String { .. } | Expr::Int { .. } => {}
    }
}

fn class_name_mut<F>(name: &mut Name, scope: &Scope, f: &mut F)
where
    F: FnMut(&mut Name, NameKind, &Scope),
{
    if !name.is_builtin_type() {
        f(name, NameKind::Class, scope);
    }
}

/// Read-only counterpart of [`walk_names_mut`].
pub fn for_each_name<F>(program: &Program, f: &mut F)
where
    F: FnMut(&Name, NameKind, &Scope),
{
    for_each_body(program, &mut |stmts, namespace| {
        let scope = Scope::for_body(namespace, stmts);
        for stmt in stmts {
            stmt_names(stmt, &scope, f);
        }
    });
}

fn stmt_names<F>(stmt: &Stmt, scope: &Scope, f: &mut F)
where
    F: FnMut(&Name, NameKind, &Scope),
{
    match stmt {
        Stmt::Namespace { .. } | Stmt::Use(_) => {}
        Stmt::Class(class) => {
            let references = class.extends.iter().chain(&class.implements);
            for name in references.filter(|n| !n.is_builtin_type()) {
                f(name, NameKind::Class, scope);
            }
            for child in &class.body {
                stmt_names(child, scope, f);
            }
        }
        Stmt::Function(function) => {
            let types = function
                .params
                .iter()
                .filter_map(|p| p.ty.as_ref())
                .chain(&function.returns);
            for name in types.filter(|n| !n.is_builtin_type()) {
                f(name, NameKind::Class, scope);
            }
            for child in &function.body {
                stmt_names(child, scope, f);
            }
        }
        Stmt::Expr { expr } => expr_names(expr, scope, f),
        Stmt::Return { expr } => {
            if let Some(expr) = expr {
                expr_names(expr, scope, f);
            }
        }
    }
}

fn expr_names<F>(expr: &Expr, scope: &Scope, f: &mut F)
where
    F: FnMut(&Name, NameKind, &Scope),
{
    match expr {
        Expr::New { class, args } | Expr::StaticCall { class, args, .. } => {
            if !class.is_builtin_type() {
                f(class, NameKind::Class, scope);
            }
            for arg in args {
                expr_names(arg, scope, f);
            }
        }
        Expr::Call { function, args } => {
            f(function, NameKind::Function, scope);
            for arg in args {
                expr_names(arg, scope, f);
            }
        }
        Expr::ClassConst { class, .. } => {
            if !class.is_builtin_type() {
                f(class, NameKind::Class, scope);
            }
        }
        Expr::Instanceof { expr, class } => {
            expr_names(expr, scope, f);
            if !class.is_builtin_type() {
                f(class, NameKind::Class, scope);
            }
        }
        Expr::Variable { .. } | Expr::String { .. } | Expr::Int { .. } => {}
    }
}

/// `true` if any visited name satisfies `pred`. Stops reporting after the first hit.
pub fn any_name<P>(program: &Program, mut pred: P) -> bool
where
    P: FnMut(&Name, NameKind, &Scope) -> bool,
{
    let mut found = false;
    for_each_name(program, &mut |name, kind, scope| {
        if !found && pred(name, kind, scope) {
            found = true;
        }
    });
    found
}

// ---------------------------------------------------------------------------
// Docblocks
// ---------------------------------------------------------------------------

/// Visit every class and function docblock.
pub fn walk_docs_mut<F>(program: &mut Program, f: &mut F)
where
    F: FnMut(&mut String, &Scope),
{
    for_each_body_mut(program, &mut |stmts, namespace| {
        let scope = Scope::for_body(namespace, stmts);
        for stmt in stmts.iter_mut() {
            stmt_docs_mut(stmt, &scope, f);
        }
    });
}

fn stmt_docs_mut<F>(stmt: &mut Stmt, scope: &Scope, f: &mut F)
where
    F: FnMut(&mut String, &Scope),
{
    let (doc, body) = match stmt {
        Stmt::Class(class) => (&mut class.doc, &mut class.body),
        Stmt::Function(function) => (&mut function.doc, &mut function.body),
        _ => return,
    };
    if let Some(doc) = doc {
        f(doc, scope);
    }
    for child in body {
        stmt_docs_mut(child, scope, f);
    }
}

pub fn for_each_doc<F>(program: &Program, f: &mut F)
where
    F: FnMut(&str, &Scope),
{
    for_each_body(program, &mut |stmts, namespace| {
        let scope = Scope::for_body(namespace, stmts);
        for stmt in stmts {
            stmt_docs(stmt, &scope, f);
        }
    });
}

fn stmt_docs<F>(stmt: &Stmt, scope: &Scope, f: &mut F)
where
    F: FnMut(&str, &Scope),
{
    let (doc, body) = match stmt {
        Stmt::Class(class) => (&class.doc, &class.body),
        Stmt::Function(function) => (&function.doc, &function.body),
        _ => return,
    };
    if let Some(doc) = doc {
        f(doc, scope);
    }
    for child in body {
        stmt_docs(child, scope, f);
    }
}

// ---------------------------------------------------------------------------
// Statement lists
// ---------------------------------------------------------------------------

/// Visit every statement list (bodies, class bodies, function bodies) so
/// statements can be inserted or removed. Parents are visited before their
/// children.
pub fn walk_stmt_lists_mut<F>(program: &mut Program, f: &mut F)
where
    F: FnMut(&mut Vec<Stmt>, &Scope),
{
    for_each_body_mut(program, &mut |stmts, namespace| {
        let scope = Scope::for_body(namespace, stmts);
        nested_lists_mut(stmts, &scope, f);
    });
}

fn nested_lists_mut<F>(stmts: &mut Vec<Stmt>, scope: &Scope, f: &mut F)
where
    F: FnMut(&mut Vec<Stmt>, &Scope),
{
    f(stmts, scope);
    for stmt in stmts.iter_mut() {
        match stmt {
            Stmt::Class(class) => nested_lists_mut(&mut class.body, scope, f),
            Stmt::Function(function) => nested_lists_mut(&mut function.body, scope, f),
            _ => {}
        }
    }
}
