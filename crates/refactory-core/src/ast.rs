//! In-memory program tree handed to rules and post passes.
//!
//! The tree is produced by an external parser and consumed by an external
//! printer; here it only needs to be rich enough for the rules to rewrite
//! class/function references, `use` imports and docblocks. It (de)serializes
//! as JSON, internally tagged by `kind`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scalar and pseudo types that never name a class.
const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "parent", "self", "static", "string", "true", "void",
];

/// A parsed source file: an ordered sequence of top-level statements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

impl From<Vec<Stmt>> for Program {
    fn from(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

/// A class or function reference as written in source.
///
/// A leading `\` marks a fully qualified name. Segments are separated by `\`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build a fully qualified name, adding the leading `\` if missing.
    pub fn fully_qualified(name: &str) -> Self {
        Self(format!("\\{}", name.trim_start_matches('\\')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_fully_qualified(&self) -> bool {
        self.0.starts_with('\\')
    }

    /// The name without its leading `\`.
    pub fn unqualified(&self) -> &str {
        self.0.trim_start_matches('\\')
    }

    /// `true` when the name has more than one segment (`A\B`, `\A\B`).
    pub fn is_qualified(&self) -> bool {
        self.unqualified().contains('\\')
    }

    /// Last segment: `\App\Model\User` → `User`.
    pub fn short(&self) -> &str {
        short_name(self.unqualified())
    }

    /// First segment: `Model\User` → `Model`.
    pub fn first_segment(&self) -> &str {
        let unqualified = self.unqualified();
        unqualified.split('\\').next().unwrap_or(unqualified)
    }

    /// `true` for scalar/pseudo types such as `string` or `self`.
    pub fn is_builtin_type(&self) -> bool {
        !self.is_qualified()
            && BUILTIN_TYPES
                .iter()
                .any(|t| t.eq_ignore_ascii_case(self.unqualified()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Last `\`-separated segment of a class name.
pub fn short_name(name: &str) -> &str {
    name.rsplit('\\').next().unwrap_or(name)
}

/// Top-level and nested statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stmt {
    Namespace {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default)]
        stmts: Vec<Stmt>,
    },
    Use(UseImport),
    Class(ClassDecl),
    Function(FunctionDecl),
    Expr {
        expr: Expr,
    },
    Return {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expr: Option<Expr>,
    },
}

impl Stmt {
    pub fn use_import(name: &str) -> Self {
        Stmt::Use(UseImport::new(name))
    }

    pub fn as_use(&self) -> Option<&UseImport> {
        match self {
            Stmt::Use(import) => Some(import),
            _ => None,
        }
    }
}

/// `use Name\Space\Class [as Alias];`
///
/// `name` is stored without a leading `\`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UseImport {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl UseImport {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim_start_matches('\\').to_string(),
            alias: None,
        }
    }

    /// The local name this import binds.
    pub fn local_name(&self) -> &str {
        self.alias
            .as_deref()
            .unwrap_or_else(|| short_name(&self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<Name>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Name>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Name>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    New {
        class: Name,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Expr>,
    },
    Call {
        function: Name,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Expr>,
    },
    StaticCall {
        class: Name,
        method: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<Expr>,
    },
    ClassConst {
        class: Name,
        constant: String,
    },
    Instanceof {
        expr: Box<Expr>,
        class: Name,
    },
    Variable {
        name: String,
    },
    String {
        value: String,
    },
    Int {
        value: i64,
    },
}
