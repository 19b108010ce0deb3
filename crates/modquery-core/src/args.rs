//! Reference token grammar.
//!
//! Module references come in three shapes: the root sentinel (`<root>`), a
//! bare local name (`rules_cc`) and a version-qualified name
//! (`rules_cc@0.0.9`, with `_` standing for an empty version). Extension
//! references append `%name` (and optionally `~isolation`) to a module
//! reference. Parsing is purely syntactic; see [`Resolver`](crate::Resolver)
//! for turning references into graph identities.

use std::fmt;
use std::sync::LazyLock;

use modquery_graph::{EMPTY_VERSION_TOKEN, ModuleKey, ROOT_TOKEN};
use regex::Regex;

use crate::error::{Error, Result};

/// Module names: lowercase, may contain `.`, `_` and `-`, no trailing separator.
pub static MODULE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9._-]*[a-z0-9])?$").unwrap());

pub static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.+_-]+$").unwrap());

pub static EXTENSION_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

pub static ISOLATION_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._+-]+$").unwrap());

/// A parsed module reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleArg {
    /// The root sentinel.
    Root,
    /// A local dependency name, meaningful relative to a base module.
    Named(String),
    /// An exact module version.
    Qualified(ModuleKey),
}

impl ModuleArg {
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidReferenceSyntax {
            token: token.to_string(),
            reason: reason.to_string(),
        };

        if token == ROOT_TOKEN {
            return Ok(Self::Root);
        }
        let (name, version) = match token.split_once('@') {
            Some((name, version)) => (name, Some(version)),
            None => (token, None),
        };
        if !MODULE_NAME_PATTERN.is_match(name) {
            return Err(invalid("invalid module name"));
        }
        match version {
            None => Ok(Self::Named(name.to_string())),
            Some(EMPTY_VERSION_TOKEN) => Ok(Self::Qualified(ModuleKey::new(name, ""))),
            Some(version) if VERSION_PATTERN.is_match(version) => {
                Ok(Self::Qualified(ModuleKey::new(name, version)))
            }
            Some(_) => Err(invalid("invalid version")),
        }
    }
}

impl fmt::Display for ModuleArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str(ROOT_TOKEN),
            Self::Named(name) => f.write_str(name),
            Self::Qualified(key) => write!(f, "{key}"),
        }
    }
}

/// A parsed extension reference: `module%name[~isolation]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionArg {
    pub module: ModuleArg,
    pub extension_name: String,
    pub isolation_key: Option<String>,
}

impl ExtensionArg {
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidReferenceSyntax {
            token: token.to_string(),
            reason: reason.to_string(),
        };

        let (module, rest) = token
            .split_once('%')
            .ok_or_else(|| invalid("expected 'module%extension'"))?;
        let module = ModuleArg::parse(module)?;
        let (name, isolation) = match rest.split_once('~') {
            Some((name, isolation)) => (name, Some(isolation)),
            None => (rest, None),
        };
        if !EXTENSION_NAME_PATTERN.is_match(name) {
            return Err(invalid("invalid extension name"));
        }
        if let Some(isolation) = isolation {
            if !ISOLATION_KEY_PATTERN.is_match(isolation) {
                return Err(invalid("invalid isolation key"));
            }
        }
        Ok(Self {
            module,
            extension_name: name.to_string(),
            isolation_key: isolation.map(str::to_string),
        })
    }
}

impl fmt::Display for ExtensionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%{}", self.module, self.extension_name)?;
        if let Some(isolation) = &self.isolation_key {
            write!(f, "~{isolation}")?;
        }
        Ok(())
    }
}

/// Split a comma-separated list, skipping empty entries.
pub fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|token| !token.is_empty())
}

/// Parse a comma-separated list of module references.
pub fn parse_module_list(text: &str) -> Result<Vec<ModuleArg>> {
    split_list(text).map(ModuleArg::parse).collect()
}

/// Parse a comma-separated list of extension references.
pub fn parse_extension_list(text: &str) -> Result<Vec<ExtensionArg>> {
    split_list(text).map(ExtensionArg::parse).collect()
}
