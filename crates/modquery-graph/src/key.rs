//! Module identity.
//!
//! A [`ModuleKey`] names one version of one module. The distinguished
//! [`ModuleKey::ROOT`] key (empty name and version) stands for the module
//! under query. Keys order lexicographically by `(name, version)`, which is
//! what every deterministic iteration in the workspace relies on.
//!
//! # Example
//!
//! ```
//! use modquery_graph::ModuleKey;
//!
//! let key: ModuleKey = "rules_cc@0.0.9".parse().unwrap();
//! assert_eq!(key.name(), "rules_cc");
//! assert_eq!(key.to_string(), "rules_cc@0.0.9");
//! assert_eq!("<root>".parse::<ModuleKey>().unwrap(), ModuleKey::ROOT);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GraphError;

/// Text form of the root module.
pub const ROOT_TOKEN: &str = "<root>";

/// Version placeholder for modules without a registry version.
pub const EMPTY_VERSION_TOKEN: &str = "_";

/// Identity of a module version: `(name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKey {
    name: String,
    version: String,
}

impl ModuleKey {
    /// The module under query.
    pub const ROOT: ModuleKey = ModuleKey {
        name: String::new(),
        version: String::new(),
    };

    /// Create a key from a module name and version.
    ///
    /// An empty version denotes a module overridden outside of any registry.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty() && self.version.is_empty()
    }

    /// Canonical name of the repository backing this module.
    ///
    /// The root module owns the main repository (`""`); every other module
    /// lives in `name~version`.
    pub fn canonical_repo_name(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}~{}", self.name, self.version)
        }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str(ROOT_TOKEN)
        } else if self.version.is_empty() {
            write!(f, "{}@{}", self.name, EMPTY_VERSION_TOKEN)
        } else {
            write!(f, "{}@{}", self.name, self.version)
        }
    }
}

impl FromStr for ModuleKey {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ROOT_TOKEN {
            return Ok(Self::ROOT);
        }
        let invalid = |reason: &str| GraphError::InvalidKey {
            text: s.to_string(),
            reason: reason.to_string(),
        };
        let (name, version) = s
            .split_once('@')
            .ok_or_else(|| invalid("expected 'name@version'"))?;
        if name.is_empty() {
            return Err(invalid("empty module name"));
        }
        if version.is_empty() {
            return Err(invalid("empty version (use '_' for no version)"));
        }
        if version.contains('@') {
            return Err(invalid("more than one '@'"));
        }
        let version = if version == EMPTY_VERSION_TOKEN {
            ""
        } else {
            version
        };
        Ok(Self::new(name, version))
    }
}

impl Serialize for ModuleKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
