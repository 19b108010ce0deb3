//! Module extension identities and the extension usage table.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GraphError;
use crate::key::ModuleKey;

/// Identity of a module extension.
///
/// Ordered by `(module name, module version, extension name, isolation key)`
/// through the derived `Ord`, with non-isolated extensions first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleExtensionId {
    module: ModuleKey,
    extension_name: String,
    isolation_key: Option<String>,
}

impl ModuleExtensionId {
    pub fn new(module: ModuleKey, extension_name: impl Into<String>) -> Self {
        Self {
            module,
            extension_name: extension_name.into(),
            isolation_key: None,
        }
    }

    /// Create the id of an isolated usage of an extension.
    pub fn isolated(
        module: ModuleKey,
        extension_name: impl Into<String>,
        isolation_key: impl Into<String>,
    ) -> Self {
        Self {
            module,
            extension_name: extension_name.into(),
            isolation_key: Some(isolation_key.into()),
        }
    }

    /// The module that defines the extension.
    pub fn module(&self) -> &ModuleKey {
        &self.module
    }

    pub fn extension_name(&self) -> &str {
        &self.extension_name
    }

    pub fn isolation_key(&self) -> Option<&str> {
        self.isolation_key.as_deref()
    }
}

impl fmt::Display for ModuleExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%{}", self.module, self.extension_name)?;
        if let Some(isolation) = &self.isolation_key {
            write!(f, "~{isolation}")?;
        }
        Ok(())
    }
}

impl FromStr for ModuleExtensionId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| GraphError::InvalidExtensionId {
            text: s.to_string(),
            reason,
        };
        let (module, rest) = s
            .split_once('%')
            .ok_or_else(|| invalid("expected 'module%extension'".to_string()))?;
        let module: ModuleKey = module.parse().map_err(|e| invalid(format!("{e}")))?;
        let (name, isolation) = match rest.split_once('~') {
            Some((name, isolation)) => (name, Some(isolation)),
            None => (rest, None),
        };
        if name.is_empty() {
            return Err(invalid("empty extension name".to_string()));
        }
        match isolation {
            Some("") => Err(invalid("empty isolation key".to_string())),
            Some(isolation) => Ok(Self::isolated(module, name, isolation)),
            None => Ok(Self::new(module, name)),
        }
    }
}

impl Serialize for ModuleExtensionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleExtensionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// One tag declared on an extension usage (e.g. `maven.install(...)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionTag {
    /// Tag class name.
    pub class: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// What one module declared when it used one extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionUsage {
    /// Tags in declaration order.
    #[serde(default)]
    pub tags: Vec<ExtensionTag>,
    /// Generated repositories the module actually imported.
    #[serde(default)]
    pub imports: BTreeSet<String>,
}

/// Read-only table of extension usages keyed by `(using module, extension)`.
#[derive(Debug, Clone, Default)]
pub struct UsageTable {
    rows: BTreeMap<(ModuleKey, ModuleExtensionId), ExtensionUsage>,
}

impl UsageTable {
    pub(crate) fn new(rows: BTreeMap<(ModuleKey, ModuleExtensionId), ExtensionUsage>) -> Self {
        Self { rows }
    }

    /// The usage of `extension` by `user`, if any.
    pub fn get(&self, user: &ModuleKey, extension: &ModuleExtensionId) -> Option<&ExtensionUsage> {
        self.rows.get(&(user.clone(), extension.clone()))
    }

    /// All usages of one extension, ordered by using module.
    pub fn usages_of<'a>(
        &'a self,
        extension: &'a ModuleExtensionId,
    ) -> impl Iterator<Item = (&'a ModuleKey, &'a ExtensionUsage)> + 'a {
        self.rows
            .iter()
            .filter(move |((_, id), _)| id == extension)
            .map(|((user, _), usage)| (user, usage))
    }

    /// Every extension that appears in the table.
    pub fn extension_ids(&self) -> BTreeSet<&ModuleExtensionId> {
        self.rows.keys().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
