//! Name to versions index.

use std::collections::{BTreeMap, BTreeSet};

use crate::graph::DepGraph;
use crate::key::ModuleKey;

/// Every known version of every module name, used or not.
///
/// The root module is reached through its sentinel token and is not indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModulesIndex {
    versions: BTreeMap<String, BTreeSet<ModuleKey>>,
}

impl ModulesIndex {
    /// Build the index from a graph.
    pub fn new(graph: &DepGraph) -> Self {
        let versions = graph
            .iter()
            .map(|(key, _)| key)
            .filter(|key| !key.is_root())
            .fold(BTreeMap::new(), |mut acc: BTreeMap<String, BTreeSet<ModuleKey>>, key| {
                acc.entry(key.name().to_string())
                    .or_default()
                    .insert(key.clone());
                acc
            });
        Self { versions }
    }

    /// All versions of `name`, empty if the name is unknown.
    pub fn versions(&self, name: &str) -> impl Iterator<Item = &ModuleKey> {
        self.versions.get(name).into_iter().flatten()
    }

    pub fn contains(&self, key: &ModuleKey) -> bool {
        self.versions
            .get(key.name())
            .is_some_and(|keys| keys.contains(key))
    }

    /// Known module names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.versions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}
