//! Snapshot of one evaluated dependency graph.
//!
//! The upstream evaluation phase hands the graph over as a JSON document
//! (see [`SnapshotFile`]); [`Snapshot`] is the validated, immutable form the
//! query engine reads.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extension::{ExtensionTag, ExtensionUsage, ModuleExtensionId, UsageTable};
use crate::graph::{DepGraph, GraphBuilder};
use crate::index::ModulesIndex;
use crate::key::ModuleKey;
use crate::module::ModuleSpec;

/// Attributes of one repository rule instance, keyed by attribute name.
pub type RepoRuleAttributes = BTreeMap<String, serde_json::Value>;

/// The immutable graph, usage table and derived index.
#[derive(Debug, Clone)]
pub struct Snapshot {
    graph: DepGraph,
    usages: UsageTable,
    index: ModulesIndex,
}

impl Snapshot {
    pub(crate) fn new(graph: DepGraph, usages: UsageTable) -> Self {
        let index = ModulesIndex::new(&graph);
        Self {
            graph,
            usages,
            index,
        }
    }

    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    pub fn usages(&self) -> &UsageTable {
        &self.usages
    }

    pub fn index(&self) -> &ModulesIndex {
        &self.index
    }

    /// Every extension known to the snapshot, from module declarations and
    /// from the usage table.
    pub fn extension_ids(&self) -> BTreeSet<&ModuleExtensionId> {
        let declared = self
            .graph
            .iter()
            .flat_map(|(_, module)| module.extension_usages().keys());
        declared.chain(self.usages.extension_ids()).collect()
    }
}

/// One row of the serialized usage table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub module: ModuleKey,
    pub extension: ModuleExtensionId,
    #[serde(default)]
    pub tags: Vec<ExtensionTag>,
    #[serde(default)]
    pub imports: BTreeSet<String>,
}

/// Serialized snapshot document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub modules: Vec<ModuleSpec>,
    #[serde(default)]
    pub usages: Vec<UsageRecord>,
    /// Repository rule attributes keyed by canonical repository name.
    #[serde(default)]
    pub repo_rules: BTreeMap<String, RepoRuleAttributes>,
}

impl SnapshotFile {
    /// Parse a snapshot document from JSON text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Read and parse a snapshot document.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(?path, "Loading snapshot file");
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Validate the document and build the snapshot, keeping the repository
    /// rule table aside.
    pub fn into_snapshot(self) -> Result<(Snapshot, BTreeMap<String, RepoRuleAttributes>)> {
        let mut builder = GraphBuilder::new();
        for module in self.modules {
            builder.add_module(module);
        }
        for record in self.usages {
            builder.add_usage(
                record.module,
                record.extension,
                ExtensionUsage {
                    tags: record.tags,
                    imports: record.imports,
                },
            );
        }
        Ok((builder.build()?, self.repo_rules))
    }
}
