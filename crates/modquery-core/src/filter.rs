//! Extension inclusion filter for graph traversals.

use std::collections::BTreeSet;

use modquery_graph::{DepOrigin, ModuleExtensionId};
use serde::Serialize;

/// Set of extensions whose edges a traversal may follow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "extensions")]
pub enum ExtensionFilter {
    /// Every extension passes.
    #[default]
    Complete,
    /// Only the listed extensions pass.
    Finite(BTreeSet<ModuleExtensionId>),
}

impl ExtensionFilter {
    pub fn finite(ids: impl IntoIterator<Item = ModuleExtensionId>) -> Self {
        Self::Finite(ids.into_iter().collect())
    }

    pub fn contains(&self, id: &ModuleExtensionId) -> bool {
        match self {
            Self::Complete => true,
            Self::Finite(ids) => ids.contains(id),
        }
    }

    /// Whether an edge with the given origin survives the filter.
    ///
    /// Declared edges always pass. Extension edges pass when any causing
    /// extension does, and the first such extension is returned as the
    /// edge's cause.
    pub fn admit(&self, origin: DepOrigin<'_>) -> Option<EdgeCause> {
        match origin {
            DepOrigin::Declared => Some(EdgeCause::Direct),
            DepOrigin::Extensions(causes) => causes
                .iter()
                .find(|id| self.contains(id))
                .map(|id| EdgeCause::Extension(id.clone())),
        }
    }
}

/// Why an edge exists in a traversal result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "extension")]
pub enum EdgeCause {
    /// A dependency the module declared itself.
    Direct,
    /// A dependency introduced by this extension usage.
    Extension(ModuleExtensionId),
}

impl EdgeCause {
    pub fn extension(&self) -> Option<&ModuleExtensionId> {
        match self {
            Self::Direct => None,
            Self::Extension(id) => Some(id),
        }
    }
}
