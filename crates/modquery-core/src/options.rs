//! Query types and per-invocation options.

use std::fmt;
use std::str::FromStr;

use modquery_graph::ROOT_TOKEN;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The kind of query to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Tree,
    Deps,
    Path,
    AllPaths,
    Explain,
    Show,
    ShowExtension,
}

impl QueryType {
    pub const ALL: [QueryType; 7] = [
        Self::Tree,
        Self::Deps,
        Self::Path,
        Self::AllPaths,
        Self::Explain,
        Self::Show,
        Self::ShowExtension,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Deps => "deps",
            Self::Path => "path",
            Self::AllPaths => "all_paths",
            Self::Explain => "explain",
            Self::Show => "show",
            Self::ShowExtension => "show_extension",
        }
    }

    /// Graph queries traverse edges and honor the extension filter.
    pub fn is_graph(self) -> bool {
        matches!(
            self,
            Self::Tree | Self::Deps | Self::Path | Self::AllPaths | Self::Explain
        )
    }

    /// Comma-separated list of all query type names.
    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|q| q.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Depth limit used when none was requested.
    pub fn default_depth(self) -> usize {
        match self {
            Self::Explain => 1,
            Self::Deps => 2,
            _ => usize::MAX,
        }
    }

    /// The depth limit a traversal actually uses; `None` and `0` both mean
    /// "not requested".
    pub fn effective_depth(self, requested: Option<usize>) -> usize {
        match requested {
            Some(depth) if depth >= 1 => depth,
            _ => self.default_depth(),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|q| q.as_str() == s)
            .ok_or_else(|| Error::UnknownQueryType {
                input: s.to_string(),
                valid: Self::valid_values(),
            })
    }
}

/// Ceiling on all-paths enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumerationLimits {
    /// Maximum number of paths reported.
    pub max_paths: usize,
    /// Maximum number of nodes the enumeration may visit.
    pub max_steps: usize,
}

impl Default for EnumerationLimits {
    fn default() -> Self {
        Self {
            max_paths: 1_000,
            max_steps: 100_000,
        }
    }
}

/// Options shared by every query type.
///
/// Reference-valued options hold unparsed comma-separated lists; dispatch
/// resolves them against the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Module whose local dependency names bare references are resolved against.
    pub base_module: String,
    /// Start modules of graph queries.
    pub from: String,
    /// Using modules whose extension usages `show_extension` reports; empty
    /// means all.
    pub extension_usages: String,
    /// Extensions whose edges graph queries follow; `None` follows all.
    pub extension_filter: Option<String>,
    /// Allow references to module versions that lost selection.
    pub include_unused: bool,
    pub depth: Option<usize>,
    pub limits: EnumerationLimits,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            base_module: ROOT_TOKEN.to_string(),
            from: ROOT_TOKEN.to_string(),
            extension_usages: String::new(),
            extension_filter: None,
            include_unused: false,
            depth: None,
            limits: EnumerationLimits::default(),
        }
    }
}
