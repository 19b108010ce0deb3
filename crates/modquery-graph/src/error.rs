//! Error types for modquery-graph

use crate::extension::ModuleExtensionId;
use crate::key::ModuleKey;

/// Result type for graph construction and lookup
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while parsing identities or assembling a snapshot
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// A module key string could not be parsed
    #[error("invalid module key '{text}': {reason}")]
    InvalidKey { text: String, reason: String },

    /// A module extension id string could not be parsed
    #[error("invalid extension id '{text}': {reason}")]
    InvalidExtensionId { text: String, reason: String },

    /// The snapshot does not contain the root module
    #[error("snapshot has no root module")]
    MissingRoot,

    /// The same module key was declared twice
    #[error("module {0} is declared more than once")]
    DuplicateModule(ModuleKey),

    /// A dependency edge points at a module that is not in the snapshot
    #[error("module {module} depends on unknown module {target} (as '{name}')")]
    DanglingEdge {
        module: ModuleKey,
        name: String,
        target: ModuleKey,
    },

    /// An extension-introduced edge names a dependency the module does not have
    #[error("module {module} attributes unknown dependency '{name}' to an extension")]
    UnknownExtensionEdge { module: ModuleKey, name: String },

    /// The used-dependency relation contains a cycle
    #[error("dependency cycle among: {}", format_keys(.participants))]
    DependencyCycle { participants: Vec<ModuleKey> },

    /// A module cannot be reached from the root through any declared edge
    #[error("module {0} is not reachable from the root module")]
    Unreachable(ModuleKey),

    /// A usage-table row references a module that is not in the snapshot
    #[error("usage of {extension} by unknown module {module}")]
    UnknownUsageModule {
        module: ModuleKey,
        extension: ModuleExtensionId,
    },

    /// Lookup of a module that is not in the graph
    #[error("unknown module: {0}")]
    UnknownModule(ModuleKey),

    /// I/O error reading a snapshot file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Snapshot file is not valid JSON for the expected schema
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn format_keys(keys: &[ModuleKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
