//! Error types for modquery-core

use std::fmt;

use modquery_graph::{GraphError, ModuleKey};

use crate::options::QueryType;

/// Result type for resolution and query operations
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of an [`Error`], stable across context wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidReferenceSyntax,
    ModuleNotFound,
    ExtensionNotFound,
    AmbiguousReference,
    UnusedModuleExcluded,
    TooManyArguments,
    BaseModuleMultipleVersions,
    UnknownQueryType,
    GraphEvaluationFailed,
    Interrupted,
}

impl ErrorKind {
    /// Fatal kinds abort the whole invocation rather than one query.
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::GraphEvaluationFailed | Self::Interrupted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidReferenceSyntax => "invalid_reference_syntax",
            Self::ModuleNotFound => "module_not_found",
            Self::ExtensionNotFound => "extension_not_found",
            Self::AmbiguousReference => "ambiguous_reference",
            Self::UnusedModuleExcluded => "unused_module_excluded",
            Self::TooManyArguments => "too_many_arguments",
            Self::BaseModuleMultipleVersions => "base_module_multiple_versions",
            Self::UnknownQueryType => "unknown_query_type",
            Self::GraphEvaluationFailed => "graph_evaluation_failed",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while resolving arguments or running a query
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A reference token does not follow the reference grammar
    #[error("invalid reference '{token}': {reason}")]
    InvalidReferenceSyntax { token: String, reason: String },

    /// No module matches the reference
    #[error("no module '{reference}' {within}")]
    ModuleNotFound { reference: String, within: String },

    /// The module exists but does not have the named extension
    #[error("no extension '{extension}' is defined by module {module}")]
    ExtensionNotFound { extension: String, module: ModuleKey },

    /// The reference denotes more than one thing and was not qualified
    #[error("'{reference}' is ambiguous, choose one of: {}", .candidates.join(", "))]
    AmbiguousReference {
        reference: String,
        candidates: Vec<String>,
    },

    /// The module version lost selection and unused modules were not requested
    #[error(
        "module version {key} is unused as a result of version selection; enable include-unused to query it"
    )]
    UnusedModuleExcluded { key: ModuleKey },

    /// The query type takes no positional arguments
    #[error("the '{query}' query doesn't take extra arguments")]
    TooManyArguments { query: QueryType },

    /// The base module selector matched several versions
    #[error(
        "the base module can only specify exactly one module version, choose one of: {}",
        format_keys(.candidates)
    )]
    BaseModuleMultipleVersions { candidates: Vec<ModuleKey> },

    /// No query type was given
    #[error("no query type specified, choose one of: {valid}")]
    MissingQueryType { valid: String },

    /// The query type is not recognized
    #[error("invalid query type '{input}', choose one of: {valid}")]
    UnknownQueryType { input: String, valid: String },

    /// The snapshot or an external lookup could not be evaluated
    #[error("graph evaluation failed: {message}")]
    GraphEvaluationFailed { message: String },

    /// The invocation was cancelled
    #[error("query interrupted: {message}")]
    Interrupted { message: String },

    /// An error attributed to one argument or option
    #[error("{context}: {source}")]
    InArgument {
        context: String,
        source: Box<Error>,
    },
}

impl Error {
    /// Attribute `self` to the argument or option described by `context`.
    pub fn in_argument(self, context: impl Into<String>) -> Self {
        Self::InArgument {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The kind of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidReferenceSyntax { .. } => ErrorKind::InvalidReferenceSyntax,
            Self::ModuleNotFound { .. } => ErrorKind::ModuleNotFound,
            Self::ExtensionNotFound { .. } => ErrorKind::ExtensionNotFound,
            Self::AmbiguousReference { .. } => ErrorKind::AmbiguousReference,
            Self::UnusedModuleExcluded { .. } => ErrorKind::UnusedModuleExcluded,
            Self::TooManyArguments { .. } => ErrorKind::TooManyArguments,
            Self::BaseModuleMultipleVersions { .. } => ErrorKind::BaseModuleMultipleVersions,
            Self::MissingQueryType { .. } | Self::UnknownQueryType { .. } => {
                ErrorKind::UnknownQueryType
            }
            Self::GraphEvaluationFailed { .. } => ErrorKind::GraphEvaluationFailed,
            Self::Interrupted { .. } => ErrorKind::Interrupted,
            Self::InArgument { source, .. } => source.kind(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }
}

impl From<GraphError> for Error {
    fn from(err: GraphError) -> Self {
        Self::GraphEvaluationFailed {
            message: err.to_string(),
        }
    }
}

fn format_keys(keys: &[ModuleKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
