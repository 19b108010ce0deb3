//! Repository rule lookup for `show`.

use std::collections::BTreeMap;

use modquery_graph::{ModuleKey, RepoRuleAttributes};
use serde::Serialize;

use super::QueryEngine;
use crate::error::{Error, Result};

/// Failure of a [`RepoRuleLookup`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot fetch repository rule for '{repo}': {reason}")]
pub struct LookupError {
    pub repo: String,
    pub reason: String,
}

/// Source of repository rule attributes, keyed by canonical repository name.
pub trait RepoRuleLookup {
    fn lookup(&self, repo: &str) -> std::result::Result<RepoRuleAttributes, LookupError>;
}

/// In-memory lookup table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticRepoRules {
    rules: BTreeMap<String, RepoRuleAttributes>,
}

impl StaticRepoRules {
    pub fn new(rules: BTreeMap<String, RepoRuleAttributes>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl RepoRuleLookup for StaticRepoRules {
    fn lookup(&self, repo: &str) -> std::result::Result<RepoRuleAttributes, LookupError> {
        self.rules.get(repo).cloned().ok_or_else(|| LookupError {
            repo: repo.to_string(),
            reason: "no such repository".to_string(),
        })
    }
}

/// A module's backing repository and its rule attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShownRepo {
    pub module: ModuleKey,
    /// Canonical repository name; empty for the root module.
    pub repo_name: String,
    pub attributes: RepoRuleAttributes,
}

impl QueryEngine<'_> {
    /// Fetch the repository rule behind each module.
    ///
    /// Any lookup failure aborts the query.
    pub fn show(&self, modules: &[ModuleKey], lookup: &dyn RepoRuleLookup) -> Result<Vec<ShownRepo>> {
        modules
            .iter()
            .map(|module| {
                let repo_name = module.canonical_repo_name();
                tracing::debug!(%module, repo = %repo_name, "Looking up repository rule");
                let attributes = lookup
                    .lookup(&repo_name)
                    .map_err(|e| Error::GraphEvaluationFailed {
                        message: e.to_string(),
                    })?;
                Ok(ShownRepo {
                    module: module.clone(),
                    repo_name,
                    attributes,
                })
            })
            .collect()
    }
}
