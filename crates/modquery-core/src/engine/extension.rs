//! Extension usage reports.

use std::collections::BTreeSet;

use modquery_graph::{ExtensionTag, ModuleExtensionId, ModuleKey};
use serde::Serialize;

use super::QueryEngine;

/// A repository an extension generated for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoImport {
    pub name: String,
    /// The using module brought the repository into scope.
    pub imported: bool,
}

/// One module's usage of an extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    pub module: ModuleKey,
    pub tags: Vec<ExtensionTag>,
    pub repos: Vec<RepoImport>,
}

/// Everything known about one extension, restricted to the selected users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionReport {
    pub extension: ModuleExtensionId,
    /// Repositories generated for the reported usages.
    pub generated: BTreeSet<String>,
    pub usages: Vec<UsageReport>,
}

impl ExtensionReport {
    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }
}

impl QueryEngine<'_> {
    /// Report the usages of each extension by the modules in `users`, or by
    /// every module when `users` is empty.
    ///
    /// Generated repositories the using module never imported are reported
    /// with `imported: false` and logged as a warning.
    pub fn show_extension(
        &self,
        extensions: &[ModuleExtensionId],
        users: &[ModuleKey],
    ) -> Vec<ExtensionReport> {
        let users: BTreeSet<&ModuleKey> = users.iter().collect();
        extensions
            .iter()
            .map(|extension| self.extension_report(extension, &users))
            .collect()
    }

    fn extension_report(
        &self,
        extension: &ModuleExtensionId,
        users: &BTreeSet<&ModuleKey>,
    ) -> ExtensionReport {
        let graph = self.snapshot.graph();
        let usages: Vec<UsageReport> = self
            .snapshot
            .usages()
            .usages_of(extension)
            .filter(|(module, _)| users.is_empty() || users.contains(module))
            .map(|(module, usage)| {
                let generated = graph
                    .get(module)
                    .and_then(|m| m.extension_usages().get(extension));
                let repos = generated
                    .into_iter()
                    .flatten()
                    .map(|name| {
                        let imported = usage.imports.contains(name);
                        if !imported {
                            tracing::warn!(
                                "Repository {name} generated by {extension} for {module} is never imported"
                            );
                        }
                        RepoImport {
                            name: name.clone(),
                            imported,
                        }
                    })
                    .collect();
                UsageReport {
                    module: module.clone(),
                    tags: usage.tags.clone(),
                    repos,
                }
            })
            .collect();

        if usages.is_empty() {
            tracing::debug!(%extension, "No matching usages");
        }
        let generated = usages
            .iter()
            .flat_map(|usage| usage.repos.iter().map(|repo| repo.name.clone()))
            .collect();
        ExtensionReport {
            extension: extension.clone(),
            generated,
            usages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modquery_test_utils::{GraphFixture, ext, key};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_restricted_to_selected_users() {
        let snapshot = GraphFixture::extensions();
        let reports =
            QueryEngine::new(&snapshot).show_extension(&[ext("tools@1.0%ext1")], &[key("lib@1.0")]);

        assert_eq!(reports.len(), 1);
        let report = &reports[0];
        assert_eq!(
            report.generated,
            BTreeSet::from(["lib_extra".to_string(), "lib_repo".to_string()])
        );
        assert_eq!(report.usages.len(), 1);
        assert_eq!(report.usages[0].module, key("lib@1.0"));
        assert_eq!(
            report.usages[0].repos,
            vec![
                RepoImport {
                    name: "lib_extra".to_string(),
                    imported: false,
                },
                RepoImport {
                    name: "lib_repo".to_string(),
                    imported: true,
                },
            ]
        );
    }

    #[test]
    fn test_empty_user_filter_reports_everyone() {
        let snapshot = GraphFixture::extensions();
        let reports = QueryEngine::new(&snapshot).show_extension(&[ext("tools@1.0%ext1")], &[]);
        let users: Vec<&ModuleKey> = reports[0].usages.iter().map(|u| &u.module).collect();
        assert_eq!(users, vec![&ModuleKey::ROOT, &key("lib@1.0")]);
        assert_eq!(reports[0].generated.len(), 3);
    }

    #[test]
    fn test_no_matching_usage_is_an_empty_report() {
        let snapshot = GraphFixture::extensions();
        let reports = QueryEngine::new(&snapshot)
            .show_extension(&[ext("tools@1.0%ext2")], &[ModuleKey::ROOT]);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_empty());
        assert!(reports[0].generated.is_empty());
    }
}
