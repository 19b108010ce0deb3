//! Text and JSON rendering of query outcomes.

use std::fmt::Write as _;

use clap::ValueEnum;
use modquery_core::{
    AllPaths, AnnotatedPath, EdgeCause, ExtensionReport, QueryOutcome, ShownRepo, Tree,
    TreeEntry,
};
use serde::Deserialize;

use crate::error::Result;

/// Character set used for tree drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    #[default]
    Utf8,
    Ascii,
}

impl Charset {
    fn branch(self) -> &'static str {
        match self {
            Self::Utf8 => "├───",
            Self::Ascii => "|___",
        }
    }

    fn last_branch(self) -> &'static str {
        match self {
            Self::Utf8 => "└───",
            Self::Ascii => "|___",
        }
    }

    fn pipe(self) -> &'static str {
        match self {
            Self::Utf8 => "│   ",
            Self::Ascii => "|   ",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const SPACE: &str = "    ";

/// Render an outcome in the requested format.
pub fn render(outcome: &QueryOutcome, format: OutputFormat, charset: Charset) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)? + "\n"),
        OutputFormat::Text => Ok(render_text(outcome, charset)),
    }
}

pub fn render_text(outcome: &QueryOutcome, charset: Charset) -> String {
    match outcome {
        QueryOutcome::Tree(tree) => render_tree(tree, charset),
        QueryOutcome::Path(Some(path)) => format!("{}\n", render_path(path)),
        QueryOutcome::Path(None) => "No path found.\n".to_string(),
        QueryOutcome::AllPaths(result) => render_all_paths(result, charset),
        QueryOutcome::Show(repos) => render_show(repos),
        QueryOutcome::ShowExtension(reports) => render_extensions(reports),
    }
}

fn cause_suffix(cause: Option<&EdgeCause>) -> String {
    match cause.and_then(EdgeCause::extension) {
        Some(id) => format!(" (via {id})"),
        None => String::new(),
    }
}

pub fn render_tree(tree: &Tree, charset: Charset) -> String {
    let entries = &tree.entries;
    let mut out = String::new();
    // `open[d]` holds whether the ancestor at depth d + 1 has later siblings.
    let mut open: Vec<bool> = Vec::new();

    let last_sibling = last_sibling_flags(entries);

    for (entry, &is_last) in entries.iter().zip(&last_sibling) {

        if entry.depth > 0 {
            open.truncate(entry.depth - 1);
            for &has_more in &open {
                out.push_str(if has_more { charset.pipe() } else { SPACE });
            }
            out.push_str(if is_last {
                charset.last_branch()
            } else {
                charset.branch()
            });
            open.push(!is_last);
        } else {
            open.clear();
        }

        out.push_str(&entry.key.to_string());
        out.push_str(&cause_suffix(entry.cause.as_ref()));
        if entry.reference_only {
            out.push_str(" (*)");
        }
        out.push('\n');
    }
    out
}

/// Whether each entry is the last child of its parent, in one reverse pass.
fn last_sibling_flags(entries: &[TreeEntry]) -> Vec<bool> {
    let mut flags = vec![false; entries.len()];
    // `follows[d]` holds whether a later sibling at depth d was seen.
    let mut follows: Vec<bool> = Vec::new();
    for (i, entry) in entries.iter().enumerate().rev() {
        follows.resize(entry.depth + 1, false);
        flags[i] = !follows[entry.depth];
        follows[entry.depth] = true;
    }
    flags
}

pub fn render_path(path: &AnnotatedPath) -> String {
    let mut out = String::new();
    for (i, node) in path.nodes.iter().enumerate() {
        if i > 0 {
            out.push_str(" -> ");
        }
        out.push_str(&node.to_string());
        if i > 0 {
            out.push_str(&cause_suffix(path.edges.get(i - 1)));
        }
    }
    out
}

fn render_all_paths(result: &AllPaths, charset: Charset) -> String {
    if result.paths.is_empty() && !result.truncated {
        return "No path found.\n".to_string();
    }
    let mut out = String::new();
    for path in &result.paths {
        out.push_str(&render_path(path));
        out.push('\n');
    }
    if result.truncated {
        out.push_str("(truncated)\n");
    }
    if result.target_trees.entries.iter().any(|entry| entry.depth > 0) {
        out.push('\n');
        out.push_str(&render_tree(&result.target_trees, charset));
    }
    out
}

fn render_show(repos: &[ShownRepo]) -> String {
    let mut out = String::new();
    for repo in repos {
        let attributes = serde_json::Value::Object(
            repo.attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        );
        let _ = writeln!(out, "@{} -> {}", repo.repo_name, attributes);
    }
    out
}

fn render_extensions(reports: &[ExtensionReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = writeln!(out, "## {}", report.extension);
        if report.is_empty() {
            out.push_str("(no usages)\n");
            continue;
        }
        for usage in &report.usages {
            let _ = writeln!(out, "{}", usage.module);
            for tag in &usage.tags {
                let attributes = tag
                    .attributes
                    .iter()
                    .map(|(k, v)| format!("{k} = {v:?}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(
                    out,
                    "{SPACE}{}.{}({attributes})",
                    report.extension.extension_name(),
                    tag.class
                );
            }
            for repo in &usage.repos {
                let marker = if repo.imported {
                    "imported"
                } else {
                    "not imported"
                };
                let _ = writeln!(out, "{SPACE}{} ({marker})", repo.name);
            }
        }
    }
    out
}
