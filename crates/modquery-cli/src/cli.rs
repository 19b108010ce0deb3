//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use modquery_graph::ROOT_TOKEN;

use crate::render::{Charset, OutputFormat};

/// Query the external module dependency graph of a build
///
/// Query types:
///   tree                          dependency tree of the --from modules
///   deps <MODULE>...              the modules and their direct dependencies
///   path <MODULE>...              shortest path from --from to any target
///   all_paths <MODULE>...         every path from --from to the targets
///   explain <MODULE>...           why the targets are in the graph
///   show <MODULE>...              repository rules backing the modules
///   show_extension <EXT>...       usages of module extensions
///
/// Module references are bare dependency names of the base module (`foo`),
/// exact versions (`foo@1.2`, `foo@_` for no version) or `<root>`.
/// Extension references are written `module%extension`.
#[derive(Parser, Debug)]
#[command(name = "modquery")]
#[command(author, version, about, verbatim_doc_comment)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Snapshot document of the evaluated dependency graph
    #[arg(long, env = "MODQUERY_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Module whose dependency names bare references refer to
    #[arg(long, default_value = ROOT_TOKEN)]
    pub base_module: String,

    /// Comma-separated start modules of graph queries
    #[arg(long, default_value = ROOT_TOKEN)]
    pub from: String,

    /// Comma-separated modules whose extension usages show_extension reports
    #[arg(long, default_value = "")]
    pub extension_usages: String,

    /// Comma-separated extensions whose edges graph queries follow
    #[arg(long)]
    pub extension_filter: Option<String>,

    /// Allow module versions that lost version selection
    #[arg(long)]
    pub include_unused: bool,

    /// Maximum depth of listed trees
    #[arg(long)]
    pub depth: Option<usize>,

    /// Characters used to draw trees
    #[arg(long, value_enum)]
    pub charset: Option<Charset>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Query type followed by its arguments
    #[arg(value_name = "QUERY")]
    pub residue: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["modquery", "tree"]);
        assert_eq!(cli.base_module, "<root>");
        assert_eq!(cli.from, "<root>");
        assert_eq!(cli.extension_filter, None);
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.residue, vec!["tree"]);
    }

    #[test]
    fn test_query_with_options() {
        let cli = Cli::parse_from([
            "modquery",
            "--from",
            "a,b@1.0",
            "--extension-filter",
            "",
            "--charset",
            "ascii",
            "--depth",
            "3",
            "path",
            "c",
            "d@2.0",
        ]);
        assert_eq!(cli.from, "a,b@1.0");
        assert_eq!(cli.extension_filter.as_deref(), Some(""));
        assert_eq!(cli.charset, Some(Charset::Ascii));
        assert_eq!(cli.depth, Some(3));
        assert_eq!(cli.residue, vec!["path", "c", "d@2.0"]);
    }
}
