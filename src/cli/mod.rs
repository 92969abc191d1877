//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod catalog;
pub mod context;
pub mod history;
pub mod repl;
pub mod search;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// shopsearch - query a storefront with cached, de-duplicated requests
#[derive(Parser, Debug)]
#[command(name = "shopsearch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "SHOPSEARCH_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "SHOPSEARCH_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the storefront API endpoint
    #[arg(long, global = true, env = "SHOPSEARCH_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "SHOPSEARCH_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Disable the response cache
    #[arg(long, global = true, env = "SHOPSEARCH_NO_CACHE", hide_env = true)]
    pub no_cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full search
    Search {
        /// Search text
        query: String,
    },

    /// Show type-ahead suggestions for partial input
    Suggest {
        /// Partial search text
        query: String,
    },

    /// List products
    Products {
        /// Filter by category ID
        #[arg(long)]
        category: Option<String>,

        /// Filter by brand ID
        #[arg(long)]
        brand: Option<String>,

        /// Filter by text
        #[arg(long)]
        search: Option<String>,

        /// Page number
        #[arg(long)]
        page: Option<usize>,
    },

    /// List storefront taxonomies
    #[command(subcommand)]
    Catalog(CatalogCommands),

    /// Show trending searches
    Trending,

    /// Manage local search history
    #[command(subcommand)]
    History(HistoryCommands),

    /// Interactive search box reading input from stdin
    #[command(after_help = "\
Each line is treated as the new contents of the search box.
  !text      submit a search for text
  :accept    accept the offered spelling correction
  :dismiss   hide the offered spelling correction
  :quit      leave")]
    Repl,

    /// Display version information
    Version,
}

/// Taxonomy listing subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogCommands {
    /// List supported languages
    Languages,
    /// List supported currencies
    Currencies,
    /// List product categories
    Categories,
    /// List brands
    Brands,
}

/// Search history subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryCommands {
    /// Show recent searches, newest first
    List,
    /// Forget all recent searches
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_products_filters() {
        let cli = Cli::parse_from([
            "shopsearch",
            "products",
            "--category",
            "3",
            "--page",
            "2",
        ]);

        match cli.command {
            Commands::Products { category, page, .. } => {
                assert_eq!(category.as_deref(), Some("3"));
                assert_eq!(page, Some(2));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_catalog_subcommand() {
        let cli = Cli::parse_from(["shopsearch", "catalog", "brands", "--format", "table"]);
        assert!(matches!(cli.command, Commands::Catalog(CatalogCommands::Brands)));
        assert_eq!(cli.format, OutputFormat::Table);
    }
}
