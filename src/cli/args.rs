//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

/// Taxonomy term trees as navigation menus and term lists
#[derive(Parser, Debug)]
#[command(name = "taxnav")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Project directory holding .taxnav.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print term list block markup
    Render {
        #[command(flatten)]
        attrs: AttributeArgs,
    },

    /// Print navigation items as JSON, as served by GET /terms
    Links {
        #[command(flatten)]
        attrs: AttributeArgs,
    },

    /// Print the term forest
    Tree {
        /// Taxonomy to show
        #[arg(short, long, default_value = "category")]
        taxonomy: String,
        /// Depth limit, 0 = unlimited
        #[arg(short, long, default_value_t = 0)]
        max_depth: u32,
        /// Ignore the hierarchy: every term is a root
        #[arg(long)]
        flat: bool,
    },

    /// Regenerate taxonomy navigation blocks of a block document in place
    Sync {
        /// Block document (JSON array of blocks)
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,
        /// Report what would change without writing (exit 1 if outdated)
        #[arg(long)]
        check: bool,
    },

    /// Print render-time markup of every taxonomy navigation block in a document
    Navigation {
        /// Block document (JSON array of blocks)
        #[arg(value_hint = ValueHint::FilePath)]
        document: PathBuf,
    },

    /// Serve GET /terms over HTTP
    Serve {
        /// Listen address (default: server.bind from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Block attributes given on the command line.
///
/// Flags override values read from `--attrs`; unset values fall back to the
/// block defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct AttributeArgs {
    /// JSON object of block attributes
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub attrs: Option<PathBuf>,
    /// Taxonomy
    #[arg(short, long)]
    pub taxonomy: Option<String>,
    /// Display style: ul, ol, dropdown, filterable
    #[arg(short = 's', long)]
    pub display_style: Option<String>,
    /// Sort field: name, slug, id, count, term_order
    #[arg(long)]
    pub order_by: Option<String>,
    /// Sort direction: ASC or DESC
    #[arg(long)]
    pub order: Option<String>,
    /// List terms without posts
    #[arg(long)]
    pub include_empty: bool,
    /// Append post counts
    #[arg(long)]
    pub show_count: bool,
    /// Ignore the hierarchy
    #[arg(long)]
    pub flat: bool,
    /// Depth limit, 0 = unlimited
    #[arg(short, long, allow_negative_numbers = true)]
    pub max_depth: Option<i64>,
    /// Dropdown placeholder title
    #[arg(long)]
    pub dropdown_title: Option<String>,
    /// Dropdown placeholder link
    #[arg(long)]
    pub dropdown_link: Option<String>,
    /// Navigate on selection instead of showing a button
    #[arg(long)]
    pub no_dropdown_button: bool,
    /// Prepend a filter input (filterable style)
    #[arg(long)]
    pub filter: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}
