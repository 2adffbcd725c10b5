use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "annotree", about = concat!("annotree v", env!("CARGO_PKG_VERSION"), " - code trees and annotation indexes"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: ./annotree.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging to stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a code/tag/folder tree, optionally filtered by a name prefix
    Tree(TreeArgs),
    /// List the ids a bulk operation on a node would touch
    Flatten(FlattenArgs),
    /// Validate a record set (duplicates, cycles, orphans)
    Check(CheckArgs),
    /// Show which annotations cover each token of a document
    Tokens(TokensArgs),
}

#[derive(Args)]
pub struct TreeArgs {
    /// JSON file with an array of records
    pub records: PathBuf,
    /// Record kind, used for the root label (code, tag, folder)
    #[arg(long, default_value = "code")]
    pub kind: String,
    /// Keep only nodes whose name starts with this (case-sensitive)
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct FlattenArgs {
    /// JSON file with an array of records
    pub records: PathBuf,
    /// Node to flatten
    #[arg(allow_negative_numbers = true)]
    pub id: i64,
    /// Include the node itself
    #[arg(long)]
    pub with_root: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// JSON file with an array of records
    pub records: PathBuf,
}

#[derive(Args)]
pub struct TokensArgs {
    /// JSON document file: tokens, offsets, annotations
    pub document: PathBuf,
}
