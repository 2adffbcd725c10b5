use std::path::Path;

use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::{config_io, input};
use crate::model::config::Config;
use crate::model::record::{Record, RecordKind};
use crate::model::tree::TreeNode;
use crate::ops::{annotation_index, check, token_index, tree_build, tree_filter, tree_flatten};

/// Nested JSON is written recursively; deeper trees are refused rather than
/// risking the stack. `flatten --json` has no such limit.
const MAX_JSON_TREE_DEPTH: usize = 512;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let config = config_io::load_config(cli.config.as_deref(), &cwd)?;
    let json = cli.json;

    match cli.command {
        Commands::Tree(args) => cmd_tree(args, &config, json),
        Commands::Flatten(args) => cmd_flatten(args, &config, json),
        Commands::Check(args) => cmd_check(args, json),
        Commands::Tokens(args) => cmd_tokens(args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_tree(
    path: &Path,
    kind: RecordKind,
    config: &Config,
) -> Result<TreeNode, Box<dyn std::error::Error>> {
    let records = input::load_records(path)?;
    let label = config
        .tree
        .root_label
        .clone()
        .unwrap_or_else(|| kind.default_root_label().to_string());
    let tree = tree_build::build_tree_with(&records, &Record::root(label), config.tree.cycle_policy)?;
    debug!(kind = %kind, nodes = tree.node_count(), "loaded tree");
    Ok(tree)
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn cmd_tree(args: TreeArgs, config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let kind = RecordKind::from_name(&args.kind)
        .ok_or_else(|| format!("unknown record kind '{}' (expected code, tag, or folder)", args.kind))?;
    let tree = load_tree(&args.records, kind, config)?;
    let query = args.filter.as_deref().unwrap_or("");
    let result = tree_filter::filter_tree(&tree, query);

    if json {
        let depth = result.tree.height();
        if depth > MAX_JSON_TREE_DEPTH {
            return Err(format!(
                "tree is {} levels deep, nested JSON output is limited to {} (use `flatten --json`)",
                depth, MAX_JSON_TREE_DEPTH
            )
            .into());
        }
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_lines(&format_outline(&result, &config.output));
        if !query.trim().is_empty() && result.is_empty() {
            println!("no results for \"{}\"", query.trim());
        }
    }
    Ok(())
}

fn cmd_flatten(
    args: FlattenArgs,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let tree = load_tree(&args.records, RecordKind::Code, config)?;
    let node = tree
        .find(args.id)
        .ok_or_else(|| format!("record not found: {}", args.id))?;
    let records = if args.with_root {
        tree_flatten::flatten_with_root(node)
    } else {
        tree_flatten::flatten(node)
    };

    if json {
        let out = FlattenJson {
            id: args.id,
            ids: records.iter().map(|r| r.id).collect(),
            records,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for rec in &records {
            println!("{}\t{}", rec.id, rec.name);
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let records = input::load_records(&args.records)?;
    let result = check::check_records(&records);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_lines(&format_check(&result));
    }
    Ok(())
}

fn cmd_tokens(args: TokensArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let doc = input::load_document(&args.document)?;
    let Some(tokens) = token_index::build_tokens(&doc.tokens, doc.offsets.as_deref())? else {
        if json {
            println!("{}", serde_json::json!({ "status": "pending" }));
        } else {
            println!("offsets not loaded");
        }
        return Ok(());
    };

    let index = annotation_index::build_index(tokens.len(), &doc.annotations)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&document_to_json(&tokens, &index))?);
    } else {
        print_lines(&format_token_lines(&tokens, &index));
        if !index.is_empty() {
            println!();
            print_lines(&format_annotation_lines(&tokens, &index));
        }
    }
    Ok(())
}
