use serde::Serialize;

use crate::model::config::OutputConfig;
use crate::model::document::{AnnotationIndex, RangeAnnotation, Token};
use crate::model::record::{Record, RecordId};
use crate::model::tree::{FilterResult, TreeNode};
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::token_index::span_text;
use crate::util::unicode::{display_width, escape_controls, pad_to_width, truncate_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct FlattenJson {
    pub id: RecordId,
    pub ids: Vec<RecordId>,
    pub records: Vec<Record>,
}

#[derive(Serialize)]
pub struct TokenJson<'a> {
    #[serde(flatten)]
    pub token: &'a Token,
    pub annotations: &'a [i64],
}

#[derive(Serialize)]
pub struct DocumentJson<'a> {
    pub tokens: Vec<TokenJson<'a>>,
    pub annotations: Vec<&'a RangeAnnotation>,
    pub group_labels: Vec<GroupLabelJson>,
}

#[derive(Serialize)]
pub struct GroupLabelJson {
    pub label: u32,
    pub group_id: i64,
}

pub fn document_to_json<'a>(tokens: &'a [Token], index: &'a AnnotationIndex) -> DocumentJson<'a> {
    DocumentJson {
        tokens: tokens
            .iter()
            .map(|t| TokenJson {
                token: t,
                annotations: index.ids_at(t.index),
            })
            .collect(),
        annotations: index.annotation_by_id.values().collect(),
        group_labels: index
            .group_labels
            .iter()
            .map(|(&group_id, &label)| GroupLabelJson { label, group_id })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Marker in front of each outline line: `▾` auto-expanded, `▸` has
/// children but is collapsed in a browser, `•` leaf.
fn node_marker(node: &TreeNode, result: &FilterResult) -> char {
    if result.expand_ids.contains(&node.id()) {
        '▾'
    } else if node.is_leaf() {
        '•'
    } else {
        '▸'
    }
}

/// Render a (possibly filtered) tree as an indented outline.
pub fn format_outline(result: &FilterResult, cfg: &OutputConfig) -> Vec<String> {
    let mut lines = vec![truncate_to_width(result.tree.name(), cfg.max_name_width)];
    let mut stack: Vec<(&TreeNode, usize)> =
        result.tree.children.iter().rev().map(|c| (c, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        lines.push(format!(
            "{}{} {} [{}]",
            " ".repeat(cfg.indent * depth),
            node_marker(node, result),
            truncate_to_width(node.name(), cfg.max_name_width),
            node.id()
        ));
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }
    lines
}

/// Badge for an annotation at a token: `#id`, plus `[g1,g2]` for groups
fn annotation_badge(ann: &RangeAnnotation) -> String {
    if ann.group_ids.is_empty() {
        format!("#{}", ann.id)
    } else {
        let groups: Vec<String> = ann.group_ids.iter().map(|g| format!("g{}", g)).collect();
        format!("#{}[{}]", ann.id, groups.join(","))
    }
}

/// One line per token: position, text, covering annotations.
pub fn format_token_lines(tokens: &[Token], index: &AnnotationIndex) -> Vec<String> {
    let text_width = tokens
        .iter()
        .map(|t| display_width(&escape_controls(&t.text)))
        .max()
        .unwrap_or(0);
    let pos_width = tokens.len().saturating_sub(1).to_string().len();

    tokens
        .iter()
        .map(|t| {
            let badges: Vec<String> = index.annotations_at(t.index).map(annotation_badge).collect();
            let line = format!(
                "{:>pw$}  {}  {}",
                t.index,
                pad_to_width(&escape_controls(&t.text), text_width),
                badges.join(" "),
                pw = pos_width
            );
            line.trim_end().to_string()
        })
        .collect()
}

/// One line per annotation: id, covered range, and the covered text.
pub fn format_annotation_lines(tokens: &[Token], index: &AnnotationIndex) -> Vec<String> {
    index
        .annotation_by_id
        .values()
        .map(|ann| {
            format!(
                "{} tokens {}..{} \"{}\"",
                annotation_badge(ann),
                ann.begin_token,
                ann.end_token,
                escape_controls(&span_text(tokens, ann.covered_tokens()))
            )
        })
        .collect()
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            let line = match err {
                CheckError::DuplicateId { id, count } => {
                    format!("  id {} is used by {} records", id, count)
                }
                CheckError::SelfParent { id, name } => {
                    format!("  {} [{}] is its own parent", name, id)
                }
                CheckError::Cycle { ids } => {
                    let ids: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
                    format!("  parent cycle: {}", ids.join(" -> "))
                }
                CheckError::Unreachable { id, name } => {
                    format!("  {} [{}] descends from a cycle", name, id)
                }
            };
            lines.push(line);
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warning in &result.warnings {
            let line = match warning {
                CheckWarning::OrphanParent { id, parent_id } => {
                    format!("  [{}] has unknown parent {} (shown at top level)", id, parent_id)
                }
                CheckWarning::EmptyName { id } => format!("  [{}] has an empty name", id),
            };
            lines.push(line);
        }
    }
    if result.valid {
        lines.push("\u{2713} records are valid".to_string());
    } else {
        lines.push("\u{2717} records have errors".to_string());
    }
    lines
}
