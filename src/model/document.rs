use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of a span, sentence, or bounding-box annotation
pub type AnnotationId = i64;

/// Character range `[begin, end]` of one token, serialized as a two-element array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharOffset(pub usize, pub usize);

impl CharOffset {
    pub fn begin(self) -> usize {
        self.0
    }

    pub fn end(self) -> usize {
        self.1
    }
}

/// A token of a loaded document with its character position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Dense 0-based position in the document
    pub index: usize,
    pub begin_char: usize,
    pub end_char: usize,
    pub text: String,
    /// A gap exists between this token and the next one
    pub has_trailing_whitespace: bool,
    /// Number of `\n` in `text`
    pub newline_count: usize,
}

/// An annotation over a token range.
///
/// Coverage is `begin_token..end_token`: the `end_token` position itself is
/// not covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeAnnotation {
    pub id: AnnotationId,
    pub begin_token: usize,
    pub end_token: usize,
    #[serde(default)]
    pub group_ids: Vec<i64>,
}

impl RangeAnnotation {
    pub fn new(id: AnnotationId, begin_token: usize, end_token: usize) -> Self {
        RangeAnnotation {
            id,
            begin_token,
            end_token,
            group_ids: Vec::new(),
        }
    }

    pub fn with_groups(mut self, group_ids: Vec<i64>) -> Self {
        self.group_ids = group_ids;
        self
    }

    /// Token positions this annotation covers
    pub fn covered_tokens(&self) -> std::ops::Range<usize> {
        self.begin_token..self.end_token
    }
}

/// Inverted token → annotation index for one document/user selection.
///
/// `group_ids` of the stored annotations are compact display labels (1, 2, ...)
/// assigned in first-seen order. Labels are only meaningful within this index;
/// anything that talks to persistence must go through [`AnnotationIndex::raw_group_id`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnnotationIndex {
    pub annotation_by_id: IndexMap<AnnotationId, RangeAnnotation>,
    pub token_to_annotation_ids: BTreeMap<usize, Vec<AnnotationId>>,
    /// Raw persisted group id → display label
    pub group_labels: IndexMap<i64, u32>,
}

impl AnnotationIndex {
    /// Annotation ids covering `token`, in processing order
    pub fn ids_at(&self, token: usize) -> &[AnnotationId] {
        self.token_to_annotation_ids
            .get(&token)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Annotations covering `token`, in processing order
    pub fn annotations_at(&self, token: usize) -> impl Iterator<Item = &RangeAnnotation> + '_ {
        self.ids_at(token)
            .iter()
            .filter_map(|id| self.annotation_by_id.get(id))
    }

    pub fn get(&self, id: AnnotationId) -> Option<&RangeAnnotation> {
        self.annotation_by_id.get(&id)
    }

    /// Display label for a raw group id, if any annotation referenced it
    pub fn group_label(&self, raw_group_id: i64) -> Option<u32> {
        self.group_labels.get(&raw_group_id).copied()
    }

    /// Raw persisted group id behind a display label
    pub fn raw_group_id(&self, label: u32) -> Option<i64> {
        self.group_labels
            .iter()
            .find(|(_, l)| **l == label)
            .map(|(raw, _)| *raw)
    }

    pub fn len(&self) -> usize {
        self.annotation_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotation_by_id.is_empty()
    }
}
