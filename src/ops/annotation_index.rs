use tracing::debug;

use crate::model::document::{AnnotationId, AnnotationIndex, RangeAnnotation};

/// Error type for annotation indexing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnnotationError {
    #[error("annotation {id}: end token {end_token} is before begin token {begin_token}")]
    InvalidRange {
        id: AnnotationId,
        begin_token: usize,
        end_token: usize,
    },
    #[error("annotation {id} reaches token {end_token} but the document has {token_count} tokens")]
    TokenOutOfRange {
        id: AnnotationId,
        end_token: usize,
        token_count: usize,
    },
    #[error("duplicate annotation id: {0}")]
    DuplicateId(AnnotationId),
}

/// Build the token → annotation index for a document of `token_count` tokens.
///
/// Each annotation covers `begin_token..end_token`; the end position itself is
/// not covered. Ids are appended per token in the order annotations are given,
/// so overlapping annotations stack up under the same token.
///
/// An annotation reaching past the last token is reported as
/// `TokenOutOfRange`. That usually means it was made against a stale
/// tokenization, and it is checked before any coverage is expanded.
///
/// Raw group ids are rewritten to compact labels starting at 1, assigned in
/// first-seen order. The numbering belongs to this call only: adding or
/// removing an annotation can shift every later label.
pub fn build_index(
    token_count: usize,
    annotations: &[RangeAnnotation],
) -> Result<AnnotationIndex, AnnotationError> {
    let mut index = AnnotationIndex::default();

    for ann in annotations {
        if ann.end_token < ann.begin_token {
            return Err(AnnotationError::InvalidRange {
                id: ann.id,
                begin_token: ann.begin_token,
                end_token: ann.end_token,
            });
        }
        if ann.end_token > token_count {
            return Err(AnnotationError::TokenOutOfRange {
                id: ann.id,
                end_token: ann.end_token,
                token_count,
            });
        }
        if index.annotation_by_id.contains_key(&ann.id) {
            return Err(AnnotationError::DuplicateId(ann.id));
        }

        for token in ann.covered_tokens() {
            index
                .token_to_annotation_ids
                .entry(token)
                .or_default()
                .push(ann.id);
        }

        let mut remapped = ann.clone();
        for group in &mut remapped.group_ids {
            let next = index.group_labels.len() as u32 + 1;
            let label = *index.group_labels.entry(*group).or_insert(next);
            *group = i64::from(label);
        }
        index.annotation_by_id.insert(ann.id, remapped);
    }

    debug!(
        annotations = index.annotation_by_id.len(),
        tokens = index.token_to_annotation_ids.len(),
        groups = index.group_labels.len(),
        "built annotation index"
    );
    Ok(index)
}
