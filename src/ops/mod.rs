pub mod annotation_index;
pub mod check;
pub mod token_index;
pub mod tree_build;
pub mod tree_filter;
pub mod tree_flatten;

pub use annotation_index::{AnnotationError, build_index};
pub use token_index::{TokenError, build_tokens, span_text};
pub use tree_build::{TreeError, build_tree, build_tree_with};
pub use tree_filter::filter_tree;
pub use tree_flatten::{CheckState, check_state, flatten, flatten_with_root, subtree_ids, toggle_subtree};
