use serde::{Deserialize, Serialize};

/// Configuration from annotree.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// What to do with records that can never be reached from the root
/// (self-parented records and parent cycles)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    /// Fail the build with `CycleDetected`
    #[default]
    Reject,
    /// Leave the unreachable records out of the tree and log a warning
    Drop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
    /// Label of the synthetic root. Falls back to the record kind's default.
    #[serde(default)]
    pub root_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Names wider than this (in terminal cells) are truncated with `…`
    #[serde(default = "default_max_name_width")]
    pub max_name_width: usize,
    /// Spaces per tree level in outline output
    #[serde(default = "default_indent")]
    pub indent: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            max_name_width: default_max_name_width(),
            indent: default_indent(),
        }
    }
}

fn default_max_name_width() -> usize {
    48
}

fn default_indent() -> usize {
    2
}
