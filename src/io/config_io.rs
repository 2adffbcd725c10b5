use std::path::{Path, PathBuf};

use tracing::debug;

use crate::io::input::{InputError, read_text};
use crate::model::config::Config;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE: &str = "annotree.toml";

/// Resolve which config file to use: an explicit path wins, otherwise
/// `annotree.toml` in `dir` if it exists.
pub fn find_config(explicit: Option<&Path>, dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let candidate = dir.join(CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Read and parse a config file.
pub fn read_config(path: &Path) -> Result<Config, InputError> {
    let text = read_text(path)?;
    let config = toml::from_str(&text).map_err(|e| InputError::ConfigParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load the effective config. No file means defaults.
pub fn load_config(explicit: Option<&Path>, dir: &Path) -> Result<Config, InputError> {
    match find_config(explicit, dir) {
        Some(path) => read_config(&path),
        None => Ok(Config::default()),
    }
}
