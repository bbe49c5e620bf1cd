use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Defaults read from an optional TOML file.
///
/// ```toml
/// show_empty_objects = true
/// merged_name = "HC"
/// message_prefix = "accum"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Force listing of objects without entries in reports.
    pub show_empty_objects: bool,
    /// Store name used by `merge` when `--name` is not given.
    pub merged_name: String,
    /// Prefix of every lookup-miss message line.
    pub message_prefix: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            show_empty_objects: false,
            merged_name: "merged".into(),
            message_prefix: "accum".into(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
