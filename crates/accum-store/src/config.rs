use serde::{Deserialize, Serialize};

/// Construction-time settings for a [`Store`](crate::Store).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store name, used in reports and in derived artifact names.
    pub name: String,
    /// Free-form title shown in reports.
    pub title: String,
    /// Whether reports list artifacts that hold no entries.
    pub show_empty_objects: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            show_empty_objects: false,
        }
    }
}

impl StoreConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
