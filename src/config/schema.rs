use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_FLAG_FILE: &str = ".dynif-migrated.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub content: ContentSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            content: ContentSettings::default(),
        }
    }
}

/// where and what the content scans read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSettings {
    /// file extensions treated as content items
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// migration flag file, relative to the content root (overrides the
    /// default location)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_file: Option<PathBuf>,
}

fn default_extensions() -> Vec<String> {
    vec!["html".to_string()]
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            flag_file: None,
        }
    }
}
