use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub data: Option<DataConfig>,
    pub processing: Option<ProcessingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root of the `data/<field>/<year>/<version>` tree.
    pub root: Option<String>,
    /// Fields to process; all field directories under the root when unset.
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub workers: Option<usize>,
    /// Anchor set name: "modern" or "early-scan".
    pub era: Option<String>,
}

/// Platform config directory path: `<config_dir>/subiecte/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("subiecte").join("config.toml"))
}

/// Load config by cascading CWD `.subiecte.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".subiecte.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        data: Some(DataConfig {
            root: overlay
                .data
                .as_ref()
                .and_then(|d| d.root.clone())
                .or_else(|| base.data.as_ref().and_then(|d| d.root.clone())),
            fields: overlay
                .data
                .as_ref()
                .and_then(|d| d.fields.clone())
                .or_else(|| base.data.as_ref().and_then(|d| d.fields.clone())),
        }),
        processing: Some(ProcessingConfig {
            workers: overlay
                .processing
                .as_ref()
                .and_then(|p| p.workers)
                .or_else(|| base.processing.as_ref().and_then(|p| p.workers)),
            era: overlay
                .processing
                .as_ref()
                .and_then(|p| p.era.clone())
                .or_else(|| base.processing.as_ref().and_then(|p| p.era.clone())),
        }),
    }
}
