use docstep_model::{NodeType, Schema, SchemaError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid schema: {0}")]
    InvalidSchema(#[from] SchemaError),
}

/// A document schema as stored on disk.
///
/// ```toml
/// top = "doc"
/// include = ["~/.config/docstep/extra-types.toml"]
///
/// [[types]]
/// name = "doc"
/// contains = "block"
///
/// [[types]]
/// name = "paragraph"
/// group = "block"
/// contains = "inline"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub top: String,
    /// Further files holding `[[types]]` tables. Relative paths are resolved
    /// against the directory of the config file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,
    #[serde(default)]
    pub types: Vec<NodeType>,
}

#[derive(Debug, Deserialize)]
struct TypesFile {
    #[serde(default)]
    types: Vec<NodeType>,
}

impl Config {
    /// The node types of [`Schema::basic`].
    pub fn basic() -> Self {
        let schema = Schema::basic();
        Self {
            top: schema.top().name.clone(),
            include: Vec::new(),
            types: schema.types().map(|t| t.as_ref().clone()).collect(),
        }
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let mut config: Config = read_toml(config_path)?;

        let base = config_path.parent().unwrap_or(Path::new(""));
        config.include = config
            .include
            .into_iter()
            .map(|path| {
                let path = Self::expand_path(&path).unwrap_or(path);
                if path.is_relative() {
                    base.join(path)
                } else {
                    path
                }
            })
            .collect();

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/docstep");
        PathBuf::from(config_dir.as_ref()).join("schema.toml")
    }

    /// Build and validate the schema: the types listed here, followed by the
    /// types of every included file in order.
    pub fn schema(&self) -> Result<Schema, ConfigError> {
        let mut types = self.types.clone();
        for path in &self.include {
            let file: TypesFile = read_toml(path)?;
            types.extend(file.types);
        }
        Ok(Schema::new(types, &self.top)?)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::basic()
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
        config_path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
        config_path: path.to_path_buf(),
        source,
    })
}
