//! File-backed configuration provider with read-on-demand hot reload.

use crate::schema::RouterConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// Name of the configuration file searched for in the working directory.
pub const CONFIG_FILE_NAME: &str = "router_config.toml";

/// Default configuration written on first run, with the three orchestrator
/// tiers mapped to Anthropic models. API keys are intentionally left blank.
const DEFAULT_CONFIG: &str = r#"# Model catalog. Each model needs: url, api_key, context_window (tokens).
# An empty api_key means the caller's own bearer token is forwarded.

[models."claude-opus-4-1"]
url = "https://api.anthropic.com"
api_key = ""
context_window = 200000

[models."claude-sonnet-4-5"]
url = "https://api.anthropic.com"
api_key = ""
context_window = 200000

[models."claude-haiku-4-5"]
url = "https://api.anthropic.com"
api_key = ""
context_window = 200000

# Per-agent overrides. Requests whose transcript announces one of these
# sub-agents are routed to the mapped model.

[agent_model_map]
analyst = "claude-opus-4-1"
architect = "claude-opus-4-1"
build-fixer = "claude-sonnet-4-5"
code-reviewer = "claude-opus-4-1"
code-simplifier = "claude-sonnet-4-5"
critic = "claude-opus-4-1"
debugger = "claude-sonnet-4-5"
deep-executor = "claude-opus-4-1"
designer = "claude-sonnet-4-5"
document-specialist = "claude-sonnet-4-5"
executor = "claude-sonnet-4-5"
explore = "claude-haiku-4-5"
git-master = "claude-sonnet-4-5"
planner = "claude-opus-4-1"
qa-tester = "claude-sonnet-4-5"
quality-reviewer = "claude-opus-4-1"
scientist = "claude-sonnet-4-5"
security-reviewer = "claude-opus-4-1"
test-engineer = "claude-sonnet-4-5"
verifier = "claude-sonnet-4-5"
writer = "claude-haiku-4-5"

# Tier fallback used when no agent-specific rule applies: the requested model
# name is matched against haiku / sonnet / opus.

[orchestrator_model_map]
haiku = "claude-haiku-4-5"
sonnet = "claude-sonnet-4-5"
opus = "claude-opus-4-1"
"#;

/// Errors raised by the configuration provider.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read or written.
    #[error("config file {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for the schema.
    #[error("config file {path}: {source}")]
    Parse {
        /// Path involved.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: Box<toml::de::Error>,
    },
    /// The configuration could not be serialized for saving.
    #[error("config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// The referential invariant is violated.
    #[error("config validation failed:\n{}", .0.join("\n"))]
    Validation(Vec<String>),
    /// No home directory to place the default config in.
    #[error("no config file found and no home directory to create one in")]
    NoHome,
}

/// File-backed provider for [`RouterConfig`].
///
/// `load` re-reads the file on every call. That makes config edits visible to
/// the next request, at the cost of one small file read per request, which is
/// the intended trade-off for an interactively edited routing table.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    path: PathBuf,
}

impl ConfigProvider {
    /// Creates a provider bound to an explicit file path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Locates the config file: `./router_config.toml` first, then
    /// `~/.config/model-router/router_config.toml`. When neither exists, a
    /// commented default is written at the home path.
    pub fn discover() -> Result<Self, ConfigError> {
        for path in Self::search_paths() {
            if path.exists() {
                return Ok(Self { path });
            }
        }

        let path = Self::home_path().ok_or(ConfigError::NoHome)?;
        write_default(&path)?;
        info!(path = %path.display(), "created default config, add your API keys");
        Ok(Self { path })
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home) = Self::home_path() {
            paths.push(home);
        }
        paths
    }

    fn home_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".config").join("model-router").join(CONFIG_FILE_NAME))
    }

    /// The path this provider reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the config file.
    pub fn load(&self) -> Result<RouterConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source: Box::new(source),
        })
    }

    /// Reads, parses, and validates the config file. Used at startup, where a
    /// violated invariant must refuse to start the process.
    pub fn load_validated(&self) -> Result<RouterConfig, ConfigError> {
        let config = self.load()?;
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Persists an edited configuration. Only the external dashboard
    /// collaborator writes through this; the request path never does.
    pub fn save(&self, config: &RouterConfig) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(config)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, text).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

fn write_default(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ModelConfig;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir().join(format!("router-config-test-{}.toml", uuid::Uuid::new_v4()))
    }

    #[test]
    fn default_config_parses_and_validates() {
        let config: RouterConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.orchestrator_model_map.len(), 3);
        assert_eq!(config.agent_model_map.len(), 21);
    }

    #[test]
    fn load_picks_up_edits_between_calls() {
        let path = temp_config_path();
        let provider = ConfigProvider::from_path(&path);

        let mut config = RouterConfig::default();
        config.models.insert(
            "model-a".into(),
            ModelConfig {
                url: "https://one.example.com".into(),
                api_key: String::new(),
                context_window: 100_000,
            },
        );
        provider.save(&config).unwrap();
        assert_eq!(
            provider.load().unwrap().models["model-a"].url,
            "https://one.example.com"
        );

        config.models.get_mut("model-a").unwrap().url = "https://two.example.com".into();
        provider.save(&config).unwrap();
        assert_eq!(
            provider.load().unwrap().models["model-a"].url,
            "https://two.example.com"
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_validated_rejects_dangling_references() {
        let path = temp_config_path();
        std::fs::write(
            &path,
            r#"
[models."model-a"]
url = "https://api.example.com"
api_key = ""
context_window = 1000

[orchestrator_model_map]
haiku = "nope"
"#,
        )
        .unwrap();

        let provider = ConfigProvider::from_path(&path);
        let err = provider.load_validated().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("nope"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let provider = ConfigProvider::from_path(temp_config_path());
        assert!(matches!(provider.load(), Err(ConfigError::Io { .. })));
    }
}
