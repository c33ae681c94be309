//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/taxnav/taxnav.toml`
//! 3. Local config: `<project_dir>/.taxnav.toml`
//! 4. Environment variables: `TAXNAV_*` prefix

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;

/// HTTP endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (default: 127.0.0.1:8787)
    pub bind: String,
    /// Bearer tokens granting the content-edit capability
    pub editor_tokens: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".into(),
            editor_tokens: vec![],
        }
    }
}

/// Raw server config for intermediate parsing (arrays are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawServerConfig {
    pub bind: Option<String>,
    pub editor_tokens: Option<Vec<String>>,
}

impl ServerConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for item in overlay {
            if let Some(negated) = item.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(item.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge local config onto self: scalars replace, token list unions.
    pub fn merge(&self, overlay: &RawServerConfig) -> Self {
        Self {
            bind: overlay.bind.clone().unwrap_or_else(|| self.bind.clone()),
            editor_tokens: overlay
                .editor_tokens
                .as_ref()
                .map(|o| Self::merge_array(&self.editor_tokens, o))
                .unwrap_or_else(|| self.editor_tokens.clone()),
        }
    }

    /// Apply global config onto defaults: arrays REPLACE.
    pub fn apply_global(&self, global: &RawServerConfig) -> Self {
        Self {
            bind: global.bind.clone().unwrap_or_else(|| self.bind.clone()),
            editor_tokens: global
                .editor_tokens
                .clone()
                .unwrap_or_else(|| self.editor_tokens.clone()),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub site_url: Option<String>,
    pub store_path: Option<PathBuf>,
    pub permalink_bases: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub server: RawServerConfig,
}

/// Unified configuration for taxnav.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Site root prepended to term addresses
    pub site_url: String,
    /// JSON term catalog (default: <data dir>/terms.json)
    pub store_path: PathBuf,
    /// URL path segment per taxonomy
    pub permalink_bases: BTreeMap<String, String>,
    pub server: ServerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: "http://localhost".into(),
            store_path: default_store_path(),
            permalink_bases: BTreeMap::from([
                ("category".to_string(), "category".to_string()),
                ("post_tag".to_string(), "tag".to_string()),
            ]),
            server: ServerConfig::default(),
        }
    }
}

fn default_store_path() -> PathBuf {
    ProjectDirs::from("", "", "taxnav")
        .map(|dirs| dirs.data_dir().join("terms.json"))
        .unwrap_or_else(|| PathBuf::from("~/.local/share/taxnav/terms.json"))
}

/// Get the XDG config directory for taxnav.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taxnav").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("taxnav.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".taxnav.toml")
}

/// Expand `~`, `$VAR` and `${VAR}`; unexpandable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.store_path.to_string_lossy().as_ref());
        self.store_path = PathBuf::from(expanded);
    }

    /// Merge local config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Permalink bases: overlay entries added or replaced per taxonomy
    /// - Token list: union merge with negation support
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut permalink_bases = self.permalink_bases.clone();
        if let Some(bases) = &overlay.permalink_bases {
            permalink_bases.extend(bases.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self {
            site_url: overlay
                .site_url
                .clone()
                .unwrap_or_else(|| self.site_url.clone()),
            store_path: overlay
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            permalink_bases,
            server: self.server.merge(&overlay.server),
        }
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays and maps.
    fn apply_global(&self, global: &RawSettings) -> Self {
        Self {
            site_url: global
                .site_url
                .clone()
                .unwrap_or_else(|| self.site_url.clone()),
            store_path: global
                .store_path
                .clone()
                .unwrap_or_else(|| self.store_path.clone()),
            permalink_bases: global
                .permalink_bases
                .clone()
                .unwrap_or_else(|| self.permalink_bases.clone()),
            server: self.server.apply_global(&global.server),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/taxnav/taxnav.toml` (arrays REPLACE defaults)
    /// 3. Local config: `<project_dir>/.taxnav.toml` (arrays UNION with global)
    /// 4. Environment variables: `TAXNAV_*` prefix (REPLACES - explicit override)
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(global_config_path().as_deref(), project_dir)
    }

    /// Load with an explicit global config location.
    pub fn load_layers(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                let raw = load_raw_settings(global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if local_path.exists() {
                debug!("local config: {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply TAXNAV_* environment variables as explicit overrides.
    ///
    /// Env vars replace values (not merge) - they are explicit user overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("TAXNAV")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.editor_tokens")
                .try_parsing(false),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("site_url") {
            settings.site_url = val;
        }
        if let Ok(val) = config.get_string("store_path") {
            settings.store_path = PathBuf::from(val);
        }
        if let Ok(table) = config.get_table("permalink_bases") {
            for (taxonomy, base) in table {
                if let Ok(base) = base.into_string() {
                    settings.permalink_bases.insert(taxonomy, base);
                }
            }
        }
        if let Ok(val) = config.get_string("server.bind") {
            settings.server.bind = val;
        }
        if let Ok(val) = config.get::<Vec<String>>("server.editor_tokens") {
            settings.server.editor_tokens = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# taxnav configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/taxnav/taxnav.toml  (defines your baseline)
#   Local:  <project_dir>/.taxnav.toml    (project-specific additions)
#   Env:    TAXNAV_* environment variables (explicit overrides)
#           e.g. TAXNAV_SERVER__EDITOR_TOKENS=tok1,tok2
#
# Array Merge Semantics:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global. Use "!item" to REMOVE an inherited item:
#     editor_tokens = ["new-token", "!old-token"]

# Site root prepended to term addresses
# site_url = "http://localhost"

# JSON term catalog read on every query
# store_path = "~/.local/share/taxnav/terms.json"

[permalink_bases]
# URL path segment per taxonomy (default: the taxonomy's rewrite base or name)
# category = "category"
# post_tag = "tag"

[server]
# Listen address of `taxnav serve`
# bind = "127.0.0.1:8787"

# Bearer tokens allowed to fetch terms (content-edit capability)
# editor_tokens = []
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
