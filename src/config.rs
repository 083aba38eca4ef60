use crate::domain::version::DEFAULT_STARTING_VERSION;
use crate::domain::{normalize_starting_version, Component};
use crate::error::{ComponentTagError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "./componenttag.toml";

/// File looked up in the user config directory
pub const USER_CONFIG_FILE: &str = ".componenttag.toml";

/// Represents the complete file configuration for component-tag.
///
/// Every value here is a fallback: CLI flags and CI inputs take precedence.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub component: ComponentConfig,

    #[serde(default)]
    pub markers: MarkersConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

/// Component identity defaults
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ComponentConfig {
    pub name: Option<String>,
    pub path: Option<String>,
    pub starting_version: Option<String>,
}

fn default_major_marker() -> String {
    "#major".to_string()
}

fn default_minor_marker() -> String {
    "#minor".to_string()
}

fn default_patch_marker() -> String {
    "#patch".to_string()
}

/// Commit message substrings that select a bump level.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MarkersConfig {
    #[serde(default = "default_major_marker")]
    pub major: String,

    #[serde(default = "default_minor_marker")]
    pub minor: String,

    #[serde(default = "default_patch_marker")]
    pub patch: String,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        MarkersConfig {
            major: default_major_marker(),
            minor: default_minor_marker(),
            patch: default_patch_marker(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_message() -> String {
    "Release {tag}".to_string()
}

/// Configuration for tagging behavior.
///
/// Controls how tags are written and pushed without affecting version derivation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Annotated tag message; `{tag}` and `{version}` are substituted
    #[serde(default = "default_tag_message")]
    pub tag_message: String,

    #[serde(default)]
    pub include_lightweight_tags: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            remote: default_remote(),
            tag_message: default_tag_message(),
            include_lightweight_tags: false,
        }
    }
}

impl BehaviorConfig {
    pub fn render_tag_message(&self, tag: &str, version: &str) -> String {
        self.tag_message
            .replace("{tag}", tag)
            .replace("{version}", version)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `componenttag.toml` in current directory
/// 3. `.componenttag.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        read_config_file(Path::new(path))?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        read_config_file(Path::new(LOCAL_CONFIG_FILE))?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            read_config_file(&config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str)
        .map_err(|e| ComponentTagError::config(format!("Invalid configuration file: {}", e)))
}

fn read_config_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        ComponentTagError::config(format!("Cannot read '{}': {}", path.display(), e))
    })
}

/// Raw input values supplied by the CLI or the CI environment.
///
/// Empty strings count as unset, CI runners export declared inputs even
/// when the workflow leaves them blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputOverrides {
    pub starting_version: Option<String>,
    pub component_name: Option<String>,
    pub component_path: Option<String>,
}

impl InputOverrides {
    /// Read `INPUT_<NAME>` variables the way action runners export them
    pub fn from_env() -> Self {
        InputOverrides {
            starting_version: action_input("starting-version"),
            component_name: action_input("component-name"),
            component_path: action_input("component-path"),
        }
    }

    /// Fill unset values from `fallback`
    pub fn or(self, fallback: InputOverrides) -> Self {
        InputOverrides {
            starting_version: non_empty(self.starting_version)
                .or(non_empty(fallback.starting_version)),
            component_name: non_empty(self.component_name).or(non_empty(fallback.component_name)),
            component_path: non_empty(self.component_path).or(non_empty(fallback.component_path)),
        }
    }
}

/// Look up an action input under its hyphenated and underscored names
pub fn action_input(name: &str) -> Option<String> {
    let upper = name.to_uppercase();
    [
        format!("INPUT_{}", upper),
        format!("INPUT_{}", upper.replace('-', "_")),
    ]
    .iter()
    .filter_map(|key| std::env::var(key).ok())
    .find_map(|value| non_empty(Some(value)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validated parameters for one version derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct DeriveInputs {
    /// Floor version, already stripped of its `v`
    pub starting_version: String,
    pub component: Component,
    pub markers: MarkersConfig,
}

impl DeriveInputs {
    pub fn new(
        starting_version: Option<&str>,
        component_name: &str,
        component_path: &str,
    ) -> Result<Self> {
        Self::resolve(
            InputOverrides {
                starting_version: starting_version.map(str::to_string),
                component_name: Some(component_name.to_string()),
                component_path: Some(component_path.to_string()),
            },
            &Config::default(),
        )
    }

    /// Merge `inputs` over the file configuration and validate.
    ///
    /// Fails when `component-name` or `component-path` is missing.
    pub fn resolve(inputs: InputOverrides, config: &Config) -> Result<Self> {
        let merged = inputs.or(InputOverrides {
            starting_version: config.component.starting_version.clone(),
            component_name: config.component.name.clone(),
            component_path: config.component.path.clone(),
        });

        let component_name = merged
            .component_name
            .ok_or_else(|| ComponentTagError::config("Input required and not supplied: component-name"))?;
        let component_path = merged
            .component_path
            .ok_or_else(|| ComponentTagError::config("Input required and not supplied: component-path"))?;
        let starting_version = normalize_starting_version(
            merged
                .starting_version
                .as_deref()
                .unwrap_or(DEFAULT_STARTING_VERSION),
        );

        Ok(DeriveInputs {
            starting_version,
            component: Component::new(component_name, component_path),
            markers: config.markers.clone(),
        })
    }
}
