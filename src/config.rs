use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::core::flags::parse_flag_spec;
use crate::core::keywords::parse_keyword_spec;
use crate::output::OutputFormat;

pub const CONFIG_FILE_NAME: &str = ".xluarc.json";

pub const DEFAULT_IGNORES: &[&str] = &["**/lua_modules/**", "**/.luarocks/**"];

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default = "default_ignores")]
    pub ignores: Vec<String>,
    /// Extra keyword specs, e.g. `tr:1,2`.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub no_default_keywords: bool,
    /// Extra flag specs, e.g. `log:1:lua-format`.
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub extract_all: bool,
    /// Comment tag to keep; an empty tag keeps every comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_comments: Option<String>,
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub sort_output: bool,
    #[serde(default)]
    pub no_location: bool,
    #[serde(default)]
    pub omit_header: bool,
}

fn default_ignores() -> Vec<String> {
    DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect()
}

fn default_output() -> String {
    "messages.pot".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            ignores: default_ignores(),
            keywords: Vec::new(),
            no_default_keywords: false,
            flags: Vec::new(),
            extract_all: false,
            add_comments: None,
            output: default_output(),
            output_format: OutputFormat::default(),
            sort_output: false,
            no_location: false,
            omit_header: false,
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern, keyword spec or flag spec is
    /// invalid.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        // Patterns without wildcards are literal paths.
        for pattern in &self.includes {
            if pattern.contains('*') || pattern.contains('?') {
                Pattern::new(pattern).with_context(|| {
                    format!("Invalid glob pattern in 'includes': \"{}\"", pattern)
                })?;
            }
        }

        for spec in &self.keywords {
            parse_keyword_spec(spec).context("Invalid entry in 'keywords'")?;
        }
        for spec in &self.flags {
            parse_flag_spec(spec).context("Invalid entry in 'flags'")?;
        }

        Ok(())
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
