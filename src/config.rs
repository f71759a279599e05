//! Configuration for scenecut.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SCENECUT_INPUT, SCENECUT_OUTPUT)
//! 2. Config file (.scenecut/config.yaml, or `--config <path>`)
//! 3. Defaults (data/script.txt -> data_output/)
//!
//! Config file discovery:
//! - Searches current directory and parents for .scenecut/config.yaml
//! - Falls back to the user config directory (scenecut/config.yaml)
//! - Paths in config file are relative to the project root (parent of .scenecut/)
//!
//! The resolved [`Config`] is passed explicitly to every stage; there is no
//! process-wide configuration state.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::Limits;
use crate::domain::SelectionCriterion;

pub mod paths;

pub use paths::OutputLayout;

/// Environment variable overriding the script path
pub const ENV_INPUT: &str = "SCENECUT_INPUT";

/// Environment variable overriding the output root
pub const ENV_OUTPUT: &str = "SCENECUT_OUTPUT";

/// Characters tracked by the co-occurrence report and the sampler
pub const DEFAULT_CHARACTERS: &[&str] = &[
    "Erin",
    "Mary",
    "Orla",
    "Gerry",
    "Michelle",
    "James",
    "Clare",
    "Sister Michael",
];

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Season the scene stages operate on (1 or 2)
    pub target_season: Option<u8>,
    #[serde(default)]
    pub markers: Markers,
    #[serde(default)]
    pub selection: SelectionCriterion,
    pub characters: Option<Vec<String>>,
    #[serde(default)]
    pub summarizer: SummarizerSettings,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub sampling: SamplingSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Raw script file (relative to project root)
    pub script: Option<String>,
    /// Output root (relative to project root)
    pub output: Option<String>,
    /// Externally generated scenes CSV (relative to project root)
    pub generated_scenes: Option<String>,
}

/// Structural markers used to segment the script
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Markers {
    /// Literal marker that opens the second season
    #[serde(default = "default_season_marker")]
    pub season: String,

    /// Episode heading regex; the first capture group (or first digit run) is the number
    #[serde(default = "default_episode_pattern")]
    pub episode: String,

    /// Scene heading regex
    #[serde(default = "default_scene_pattern")]
    pub scene: String,

    /// Character that ends a scene body
    #[serde(default = "default_scene_boundary")]
    pub scene_boundary: char,
}

pub(crate) fn default_season_marker() -> String {
    "SEASON 2".to_string()
}
pub(crate) fn default_episode_pattern() -> String {
    r"EPISODE\s+(\d+)".to_string()
}
pub(crate) fn default_scene_pattern() -> String {
    r"(?s)\[.*?\]".to_string()
}
pub(crate) fn default_scene_boundary() -> char {
    '['
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            season: default_season_marker(),
            episode: default_episode_pattern(),
            scene: default_scene_pattern(),
            scene_boundary: default_scene_boundary(),
        }
    }
}

/// External summarizer command
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummarizerSettings {
    /// Program to spawn (default: fabric)
    #[serde(default = "default_summarizer_program")]
    pub program: String,

    /// Arguments passed to the program
    #[serde(default = "default_summarizer_args")]
    pub args: Vec<String>,
}

fn default_summarizer_program() -> String {
    "fabric".to_string()
}
fn default_summarizer_args() -> Vec<String> {
    vec!["-p".to_string(), "summarize".to_string()]
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            program: default_summarizer_program(),
            args: default_summarizer_args(),
        }
    }
}

/// Character chunk sampling
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SamplingSettings {
    /// Word budget for the chunk (default: 1500)
    #[serde(default = "default_sample_words")]
    pub max_words: usize,

    /// Fixed RNG seed for reproducible chunks
    pub seed: Option<u64>,
}

fn default_sample_words() -> usize {
    1500
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            max_words: default_sample_words(),
            seed: None,
        }
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw script file
    pub script: PathBuf,
    /// Output root directory
    pub output: PathBuf,
    /// Externally generated scenes CSV
    pub generated_scenes: PathBuf,
    pub target_season: u8,
    pub markers: Markers,
    pub selection: SelectionCriterion,
    pub characters: Vec<String>,
    pub summarizer: SummarizerSettings,
    pub limits: Limits,
    pub sampling: SamplingSettings,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// An explicit path must exist; otherwise the file is discovered.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;

        let config_file = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => find_config_file(&cwd),
        };

        let parsed = match config_file {
            Some(ref path) => Some(load_config_file(path)?),
            None => None,
        };

        Self::resolve(
            parsed,
            config_file,
            &cwd,
            std::env::var(ENV_INPUT).ok(),
            std::env::var(ENV_OUTPUT).ok(),
        )
    }

    /// Build a configuration rooted at `base` with default settings
    pub fn with_root(base: &Path) -> Self {
        Self {
            script: base.join("data").join("script.txt"),
            output: base.join("data_output"),
            generated_scenes: base.join("data_output").join("generated_scenes.csv"),
            target_season: 2,
            markers: Markers::default(),
            selection: SelectionCriterion::default(),
            characters: DEFAULT_CHARACTERS.iter().map(|c| c.to_string()).collect(),
            summarizer: SummarizerSettings::default(),
            limits: Limits::default(),
            sampling: SamplingSettings::default(),
            config_file: None,
        }
    }

    /// Merge a parsed config file and environment overrides over the defaults
    fn resolve(
        file: Option<ConfigFile>,
        config_path: Option<PathBuf>,
        cwd: &Path,
        env_input: Option<String>,
        env_output: Option<String>,
    ) -> Result<Self> {
        // Base directory is the parent of .scenecut/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .as_deref()
            .and_then(|p| p.parent())
            .and_then(|p| p.parent())
            .unwrap_or(cwd)
            .to_path_buf();

        let mut config = Self::with_root(&base_dir);
        config.config_file = config_path;
        let mut explicit_generated = false;

        if let Some(file) = file {
            if let Some(ref script) = file.paths.script {
                config.script = resolve_path(&base_dir, script);
            }
            if let Some(ref output) = file.paths.output {
                config.output = resolve_path(&base_dir, output);
                config.generated_scenes = config.output.join("generated_scenes.csv");
            }
            if let Some(ref generated) = file.paths.generated_scenes {
                config.generated_scenes = resolve_path(&base_dir, generated);
                explicit_generated = true;
            }
            if let Some(season) = file.target_season {
                config.target_season = season;
            }
            if let Some(characters) = file.characters {
                config.characters = characters;
            }
            config.markers = file.markers;
            config.selection = file.selection;
            config.summarizer = file.summarizer;
            config.limits = file.limits;
            config.sampling = file.sampling;
        }

        if let Some(input) = env_input {
            config.script = PathBuf::from(input);
        }
        if let Some(output) = env_output {
            config.output = PathBuf::from(output);
            if !explicit_generated {
                config.generated_scenes = config.output.join("generated_scenes.csv");
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings no stage can work with
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.target_season, 1 | 2) {
            anyhow::bail!(
                "target_season must be 1 or 2, got {}",
                self.target_season
            );
        }
        if self.markers.season.is_empty() {
            anyhow::bail!("Season marker cannot be empty");
        }
        if self.selection.min_lines > self.selection.max_lines {
            anyhow::bail!(
                "selection.min_lines ({}) is greater than selection.max_lines ({})",
                self.selection.min_lines,
                self.selection.max_lines
            );
        }
        Ok(())
    }

    /// Output directory layout rooted at `output`
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.output)
    }
}

/// Find config file by searching `start` and its parents, then the user config dir
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".scenecut").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("scenecut").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
