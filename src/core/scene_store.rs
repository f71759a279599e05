//! Directory-backed storage of text files (seasons, episodes, scenes).
//!
//! Every stage reads and writes whole files; re-running a stage overwrites
//! its earlier output in place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

/// A directory of `.txt` files addressed by file name
#[derive(Debug, Clone)]
pub struct SceneStore {
    dir: PathBuf,
}

impl SceneStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    /// Create the directory (and parents) if missing
    pub async fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))
    }

    /// `.txt` file names in the directory, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/*.txt",
            glob::Pattern::escape(&self.dir.to_string_lossy())
        );

        let mut names = Vec::new();
        for entry in glob::glob(&pattern).context("Invalid scene file pattern")? {
            let path = entry.context("Failed to read directory entry")?;
            if !path.is_file() {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Read a file as UTF-8, replacing invalid sequences
    pub async fn read(&self, name: &str) -> Result<String> {
        read_text_lossy(&self.path_of(name)).await
    }

    pub async fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path_of(name);
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        Ok(path)
    }

    /// Copy `name` into `target`, overwriting any existing copy
    pub async fn copy_to(&self, name: &str, target: &SceneStore) -> Result<PathBuf> {
        let from = self.path_of(name);
        let to = target.path_of(name);
        fs::copy(&from, &to)
            .await
            .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))?;
        Ok(to)
    }
}

/// Read a text file, replacing invalid UTF-8 sequences
pub async fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
