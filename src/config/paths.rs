//! Canonical output layout.
//!
//! Single source of truth for where each stage reads and writes. Import this
//! instead of joining path fragments by hand.
//!
//! ## Layout
//!
//! | Location | Written by | Purpose |
//! |----------|------------|---------|
//! | `seasons/season_<n>.txt` | segment | Raw season text |
//! | `season_<n>_episodes/episode_<e>.txt` | segment | Episode text |
//! | `season_<n>_scenes/episode_<e>_scene_<i>.txt` | segment | Scene text |
//! | `scene_summary.csv` | overview | Per-scene statistics |
//! | `data_selected/` | select | Copies of selected scenes |
//! | `summaries.csv` | summarize | Summaries of selected scenes |
//! | `generated_scenes/` | clean-generated | Cleaned generated scenes + overview |
//! | `comparison/overview.csv` | compare | Generated vs. human scenes |
//! | `season_<n>_chunk.txt` | sample | Character-covering text chunk |
//! | `runs/<run-id>/events.jsonl` | every command | Run log |

use std::path::{Path, PathBuf};

/// Directory layout below the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn seasons_dir(&self) -> PathBuf {
        self.root.join("seasons")
    }

    pub fn season_file(&self, season: u8) -> PathBuf {
        self.seasons_dir().join(format!("season_{}.txt", season))
    }

    pub fn episodes_dir(&self, season: u8) -> PathBuf {
        self.root.join(format!("season_{}_episodes", season))
    }

    pub fn scenes_dir(&self, season: u8) -> PathBuf {
        self.root.join(format!("season_{}_scenes", season))
    }

    pub fn scene_summary_csv(&self) -> PathBuf {
        self.root.join("scene_summary.csv")
    }

    pub fn selected_dir(&self) -> PathBuf {
        self.root.join("data_selected")
    }

    pub fn summaries_csv(&self) -> PathBuf {
        self.root.join("summaries.csv")
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root.join("generated_scenes")
    }

    pub fn generated_overview_csv(&self) -> PathBuf {
        self.generated_dir().join("generated_scene_overview.csv")
    }

    pub fn comparison_csv(&self) -> PathBuf {
        self.root.join("comparison").join("overview.csv")
    }

    pub fn chunk_file(&self, season: u8) -> PathBuf {
        self.root.join(format!("season_{}_chunk.txt", season))
    }

    /// Run log root (one directory per run id)
    pub fn runs_dir(&self) -> PathBuf {
        self.root.join("runs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_scoped_paths() {
        let layout = OutputLayout::new("/out");

        assert_eq!(layout.season_file(2), PathBuf::from("/out/seasons/season_2.txt"));
        assert_eq!(layout.episodes_dir(1), PathBuf::from("/out/season_1_episodes"));
        assert_eq!(layout.scenes_dir(2), PathBuf::from("/out/season_2_scenes"));
        assert_eq!(layout.chunk_file(1), PathBuf::from("/out/season_1_chunk.txt"));
    }

    #[test]
    fn test_report_paths_live_under_root() {
        let layout = OutputLayout::new("/out");

        for path in [
            layout.scene_summary_csv(),
            layout.summaries_csv(),
            layout.generated_overview_csv(),
            layout.comparison_csv(),
            layout.runs_dir(),
        ] {
            assert!(path.starts_with(layout.root()), "{} escapes root", path.display());
        }
        assert!(layout.generated_overview_csv().starts_with(layout.generated_dir()));
    }
}
