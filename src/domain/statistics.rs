//! Per-scene statistics and the selection predicate over them.

use serde::{Deserialize, Serialize};

/// Derived record for one scene file.
///
/// Field names double as the `scene_summary.csv` column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneStatistic {
    /// Scene file name, used as the scene identifier
    pub scene_file: String,

    /// Non-empty lines
    pub num_lines: usize,

    /// Distinct speaker labels
    pub num_speakers: usize,
}

impl SceneStatistic {
    pub fn new(scene_file: impl Into<String>, num_lines: usize, num_speakers: usize) -> Self {
        Self {
            scene_file: scene_file.into(),
            num_lines,
            num_speakers,
        }
    }
}

/// Scene filter: line count within `[min_lines, max_lines]` and at least
/// `min_speakers` distinct speakers. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCriterion {
    #[serde(default = "default_min_lines")]
    pub min_lines: usize,

    #[serde(default = "default_max_lines")]
    pub max_lines: usize,

    /// Default 2, i.e. "more than one speaker"
    #[serde(default = "default_min_speakers")]
    pub min_speakers: usize,
}

fn default_min_lines() -> usize {
    15
}
fn default_max_lines() -> usize {
    30
}
fn default_min_speakers() -> usize {
    2
}

impl Default for SelectionCriterion {
    fn default() -> Self {
        Self {
            min_lines: default_min_lines(),
            max_lines: default_max_lines(),
            min_speakers: default_min_speakers(),
        }
    }
}

impl SelectionCriterion {
    pub fn matches(&self, statistic: &SceneStatistic) -> bool {
        (self.min_lines..=self.max_lines).contains(&statistic.num_lines)
            && statistic.num_speakers >= self.min_speakers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds_are_inclusive() {
        let criterion = SelectionCriterion::default();

        assert!(criterion.matches(&SceneStatistic::new("a.txt", 15, 2)));
        assert!(criterion.matches(&SceneStatistic::new("b.txt", 30, 2)));
        assert!(!criterion.matches(&SceneStatistic::new("c.txt", 14, 2)));
        assert!(!criterion.matches(&SceneStatistic::new("d.txt", 31, 2)));
    }

    #[test]
    fn test_single_speaker_rejected() {
        let criterion = SelectionCriterion::default();
        assert!(!criterion.matches(&SceneStatistic::new("a.txt", 20, 1)));
        assert!(!criterion.matches(&SceneStatistic::new("b.txt", 20, 0)));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let criterion: SelectionCriterion = serde_yaml::from_str("max_lines: 50").unwrap();
        assert_eq!(criterion.min_lines, 15);
        assert_eq!(criterion.max_lines, 50);
        assert_eq!(criterion.min_speakers, 2);
    }
}
