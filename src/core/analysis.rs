//! Line and speaker statistics for a scene.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::SceneStatistic;

/// Speaker label at the start of a line: uppercase letter, then letters or
/// spaces, then a colon. Any capitalized phrase before a colon matches, which
/// lets the odd stage direction through as a speaker.
static SPEAKER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][A-Za-z\s]*):").expect("Invalid speaker regex"));

/// Line count and distinct speakers of one scene
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneAnalysis {
    pub line_count: usize,
    pub speakers: BTreeSet<String>,
}

impl SceneAnalysis {
    pub fn speaker_count(&self) -> usize {
        self.speakers.len()
    }

    pub fn into_statistic(self, scene_file: impl Into<String>) -> SceneStatistic {
        SceneStatistic::new(scene_file, self.line_count, self.speakers.len())
    }
}

/// Count non-empty lines and collect speaker labels
pub fn analyze(scene_text: &str) -> SceneAnalysis {
    let mut analysis = SceneAnalysis::default();

    for line in scene_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        analysis.line_count += 1;
        if let Some(name) = speaker_of(line) {
            analysis.speakers.insert(name.to_string());
        }
    }

    analysis
}

/// Speaker label of a trimmed line, if any
pub fn speaker_of(line: &str) -> Option<&str> {
    SPEAKER_PATTERN
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_speakers() {
        let analysis = analyze("JOHN: hi\nMARY: bye\n");
        assert_eq!(analysis.line_count, 2);
        assert_eq!(
            analysis.speakers,
            BTreeSet::from(["JOHN".to_string(), "MARY".to_string()])
        );
    }

    #[test]
    fn test_blank_lines_ignored_and_speakers_deduplicated() {
        let text = "[KITCHEN]\n\n  ERIN: Mammy?  \n\nMA MALLON: What?\nERIN: Nothing.\n   \n";
        let analysis = analyze(text);

        assert_eq!(analysis.line_count, 4);
        assert_eq!(analysis.speaker_count(), 2);
        assert!(analysis.speakers.contains("MA MALLON"));
    }

    #[test]
    fn test_non_speaker_lines() {
        assert_eq!(speaker_of("(they leave)"), None);
        assert_eq!(speaker_of("erin: lowercase"), None);
        assert_eq!(speaker_of("SISTER MICHAEL : Girls."), Some("SISTER MICHAEL"));
        // Capitalized phrase before a colon counts as a speaker
        assert_eq!(speaker_of("Later that day: school"), Some("Later that day"));
        assert_eq!(speaker_of("DR. SMITH: hi"), None);
    }

    #[test]
    fn test_into_statistic() {
        let stat = analyze("A: x\nB: y\nz").into_statistic("episode_1_scene_1.txt");
        assert_eq!(stat, SceneStatistic::new("episode_1_scene_1.txt", 3, 2));
    }

    #[test]
    fn test_empty_scene() {
        let analysis = analyze("");
        assert_eq!(analysis.line_count, 0);
        assert!(analysis.speakers.is_empty());
    }
}
