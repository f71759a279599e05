//! Script segmentation.
//!
//! Pure text transformation: document -> two seasons -> numbered episodes ->
//! ordered scenes. Nothing here touches the filesystem; persistence is done
//! by the orchestrator using the identifiers on the returned tree.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use thiserror::Error;

use crate::config::Markers;
use crate::domain::{Episode, Scene, Season, Segmentation};

/// First run of digits inside an episode heading
static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid digits regex"));

/// Segmentation errors
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("Season marker '{marker}' not found in document")]
    MarkerNotFound { marker: String },

    #[error("Season marker cannot be empty")]
    EmptyMarker,

    #[error("Invalid {kind} pattern '{pattern}': {source}")]
    InvalidPattern {
        kind: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Episode heading '{heading}' contains no number")]
    MissingEpisodeNumber { heading: String },
}

/// Compiled structural markers
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub season_marker: String,
    pub episode_heading: Regex,
    pub scene_heading: Regex,
    pub scene_boundary: char,
}

impl PatternSet {
    pub fn new(
        season_marker: &str,
        episode_pattern: &str,
        scene_pattern: &str,
        scene_boundary: char,
    ) -> Result<Self, SegmentError> {
        if season_marker.is_empty() {
            return Err(SegmentError::EmptyMarker);
        }

        Ok(Self {
            season_marker: season_marker.to_string(),
            episode_heading: compile("episode", episode_pattern)?,
            scene_heading: compile("scene", scene_pattern)?,
            scene_boundary,
        })
    }

    pub fn from_markers(markers: &Markers) -> Result<Self, SegmentError> {
        Self::new(
            &markers.season,
            &markers.episode,
            &markers.scene,
            markers.scene_boundary,
        )
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::from_markers(&Markers::default()).expect("Invalid default markers")
    }
}

fn compile(kind: &'static str, pattern: &str) -> Result<Regex, SegmentError> {
    Regex::new(pattern).map_err(|source| SegmentError::InvalidPattern {
        kind,
        pattern: pattern.to_string(),
        source,
    })
}

/// Split a document at the first occurrence of `marker`.
///
/// Season 1 is everything before the marker; season 2 starts at the marker
/// (inclusive). Both are trimmed.
pub fn split_seasons<'a>(document: &'a str, marker: &str) -> Result<(&'a str, &'a str), SegmentError> {
    if marker.is_empty() {
        return Err(SegmentError::EmptyMarker);
    }

    let at = document
        .find(marker)
        .ok_or_else(|| SegmentError::MarkerNotFound {
            marker: marker.to_string(),
        })?;

    Ok((document[..at].trim(), document[at..].trim()))
}

/// An episode block before scene splitting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeBlock<'a> {
    pub number: String,
    pub heading: &'a str,
    pub text: &'a str,
}

/// Split a season into episodes at each heading match.
///
/// Text before the first heading is dropped. A repeated episode number
/// replaces the earlier block at its original position (last write wins).
pub fn split_episodes<'a>(season_text: &'a str, heading: &Regex) -> Result<Vec<EpisodeBlock<'a>>, SegmentError> {
    let mut found: Vec<(usize, usize, String)> = Vec::new();
    for caps in heading.captures_iter(season_text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.is_empty() {
            continue;
        }
        let number = episode_number(&caps).ok_or_else(|| SegmentError::MissingEpisodeNumber {
            heading: whole.as_str().to_string(),
        })?;
        found.push((whole.start(), whole.end(), number));
    }

    let mut blocks: Vec<EpisodeBlock<'a>> = Vec::new();
    for (i, (start, end, number)) in found.iter().enumerate() {
        let body_end = found.get(i + 1).map(|next| next.0).unwrap_or(season_text.len());
        let block = EpisodeBlock {
            number: number.clone(),
            heading: season_text[*start..*end].trim(),
            text: season_text[*end..body_end].trim(),
        };

        match blocks.iter_mut().find(|b| b.number == block.number) {
            Some(existing) => *existing = block,
            None => blocks.push(block),
        }
    }

    Ok(blocks)
}

/// Episode number: first capture group, or the first digit run in the heading
fn episode_number(caps: &Captures<'_>) -> Option<String> {
    if let Some(group) = caps.get(1) {
        return Some(group.as_str().to_string());
    }
    let whole = caps.get(0)?.as_str();
    DIGITS.find(whole).map(|m| m.as_str().to_string())
}

/// Split an episode into scenes.
///
/// Each scene is a heading match followed by everything up to the next
/// `boundary` character or the end of the text, trimmed. Scenes come back in
/// source order; text without any heading yields no scenes.
pub fn split_scenes<'a>(episode_text: &'a str, heading: &Regex, boundary: char) -> Vec<&'a str> {
    let mut scenes = Vec::new();
    let mut pos = 0;

    while pos <= episode_text.len() {
        let Some(m) = heading.find_at(episode_text, pos) else {
            break;
        };

        let body_end = episode_text[m.end()..]
            .find(boundary)
            .map(|offset| m.end() + offset)
            .unwrap_or(episode_text.len());

        if body_end <= pos {
            // Empty match right at a boundary; step over one character
            match episode_text[pos..].chars().next() {
                Some(c) => pos += c.len_utf8(),
                None => break,
            }
            continue;
        }

        scenes.push(episode_text[m.start()..body_end].trim());
        pos = body_end;
    }

    scenes
}

/// Segment a whole document into seasons, episodes and scenes
pub fn segment(document: &str, patterns: &PatternSet) -> Result<Segmentation, SegmentError> {
    let (first, second) = split_seasons(document, &patterns.season_marker)?;

    Ok(Segmentation {
        seasons: [
            segment_season(1, first, patterns)?,
            segment_season(2, second, patterns)?,
        ],
    })
}

fn segment_season(number: u8, text: &str, patterns: &PatternSet) -> Result<Season, SegmentError> {
    let mut season = Season::new(number, text.to_string());

    for block in split_episodes(text, &patterns.episode_heading)? {
        let scenes = split_scenes(block.text, &patterns.scene_heading, patterns.scene_boundary)
            .into_iter()
            .enumerate()
            .map(|(i, scene)| Scene {
                episode: block.number.clone(),
                index: i + 1,
                text: scene.to_string(),
            })
            .collect();

        season.insert_episode(Episode {
            number: block.number,
            heading: block.heading.to_string(),
            text: block.text.to_string(),
            scenes,
        });
    }

    Ok(season)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "SEASON 1\nEPISODE 1\n[SCHOOL] ERIN: Hi.\n\nSEASON 2\nEPISODE 1\n[KITCHEN] MARY: Tea?\nGERRY: Aye.\n[CAR] ORLA: Vroom.\nEPISODE 2\n[BEACH] CLARE: Cold.\n";

    #[test]
    fn test_split_seasons() {
        let (first, second) = split_seasons(SCRIPT, "SEASON 2").unwrap();
        assert!(first.starts_with("SEASON 1"));
        assert!(first.ends_with("ERIN: Hi."));
        assert!(second.starts_with("SEASON 2"));
        assert!(second.ends_with("CLARE: Cold."));
    }

    #[test]
    fn test_split_seasons_uses_first_marker() {
        let (first, second) = split_seasons("a SEASON 2 b SEASON 2 c", "SEASON 2").unwrap();
        assert_eq!(first, "a");
        assert_eq!(second, "SEASON 2 b SEASON 2 c");
    }

    #[test]
    fn test_missing_marker() {
        let result = split_seasons("no marker here", "SEASON 2");
        assert!(matches!(result, Err(SegmentError::MarkerNotFound { .. })));

        let result = split_seasons("", "SEASON 2");
        assert!(matches!(result, Err(SegmentError::MarkerNotFound { .. })));
    }

    #[test]
    fn test_split_episodes() {
        let patterns = PatternSet::default();
        let season = "SEASON 2\nEPISODE 1\nfirst body\nEPISODE 2\n\nsecond body\n";
        let blocks = split_episodes(season, &patterns.episode_heading).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].number, "1");
        assert_eq!(blocks[0].heading, "EPISODE 1");
        assert_eq!(blocks[0].text, "first body");
        assert_eq!(blocks[1].number, "2");
        assert_eq!(blocks[1].text, "second body");
    }

    #[test]
    fn test_duplicate_episode_last_write_wins() {
        let patterns = PatternSet::default();
        let season = "EPISODE 1\nold\nEPISODE 2\nmiddle\nEPISODE 1\nnew";
        let blocks = split_episodes(season, &patterns.episode_heading).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].number, "1");
        assert_eq!(blocks[0].text, "new");
        assert_eq!(blocks[1].text, "middle");
    }

    #[test]
    fn test_episode_number_without_capture_group() {
        let heading = Regex::new(r"Episode\s+\d+").unwrap();
        let blocks = split_episodes("Episode 07\nbody", &heading).unwrap();
        assert_eq!(blocks[0].number, "07");
    }

    #[test]
    fn test_episode_heading_without_number() {
        let heading = Regex::new(r"EPISODE [A-Z]+").unwrap();
        let result = split_episodes("EPISODE ONE\nbody", &heading);
        assert!(matches!(result, Err(SegmentError::MissingEpisodeNumber { .. })));
    }

    #[test]
    fn test_split_scenes_in_order() {
        let patterns = PatternSet::default();
        let text = "[KITCHEN] MARY: Tea?\nGERRY: Aye.\n[CAR] ORLA: Vroom.\n[SHOP]\n";
        let scenes = split_scenes(text, &patterns.scene_heading, '[');

        assert_eq!(
            scenes,
            vec!["[KITCHEN] MARY: Tea?\nGERRY: Aye.", "[CAR] ORLA: Vroom.", "[SHOP]"]
        );
    }

    #[test]
    fn test_split_scenes_without_headings() {
        let patterns = PatternSet::default();
        assert!(split_scenes("just prose", &patterns.scene_heading, '[').is_empty());
        assert!(split_scenes("", &patterns.scene_heading, '[').is_empty());
    }

    #[test]
    fn test_text_before_first_heading_dropped() {
        let patterns = PatternSet::default();
        let scenes = split_scenes("cold open\n[HALL] hi", &patterns.scene_heading, '[');
        assert_eq!(scenes, vec!["[HALL] hi"]);
    }

    #[test]
    fn test_unclosed_bracket_ends_scene() {
        let patterns = PatternSet::default();
        let scenes = split_scenes("[A] one [b two", &patterns.scene_heading, '[');
        assert_eq!(scenes, vec!["[A] one"]);
    }

    #[test]
    fn test_multiline_heading() {
        let patterns = PatternSet::default();
        let scenes = split_scenes("[INT.\nHOUSE] body", &patterns.scene_heading, '[');
        assert_eq!(scenes, vec!["[INT.\nHOUSE] body"]);
    }

    #[test]
    fn test_segment_full_document() {
        let patterns = PatternSet::default();
        let segmentation = segment(SCRIPT, &patterns).unwrap();

        let season1 = segmentation.season(1).unwrap();
        assert_eq!(season1.episodes.len(), 1);
        assert_eq!(season1.scene_count(), 1);

        let season2 = segmentation.season(2).unwrap();
        assert_eq!(season2.episodes.len(), 2);
        let ep1 = season2.episode("1").unwrap();
        assert_eq!(ep1.scenes.len(), 2);
        assert_eq!(ep1.scenes[0].file_name(), "episode_1_scene_1.txt");
        assert_eq!(ep1.scenes[1].text, "[CAR] ORLA: Vroom.");
        assert_eq!(season2.episode("2").unwrap().scenes[0].id(), "episode_2_scene_1");
    }

    #[test]
    fn test_invalid_pattern() {
        let result = PatternSet::new("SEASON 2", "EPISODE (", r"\[.*?\]", '[');
        assert!(matches!(
            result,
            Err(SegmentError::InvalidPattern { kind: "episode", .. })
        ));
        assert!(matches!(
            PatternSet::new("", r"EPISODE\s+(\d+)", r"\[.*?\]", '['),
            Err(SegmentError::EmptyMarker)
        ));
    }
}
