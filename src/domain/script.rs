//! Structural units of a script.
//!
//! A document splits into exactly two seasons, each season into numbered
//! episodes, each episode into an ordered list of scenes. Every unit owns
//! its text; nothing is shared between branches of the tree.

/// Identifier used for scene files: `episode_<n>_scene_<i>`
pub fn scene_id(episode: &str, index: usize) -> String {
    format!("episode_{}_scene_{}", episode, index)
}

/// A scene inside an episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// Episode number the scene belongs to
    pub episode: String,

    /// 1-indexed position within the episode
    pub index: usize,

    /// Scene text, starting with its bracketed heading
    pub text: String,
}

impl Scene {
    pub fn id(&self) -> String {
        scene_id(&self.episode, self.index)
    }

    pub fn file_name(&self) -> String {
        format!("{}.txt", self.id())
    }
}

/// A numbered episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Episode {
    /// Number extracted from the heading, as written (leading zeros kept)
    pub number: String,

    /// Heading text as it appeared in the script (e.g. "EPISODE 3")
    pub heading: String,

    /// Episode body without the heading
    pub text: String,

    /// Scenes in source order
    pub scenes: Vec<Scene>,
}

impl Episode {
    pub fn file_name(&self) -> String {
        format!("episode_{}.txt", self.number)
    }

    /// Episode file content: heading line followed by the body
    pub fn render(&self) -> String {
        format!("{}\n{}", self.heading, self.text)
    }
}

/// One of the two seasons of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Season {
    pub number: u8,
    pub text: String,
    /// Episodes in order of first appearance
    pub episodes: Vec<Episode>,
}

impl Season {
    pub fn new(number: u8, text: String) -> Self {
        Self {
            number,
            text,
            episodes: Vec::new(),
        }
    }

    pub fn file_name(&self) -> String {
        format!("season_{}.txt", self.number)
    }

    /// Insert an episode; a repeated number replaces the earlier one in place
    pub fn insert_episode(&mut self, episode: Episode) {
        if let Some(existing) = self
            .episodes
            .iter_mut()
            .find(|e| e.number == episode.number)
        {
            *existing = episode;
        } else {
            self.episodes.push(episode);
        }
    }

    pub fn episode(&self, number: &str) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.number == number)
    }

    /// All scenes of the season, episode by episode
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.episodes.iter().flat_map(|e| e.scenes.iter())
    }

    pub fn scene_count(&self) -> usize {
        self.episodes.iter().map(|e| e.scenes.len()).sum()
    }
}

/// Result of segmenting a whole document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segmentation {
    pub seasons: [Season; 2],
}

impl Segmentation {
    /// Look up a season by its 1-based number
    pub fn season(&self, number: u8) -> Option<&Season> {
        self.seasons.iter().find(|s| s.number == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(number: &str, text: &str) -> Episode {
        Episode {
            number: number.to_string(),
            heading: format!("EPISODE {}", number),
            text: text.to_string(),
            scenes: Vec::new(),
        }
    }

    #[test]
    fn test_scene_file_name() {
        let scene = Scene {
            episode: "4".to_string(),
            index: 10,
            text: "[KITCHEN]".to_string(),
        };
        assert_eq!(scene.id(), "episode_4_scene_10");
        assert_eq!(scene.file_name(), "episode_4_scene_10.txt");
    }

    #[test]
    fn test_duplicate_episode_replaces_in_place() {
        let mut season = Season::new(2, String::new());
        season.insert_episode(episode("1", "first"));
        season.insert_episode(episode("2", "second"));
        season.insert_episode(episode("1", "again"));

        assert_eq!(season.episodes.len(), 2);
        assert_eq!(season.episodes[0].number, "1");
        assert_eq!(season.episodes[0].text, "again");
        assert_eq!(season.episode("2").unwrap().text, "second");
    }

    #[test]
    fn test_episode_render() {
        let ep = episode("3", "[PUB] Hello");
        assert_eq!(ep.render(), "EPISODE 3\n[PUB] Hello");
        assert_eq!(ep.file_name(), "episode_3.txt");
    }
}
