//! Character co-occurrence counting and character-covering chunk sampling.
//!
//! Character detection is plain case-sensitive substring containment: "Erin"
//! matches inside "Erin's" and inside any longer word containing it.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

/// Characters (from `characters`, in that order) whose name occurs in `scene`
pub fn detect_characters<'a>(scene: &str, characters: &'a [String]) -> Vec<&'a str> {
    characters
        .iter()
        .filter(|name| scene.contains(name.as_str()))
        .map(String::as_str)
        .collect()
}

/// Number of scenes each character appears in; a character counts at most
/// once per scene. Characters never seen map to 0.
pub fn count_character_scenes<S: AsRef<str>>(scenes: &[S], characters: &[String]) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = characters.iter().map(|c| (c.clone(), 0)).collect();

    for scene in scenes {
        let present: HashSet<&str> = detect_characters(scene.as_ref(), characters).into_iter().collect();
        for name in present {
            if let Some(count) = counts.get_mut(name) {
                *count += 1;
            }
        }
    }

    counts
}

/// One line of the character report
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterCount {
    pub name: String,
    pub scenes: usize,
    /// Share of all scenes, 0.0 when there are no scenes
    pub percentage: f64,
}

/// Co-occurrence report in character order
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterReport {
    pub total_scenes: usize,
    pub entries: Vec<CharacterCount>,
}

pub fn character_report<S: AsRef<str>>(scenes: &[S], characters: &[String]) -> CharacterReport {
    let counts = count_character_scenes(scenes, characters);
    let total_scenes = scenes.len();

    let entries = characters
        .iter()
        .map(|name| {
            let scenes = counts.get(name).copied().unwrap_or(0);
            CharacterCount {
                name: name.clone(),
                scenes,
                percentage: percentage(scenes, total_scenes),
            }
        })
        .collect();

    CharacterReport {
        total_scenes,
        entries,
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// A word-budgeted text chunk built from whole scenes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    /// Whitespace-separated tokens across the included scenes
    pub words: usize,
    pub scenes: usize,
}

/// Build a chunk that covers every character where possible.
///
/// For each character in order, the first scene mentioning them that has not
/// been taken yet is put up front; scenes are "taken" by exact text, so two
/// identical scenes count as one. The remaining scenes follow in random order.
/// Scenes are added until the next one would push the word count past
/// `max_words`.
pub fn sample_chunk<S, R>(scenes: &[S], characters: &[String], max_words: usize, rng: &mut R) -> Chunk
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut taken: HashSet<&str> = HashSet::new();
    let mut ordered: Vec<&str> = Vec::new();

    for name in characters {
        let pick = scenes
            .iter()
            .map(AsRef::as_ref)
            .find(|scene| scene.contains(name.as_str()) && !taken.contains(scene));
        if let Some(scene) = pick {
            taken.insert(scene);
            ordered.push(scene);
        }
    }

    let mut remaining: Vec<&str> = scenes
        .iter()
        .map(AsRef::as_ref)
        .filter(|scene| !taken.contains(scene))
        .collect();
    remaining.shuffle(rng);
    ordered.extend(remaining);

    let mut included: Vec<&str> = Vec::new();
    let mut words = 0;
    for scene in ordered {
        let scene_words = scene.split_whitespace().count();
        if words + scene_words > max_words {
            break;
        }
        included.push(scene);
        words += scene_words;
    }

    Chunk {
        text: included.join("\n\n").trim().to_string(),
        words,
        scenes: included.len(),
    }
}
