//! Cleaning of externally generated scenes and pairing with original files.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Leading line numbers such as "12.", "3:", "4)" or "5 -"
static LINE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*[.:)\-]\s*").expect("Invalid line number regex"));

/// Drop blank lines, trailing whitespace and leading line numbers.
pub fn clean_generated_scene(scene_text: &str) -> Vec<String> {
    scene_text
        .split('\n')
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(|line| LINE_NUMBER.replace(line, "").into_owned())
        .collect()
}

/// File content for cleaned lines: every line followed by a blank line
pub fn render_cleaned(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{}\n\n", line)).collect()
}

/// Join key for scene file names: lower-cased, `.txt` extension ensured
pub fn normalize_key(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if lower.ends_with(".txt") {
        lower
    } else {
        format!("{}.txt", lower)
    }
}

/// How generated rows were matched to original files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingMode {
    /// Rows carried a scene file name
    Keyed,
    /// Rows were matched by position against the sorted original files
    Positional,
}

/// Outcome of pairing generated rows with original file names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub mode: PairingMode,
    /// (row index, original file name)
    pub pairs: Vec<(usize, String)>,
    /// Human-readable reasons for rows or files left unpaired
    pub warnings: Vec<String>,
}

/// Pair generated rows with original files.
///
/// If any row carries a key, rows are matched by normalized file name and
/// rows without a usable key are skipped. Otherwise rows are matched by
/// position, and a count mismatch is reported but not fatal.
pub fn pair_generated(keys: &[Option<String>], originals: &[String]) -> Pairing {
    if keys.iter().any(|k| k.as_deref().is_some_and(|k| !k.trim().is_empty())) {
        pair_by_key(keys, originals)
    } else {
        pair_by_position(keys.len(), originals)
    }
}

fn pair_by_key(keys: &[Option<String>], originals: &[String]) -> Pairing {
    let by_key: HashMap<String, &String> = originals.iter().map(|f| (normalize_key(f), f)).collect();
    let mut pairs = Vec::new();
    let mut warnings = Vec::new();

    for (idx, key) in keys.iter().enumerate() {
        match key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => match by_key.get(&normalize_key(key)) {
                Some(original) => pairs.push((idx, (*original).clone())),
                None => warnings.push(format!("Row {}: no original scene file for '{}'", idx + 1, key)),
            },
            None => warnings.push(format!("Row {}: missing scene_file, skipped", idx + 1)),
        }
    }

    Pairing {
        mode: PairingMode::Keyed,
        pairs,
        warnings,
    }
}

fn pair_by_position(rows: usize, originals: &[String]) -> Pairing {
    let mut warnings = Vec::new();
    if rows != originals.len() {
        warnings.push(format!(
            "Number of generated scenes ({}) and original files ({}) do not match",
            rows,
            originals.len()
        ));
    }

    Pairing {
        mode: PairingMode::Positional,
        pairs: originals.iter().take(rows).cloned().enumerate().collect(),
        warnings,
    }
}
