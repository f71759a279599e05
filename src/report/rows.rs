//! CSV row types. Field names are the column names.

use serde::{Deserialize, Serialize};

use super::CsvRecord;

/// Summary of one selected scene (`summaries.csv`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub scene_file: String,
    pub summary: String,
}

impl CsvRecord for SummaryRow {
    const HEADERS: &'static [&'static str] = &["scene_file", "summary"];
}

/// One externally generated scene.
///
/// `scene_file` is optional; without it rows can only be matched to
/// original files by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedScene {
    #[serde(default)]
    pub scene_file: Option<String>,
    pub scene: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub num_lines: Option<usize>,
}

impl CsvRecord for GeneratedScene {
    const HEADERS: &'static [&'static str] = &["scene_file", "scene", "summary", "num_lines"];
}

/// Overview of cleaned generated scenes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedOverviewRow {
    /// 1-based row number in the generated scenes CSV
    pub scene_number: usize,
    pub filename: String,
    pub summary: String,
    pub num_lines_after_cleaning: usize,
    pub num_lines_original: Option<usize>,
}

impl CsvRecord for GeneratedOverviewRow {
    const HEADERS: &'static [&'static str] = &[
        "scene_number",
        "filename",
        "summary",
        "num_lines_after_cleaning",
        "num_lines_original",
    ];
}

/// An overview row extended with the generated and human-written text of
/// the same scene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub scene_number: usize,
    pub filename: String,
    pub summary: String,
    pub num_lines_after_cleaning: usize,
    pub num_lines_original: Option<usize>,
    pub llm_scene: String,
    /// Empty when the human scene file is missing
    pub human_scene: String,
}

impl ComparisonRow {
    pub fn new(overview: GeneratedOverviewRow, llm_scene: String, human_scene: String) -> Self {
        Self {
            scene_number: overview.scene_number,
            filename: overview.filename,
            summary: overview.summary,
            num_lines_after_cleaning: overview.num_lines_after_cleaning,
            num_lines_original: overview.num_lines_original,
            llm_scene,
            human_scene,
        }
    }
}

impl CsvRecord for ComparisonRow {
    const HEADERS: &'static [&'static str] = &[
        "scene_number",
        "filename",
        "summary",
        "num_lines_after_cleaning",
        "num_lines_original",
        "llm_scene",
        "human_scene",
    ];
}
