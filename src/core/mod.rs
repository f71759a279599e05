//! Core pipeline logic.
//!
//! - Segmenter: season, episode and scene splitting
//! - Analysis, Selector: per-scene statistics and selection
//! - Characters: co-occurrence counts and the chunk sampler
//! - Cleaning: generated-scene cleanup and pairing
//! - Limits: input size and summarizer bounds
//! - RunLog, SceneStore: persistence
//! - Orchestrator: stage execution

pub mod analysis;
pub mod characters;
pub mod cleaning;
pub mod limits;
pub mod orchestrator;
pub mod run_log;
pub mod scene_store;
pub mod segmenter;
pub mod selector;

pub use analysis::{analyze, SceneAnalysis};
pub use characters::{character_report, sample_chunk, CharacterCount, CharacterReport, Chunk};
pub use cleaning::{clean_generated_scene, pair_generated, Pairing, PairingMode};
pub use limits::{LimitViolation, Limits};
pub use orchestrator::{
    CleaningReport, ComparisonReport, Orchestrator, PipelineReport, SeasonCounts, SegmentReport,
    SelectionReport,
};
pub use run_log::{hash_input, stage_key, RunLog};
pub use scene_store::SceneStore;
pub use segmenter::{segment, PatternSet, SegmentError};
pub use selector::select;
