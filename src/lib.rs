//! scenecut - TV script segmentation and scene selection
//!
//! Splits a plain-text script into seasons, episodes and scenes, measures
//! each scene (lines, distinct speakers), selects scenes for summarization
//! and prepares generated scenes for side-by-side comparison.
//!
//! # Modules
//!
//! - `core`: Segmentation, statistics, selection and the stage orchestrator
//! - `domain`: Script and run-log data structures
//! - `report`: CSV row types and I/O
//! - `adapters`: External summarizer integration
//! - `config`: Configuration and output layout
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Segment, analyze and select
//! scenecut run
//!
//! # Summarize the selection with an external command
//! scenecut summarize
//!
//! # Inspect a run
//! scenecut status <run-id>
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod report;

pub use config::{Config, OutputLayout};
pub use core::Orchestrator;
pub use domain::{Event, EventType, Run, RunState, SceneStatistic, SelectionCriterion, Segmentation};
