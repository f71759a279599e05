//! Domain types for scenecut.
//!
//! - Script: Season, Episode, Scene containment tree
//! - Statistics: per-scene counts and the selection predicate
//! - Events / Run: the run log

pub mod events;
pub mod run;
pub mod script;
pub mod statistics;

pub use events::{Event, EventType, StageStatus};
pub use run::{Run, RunState};
pub use script::{scene_id, Episode, Scene, Season, Segmentation};
pub use statistics::{SceneStatistic, SelectionCriterion};
