//! Scene selection over per-scene statistics.

use crate::domain::{SceneStatistic, SelectionCriterion};

/// Identifiers of scenes matching `criterion`, in input order.
pub fn select<'a>(statistics: &'a [SceneStatistic], criterion: &SelectionCriterion) -> Vec<&'a str> {
    statistics
        .iter()
        .filter(|stat| criterion.matches(stat))
        .map(|stat| stat.scene_file.as_str())
        .collect()
}
