//! Stage execution.
//!
//! Wires the pure segmentation, statistics, selection and character logic to
//! the output layout. Stages run one after another; each records its start,
//! warnings and outcome in the run log.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::{CommandSummarizer, Summarizer};
use crate::config::{Config, OutputLayout};
use crate::core::analysis::analyze;
use crate::core::characters::{self, CharacterReport, Chunk};
use crate::core::cleaning::{clean_generated_scene, normalize_key, pair_generated, render_cleaned, PairingMode};
use crate::core::run_log::{stage_key, RunLog};
use crate::core::scene_store::{read_text_lossy, SceneStore};
use crate::core::segmenter::{segment, PatternSet};
use crate::core::selector::select;
use crate::domain::{Event, EventType, SceneStatistic, Segmentation, StageStatus};
use crate::report::{
    read_rows, write_rows, ComparisonRow, GeneratedOverviewRow, GeneratedScene, SummaryRow,
};

/// Episode and scene counts of one season
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonCounts {
    pub season: u8,
    pub episodes: usize,
    pub scenes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReport {
    pub seasons: Vec<SeasonCounts>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    /// Scenes matching the criterion, in overview order
    pub selected: Vec<String>,
    pub copied: Vec<String>,
    /// Selected scenes whose source file was missing
    pub missing: Vec<String>,
    /// `.txt` files now in the selection directory
    pub files_in_target: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleaningReport {
    pub mode: PairingMode,
    pub rows: usize,
    pub written: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonReport {
    pub rows: usize,
    pub missing_human: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub segment: SegmentReport,
    pub scenes_analyzed: usize,
    pub selection: SelectionReport,
    /// Present when the summarize stage ran
    pub summaries: Option<usize>,
}

/// A stage in progress
struct Stage {
    name: &'static str,
    key: String,
    started: Instant,
}

/// Runs pipeline stages for one command invocation
pub struct Orchestrator {
    config: Config,
    layout: OutputLayout,
    patterns: PatternSet,
    summarizer: Option<Box<dyn Summarizer>>,
    log: RunLog,
}

impl Orchestrator {
    /// Start a run; the configured summarizer command is resolved when a
    /// summarize stage runs
    pub async fn start(config: Config, command: &str) -> Result<Self> {
        Self::open(config, command, None).await
    }

    /// Start a run with an explicit summarizer
    pub async fn start_with_summarizer(
        config: Config,
        command: &str,
        summarizer: Box<dyn Summarizer>,
    ) -> Result<Self> {
        Self::open(config, command, Some(summarizer)).await
    }

    async fn open(
        config: Config,
        command: &str,
        summarizer: Option<Box<dyn Summarizer>>,
    ) -> Result<Self> {
        let patterns = PatternSet::from_markers(&config.markers).context("Invalid marker configuration")?;
        let layout = config.layout();

        let run_id = Uuid::new_v4();
        let log = RunLog::open(&layout.runs_dir(), run_id).await?;
        log.append(&Event::new(
            run_id,
            None,
            EventType::RunStarted,
            format!("{}:start", run_id),
            command.to_string(),
            StageStatus::Running,
        ))
        .await?;

        info!(%run_id, command, "Run started");

        Ok(Self {
            config,
            layout,
            patterns,
            summarizer,
            log,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.log.run_id()
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Record the outcome of the run and hand the result back
    pub async fn finish<T>(self, result: Result<T>) -> Result<T> {
        let run_id = self.log.run_id();
        let event = match &result {
            Ok(_) => Event::new(
                run_id,
                None,
                EventType::RunCompleted,
                format!("{}:complete", run_id),
                "Run completed".to_string(),
                StageStatus::Completed,
            ),
            Err(e) => Event::new(
                run_id,
                None,
                EventType::RunFailed,
                format!("{}:failed", run_id),
                "Run failed".to_string(),
                StageStatus::Failed,
            )
            .with_error(format!("{:#}", e)),
        };

        if let Err(log_err) = self.log.append(&event).await {
            warn!(%run_id, error = %log_err, "Failed to record run outcome");
        }

        result
    }

    // ------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------

    /// Split the script into seasons, episodes and scenes and write them out.
    ///
    /// Nothing is written when segmentation fails.
    #[instrument(skip(self))]
    pub async fn segment_script(&self) -> Result<SegmentReport> {
        let stage = self.begin_stage("segment", &self.config.script.to_string_lossy()).await?;
        let result = self.segment_inner().await;
        self.end_stage(stage, &result, |r| {
            r.seasons
                .iter()
                .map(|s| format!("season {}: {} episodes, {} scenes", s.season, s.episodes, s.scenes))
                .collect::<Vec<_>>()
                .join("; ")
        })
        .await?;
        result
    }

    async fn segment_inner(&self) -> Result<SegmentReport> {
        let segmentation = self.load_segmentation().await?;

        let seasons_dir = SceneStore::new(self.layout.seasons_dir());
        seasons_dir.ensure().await?;

        let mut counts = Vec::new();
        for season in &segmentation.seasons {
            seasons_dir.write(&season.file_name(), &season.text).await?;

            let episodes = SceneStore::new(self.layout.episodes_dir(season.number));
            let scenes = SceneStore::new(self.layout.scenes_dir(season.number));
            episodes.ensure().await?;
            scenes.ensure().await?;

            for episode in &season.episodes {
                episodes.write(&episode.file_name(), &episode.render()).await?;
                for scene in &episode.scenes {
                    scenes.write(&scene.file_name(), &scene.text).await?;
                }
            }

            info!(
                season = season.number,
                episodes = season.episodes.len(),
                scenes = season.scene_count(),
                "Season written"
            );
            counts.push(SeasonCounts {
                season: season.number,
                episodes: season.episodes.len(),
                scenes: season.scene_count(),
            });
        }

        Ok(SegmentReport { seasons: counts })
    }

    /// Compute statistics for every scene file of the target season and
    /// write `scene_summary.csv`
    #[instrument(skip(self))]
    pub async fn write_overview(&self) -> Result<Vec<SceneStatistic>> {
        let scenes = SceneStore::new(self.layout.scenes_dir(self.config.target_season));
        let stage = self.begin_stage("overview", &scenes.dir().to_string_lossy()).await?;
        let result = self.overview_inner(&scenes).await;
        self.end_stage(stage, &result, |stats| format!("{} scenes analyzed", stats.len()))
            .await?;
        result
    }

    async fn overview_inner(&self, scenes: &SceneStore) -> Result<Vec<SceneStatistic>> {
        let names = scenes.list()?;
        if names.is_empty() {
            self.record_warning(
                "overview",
                format!("No scene files found in {}", scenes.dir().display()),
            )
            .await?;
        }

        let mut stats = Vec::with_capacity(names.len());
        for name in names {
            let text = scenes.read(&name).await?;
            let statistic = analyze(&text).into_statistic(name);
            debug!(scene = %statistic.scene_file, lines = statistic.num_lines, speakers = statistic.num_speakers, "Scene analyzed");
            stats.push(statistic);
        }

        write_rows(&self.layout.scene_summary_csv(), &stats)?;
        Ok(stats)
    }

    /// Select scenes from `scene_summary.csv` and copy them to the selection
    /// directory. Missing source files are reported and skipped.
    #[instrument(skip(self))]
    pub async fn select_scenes(&self) -> Result<SelectionReport> {
        let summary_path = self.layout.scene_summary_csv();
        let stage = self.begin_stage("select", &summary_path.to_string_lossy()).await?;
        let result = self.select_inner(summary_path).await;
        self.end_stage(stage, &result, |r| {
            format!("{} selected, {} copied, {} missing", r.selected.len(), r.copied.len(), r.missing.len())
        })
        .await?;
        result
    }

    async fn select_inner(&self, summary_path: PathBuf) -> Result<SelectionReport> {
        info!(path = %summary_path.display(), "Loading scene summary");
        let stats: Vec<SceneStatistic> = read_rows(&summary_path)?;

        let selected: Vec<String> = select(&stats, &self.config.selection)
            .into_iter()
            .map(str::to_string)
            .collect();
        info!(count = selected.len(), "Selected scenes matching criteria");

        let source = SceneStore::new(self.layout.scenes_dir(self.config.target_season));
        let target = SceneStore::new(self.layout.selected_dir());
        target.ensure().await?;

        let mut copied = Vec::new();
        let mut missing = Vec::new();
        for scene_file in &selected {
            if !source.contains(scene_file) {
                self.record_warning("select", format!("Scene file not found: {}", scene_file))
                    .await?;
                missing.push(scene_file.clone());
                continue;
            }
            source.copy_to(scene_file, &target).await?;
            copied.push(scene_file.clone());
        }

        Ok(SelectionReport {
            selected,
            copied,
            missing,
            files_in_target: target.list()?.len(),
        })
    }

    /// Summarize every selected scene and write `summaries.csv`
    #[instrument(skip(self))]
    pub async fn summarize_selected(&self) -> Result<Vec<SummaryRow>> {
        let selected = SceneStore::new(self.layout.selected_dir());
        let stage = self.begin_stage("summarize", &selected.dir().to_string_lossy()).await?;
        let result = self.summarize_inner(&selected).await;
        self.end_stage(stage, &result, |rows| format!("{} scenes summarized", rows.len()))
            .await?;
        result
    }

    async fn summarize_inner(&self, selected: &SceneStore) -> Result<Vec<SummaryRow>> {
        let names = selected.list()?;
        let mut rows = Vec::with_capacity(names.len());

        let configured;
        let summarizer: &dyn Summarizer = match self.summarizer.as_deref() {
            Some(summarizer) => summarizer,
            None => {
                configured = CommandSummarizer::from_settings(&self.config.summarizer);
                &configured
            }
        };
        debug!(summarizer = summarizer.name(), scenes = names.len(), "Summarizing selection");

        let limits = &self.config.limits;
        for name in names {
            let text = selected.read(&name).await?;
            let (input, truncated) = limits.truncate_for_summary(&text);
            if truncated {
                debug!(scene = %name, max_words = limits.summary_max_words, "Scene truncated for summarizer");
            }

            let summary = summarizer
                .summarize(&input, limits.summarize_timeout())
                .await
                .with_context(|| format!("Failed to summarize {}", name))?;

            info!(scene = %name, "Scene summarized");
            rows.push(SummaryRow {
                scene_file: name,
                summary,
            });
        }

        write_rows(&self.layout.summaries_csv(), &rows)?;
        Ok(rows)
    }

    /// Count in how many scenes of `season` each configured character appears
    #[instrument(skip(self))]
    pub async fn count_characters(&self, season: u8) -> Result<CharacterReport> {
        let stage = self.begin_stage("characters", &self.config.script.to_string_lossy()).await?;
        let result = self.characters_inner(season).await;
        self.end_stage(stage, &result, |r| format!("{} scenes counted", r.total_scenes))
            .await?;
        result
    }

    async fn characters_inner(&self, season: u8) -> Result<CharacterReport> {
        let segmentation = self.load_segmentation().await?;
        let scenes = season_scenes(&segmentation, season)?;
        Ok(characters::character_report(&scenes, &self.config.characters))
    }

    /// Write a word-budgeted chunk of `season` covering every character
    #[instrument(skip(self))]
    pub async fn write_chunk(&self, season: u8) -> Result<(Chunk, PathBuf)> {
        let stage = self.begin_stage("sample", &self.config.script.to_string_lossy()).await?;
        let result = self.chunk_inner(season).await;
        self.end_stage(stage, &result, |(chunk, _)| {
            format!("{} scenes, {} words", chunk.scenes, chunk.words)
        })
        .await?;
        result
    }

    async fn chunk_inner(&self, season: u8) -> Result<(Chunk, PathBuf)> {
        let segmentation = self.load_segmentation().await?;
        let scenes = season_scenes(&segmentation, season)?;

        let mut rng = match self.config.sampling.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let chunk = characters::sample_chunk(
            &scenes,
            &self.config.characters,
            self.config.sampling.max_words,
            &mut rng,
        );

        let path = self.layout.chunk_file(season);
        SceneStore::new(self.layout.root()).ensure().await?;
        tokio::fs::write(&path, &chunk.text)
            .await
            .with_context(|| format!("Failed to write chunk: {}", path.display()))?;

        Ok((chunk, path))
    }

    /// Clean externally generated scenes and write them next to an overview.
    ///
    /// Rows are matched to the selected original files by their `scene_file`
    /// column; without that column they are matched by position.
    #[instrument(skip(self))]
    pub async fn clean_generated(&self) -> Result<CleaningReport> {
        let stage = self
            .begin_stage("clean-generated", &self.config.generated_scenes.to_string_lossy())
            .await?;
        let result = self.clean_inner().await;
        self.end_stage(stage, &result, |r| {
            format!("{} of {} generated scenes written", r.written, r.rows)
        })
        .await?;
        result
    }

    async fn clean_inner(&self) -> Result<CleaningReport> {
        let rows: Vec<GeneratedScene> = read_rows(&self.config.generated_scenes)?;
        let originals = SceneStore::new(self.layout.selected_dir()).list()?;

        let keys: Vec<Option<String>> = rows.iter().map(|r| r.scene_file.clone()).collect();
        let pairing = pair_generated(&keys, &originals);
        for warning in &pairing.warnings {
            self.record_warning("clean-generated", warning.clone()).await?;
        }

        let output = SceneStore::new(self.layout.generated_dir());
        output.ensure().await?;

        let mut overview = Vec::with_capacity(pairing.pairs.len());
        for (idx, filename) in &pairing.pairs {
            let row = &rows[*idx];
            let lines = clean_generated_scene(&row.scene);
            output.write(filename, &render_cleaned(&lines)).await?;

            overview.push(GeneratedOverviewRow {
                scene_number: idx + 1,
                filename: filename.clone(),
                summary: row.summary.clone(),
                num_lines_after_cleaning: lines.len(),
                num_lines_original: row.num_lines,
            });
        }

        let overview_path = self.layout.generated_overview_csv();
        write_rows(&overview_path, &overview)?;
        info!(
            rows = rows.len(),
            path = %overview_path.display(),
            "Processed generated scenes"
        );

        Ok(CleaningReport {
            mode: pairing.mode,
            rows: rows.len(),
            written: overview.len(),
            warnings: pairing.warnings.len(),
        })
    }

    /// Join the generated-scene overview with generated and human scene text
    #[instrument(skip(self))]
    pub async fn build_comparison(&self) -> Result<ComparisonReport> {
        let overview_path = self.layout.generated_overview_csv();
        let stage = self.begin_stage("compare", &overview_path.to_string_lossy()).await?;
        let result = self.compare_inner(overview_path).await;
        self.end_stage(stage, &result, |r| {
            format!("{} rows, {} missing human scenes", r.rows, r.missing_human)
        })
        .await?;
        result
    }

    async fn compare_inner(&self, overview_path: PathBuf) -> Result<ComparisonReport> {
        let overview: Vec<GeneratedOverviewRow> = read_rows(&overview_path)?;
        let generated: Vec<GeneratedScene> = read_rows(&self.config.generated_scenes)?;

        let human = SceneStore::new(self.layout.selected_dir());
        let human_files: HashMap<String, String> = human
            .list()?
            .into_iter()
            .map(|name| (normalize_key(&name), name))
            .collect();

        let mut rows = Vec::with_capacity(overview.len());
        let mut missing_human = 0;
        for entry in overview {
            // scene_number is the 1-based row of the generated scenes CSV
            let llm_scene = match entry.scene_number.checked_sub(1).and_then(|i| generated.get(i)) {
                Some(row) => row.scene.clone(),
                None => {
                    self.record_warning(
                        "compare",
                        format!(
                            "No generated scene for row {} ({})",
                            entry.scene_number, entry.filename
                        ),
                    )
                    .await?;
                    String::new()
                }
            };

            let human_scene = match human_files.get(&normalize_key(&entry.filename)) {
                Some(name) => human.read(name).await?,
                None => {
                    missing_human += 1;
                    String::new()
                }
            };

            rows.push(ComparisonRow::new(entry, llm_scene, human_scene));
        }

        if missing_human > 0 {
            self.record_warning("compare", format!("Missing human scenes: {}", missing_human))
                .await?;
        }

        write_rows(&self.layout.comparison_csv(), &rows)?;
        Ok(ComparisonReport {
            rows: rows.len(),
            missing_human,
        })
    }

    /// Segment, analyze and select; optionally summarize the selection
    pub async fn run_pipeline(&self, summarize: bool) -> Result<PipelineReport> {
        let segment = self.segment_script().await?;
        let stats = self.write_overview().await?;
        let selection = self.select_scenes().await?;
        let summaries = if summarize {
            Some(self.summarize_selected().await?.len())
        } else {
            None
        };

        Ok(PipelineReport {
            segment,
            scenes_analyzed: stats.len(),
            selection,
            summaries,
        })
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Read, size-check and segment the configured script
    async fn load_segmentation(&self) -> Result<Segmentation> {
        let script = &self.config.script;
        let document = read_text_lossy(script).await?;
        self.config.limits.validate_input(&document, Some(script.as_path()))?;

        segment(&document, &self.patterns)
            .with_context(|| format!("Failed to segment {}", script.display()))
    }

    async fn begin_stage(&self, name: &'static str, input: &str) -> Result<Stage> {
        let run_id = self.log.run_id();
        let key = stage_key(run_id, name, input);

        self.log
            .append(&Event::new(
                run_id,
                Some(name.to_string()),
                EventType::StageStarted,
                key.clone(),
                format!("Stage '{}' started", name),
                StageStatus::Running,
            ))
            .await?;
        debug!(stage = name, %key, "Stage started");

        Ok(Stage {
            name,
            key,
            started: Instant::now(),
        })
    }

    async fn end_stage<T>(
        &self,
        stage: Stage,
        result: &Result<T>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<()> {
        let run_id = self.log.run_id();
        let duration_ms = stage.started.elapsed().as_millis() as u64;

        let event = match result {
            Ok(value) => {
                let summary = describe(value);
                info!(stage = stage.name, duration_ms, "{}", summary);
                Event::new(
                    run_id,
                    Some(stage.name.to_string()),
                    EventType::StageCompleted,
                    stage.key,
                    summary,
                    StageStatus::Completed,
                )
            }
            Err(e) => Event::new(
                run_id,
                Some(stage.name.to_string()),
                EventType::StageFailed,
                stage.key,
                format!("Stage '{}' failed", stage.name),
                StageStatus::Failed,
            )
            .with_error(format!("{:#}", e)),
        };

        self.log.append(&event.with_duration(duration_ms)).await
    }

    /// Log a non-fatal problem and record it in the run log
    async fn record_warning(&self, stage: &'static str, message: String) -> Result<()> {
        warn!(stage, "{}", message);
        let run_id = self.log.run_id();
        self.log
            .append(&Event::new(
                run_id,
                Some(stage.to_string()),
                EventType::StageWarning,
                format!("{}:{}:warning", run_id, stage),
                message,
                StageStatus::Running,
            ))
            .await
    }
}

fn season_scenes(segmentation: &Segmentation, season: u8) -> Result<Vec<&str>> {
    let season = segmentation
        .season(season)
        .with_context(|| format!("Season {} does not exist (expected 1 or 2)", season))?;
    Ok(season.scenes().map(|s| s.text.as_str()).collect())
}
