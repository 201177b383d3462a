//! Upload processing
//!
//! [`UploadProcessor`] drives one upload through every stage: parse, group by
//! simulation and run, build each run's tables, derive lift status and
//! passenger KPIs, build and compile timelines, and summarize runs and
//! scenarios. Runs missing a table are skipped with a diagnostic; an upload
//! with no usable run at all is rejected.

use super::cache::SummaryCache;
use super::error::{Disposition, ErrorHandler, PipelineError, PipelineResult};
use super::progress::{NoProgress, ProgressReporter};
use super::summary::{format_clock, summary_name, ScenarioSummary, Summarizer};
use crate::logbook::{
    build_run_tables, count_lifts, derive_lift_status, derive_passenger_kpis, group_runs, LiftEventRow,
    PassengerEventRow, RunTables, SimulationGroup,
};
use crate::parser::{parse_with, summarize_catalog, CatalogEntry, CatalogTotals, SkippedSection};
use crate::timeline::{build_timelines, compile_timelines, ChartSamples, Timeline};
use crate::types::{LobbyId, PipelineConfig, RunId, SimulationId, UploadId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Derived tables and summary of one usable run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Run summary
    pub summary: ScenarioSummary,
    /// Lift movement rows with derived status
    pub lift_events: Vec<LiftEventRow>,
    /// Passenger rows with derived KPIs
    pub passengers: Vec<PassengerEventRow>,
    /// One timeline per lobby
    pub lobby_timelines: BTreeMap<LobbyId, Timeline>,
    /// All lobbies compiled together
    pub timeline: Timeline,
}

/// A run excluded from aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRun {
    /// Simulation the run belongs to
    pub simulation_id: SimulationId,
    /// The excluded run
    pub run_id: RunId,
    /// Diagnostic
    pub reason: String,
}

/// Everything derived for one simulation
#[derive(Debug, Clone)]
pub struct ScenarioReport {
    /// Simulation id
    pub simulation_id: SimulationId,
    /// Scenario summary, absent when no run was usable
    pub summary: Option<ScenarioSummary>,
    /// Usable runs in log order
    pub runs: Vec<RunReport>,
    /// Runs that were excluded
    pub skipped_runs: Vec<SkippedRun>,
    /// All-lobby run timelines compiled across runs
    pub timeline: Timeline,
    /// Each lobby compiled across runs
    pub lobby_timelines: BTreeMap<LobbyId, Timeline>,
}

impl ScenarioReport {
    /// Whether no run of the scenario was usable
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Result of processing one upload
#[derive(Debug, Clone)]
pub struct UploadReport {
    /// Unique id of this processing pass
    pub upload_id: UploadId,
    /// Display name of the upload
    pub name: String,
    /// When processing finished
    pub processed_at: DateTime<Utc>,
    /// Per-simulation overview of the parsed log
    pub catalog: Vec<CatalogEntry>,
    /// One report per simulation, in first-seen order
    pub scenarios: Vec<ScenarioReport>,
    /// Sections dropped by the parser
    pub skipped_sections: Vec<SkippedSection>,
}

impl UploadReport {
    /// Usable runs across every scenario
    pub fn usable_run_count(&self) -> usize {
        self.scenarios.iter().map(|scenario| scenario.runs.len()).sum()
    }

    /// Scenario summaries, skipping empty scenarios
    pub fn scenario_summaries(&self) -> impl Iterator<Item = &ScenarioSummary> {
        self.scenarios.iter().filter_map(|scenario| scenario.summary.as_ref())
    }

    /// Run summaries across every scenario
    pub fn run_summaries(&self) -> impl Iterator<Item = &ScenarioSummary> {
        self.scenarios.iter().flat_map(|scenario| scenario.runs.iter().map(|run| &run.summary))
    }

    /// Serializable summary document
    pub fn to_document(&self, config: &PipelineConfig) -> SummaryDocument {
        let totals = CatalogTotals::from_entries(&self.catalog);

        SummaryDocument {
            upload_id: self.upload_id,
            name: self.name.clone(),
            processed_at: self.processed_at,
            catalog_statement: totals.statement(),
            catalog: self.catalog.clone(),
            scenarios: self.scenario_summaries().cloned().collect(),
            runs: self.run_summaries().cloned().collect(),
            charts: self
                .scenarios
                .iter()
                .filter(|scenario| !scenario.is_empty())
                .map(|scenario| ScenarioChart::from_timeline(&scenario.simulation_id, &scenario.timeline, config))
                .collect(),
            skipped_runs: self.scenarios.iter().flat_map(|s| s.skipped_runs.iter().cloned()).collect(),
            skipped_sections: self.skipped_sections.clone(),
        }
    }
}

/// Sampled chart series of one scenario timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioChart {
    /// Simulation id
    pub simulation_id: SimulationId,
    /// Main series sampled every `chart_sample_stride` seconds
    pub samples: ChartSamples,
    /// Waiting passengers above each wait threshold, sampled alike
    pub thresholds: BTreeMap<u32, Vec<usize>>,
}

impl ScenarioChart {
    fn from_timeline(simulation_id: &SimulationId, timeline: &Timeline, config: &PipelineConfig) -> Self {
        let stride = config.chart_sample_stride.max(1);
        let thresholds = config
            .wait_thresholds
            .iter()
            .map(|&cutoff| {
                let series = timeline.threshold_series(f64::from(cutoff));
                (cutoff, series.into_iter().step_by(stride).collect())
            })
            .collect();

        Self {
            simulation_id: simulation_id.clone(),
            samples: timeline.chart_samples(stride),
            thresholds,
        }
    }
}

/// Summaries of one upload, written as JSON by the binary
#[derive(Debug, Clone, Serialize)]
pub struct SummaryDocument {
    /// Upload id
    pub upload_id: UploadId,
    /// Upload display name
    pub name: String,
    /// Processing time
    pub processed_at: DateTime<Utc>,
    /// One-line verification statement
    pub catalog_statement: String,
    /// Per-simulation overview
    pub catalog: Vec<CatalogEntry>,
    /// Scenario summaries
    pub scenarios: Vec<ScenarioSummary>,
    /// Run summaries
    pub runs: Vec<ScenarioSummary>,
    /// Sampled scenario charts
    pub charts: Vec<ScenarioChart>,
    /// Runs excluded from aggregation
    pub skipped_runs: Vec<SkippedRun>,
    /// Sections dropped by the parser
    pub skipped_sections: Vec<SkippedSection>,
}

/// Processes uploads and keeps the summary catalog across them
#[derive(Debug)]
pub struct UploadProcessor {
    config: PipelineConfig,
    summarizer: Summarizer,
    cache: SummaryCache,
    progress: Box<dyn ProgressReporter>,
    error_handler: ErrorHandler,
    catalog: Vec<ScenarioSummary>,
}

impl UploadProcessor {
    /// Create a processor with a validated configuration and an injected cache
    pub fn new(config: PipelineConfig, cache: SummaryCache) -> PipelineResult<Self> {
        config
            .validate()
            .map_err(|e| PipelineError::configuration_error(e.to_string()))?;

        Ok(Self {
            summarizer: Summarizer::new(config.summary_decimals),
            config,
            cache,
            progress: Box::new(NoProgress),
            error_handler: ErrorHandler::new(),
            catalog: Vec::new(),
        })
    }

    /// Report progress through `progress`
    pub fn with_progress(mut self, progress: Box<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// The active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Failures skipped so far across every upload
    pub fn skipped_count(&self) -> usize {
        self.error_handler.skipped_count()
    }

    /// Process the text of one upload
    #[instrument(skip(self, raw_text), fields(upload = name, bytes = raw_text.len()))]
    pub fn process_upload(&mut self, name: &str, raw_text: &str) -> PipelineResult<UploadReport> {
        self.cache.invalidate();

        let parsed = parse_with(raw_text, &self.config).map_err(|e| self.reject(e))?;

        let catalog = summarize_catalog(&parsed);
        let statement = CatalogTotals::from_entries(&catalog).statement();
        crate::pipeline_event!(info, "Verified upload", upload = name, statement = statement.as_str());

        let groups = group_runs(&parsed);
        let total_runs: usize = groups.iter().map(|group| group.runs.len()).sum();
        let mut done = 0;

        let mut scenarios = Vec::with_capacity(groups.len());
        for group in &groups {
            scenarios.push(self.process_scenario(name, group, &mut done, total_runs)?);
        }

        let report = UploadReport {
            upload_id: UploadId::new(),
            name: name.to_string(),
            processed_at: Utc::now(),
            catalog,
            scenarios,
            skipped_sections: parsed.skipped,
        };

        if report.usable_run_count() == 0 {
            return Err(self.reject(PipelineError::NoUsableRuns { upload: name.to_string() }));
        }

        self.catalog.extend(report.scenario_summaries().cloned());
        info!(
            upload_id = %report.upload_id,
            scenarios = report.scenarios.len(),
            runs = report.usable_run_count(),
            "Processed upload"
        );
        Ok(report)
    }

    /// Read and process each file as its own upload.
    ///
    /// Uploads are named by the configured scenario name, or else the file stem.
    /// The batch stops at the first file that cannot be read or is rejected;
    /// uploads processed before it stay in the summary table.
    pub fn process_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> PipelineResult<Vec<UploadReport>> {
        let mut reports = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let raw_text = fs::read_to_string(path)?;
            let name = self.config.scenario_name.clone().unwrap_or_else(|| upload_name(path));
            debug!(path = %path.display(), name = %name, "Read upload");
            reports.push(self.process_upload(&name, &raw_text)?);
        }

        Ok(reports)
    }

    /// Scenario summaries of every upload so far, sorted by name then simulation
    pub fn summary_table(&mut self) -> &[ScenarioSummary] {
        let catalog = &self.catalog;
        self.cache.get_or_compute(|| {
            let mut table = catalog.clone();
            table.sort_by(|a, b| {
                a.name.cmp(&b.name).then_with(|| a.simulation_id.cmp(&b.simulation_id))
            });
            table
        })
    }

    fn process_scenario(
        &mut self,
        upload: &str,
        group: &SimulationGroup<'_>,
        done: &mut usize,
        total_runs: usize,
    ) -> PipelineResult<ScenarioReport> {
        let mut runs = Vec::new();
        let mut skipped_runs = Vec::new();
        let mut scenario_lift_count = None;

        for run in &group.runs {
            match build_run_tables(run) {
                Ok(tables) => {
                    scenario_lift_count = scenario_lift_count.or(tables.lift_count);
                    runs.push(self.process_run(upload, tables));
                }
                Err(error) => match self.error_handler.handle_error(&error) {
                    Disposition::Skip => skipped_runs.push(SkippedRun {
                        simulation_id: run.simulation_id.clone(),
                        run_id: run.run_id.clone(),
                        reason: error.to_string(),
                    }),
                    Disposition::Abort => return Err(error),
                },
            }

            *done += 1;
            self.progress.on_progress(
                *done,
                total_runs,
                &format!("Processing Log ({}/{})", done, total_runs),
            );
        }

        let run_timelines: Vec<&Timeline> = runs.iter().map(|run| &run.timeline).collect();
        let timeline = compile_timelines(run_timelines.iter().copied());

        let lobbies: BTreeSet<LobbyId> =
            runs.iter().flat_map(|run| run.lobby_timelines.keys().copied()).collect();
        let lobby_timelines = lobbies
            .into_iter()
            .map(|lobby| {
                let sources = runs.iter().filter_map(|run| run.lobby_timelines.get(&lobby));
                (lobby, compile_timelines(sources))
            })
            .collect();

        let summary = runs.first().map(|first| {
            let passenger_tables: Vec<&[PassengerEventRow]> =
                runs.iter().map(|run| run.passengers.as_slice()).collect();
            let kpis = self.summarizer.summarize(&passenger_tables, &run_timelines);
            let lift_count = scenario_lift_count.unwrap_or(first.summary.lift_count);

            ScenarioSummary {
                name: summary_name(upload, lift_count),
                simulation_id: group.simulation_id.clone(),
                run_id: None,
                run_count: Some(runs.len()),
                lift_count,
                floor_count: first.summary.floor_count,
                peak_clock: format_clock(kpis.peak_time),
                kpis,
            }
        });

        if summary.is_none() {
            crate::pipeline_event!(
                warn,
                "Scenario has no usable runs",
                simulation_id = group.simulation_id.as_str(),
                skipped = skipped_runs.len()
            );
        }

        Ok(ScenarioReport {
            simulation_id: group.simulation_id.clone(),
            summary,
            runs,
            skipped_runs,
            timeline,
            lobby_timelines,
        })
    }

    fn process_run(&self, upload: &str, tables: RunTables) -> RunReport {
        let _span = crate::perf_span!("process_run", run_id = tables.run_id.as_str()).entered();

        let lift_events = derive_lift_status(tables.lift_events);
        let passengers = derive_passenger_kpis(&tables.passengers);
        let lobby_timelines = build_timelines(&passengers);
        let timeline = compile_timelines(lobby_timelines.values());

        let lift_count = count_lifts(&lift_events);
        let kpis = self.summarizer.summarize(&[passengers.as_slice()], &[&timeline]);

        debug!(
            simulation_id = %tables.simulation_id,
            run_id = %tables.run_id,
            passengers = passengers.len(),
            lobbies = lobby_timelines.len(),
            "Processed run"
        );

        RunReport {
            summary: ScenarioSummary {
                name: summary_name(upload, lift_count),
                simulation_id: tables.simulation_id,
                run_id: Some(tables.run_id),
                run_count: None,
                lift_count,
                floor_count: lobby_timelines.len(),
                peak_clock: format_clock(kpis.peak_time),
                kpis,
            },
            lift_events,
            passengers,
            lobby_timelines,
            timeline,
        }
    }

    fn reject(&mut self, error: PipelineError) -> PipelineError {
        self.error_handler.handle_error(&error);
        error
    }
}

/// Display name for an upload read from `path`
pub fn upload_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
