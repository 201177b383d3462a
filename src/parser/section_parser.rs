//! Section parser for ELVR logs
//!
//! An ELVR log is a sequence of header lines (`SimulationID: <id>, <run>`) and
//! data lines (`<category>,<col1>,<col2>,...`). Consecutive data lines with the
//! same category form one section. The parser keeps a single open section and
//! closes it when the category changes, when a header arrives, and at the end
//! of the stream.

use crate::logbook::{count_lifts, LiftEventRow, PassengerRecord, LIFT_FIELDS, PASSENGER_FIELDS};
use crate::pipeline::{PipelineError, PipelineResult};
use crate::types::{LogCategory, PipelineConfig, RunId, SimulationId, SkipReason};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::{debug, info, warn};

/// Rows of one closed section, typed when the category has a schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum SectionTable {
    /// `SpatialPlot` rows
    LiftMovement(Vec<LiftEventRow>),
    /// `Person` rows
    PassengerEvent(Vec<PassengerRecord>),
    /// Rows of a category without a schema, positional columns only
    Untyped(Vec<Vec<String>>),
}

impl SectionTable {
    /// Number of rows in the section
    pub fn row_count(&self) -> usize {
        match self {
            SectionTable::LiftMovement(rows) => rows.len(),
            SectionTable::PassengerEvent(rows) => rows.len(),
            SectionTable::Untyped(rows) => rows.len(),
        }
    }

    /// Semantic column names, if the category has a schema
    pub fn field_names(&self) -> Option<&'static [&'static str]> {
        match self {
            SectionTable::LiftMovement(_) => Some(&LIFT_FIELDS),
            SectionTable::PassengerEvent(_) => Some(&PASSENGER_FIELDS),
            SectionTable::Untyped(_) => None,
        }
    }
}

/// One parsed section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Category of every row in the section
    pub category: LogCategory,
    /// The section's rows
    pub table: SectionTable,
    /// Simulation from the last header
    pub simulation_id: SimulationId,
    /// Run from the last header
    pub run_id: RunId,
    /// Lifts in the simulation, once a lift section has been seen
    pub lift_count: Option<usize>,
}

/// A section that did not become a log entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSection {
    /// Category of the section
    pub category: LogCategory,
    /// Simulation the section belongs to
    pub simulation_id: SimulationId,
    /// Run the section belongs to
    pub run_id: RunId,
    /// Data lines in the section
    pub row_count: usize,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// A `(simulation, run)` context announced in the log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSections {
    /// Simulation id
    pub simulation_id: SimulationId,
    /// Run id
    pub run_id: RunId,
    /// Log entries emitted for this run
    pub section_count: usize,
}

/// Output of a full parsing pass
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedLog {
    /// Emitted sections in log order
    pub entries: Vec<LogEntry>,
    /// Sections that were discarded or failed to parse
    pub skipped: Vec<SkippedSection>,
    /// Every run context seen, in log order
    pub runs: Vec<RunSections>,
    /// Non-blank, non-header lines in the input
    pub data_line_count: usize,
}

impl ParsedLog {
    /// Sections that failed to parse
    pub fn failed_sections(&self) -> impl Iterator<Item = &SkippedSection> {
        self.skipped
            .iter()
            .filter(|section| matches!(section.reason, SkipReason::ParseFailed(_)))
    }

    /// Entries belonging to one run
    pub fn entries_for<'a>(
        &'a self,
        simulation_id: &'a SimulationId,
        run_id: &'a RunId,
    ) -> impl Iterator<Item = &'a LogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| &entry.simulation_id == simulation_id && &entry.run_id == run_id)
    }
}

#[derive(Debug)]
struct OpenSection {
    tag: String,
    lines: Vec<String>,
}

/// Line-at-a-time ELVR parser.
///
/// Feed lines with [`SectionParser::feed_line`] and call
/// [`SectionParser::finish`] to flush the last open section.
#[derive(Debug)]
pub struct SectionParser {
    header_marker: String,
    skip_categories: Vec<String>,
    simulation_id: SimulationId,
    run_id: RunId,
    current_run: Option<usize>,
    lift_counts: BTreeMap<SimulationId, usize>,
    open: Option<OpenSection>,
    line_number: usize,
    output: ParsedLog,
}

impl SectionParser {
    /// Create a parser using the marker and skip list from the configuration
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            header_marker: config.header_marker.clone(),
            skip_categories: config.skip_categories.clone(),
            simulation_id: SimulationId::unassigned(),
            run_id: RunId::unassigned(),
            current_run: None,
            lift_counts: BTreeMap::new(),
            open: None,
            line_number: 0,
            output: ParsedLog::default(),
        }
    }

    /// Consume one input line
    pub fn feed_line(&mut self, line: &str) -> PipelineResult<()> {
        self.line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if line.starts_with(self.header_marker.as_str()) {
            self.close_section();
            return self.enter_header(line);
        }

        self.output.data_line_count += 1;
        let tag = line.split(',').next().unwrap_or_default().trim();

        match self.open.as_mut() {
            Some(open) if open.tag == tag => open.lines.push(line.to_string()),
            _ => {
                self.close_section();
                self.open =
                    Some(OpenSection { tag: tag.to_string(), lines: vec![line.to_string()] });
            }
        }

        Ok(())
    }

    /// Flush the open section and return everything parsed.
    ///
    /// Fails with [`PipelineError::EmptyInput`] when the input held neither a
    /// header nor a data line.
    pub fn finish(mut self) -> PipelineResult<ParsedLog> {
        self.close_section();

        if self.output.data_line_count == 0 && self.output.runs.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        info!(
            entries = self.output.entries.len(),
            skipped = self.output.skipped.len(),
            runs = self.output.runs.len(),
            lines = self.line_number,
            "Finished parsing ELVR log"
        );
        Ok(self.output)
    }

    fn enter_header(&mut self, line: &str) -> PipelineResult<()> {
        let malformed = || PipelineError::MalformedHeader {
            line_number: self.line_number,
            line: line.to_string(),
        };

        let cells: Vec<&str> = line.split(',').collect();
        if cells.len() < 2 {
            return Err(malformed());
        }

        let simulation = cells[0]
            .split_once(':')
            .map(|(_, id)| id.trim())
            .filter(|id| !id.is_empty())
            .ok_or_else(malformed)?;
        let run = cells[1].trim();

        self.simulation_id = SimulationId::new(simulation);
        self.run_id = RunId::new(run);
        self.register_run();

        debug!(simulation_id = %self.simulation_id, run_id = %self.run_id, "Entering run");
        Ok(())
    }

    fn register_run(&mut self) {
        let existing = self.output.runs.iter().position(|run| {
            run.simulation_id == self.simulation_id && run.run_id == self.run_id
        });

        self.current_run = Some(existing.unwrap_or_else(|| {
            self.output.runs.push(RunSections {
                simulation_id: self.simulation_id.clone(),
                run_id: self.run_id.clone(),
                section_count: 0,
            });
            self.output.runs.len() - 1
        }));
    }

    fn close_section(&mut self) {
        let Some(open) = self.open.take() else {
            return;
        };

        let category = LogCategory::from_tag(&open.tag);
        let row_count = open.lines.len();

        if self.skip_categories.iter().any(|tag| *tag == open.tag) {
            debug!(category = %category, rows = row_count, "Discarding section");
            self.output.skipped.push(self.skipped(category, row_count, SkipReason::Discarded));
            return;
        }

        match materialize(&category, &open.lines) {
            Ok(table) => {
                if let SectionTable::LiftMovement(rows) = &table {
                    self.lift_counts
                        .entry(self.simulation_id.clone())
                        .or_insert_with(|| count_lifts(rows));
                }

                if self.current_run.is_none() {
                    self.register_run();
                }
                if let Some(index) = self.current_run {
                    self.output.runs[index].section_count += 1;
                }

                debug!(category = %category, rows = row_count, "Loaded section");
                self.output.entries.push(LogEntry {
                    category,
                    table,
                    simulation_id: self.simulation_id.clone(),
                    run_id: self.run_id.clone(),
                    lift_count: self.lift_counts.get(&self.simulation_id).copied(),
                });
            }
            Err((row, reason)) => {
                let error = PipelineError::SectionParse {
                    simulation_id: self.simulation_id.clone(),
                    run_id: self.run_id.clone(),
                    category: category.clone(),
                    row,
                    reason: reason.clone(),
                };
                warn!("{}", error);
                self.output
                    .skipped
                    .push(self.skipped(category, row_count, SkipReason::ParseFailed(reason)));
            }
        }
    }

    fn skipped(&self, category: LogCategory, row_count: usize, reason: SkipReason) -> SkippedSection {
        SkippedSection {
            category,
            simulation_id: self.simulation_id.clone(),
            run_id: self.run_id.clone(),
            row_count,
            reason,
        }
    }
}

/// Split a section's lines into rows, dropping the category column
fn materialize(category: &LogCategory, lines: &[String]) -> Result<SectionTable, (usize, String)> {
    let rows = lines.iter().map(|line| {
        line.split(',').skip(1).map(|field| field.trim().to_string()).collect::<Vec<String>>()
    });

    match category {
        LogCategory::LiftMovement => rows
            .enumerate()
            .map(|(index, fields)| LiftEventRow::from_fields(&fields).map_err(|e| (index, e)))
            .collect::<Result<Vec<_>, _>>()
            .map(SectionTable::LiftMovement),
        LogCategory::PassengerEvent => rows
            .enumerate()
            .map(|(index, fields)| PassengerRecord::from_fields(&fields).map_err(|e| (index, e)))
            .collect::<Result<Vec<_>, _>>()
            .map(SectionTable::PassengerEvent),
        _ => Ok(SectionTable::Untyped(rows.collect())),
    }
}

/// Parse a complete ELVR text with the default configuration
pub fn parse(raw_text: &str) -> PipelineResult<ParsedLog> {
    parse_with(raw_text, &PipelineConfig::default())
}

/// Parse a complete ELVR text
pub fn parse_with(raw_text: &str, config: &PipelineConfig) -> PipelineResult<ParsedLog> {
    let _span = crate::perf_span!("parse_elvr", bytes = raw_text.len()).entered();

    let mut parser = SectionParser::new(config);
    for line in raw_text.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}

/// Parse an ELVR stream line by line
pub fn parse_reader<R: BufRead>(reader: R, config: &PipelineConfig) -> PipelineResult<ParsedLog> {
    let _span = crate::perf_span!("parse_elvr_stream").entered();

    let mut parser = SectionParser::new(config);
    for line in reader.lines() {
        parser.feed_line(&line?)?;
    }
    parser.finish()
}
