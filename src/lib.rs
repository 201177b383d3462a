//! ELVR Pipeline
//!
//! Parses ELVR elevator-simulator logs into per-run lift and passenger
//! logbooks and derives per-second queue timelines and scenario KPIs from them.
//!
//! # Overview
//!
//! An ELVR log interleaves header lines announcing a `(simulation, run)` pair
//! with comma-separated data lines grouped into sections by category. This
//! library turns such a log into typed tables and dashboard-ready aggregates.
//!
//! ## Key Features
//!
//! - **Section Parsing**: A single-buffer state machine with an explicit end-of-stream flush
//! - **Typed Logbooks**: Lift movement rows with derived motion status, passenger rows with wait/transit/travel KPIs
//! - **Queue Timelines**: Per-lobby, per-second waiting sets built with a sweep line
//! - **Compilation**: Associative merging of timelines across lobbies and runs
//! - **Summaries**: Rounded run and scenario KPIs with identifying metadata
//!
//! ## Quick Start
//!
//! ```rust
//! use elvr_pipeline::*;
//!
//! let log = "SimulationID: S1, 1
//! SpatialPlot,A,0,1,0,2.5
//! SpatialPlot,A,4,3,0,2.5
//! Person,0,1,0,3,70,1,1,1,20,0,A,5,12,0,3,0,0,0,0,0,0,0,0,0,0,0,0
//! ";
//!
//! let mut processor = UploadProcessor::new(PipelineConfig::default(), SummaryCache::new())?;
//! let report = processor.process_upload("Tower", log)?;
//!
//! let summary = report.scenario_summaries().next().unwrap();
//! assert_eq!(summary.name, "Tower: 1 Lift");
//! assert_eq!(summary.kpis.max_wait_time, 5.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifiers, enums, and configuration
//! - [`parser`]: Section parsing and the upload catalog
//! - [`logbook`]: Run tables, lift status, and passenger KPIs
//! - [`timeline`]: Timeline construction and compilation
//! - [`pipeline`]: Upload processing, summaries, errors, and logging
//!
//! ## Data Flow
//!
//! ```text
//! raw text ─► parser ─► logbook::build_run_tables ─┬─► derive_lift_status
//!                                                  └─► derive_passenger_kpis
//!                                                            │
//!            summarize ◄── compile_timelines ◄── build_timelines
//! ```
#![warn(missing_docs, missing_debug_implementations)]

pub mod logbook;
pub mod parser;
pub mod pipeline;
pub mod timeline;
pub mod types;

// Core types and identifiers
pub use types::{
    CliArgs, ConfigValidationError, LiftId, LiftStatus, LobbyId, LogCategory, MissingTable,
    PassengerId, PipelineConfig, RunId, SimulationId, SkipReason, UploadId,
};

// Parsing
pub use parser::{parse, parse_reader, parse_with, summarize_catalog, LogEntry, ParsedLog, SectionParser};

// Logbooks
pub use logbook::{
    build_run_tables, derive_lift_status, derive_passenger_kpis, group_runs, LiftEventRow,
    PassengerEventRow, PassengerRecord, RunTables,
};

// Timelines
pub use timeline::{build_timelines, compile_timelines, Timeline, TimelineRow};

// Pipeline
pub use pipeline::{
    summarize, LoggingConfig, PipelineError, PipelineResult, ScenarioSummary, Summarizer,
    SummaryCache, SummaryKpis, UploadProcessor, UploadReport,
};
