//! Error types and handling
//!
//! This module contains the pipeline error taxonomy and the handler that decides
//! whether a failure excludes one section or run, or rejects the whole upload.

use crate::types::{LogCategory, MissingTable, RunId, SimulationId};
use thiserror::Error;
use tracing::{error, warn};

/// Errors that can occur while processing an ELVR upload
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A header line could not be split into simulation and run
    #[error("Malformed header on line {line_number}: {line:?}")]
    MalformedHeader {
        /// 1-based line number in the input
        line_number: usize,
        /// The offending line
        line: String,
    },

    /// One section's rows could not be materialised
    #[error("Failed to parse {category} section (simulation {simulation_id}, run {run_id}) at row {row}: {reason}")]
    SectionParse {
        /// Simulation the section belongs to
        simulation_id: SimulationId,
        /// Run the section belongs to
        run_id: RunId,
        /// Category of the section
        category: LogCategory,
        /// 0-based row index within the section
        row: usize,
        /// What went wrong
        reason: String,
    },

    /// A run lacks a required table
    #[error("Run {run_id} of simulation {simulation_id} is missing its {missing}")]
    MissingTable {
        /// Simulation the run belongs to
        simulation_id: SimulationId,
        /// The unusable run
        run_id: RunId,
        /// Which table is missing
        missing: MissingTable,
    },

    /// The input contained no header and no data lines
    #[error("Input contains no ELVR data")]
    EmptyInput,

    /// Every run in the upload was excluded
    #[error("Upload {upload} has no usable runs")]
    NoUsableRuns {
        /// Upload display name
        upload: String,
    },

    /// Configuration was rejected
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create a configuration error
    pub fn configuration_error(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Section and run failures only exclude their own data
    pub fn is_recoverable(&self) -> bool {
        match self {
            PipelineError::SectionParse { .. } => true,
            PipelineError::MissingTable { .. } => true,
            PipelineError::MalformedHeader { .. } => false,
            PipelineError::EmptyInput => false,
            PipelineError::NoUsableRuns { .. } => false,
            PipelineError::Configuration(_) => false,
            PipelineError::Io(_) => false,
            PipelineError::Serialization(_) => false,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::MalformedHeader { .. } => "Header",
            PipelineError::SectionParse { .. } => "Section",
            PipelineError::MissingTable { .. } => "Run",
            PipelineError::EmptyInput => "Input",
            PipelineError::NoUsableRuns { .. } => "Upload",
            PipelineError::Configuration(_) => "Configuration",
            PipelineError::Io(_) => "IO",
            PipelineError::Serialization(_) => "Serialization",
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// What the caller should do after an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Exclude the failing section or run and continue
    Skip,
    /// Reject the whole upload
    Abort,
}

/// Logs stage-local failures with enough context to locate the bad input
#[derive(Debug, Default)]
pub struct ErrorHandler {
    skipped: usize,
}

impl ErrorHandler {
    /// Create a new error handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Log the error and decide whether processing can continue
    pub fn handle_error(&mut self, error: &PipelineError) -> Disposition {
        match error {
            PipelineError::SectionParse { simulation_id, run_id, category, row, reason } => {
                warn!(
                    simulation_id = %simulation_id,
                    run_id = %run_id,
                    category = %category,
                    row,
                    "Skipping section: {}",
                    reason
                );
            }
            PipelineError::MissingTable { simulation_id, run_id, missing } => {
                warn!(
                    simulation_id = %simulation_id,
                    run_id = %run_id,
                    "Skipping run: missing {}",
                    missing
                );
            }
            other => {
                error!("Fatal error in {}: {}", other.category(), other);
            }
        }

        if error.is_recoverable() {
            self.skipped += 1;
            Disposition::Skip
        } else {
            Disposition::Abort
        }
    }

    /// Number of failures that were skipped so far
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }
}
