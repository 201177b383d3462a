//! Configuration structures for the ELVR pipeline
//!
//! This module contains the command line arguments, the optional JSON
//! configuration file, and the validated pipeline configuration that controls
//! parsing, summary rounding, and catalog chart sampling.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default values for the pipeline configuration
pub mod defaults {
    /// Marker that starts a `SimulationID: <id>, <run>` header line
    pub const HEADER_MARKER: &str = "SimulationID";

    /// Categories that are recognised and discarded
    pub const SKIP_CATEGORIES: [&str; 2] = ["NoPassengers", "RemoteMonitoring"];

    /// Decimal places kept in summary KPIs
    pub const SUMMARY_DECIMALS: u32 = 1;

    /// Stride (seconds) between catalog chart samples
    pub const CHART_SAMPLE_STRIDE: usize = 60;

    /// Wait-time cutoffs (seconds) for threshold series
    pub const WAIT_THRESHOLDS: [u32; 4] = [60, 120, 180, 240];

    /// Highest accepted value for `summary_decimals`
    pub const MAX_SUMMARY_DECIMALS: u32 = 6;
}

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "elvr-pipeline",
    version = "0.1.0",
    about = "ELVR Pipeline - Builds lift, passenger and queue timeline logbooks from ELVR logs",
    long_about = "Parses ELVR simulator logs into per-run lift and passenger logbooks, derives wait/transit/travel KPIs, builds per-second queue timelines per lobby, compiles them across runs, and reports scenario summaries.

EXAMPLES:
    # Process one log with default settings
    elvr-pipeline results.elvr

    # Process several logs and write the summary report
    elvr-pipeline a.elvr b.elvr --output report.json

    # Use a configuration file
    elvr-pipeline results.elvr --config pipeline.json

    # Generate configuration template
    elvr-pipeline --print-config > my-config.json

    # Validate configuration without processing
    elvr-pipeline --config my-config.json --dry-run

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// ELVR log files to process
    #[arg(value_name = "FILE", help = "ELVR log files to process")]
    pub inputs: Vec<String>,

    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Output path for the summary report
    #[arg(short, long, help = "Write the summary report (JSON) to this path")]
    pub output: Option<String>,

    /// Scenario display name override
    #[arg(long, help = "Scenario display name (defaults to the file stem)")]
    pub name: Option<String>,

    /// Header line marker
    #[arg(long, help = "Marker that starts a header line (default: SimulationID)")]
    pub header_marker: Option<String>,

    /// Chart sample stride in seconds
    #[arg(long, help = "Seconds between catalog chart samples (default: 60)")]
    pub chart_stride: Option<usize>,

    /// Decimal places kept in summary KPIs
    #[arg(long, help = "Decimal places kept in summary KPIs (default: 1)")]
    pub summary_decimals: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Emit logs as JSON
    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Dry run mode - validate configuration without processing
    #[arg(long, help = "Validate configuration without processing any file")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Marker that starts a header line
    pub header_marker: Option<String>,

    /// Categories that are recognised and discarded
    pub skip_categories: Option<Vec<String>>,

    /// Decimal places kept in summary KPIs
    pub summary_decimals: Option<u32>,

    /// Stride between catalog chart samples
    pub chart_sample_stride: Option<usize>,

    /// Wait-time cutoffs for threshold series
    pub wait_thresholds: Option<Vec<u32>>,

    /// Scenario display name override
    pub scenario_name: Option<String>,

    /// Output path for the summary report
    pub output_path: Option<String>,
}

/// Configuration for the ELVR pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Marker that starts a header line
    pub header_marker: String,

    /// Categories that are recognised and discarded
    pub skip_categories: Vec<String>,

    /// Decimal places kept in summary KPIs
    pub summary_decimals: u32,

    /// Stride between catalog chart samples
    pub chart_sample_stride: usize,

    /// Wait-time cutoffs for threshold series
    pub wait_thresholds: Vec<u32>,

    /// Scenario display name override
    pub scenario_name: Option<String>,

    /// Output path for the summary report
    pub output_path: Option<String>,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for pipeline configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
    /// Header marker is empty
    #[error("Header marker must not be empty")]
    EmptyHeaderMarker,

    /// Chart stride is zero
    #[error("Chart sample stride must be greater than 0")]
    InvalidChartStride,

    /// Too many summary decimals
    #[error("Summary decimals must be at most {max}, got {value}")]
    InvalidSummaryDecimals {
        /// Requested decimal places
        value: u32,
        /// Highest accepted value
        max: u32,
    },

    /// Threshold list contains zero or is not strictly ascending
    #[error("Wait thresholds must be positive and strictly ascending, got {0:?}")]
    InvalidThresholds(Vec<u32>),
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            header_marker: defaults::HEADER_MARKER.to_string(),
            skip_categories: defaults::SKIP_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            summary_decimals: defaults::SUMMARY_DECIMALS,
            chart_sample_stride: defaults::CHART_SAMPLE_STRIDE,
            wait_thresholds: defaults::WAIT_THRESHOLDS.to_vec(),
            scenario_name: None,
            output_path: None,
        }
    }
}

impl PipelineConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence over the file
        Self::apply_cli_overrides(&mut config, args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Create configuration from a config file, merging with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            header_marker: config_file.header_marker.unwrap_or(defaults.header_marker),
            skip_categories: config_file.skip_categories.unwrap_or(defaults.skip_categories),
            summary_decimals: config_file
                .summary_decimals
                .unwrap_or(defaults.summary_decimals),
            chart_sample_stride: config_file
                .chart_sample_stride
                .unwrap_or(defaults.chart_sample_stride),
            wait_thresholds: config_file.wait_thresholds.unwrap_or(defaults.wait_thresholds),
            scenario_name: config_file.scenario_name.or(defaults.scenario_name),
            output_path: config_file.output_path.or(defaults.output_path),
        }
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(config: &mut Self, args: CliArgs) {
        if let Some(value) = args.header_marker {
            config.header_marker = value;
        }
        if let Some(value) = args.chart_stride {
            config.chart_sample_stride = value;
        }
        if let Some(value) = args.summary_decimals {
            config.summary_decimals = value;
        }
        if let Some(value) = args.name {
            config.scenario_name = Some(value);
        }
        if let Some(value) = args.output {
            config.output_path = Some(value);
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.header_marker.trim().is_empty() {
            return Err(ConfigValidationError::EmptyHeaderMarker);
        }

        if self.chart_sample_stride == 0 {
            return Err(ConfigValidationError::InvalidChartStride);
        }

        if self.summary_decimals > defaults::MAX_SUMMARY_DECIMALS {
            return Err(ConfigValidationError::InvalidSummaryDecimals {
                value: self.summary_decimals,
                max: defaults::MAX_SUMMARY_DECIMALS,
            });
        }

        let ascending = self.wait_thresholds.windows(2).all(|pair| pair[0] < pair[1]);
        if !ascending || self.wait_thresholds.contains(&0) {
            return Err(ConfigValidationError::InvalidThresholds(self.wait_thresholds.clone()));
        }

        Ok(())
    }

    /// Whether a raw category tag is on the skip list
    pub fn is_skipped(&self, tag: &str) -> bool {
        self.skip_categories.iter().any(|c| c == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            inputs: Vec::new(),
            config: None,
            output: None,
            name: None,
            header_marker: None,
            chart_stride: None,
            summary_decimals: None,
            verbose: false,
            debug: false,
            json_logs: false,
            dry_run: false,
            print_config: false,
        }
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();

        assert_eq!(config.header_marker, "SimulationID");
        assert_eq!(config.skip_categories, vec!["NoPassengers", "RemoteMonitoring"]);
        assert_eq!(config.summary_decimals, 1);
        assert_eq!(config.chart_sample_stride, 60);
        assert_eq!(config.wait_thresholds, vec![60, 120, 180, 240]);
        assert!(config.scenario_name.is_none());
        assert!(config.output_path.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_inputs_cli_parsing() {
        let cli_args = CliArgs::try_parse_from(["test", "a.elvr", "b.elvr"]).unwrap();
        assert_eq!(cli_args.inputs, vec!["a.elvr", "b.elvr"]);

        let cli_args = CliArgs::try_parse_from(["test"]).unwrap();
        assert!(cli_args.inputs.is_empty());
    }

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs {
            header_marker: Some("SimID".to_string()),
            chart_stride: Some(30),
            summary_decimals: Some(2),
            name: Some("Tower A".to_string()),
            output: Some("out.json".to_string()),
            ..empty_args()
        };

        let config = PipelineConfig::from_cli_args(args).unwrap();
        assert_eq!(config.header_marker, "SimID");
        assert_eq!(config.chart_sample_stride, 30);
        assert_eq!(config.summary_decimals, 2);
        assert_eq!(config.scenario_name.as_deref(), Some("Tower A"));
        assert_eq!(config.output_path.as_deref(), Some("out.json"));
    }

    #[test]
    fn test_config_file_loading() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        let config_json = r#"{
            "chart_sample_stride": 120,
            "wait_thresholds": [30, 90],
            "skip_categories": ["NoPassengers"]
        }"#;
        temp_file.write_all(config_json.as_bytes()).unwrap();

        let config = PipelineConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.chart_sample_stride, 120);
        assert_eq!(config.wait_thresholds, vec![30, 90]);
        assert_eq!(config.skip_categories, vec!["NoPassengers"]);
        // Unspecified fields fall back to defaults
        assert_eq!(config.header_marker, "SimulationID");
        assert_eq!(config.summary_decimals, 1);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        use std::io::Write;
        use tempfile::Builder;

        let mut temp_file = Builder::new().suffix(".json").tempfile().unwrap();
        temp_file.write_all(br#"{"chart_sample_stride": 120}"#).unwrap();

        let args = CliArgs {
            config: Some(temp_file.path().display().to_string()),
            chart_stride: Some(15),
            ..empty_args()
        };
        let config = PipelineConfig::from_cli_args(args).unwrap();
        assert_eq!(config.chart_sample_stride, 15);
    }

    #[test]
    fn test_config_file_errors() {
        let missing = PipelineConfig::from_file("/definitely/not/here.json");
        assert!(matches!(missing, Err(ConfigError::FileNotFound(_))));

        let toml_file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let unsupported = PipelineConfig::from_file(toml_file.path());
        assert!(matches!(unsupported, Err(ConfigError::UnsupportedFormat(ext)) if ext == "toml"));
    }

    #[test]
    fn test_validation_failures() {
        let config = PipelineConfig { header_marker: "  ".to_string(), ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyHeaderMarker));

        let config = PipelineConfig { chart_sample_stride: 0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidChartStride));

        let config = PipelineConfig { summary_decimals: 9, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidSummaryDecimals { value: 9, .. })
        ));

        let config = PipelineConfig { wait_thresholds: vec![120, 60], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidThresholds(_))));

        let config = PipelineConfig { wait_thresholds: vec![0, 60], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigValidationError::InvalidThresholds(_))));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = PipelineConfig::default();
        let json = config.print_json().unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let config = PipelineConfig { chart_sample_stride: 10, ..Default::default() };
        config.save_to_file(&path).unwrap();

        let loaded = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(loaded.chart_sample_stride, 10);
    }

    #[test]
    fn test_skip_list_lookup() {
        let config = PipelineConfig::default();
        assert!(config.is_skipped("NoPassengers"));
        assert!(config.is_skipped("RemoteMonitoring"));
        assert!(!config.is_skipped("Person"));
    }
}
