//! Core types and identifiers for the ELVR pipeline
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the pipeline.
//!
//! # Overview
//!
//! - **Identifiers**: simulation, run, lift, lobby and passenger identifiers
//! - **Enums**: log categories, lift motion labels, skip/missing tags
//! - **Configuration**: pipeline configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use elvr_pipeline::types::*;
//!
//! let category = LogCategory::from_tag("SpatialPlot");
//! assert_eq!(category, LogCategory::LiftMovement);
//!
//! let lobby: LobbyId = "3".parse().unwrap();
//! assert_eq!(lobby, LobbyId(3));
//!
//! let config = PipelineConfig {
//!     chart_sample_stride: 30,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use enums::*;
pub use identifiers::*;
