//! ELVR log parsing
//!
//! This module splits raw ELVR text into typed sections tagged with their
//! simulation and run, and summarises what an upload contains.
//!
//! # Usage Example
//!
//! ```rust
//! use elvr_pipeline::parser::*;
//!
//! let text = "SimulationID: X, 1\nSpatialPlot,A,0,1,0,2.5\nSpatialPlot,A,4,1,0,2.5\n";
//! let parsed = parse(text).unwrap();
//!
//! assert_eq!(parsed.entries.len(), 1);
//! assert_eq!(parsed.entries[0].lift_count, Some(1));
//! assert_eq!(summarize_catalog(&parsed)[0].run_count, 1);
//! ```

pub mod catalog;
pub mod section_parser;

pub use catalog::*;
pub use section_parser::*;
