//! Pipeline orchestration, summaries and ambient services
//!
//! This module contains the upload processor that chains every stage, the
//! scenario summarizer, the summary cache, progress reporting, and the error
//! and logging infrastructure shared by the rest of the crate.

pub mod cache;
pub mod error;
pub mod logging;
pub mod processor;
pub mod progress;
pub mod summary;

pub use cache::*;
pub use error::*;
pub use logging::*;
pub use processor::*;
pub use progress::*;
pub use summary::*;
