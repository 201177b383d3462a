//! Enumeration types for the ELVR pipeline
//!
//! This module contains the section categories recognised in ELVR logs, the
//! derived lift motion labels, and the small tags used when reporting skipped
//! sections and runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category tag carried in the first field of every ELVR data line
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogCategory {
    /// `SpatialPlot` - lift arrival/departure records
    LiftMovement,
    /// `Person` - one record per passenger journey
    PassengerEvent,
    /// `NoPassengers` - carries no analytic value
    NoPassengers,
    /// `RemoteMonitoring` - carries no analytic value
    RemoteMonitoring,
    /// Any other tag, passed through with positional columns
    Other(String),
}

impl LogCategory {
    /// Tag of lift movement sections
    pub const LIFT_MOVEMENT_TAG: &'static str = "SpatialPlot";
    /// Tag of passenger event sections
    pub const PASSENGER_EVENT_TAG: &'static str = "Person";

    /// Map a raw category tag to its category
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            Self::LIFT_MOVEMENT_TAG => LogCategory::LiftMovement,
            Self::PASSENGER_EVENT_TAG => LogCategory::PassengerEvent,
            "NoPassengers" => LogCategory::NoPassengers,
            "RemoteMonitoring" => LogCategory::RemoteMonitoring,
            other => LogCategory::Other(other.to_string()),
        }
    }

    /// The tag as it appears in the log
    pub fn tag(&self) -> &str {
        match self {
            LogCategory::LiftMovement => Self::LIFT_MOVEMENT_TAG,
            LogCategory::PassengerEvent => Self::PASSENGER_EVENT_TAG,
            LogCategory::NoPassengers => "NoPassengers",
            LogCategory::RemoteMonitoring => "RemoteMonitoring",
            LogCategory::Other(tag) => tag,
        }
    }

    /// Whether this category has a semantic column schema
    pub fn has_schema(&self) -> bool {
        matches!(self, LogCategory::LiftMovement | LogCategory::PassengerEvent)
    }
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl From<String> for LogCategory {
    fn from(tag: String) -> Self {
        LogCategory::from_tag(&tag)
    }
}

impl From<LogCategory> for String {
    fn from(category: LogCategory) -> Self {
        category.tag().to_string()
    }
}

/// Motion state derived for a lift movement row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LiftStatus {
    /// Arrival record (even position in the lift's sequence)
    Arriving,
    /// Departure towards a higher lobby
    Ascending,
    /// Departure towards a lower or the same lobby
    Descending,
    /// Departure record with no following record
    Terminating,
    /// Not yet derived
    #[default]
    Unknown,
}

impl fmt::Display for LiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiftStatus::Arriving => write!(f, "arriving"),
            LiftStatus::Ascending => write!(f, "ascending"),
            LiftStatus::Descending => write!(f, "descending"),
            LiftStatus::Terminating => write!(f, "terminating"),
            LiftStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for LiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arriving" => Ok(LiftStatus::Arriving),
            "ascending" => Ok(LiftStatus::Ascending),
            "descending" => Ok(LiftStatus::Descending),
            "terminating" => Ok(LiftStatus::Terminating),
            "unknown" => Ok(LiftStatus::Unknown),
            _ => Err(format!("Unknown lift status: {}", s)),
        }
    }
}

/// Which required table a run is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTable {
    /// No lift movement section
    Lift,
    /// No passenger event section
    Passenger,
    /// Neither section
    Both,
}

impl fmt::Display for MissingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingTable::Lift => write!(f, "lift movement table"),
            MissingTable::Passenger => write!(f, "passenger event table"),
            MissingTable::Both => write!(f, "lift movement and passenger event tables"),
        }
    }
}

/// Why a closed section did not become a log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Category is on the skip list
    Discarded,
    /// Rows could not be materialised
    ParseFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Discarded => write!(f, "discarded category"),
            SkipReason::ParseFailed(reason) => write!(f, "parse failed: {}", reason),
        }
    }
}
