//! Identifier types for the ELVR pipeline
//!
//! Simulation, run and lift identifiers are carried through verbatim from the
//! log text. Lobby identifiers are numeric because lift direction is derived by
//! comparing them. Uploads get a UUID-based identifier.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a simulation scenario, taken from a `SimulationID:` header
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationId(pub String);

impl SimulationId {
    /// Placeholder for data lines that appear before any header
    pub const UNASSIGNED: &'static str = "unassigned";

    /// Create a simulation id from its textual form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Simulation id used before the first header line
    pub fn unassigned() -> Self {
        Self(Self::UNASSIGNED.to_string())
    }

    /// Borrow the textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SimulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SimulationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of one stochastic run within a simulation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Create a run id from its textual form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Run id used before the first header line
    pub fn unassigned() -> Self {
        Self(SimulationId::UNASSIGNED.to_string())
    }

    /// Borrow the textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a lift car
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiftId(pub String);

impl LiftId {
    /// Create a lift id from its textual form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LiftId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of a lobby (floor / landing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(pub i64);

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LobbyId {
    type Err = String;

    /// Accepts integers and integral floats (`"3"`, `"3.0"`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(value) = s.parse::<i64>() {
            return Ok(LobbyId(value));
        }
        match s.parse::<f64>() {
            Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(LobbyId(value as i64)),
            _ => Err(format!("Invalid lobby id: {:?}", s)),
        }
    }
}

/// Sequential passenger identifier, 0-based and unique within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassengerId(pub usize);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one processed upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UploadId(pub Uuid);

impl UploadId {
    /// Create a new random upload ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UPL_{}", self.0.simple())
    }
}

impl Serialize for UploadId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("UPL_{}", self.0.simple()))
    }
}

impl<'de> Deserialize<'de> for UploadId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let uuid_str = s.strip_prefix("UPL_").unwrap_or(&s);
        let uuid = Uuid::parse_str(uuid_str).map_err(serde::de::Error::custom)?;
        Ok(UploadId(uuid))
    }
}
