//! Pipeline domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stored pipeline record, without its configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: Uuid,
    pub team_name: String,
    pub name: String,
    pub paused: bool,
    pub version: ConfigVersion,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Per-pipeline configuration version
///
/// Doubles as the compare-and-swap token: a save must present the version it
/// was based on, and a successful save stores `version + 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigVersion(pub u64);

impl ConfigVersion {
    /// Version a successful save based on `self` is stored under
    pub fn next(self) -> Option<ConfigVersion> {
        self.0.checked_add(1).map(ConfigVersion)
    }
}

impl fmt::Display for ConfigVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConfigVersion {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(ConfigVersion)
    }
}

impl From<u64> for ConfigVersion {
    fn from(version: u64) -> Self {
        ConfigVersion(version)
    }
}

/// Pause instruction carried by a save request
///
/// `NoChange` is never stored; it only tells storage to leave the current
/// paused flag alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PausedState {
    Pause,
    Unpause,
    #[default]
    NoChange,
}

impl PausedState {
    /// Flag value to write, if any
    pub fn as_flag(self) -> Option<bool> {
        match self {
            PausedState::Pause => Some(true),
            PausedState::Unpause => Some(false),
            PausedState::NoChange => None,
        }
    }

    /// Form value used on the wire, `None` for `NoChange`
    pub fn form_value(self) -> Option<&'static str> {
        match self {
            PausedState::Pause => Some("true"),
            PausedState::Unpause => Some("false"),
            PausedState::NoChange => None,
        }
    }
}
