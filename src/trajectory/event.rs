use serde::{Deserialize, Serialize};

/// A named timestamp along a trajectory, used to trigger side effects during playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMarker {
    #[serde(default)]
    pub event: String,
    /// Seconds since the start of the trajectory. A missing value reads as invalid.
    #[serde(default = "missing_timestamp")]
    pub timestamp: f64,
}

fn missing_timestamp() -> f64 {
    -1.0
}

impl EventMarker {
    pub fn new(event: impl Into<String>, timestamp: f64) -> Self {
        Self {
            event: event.into(),
            timestamp,
        }
    }

    pub fn offset_by(&self, offset: f64) -> Self {
        Self {
            event: self.event.clone(),
            timestamp: self.timestamp + offset,
        }
    }

    /// Markers with an empty name or a negative timestamp are dropped at load.
    pub fn is_valid(&self) -> bool {
        !self.event.is_empty() && self.timestamp >= 0.0
    }
}
