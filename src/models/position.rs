use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single fix from the positional-sample source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }

    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, Utc::now())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GpsStatus {
    Requesting,
    Available,
    Denied,
    Unavailable,
}

/// Failure classes the position source may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GpsFailure {
    PermissionDenied,
    Unavailable,
}

impl From<GpsFailure> for GpsStatus {
    fn from(failure: GpsFailure) -> Self {
        match failure {
            GpsFailure::PermissionDenied => GpsStatus::Denied,
            GpsFailure::Unavailable => GpsStatus::Unavailable,
        }
    }
}

/// What the controller did with an incoming sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleOutcome {
    /// No trip running; only the last known position was updated.
    Ignored,
    /// First sample after start; became the reference point.
    Reference,
    /// Movement above the noise threshold was credited.
    Accepted,
    /// Movement below the noise threshold was dropped.
    Jitter,
}

impl SampleOutcome {
    pub fn as_label(&self) -> &'static str {
        match self {
            SampleOutcome::Ignored => "ignored",
            SampleOutcome::Reference => "reference",
            SampleOutcome::Accepted => "accepted",
            SampleOutcome::Jitter => "jitter",
        }
    }
}
