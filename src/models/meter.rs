use serde::Serialize;

use crate::models::position::{GpsStatus, Position};
use crate::models::route::{RouteSelection, SpecialZoneSelection};
use crate::models::surcharge::Surcharges;
use crate::models::trip::{StopCharges, TripState, TripSummary};

/// Status indicator shown by the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeterStatus {
    Running,
    Paused,
    GpsReady,
    GpsSearching,
    GpsDenied,
    GpsUnavailable,
}

impl MeterStatus {
    pub fn derive(trip: &TripState, gps: GpsStatus) -> Self {
        if trip.is_running {
            return if trip.is_paused {
                MeterStatus::Paused
            } else {
                MeterStatus::Running
            };
        }

        match gps {
            GpsStatus::Available => MeterStatus::GpsReady,
            GpsStatus::Requesting => MeterStatus::GpsSearching,
            GpsStatus::Denied => MeterStatus::GpsDenied,
            GpsStatus::Unavailable => MeterStatus::GpsUnavailable,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            MeterStatus::Running => "lime",
            MeterStatus::Paused => "orange",
            MeterStatus::GpsReady => "purple",
            MeterStatus::GpsSearching | MeterStatus::GpsDenied | MeterStatus::GpsUnavailable => {
                "red"
            }
        }
    }
}

/// One consistent read of the meter, published after every event.
#[derive(Debug, Clone, Serialize)]
pub struct MeterSnapshot {
    pub status: MeterStatus,
    pub status_color: &'static str,
    pub gps_status: GpsStatus,
    pub trip: TripState,
    pub display_cost: u64,
    pub route: RouteSelection,
    pub special_zone: SpecialZoneSelection,
    pub surcharges: Surcharges,
    pub stops: StopCharges,
    pub last_position: Option<Position>,
    pub simulating: bool,
    pub last_summary: Option<TripSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum MeterEvent {
    Snapshot(Box<MeterSnapshot>),
    TripCompleted(Box<TripSummary>),
}
