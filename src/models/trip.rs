use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::tariff::FareBreakdown;
use crate::models::route::SpecialZoneSelection;
use crate::models::surcharge::Surcharges;

pub const QUICK_STOP_COST: f64 = 20.0;
pub const SERVICE_STOP_COST: f64 = 50.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TripState {
    pub raw_distance_km: f64,
    pub adjusted_distance_km: f64,
    pub waiting_seconds: u64,
    pub cost: f64,
    pub is_running: bool,
    pub is_paused: bool,
}

impl TripState {
    pub fn waiting_minutes(&self) -> u64 {
        self.waiting_seconds / 60
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopKind {
    /// Passengers only get off.
    Quick,
    /// The driver waits or runs an errand.
    Service,
}

impl StopKind {
    pub fn cost(&self) -> f64 {
        match self {
            StopKind::Quick => QUICK_STOP_COST,
            StopKind::Service => SERVICE_STOP_COST,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            StopKind::Quick => "quick",
            StopKind::Service => "service",
        }
    }
}

/// Waypoint charges registered during the current trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StopCharges {
    pub count: u32,
    pub cost: f64,
}

impl StopCharges {
    pub fn add(&mut self, kind: StopKind) {
        self.count += 1;
        self.cost += kind.cost();
    }
}

/// Frozen record of a finished trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub id: Uuid,
    pub route: &'static str,
    pub sub_route: Option<&'static str>,
    pub distance_km: f64,
    pub raw_distance_km: f64,
    pub waiting_seconds: u64,
    pub cost: f64,
    pub display_cost: u64,
    pub special_zone: SpecialZoneSelection,
    pub surcharges: Surcharges,
    pub stops: StopCharges,
    pub breakdown: FareBreakdown,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_charges_accumulate() {
        let mut stops = StopCharges::default();
        stops.add(StopKind::Quick);
        stops.add(StopKind::Service);
        stops.add(StopKind::Quick);

        assert_eq!(stops.count, 3);
        assert_eq!(stops.cost, 90.0);
    }

    #[test]
    fn waiting_minutes_are_floored() {
        let state = TripState {
            waiting_seconds: 179,
            ..TripState::default()
        };
        assert_eq!(state.waiting_minutes(), 2);
    }
}
