//! Trip lifecycle state machine.

use chrono::Utc;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::tariff::{self, FareBreakdown, FareInput};
use crate::error::TripError;
use crate::geo;
use crate::models::meter::{MeterSnapshot, MeterStatus};
use crate::models::position::{GpsFailure, GpsStatus, Position, SampleOutcome};
use crate::models::route::{RouteSelection, SpecialZoneSelection, find_route, find_zone};
use crate::models::surcharge::{
    ErrandKind, ErrandSurcharge, PassengerSurcharge, PetSurcharge, Surcharges,
};
use crate::models::trip::{StopCharges, StopKind, TripState, TripSummary};

/// Movement at or below this is treated as GPS jitter.
pub const NOISE_THRESHOLD_M: f64 = 15.0;
/// Discount per completed kilometer.
pub const DISCOUNT_PER_COMPLETED_KM: f64 = 0.125;
/// Distance credited per simulation tick.
pub const SIMULATION_STEP_KM: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Paused { since: Instant },
}

#[derive(Debug)]
pub struct TripController {
    phase: Phase,
    state: TripState,
    /// Waiting seconds folded in from finished pauses.
    waiting_folded: u64,
    route: RouteSelection,
    special_zone: SpecialZoneSelection,
    surcharges: Surcharges,
    stops: StopCharges,
    reference: Option<Position>,
    last_position: Option<Position>,
    gps_status: GpsStatus,
    last_summary: Option<TripSummary>,
}

impl Default for TripController {
    fn default() -> Self {
        Self::new()
    }
}

impl TripController {
    pub fn new() -> Self {
        let mut controller = Self {
            phase: Phase::Idle,
            state: TripState::default(),
            waiting_folded: 0,
            route: RouteSelection::default(),
            special_zone: SpecialZoneSelection::default(),
            surcharges: Surcharges::default(),
            stops: StopCharges::default(),
            reference: None,
            last_position: None,
            gps_status: GpsStatus::Requesting,
            last_summary: None,
        };
        controller.recompute_cost();
        controller
    }

    pub fn state(&self) -> &TripState {
        &self.state
    }

    pub fn route(&self) -> &RouteSelection {
        &self.route
    }

    pub fn special_zone(&self) -> &SpecialZoneSelection {
        &self.special_zone
    }

    pub fn surcharges(&self) -> &Surcharges {
        &self.surcharges
    }

    pub fn stops(&self) -> &StopCharges {
        &self.stops
    }

    pub fn reference(&self) -> Option<&Position> {
        self.reference.as_ref()
    }

    pub fn last_position(&self) -> Option<&Position> {
        self.last_position.as_ref()
    }

    pub fn gps_status(&self) -> GpsStatus {
        self.gps_status
    }

    pub fn last_summary(&self) -> Option<&TripSummary> {
        self.last_summary.as_ref()
    }

    /// Running or paused.
    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, Phase::Paused { .. })
    }

    pub fn start(&mut self) -> Result<(), TripError> {
        if self.is_active() {
            return Err(TripError::TripInProgress);
        }
        if self.last_position.is_none() {
            warn!("start requested before any position fix");
            return Err(TripError::NoPosition);
        }

        self.phase = Phase::Running;
        self.reference = None;
        self.waiting_folded = 0;
        self.state = TripState {
            is_running: true,
            ..TripState::default()
        };
        self.recompute_cost();

        info!(route = self.route.route.id, "trip started");
        Ok(())
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), TripError> {
        if !self.is_running() {
            return Err(TripError::NotRunning);
        }

        self.phase = Phase::Paused { since: now };
        self.state.is_paused = true;
        self.recompute_cost();

        info!(distance_km = self.state.adjusted_distance_km, "trip paused");
        Ok(())
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), TripError> {
        let Phase::Paused { since } = self.phase else {
            return Err(TripError::NotPaused);
        };

        self.waiting_folded += whole_seconds(since, now);
        self.state.waiting_seconds = self.waiting_folded;
        self.phase = Phase::Running;
        self.state.is_paused = false;
        self.recompute_cost();

        info!(waiting_seconds = self.state.waiting_seconds, "trip resumed");
        Ok(())
    }

    /// Refreshes the live waiting time of an open pause. Returns whether
    /// anything changed.
    pub fn tick_waiting(&mut self, now: Instant) -> bool {
        let Phase::Paused { since } = self.phase else {
            return false;
        };

        let waiting = self.waiting_folded + whole_seconds(since, now);
        if waiting == self.state.waiting_seconds {
            return false;
        }

        self.state.waiting_seconds = waiting;
        self.recompute_cost();
        true
    }

    pub fn stop(&mut self, now: Instant) -> Result<TripSummary, TripError> {
        match self.phase {
            Phase::Idle => return Err(TripError::NoActiveTrip),
            Phase::Paused { since } => {
                self.waiting_folded += whole_seconds(since, now);
                self.state.waiting_seconds = self.waiting_folded;
            }
            Phase::Running => {}
        }
        self.recompute_cost();

        let breakdown = self.breakdown();
        let summary = TripSummary {
            id: Uuid::new_v4(),
            route: self.route.route.name,
            sub_route: self.route.sub_route.map(|leg| leg.name),
            distance_km: self.state.adjusted_distance_km,
            raw_distance_km: self.state.raw_distance_km,
            waiting_seconds: self.state.waiting_seconds,
            cost: self.state.cost,
            display_cost: tariff::display_cost(self.state.cost),
            special_zone: self.special_zone.clone(),
            surcharges: self.surcharges.clone(),
            stops: self.stops.clone(),
            breakdown,
            completed_at: Utc::now(),
        };

        self.reset();
        self.last_summary = Some(summary.clone());

        info!(
            trip_id = %summary.id,
            distance_km = summary.distance_km,
            waiting_seconds = summary.waiting_seconds,
            cost = summary.cost,
            "trip completed"
        );

        Ok(summary)
    }

    /// Records a position fix and, while running, credits movement.
    pub fn ingest_position(&mut self, sample: Position) -> SampleOutcome {
        self.last_position = Some(sample);
        self.gps_status = GpsStatus::Available;

        if !self.is_running() {
            return SampleOutcome::Ignored;
        }

        let Some(reference) = self.reference else {
            self.reference = Some(sample);
            return SampleOutcome::Reference;
        };

        let moved_m = geo::distance_m(&reference, &sample);
        if moved_m <= NOISE_THRESHOLD_M {
            debug!(moved_m, "discarding jitter sample");
            return SampleOutcome::Jitter;
        }

        self.reference = Some(sample);
        self.credit_distance(moved_m / 1000.0);
        SampleOutcome::Accepted
    }

    pub fn report_gps_failure(&mut self, failure: GpsFailure) {
        self.gps_status = failure.into();
        warn!(status = ?self.gps_status, "position source failure");
    }

    /// Credits one synthetic step. Only while running.
    pub fn simulate_step(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.credit_distance(SIMULATION_STEP_KM);
        true
    }

    pub fn add_stop(&mut self, kind: StopKind) -> Result<(), TripError> {
        if !self.is_active() {
            return Err(TripError::NoActiveTrip);
        }

        self.stops.add(kind);
        self.recompute_cost();

        info!(kind = kind.as_label(), stops = self.stops.count, "stop charge added");
        Ok(())
    }

    pub fn select_route(
        &mut self,
        route_id: &str,
        sub_route_id: Option<&str>,
    ) -> Result<(), TripError> {
        self.ensure_idle()?;

        let route =
            find_route(route_id).ok_or_else(|| TripError::UnknownRoute(route_id.to_string()))?;
        let sub_route = match sub_route_id {
            Some(id) => Some(route.sub_route(id).ok_or_else(|| TripError::UnknownSubRoute {
                route: route_id.to_string(),
                sub_route: id.to_string(),
            })?),
            None => None,
        };

        self.route = RouteSelection { route, sub_route };
        self.recompute_cost();
        Ok(())
    }

    /// Toggling the special zone always clears the chosen zone.
    pub fn set_special_zone(&mut self, active: bool) -> Result<(), TripError> {
        self.ensure_idle()?;

        self.special_zone = SpecialZoneSelection { active, zone: None };
        self.recompute_cost();
        Ok(())
    }

    pub fn select_zone(&mut self, name: Option<&str>) -> Result<(), TripError> {
        self.ensure_idle()?;
        if !self.special_zone.active {
            return Err(TripError::ZoneInactive);
        }

        self.special_zone.zone = match name {
            Some(name) => {
                Some(find_zone(name).ok_or_else(|| TripError::UnknownZone(name.to_string()))?)
            }
            None => None,
        };
        self.recompute_cost();
        Ok(())
    }

    pub fn set_passenger_counts(&mut self, adults: u32, children: u32) -> Result<(), TripError> {
        self.ensure_idle()?;

        self.surcharges.passengers = PassengerSurcharge::with_counts(adults, children);
        self.recompute_cost();
        Ok(())
    }

    pub fn set_pet(&mut self, with_cage: Option<bool>) -> Result<(), TripError> {
        self.ensure_idle()?;

        self.surcharges.pet = with_cage.map(PetSurcharge::select).unwrap_or_default();
        self.recompute_cost();
        Ok(())
    }

    pub fn set_errand(&mut self, kind: Option<ErrandKind>) -> Result<(), TripError> {
        self.ensure_idle()?;

        self.surcharges.errand = kind.map(ErrandSurcharge::select).unwrap_or_default();
        self.recompute_cost();
        Ok(())
    }

    pub fn breakdown(&self) -> FareBreakdown {
        tariff::fare_breakdown(&self.fare_input())
    }

    pub fn snapshot(&self, simulating: bool) -> MeterSnapshot {
        let status = MeterStatus::derive(&self.state, self.gps_status);
        MeterSnapshot {
            status,
            status_color: status.color(),
            gps_status: self.gps_status,
            trip: self.state.clone(),
            display_cost: tariff::display_cost(self.state.cost),
            route: self.route.clone(),
            special_zone: self.special_zone.clone(),
            surcharges: self.surcharges.clone(),
            stops: self.stops.clone(),
            last_position: self.last_position,
            simulating,
            last_summary: self.last_summary.clone(),
        }
    }

    fn recompute_cost(&mut self) {
        self.state.cost = tariff::fare(&self.fare_input());
    }

    fn fare_input(&self) -> FareInput<'_> {
        FareInput {
            distance_km: self.state.adjusted_distance_km,
            waiting_minutes: self.state.waiting_minutes(),
            route: &self.route,
            special_zone: &self.special_zone,
            surcharges: &self.surcharges,
            stop_cost: self.stops.cost,
        }
    }

    fn credit_distance(&mut self, km: f64) {
        self.state.raw_distance_km += km;
        self.state.adjusted_distance_km = adjusted_distance(self.state.raw_distance_km);
        self.recompute_cost();
    }

    fn ensure_idle(&self) -> Result<(), TripError> {
        if self.is_active() {
            return Err(TripError::TripInProgress);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.state = TripState::default();
        self.waiting_folded = 0;
        self.route = RouteSelection::default();
        self.special_zone = SpecialZoneSelection::default();
        self.surcharges = Surcharges::default();
        self.stops = StopCharges::default();
        self.reference = None;
        self.recompute_cost();
    }
}

/// Raw distance minus the per-completed-km discount.
pub fn adjusted_distance(raw_km: f64) -> f64 {
    (raw_km - raw_km.floor() * DISCOUNT_PER_COMPLETED_KM).max(0.0)
}

fn whole_seconds(since: Instant, now: Instant) -> u64 {
    now.saturating_duration_since(since).as_secs()
}
