use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{oneshot, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::config::MeterConfig;
use crate::engine::controller::TripController;
use crate::error::TripError;
use crate::models::meter::{MeterEvent, MeterSnapshot};
use crate::models::position::{GpsFailure, Position};
use crate::models::surcharge::ErrandKind;
use crate::models::trip::{StopKind, TripSummary};
use crate::state::{AppState, MeterChannels};

#[derive(Debug, Clone, PartialEq)]
pub enum MeterCommand {
    Start,
    Pause,
    Resume,
    Stop,
    AddStop(StopKind),
    SetSimulation(bool),
    SelectRoute {
        route_id: String,
        sub_route_id: Option<String>,
    },
    SetSpecialZone(bool),
    SelectZone(Option<String>),
    SetPet(Option<bool>),
    SetErrand(Option<ErrandKind>),
    SetPassengers {
        adults: u32,
        children: u32,
    },
}

impl MeterCommand {
    pub fn as_label(&self) -> &'static str {
        match self {
            MeterCommand::Start => "start",
            MeterCommand::Pause => "pause",
            MeterCommand::Resume => "resume",
            MeterCommand::Stop => "stop",
            MeterCommand::AddStop(_) => "add_stop",
            MeterCommand::SetSimulation(_) => "set_simulation",
            MeterCommand::SelectRoute { .. } => "select_route",
            MeterCommand::SetSpecialZone(_) => "set_special_zone",
            MeterCommand::SelectZone(_) => "select_zone",
            MeterCommand::SetPet(_) => "set_pet",
            MeterCommand::SetErrand(_) => "set_errand",
            MeterCommand::SetPassengers { .. } => "set_passengers",
        }
    }
}

pub struct CommandEnvelope {
    pub command: MeterCommand,
    pub reply: oneshot::Sender<Result<MeterSnapshot, TripError>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionEvent {
    Sample(Position),
    Failure(GpsFailure),
}

/// Owns the trip controller and the timers that drive it.
struct Meter {
    controller: TripController,
    config: MeterConfig,
    snapshot_tx: watch::Sender<MeterSnapshot>,
    waiting_ticker: Option<Interval>,
    simulation_ticker: Option<Interval>,
}

pub async fn run_meter_engine(
    state: Arc<AppState>,
    channels: MeterChannels,
    config: MeterConfig,
) {
    let MeterChannels {
        mut command_rx,
        mut position_rx,
        snapshot_tx,
    } = channels;

    let mut meter = Meter {
        controller: TripController::new(),
        config,
        snapshot_tx,
        waiting_ticker: None,
        simulation_ticker: None,
    };
    meter.publish(&state);

    info!("meter engine started");

    loop {
        tokio::select! {
            envelope = command_rx.recv() => {
                let Some(envelope) = envelope else {
                    break;
                };
                meter.handle_command(&state, envelope);
            }
            Some(event) = position_rx.recv() => {
                meter.handle_position(&state, event);
            }
            _ = next_tick(&mut meter.waiting_ticker) => {
                if meter.controller.tick_waiting(Instant::now()) {
                    meter.publish(&state);
                }
            }
            _ = next_tick(&mut meter.simulation_ticker) => {
                if meter.controller.simulate_step() {
                    meter.publish(&state);
                }
            }
        }
    }

    meter.teardown();
    warn!("meter engine stopped: command channel closed");
}

impl Meter {
    fn handle_command(&mut self, state: &AppState, envelope: CommandEnvelope) {
        let CommandEnvelope { command, reply } = envelope;
        let label = command.as_label();

        let timer = state
            .metrics
            .command_latency_seconds
            .with_label_values(&[label])
            .start_timer();
        let result = self.apply(state, command);
        timer.observe_duration();

        if let Err(err) = &result {
            warn!(command = label, error = %err, "command rejected");
        }

        let snapshot = self.publish(state);
        if reply.send(result.map(|()| snapshot)).is_err() {
            debug!(command = label, "command caller went away before reply");
        }
    }

    fn apply(&mut self, state: &AppState, command: MeterCommand) -> Result<(), TripError> {
        let now = Instant::now();

        match command {
            MeterCommand::Start => self.controller.start(),
            MeterCommand::Pause => {
                self.controller.pause(now)?;
                self.waiting_ticker = Some(ticker(self.config.waiting_tick));
                Ok(())
            }
            MeterCommand::Resume => {
                self.controller.resume(now)?;
                self.waiting_ticker = None;
                Ok(())
            }
            MeterCommand::Stop => {
                let summary = self.controller.stop(now)?;
                self.teardown();
                self.record_summary(state, summary);
                Ok(())
            }
            MeterCommand::AddStop(kind) => {
                self.controller.add_stop(kind)?;
                state
                    .metrics
                    .stop_charges_total
                    .with_label_values(&[kind.as_label()])
                    .inc();
                Ok(())
            }
            MeterCommand::SetSimulation(enabled) => {
                if !enabled {
                    self.simulation_ticker = None;
                    return Ok(());
                }
                if !self.controller.is_active() {
                    return Err(TripError::NoActiveTrip);
                }
                if self.simulation_ticker.is_none() {
                    self.simulation_ticker = Some(ticker(self.config.simulation_tick));
                    info!("simulation started");
                }
                Ok(())
            }
            MeterCommand::SelectRoute {
                route_id,
                sub_route_id,
            } => self
                .controller
                .select_route(&route_id, sub_route_id.as_deref()),
            MeterCommand::SetSpecialZone(active) => self.controller.set_special_zone(active),
            MeterCommand::SelectZone(zone) => self.controller.select_zone(zone.as_deref()),
            MeterCommand::SetPet(with_cage) => self.controller.set_pet(with_cage),
            MeterCommand::SetErrand(kind) => self.controller.set_errand(kind),
            MeterCommand::SetPassengers { adults, children } => {
                self.controller.set_passenger_counts(adults, children)
            }
        }
    }

    fn handle_position(&mut self, state: &AppState, event: PositionEvent) {
        match event {
            PositionEvent::Sample(sample) => {
                if self.is_stale(&sample) {
                    debug!(timestamp = %sample.timestamp, "discarding stale sample");
                    state
                        .metrics
                        .position_samples_total
                        .with_label_values(&["stale"])
                        .inc();
                    return;
                }

                let outcome = self.controller.ingest_position(sample);
                state
                    .metrics
                    .position_samples_total
                    .with_label_values(&[outcome.as_label()])
                    .inc();
            }
            PositionEvent::Failure(failure) => self.controller.report_gps_failure(failure),
        }

        self.publish(state);
    }

    fn is_stale(&self, sample: &Position) -> bool {
        Utc::now()
            .signed_duration_since(sample.timestamp)
            .to_std()
            .map(|age| age > self.config.position_max_age)
            .unwrap_or(false)
    }

    fn record_summary(&self, state: &AppState, summary: TripSummary) {
        state.metrics.trips_completed_total.inc();
        state.summaries.insert(summary.id, summary.clone());
        let _ = state
            .meter_events_tx
            .send(MeterEvent::TripCompleted(Box::new(summary)));
    }

    fn publish(&self, state: &AppState) -> MeterSnapshot {
        let snapshot = self.controller.snapshot(self.simulation_ticker.is_some());

        state.metrics.current_fare.set(snapshot.trip.cost);
        self.snapshot_tx.send_replace(snapshot.clone());
        let _ = state
            .meter_events_tx
            .send(MeterEvent::Snapshot(Box::new(snapshot.clone())));

        snapshot
    }

    /// Drops every recurring timer. Safe to call with nothing running.
    fn teardown(&mut self) {
        self.waiting_ticker = None;
        self.simulation_ticker = None;
    }
}

fn ticker(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
