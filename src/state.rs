use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc, watch};
use uuid::Uuid;

use crate::engine::controller::TripController;
use crate::engine::meter::{CommandEnvelope, PositionEvent};
use crate::models::meter::{MeterEvent, MeterSnapshot};
use crate::models::trip::TripSummary;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub command_tx: mpsc::Sender<CommandEnvelope>,
    pub position_tx: mpsc::Sender<PositionEvent>,
    pub snapshot_rx: watch::Receiver<MeterSnapshot>,
    pub meter_events_tx: broadcast::Sender<MeterEvent>,
    /// Trips completed since the process started.
    pub summaries: DashMap<Uuid, TripSummary>,
    pub metrics: Metrics,
}

/// Receiving halves owned by the meter engine task.
pub struct MeterChannels {
    pub command_rx: mpsc::Receiver<CommandEnvelope>,
    pub position_rx: mpsc::Receiver<PositionEvent>,
    pub snapshot_tx: watch::Sender<MeterSnapshot>,
}

impl AppState {
    pub fn new(
        command_queue_size: usize,
        position_queue_size: usize,
        event_buffer_size: usize,
    ) -> (Self, MeterChannels) {
        let (command_tx, command_rx) = mpsc::channel(command_queue_size);
        let (position_tx, position_rx) = mpsc::channel(position_queue_size);
        let (snapshot_tx, snapshot_rx) = watch::channel(TripController::new().snapshot(false));
        let (meter_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                command_tx,
                position_tx,
                snapshot_rx,
                meter_events_tx,
                summaries: DashMap::new(),
                metrics: Metrics::new(),
            },
            MeterChannels {
                command_rx,
                position_rx,
                snapshot_tx,
            },
        )
    }

    pub fn snapshot(&self) -> MeterSnapshot {
        self.snapshot_rx.borrow().clone()
    }
}
