use tokio::sync::oneshot;

use crate::engine::meter::{CommandEnvelope, MeterCommand, PositionEvent};
use crate::error::AppError;
use crate::models::meter::MeterSnapshot;
use crate::state::AppState;

/// Hands a command to the meter engine and waits for the resulting snapshot.
pub async fn send_command(
    state: &AppState,
    command: MeterCommand,
) -> Result<MeterSnapshot, AppError> {
    let (reply, response) = oneshot::channel();

    state
        .command_tx
        .send(CommandEnvelope { command, reply })
        .await
        .map_err(|_| AppError::MeterUnavailable)?;

    let result = response.await.map_err(|_| AppError::MeterUnavailable)?;
    Ok(result?)
}

pub async fn enqueue_position(state: &AppState, event: PositionEvent) -> Result<(), AppError> {
    state
        .position_tx
        .send(event)
        .await
        .map_err(|err| AppError::Internal(format!("position queue send failed: {err}")))
}
