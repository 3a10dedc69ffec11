use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub command_queue_size: usize,
    pub position_queue_size: usize,
    pub event_buffer_size: usize,
    pub meter: MeterConfig,
}

/// Timing knobs for the meter engine task.
#[derive(Debug, Clone)]
pub struct MeterConfig {
    pub waiting_tick: Duration,
    pub simulation_tick: Duration,
    pub position_max_age: Duration,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            waiting_tick: Duration::from_millis(1000),
            simulation_tick: Duration::from_millis(1000),
            position_max_age: Duration::from_millis(10_000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            command_queue_size: parse_or_default("COMMAND_QUEUE_SIZE", 64)?,
            position_queue_size: parse_or_default("POSITION_QUEUE_SIZE", 1024)?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", 256)?,
            meter: MeterConfig {
                waiting_tick: millis_or_default("WAITING_TICK_MS", 1000)?,
                simulation_tick: millis_or_default("SIMULATION_TICK_MS", 1000)?,
                position_max_age: millis_or_default("POSITION_MAX_AGE_MS", 10_000)?,
            },
        })
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}

fn millis_or_default(key: &str, default: u64) -> Result<Duration, AppError> {
    let millis: u64 = parse_or_default(key, default)?;
    if millis == 0 {
        return Err(AppError::Internal(format!("invalid {key}: must be > 0")));
    }
    Ok(Duration::from_millis(millis))
}
