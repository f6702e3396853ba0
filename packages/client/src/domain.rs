//! Domain logic for client-side session state.
//!
//! This module contains pure types and functions without side effects,
//! making them easy to test.

use std::time::Duration;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Transport status as seen by the embedding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub status: ConnectionStatus,
    /// Last participant count reported by the relay
    pub participants: usize,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }
}

/// Delay between a transport close and the next connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Every retry waits the same delay
    Fixed(Duration),
    /// The delay doubles per consecutive failed attempt, capped at `max`
    ExponentialBackoff { initial: Duration, max: Duration },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Fixed(DEFAULT_RECONNECT_DELAY)
    }
}

impl ReconnectPolicy {
    /// Compute the delay before the next attempt.
    ///
    /// # Arguments
    ///
    /// * `consecutive_failures` - Connection attempts that failed since the
    ///   last successful open (0 after a session that opened and then closed)
    pub fn delay(&self, consecutive_failures: u32) -> Duration {
        match *self {
            ReconnectPolicy::Fixed(delay) => delay,
            ReconnectPolicy::ExponentialBackoff { initial, max } => {
                let exponent = consecutive_failures.saturating_sub(1).min(31);
                initial.saturating_mul(1u32 << exponent).min(max)
            }
        }
    }
}
