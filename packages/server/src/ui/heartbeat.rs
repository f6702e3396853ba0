//! Transport-level heartbeat.
//!
//! Pings every open transport at a fixed interval so that dead peers surface
//! as transport errors. Room state is never touched here.

use std::{sync::Arc, time::Duration};

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::domain::MessagePusher;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest accepted period. `tokio::time::interval` panics on zero.
pub const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(10);

/// Raise a period below [`MIN_HEARTBEAT_INTERVAL`] to the minimum.
pub fn clamp_interval(period: Duration) -> Duration {
    if period < MIN_HEARTBEAT_INTERVAL {
        tracing::warn!(
            "Heartbeat interval {:?} is too short, using {:?}",
            period,
            MIN_HEARTBEAT_INTERVAL
        );
        return MIN_HEARTBEAT_INTERVAL;
    }
    period
}

pub fn spawn_heartbeat(message_pusher: Arc<dyn MessagePusher>, period: Duration) -> JoinHandle<()> {
    let period = clamp_interval(period);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let pinged = message_pusher.ping_all().await;
            tracing::debug!("Heartbeat pinged {} transport(s)", pinged);
        }
    })
}
