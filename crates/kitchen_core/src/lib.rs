//! `kitchen_core`: deterministic food-truck simulation tick.
//!
//! No IO beyond the metrics writer, no engine. All randomness via the passed-in
//! Rng, all time via the passed-in `dt`.

mod assembly;
mod clock;
mod customer;
mod engine;
mod id;
pub mod metrics;
mod movement;
mod queue;
mod scoring;
mod settle;
mod spawner;
mod station;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use engine::tick;
pub use id::generate_uuid;
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use movement::{Navigator, OpenFloor};
pub use spawner::sample_spawn_delay;
pub use glam::Vec3;
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, tick: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, tick, event }
}

/// Relative slack when checking a running timer against its threshold. Summing
/// fractional `dt` steps lands a few ulps short of the exact total.
const TIMER_SLACK: f64 = 1e-6;

/// True once `remaining_s` is within rounding of zero for a timer of `total_s`.
pub(crate) fn timer_expired(remaining_s: f64, total_s: f64) -> bool {
    remaining_s <= total_s.abs() * TIMER_SLACK
}

#[cfg(test)]
mod tests;
