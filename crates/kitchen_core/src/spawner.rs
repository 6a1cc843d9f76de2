//! Customer spawner: keeps up to `capacity` customers alive, spacing new
//! arrivals by a delay drawn from the current day period's bucket.

use std::collections::HashMap;

use rand::Rng;

use crate::customer::spawn_customer;
use crate::engine::TickContext;
use crate::{
    emit, CustomerId, CustomerState, DayPeriod, Event, EventEnvelope, EventLevel, GameContent,
    GameState, Navigator, SpawnerState,
};

impl SpawnerState {
    pub fn new(capacity: usize, enabled: bool, initial_delay_s: f32) -> Self {
        Self {
            roster: Vec::new(),
            capacity,
            delay_remaining_s: initial_delay_s,
            enabled,
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.roster.len() < self.capacity
    }

    /// Drops roster entries whose customer no longer exists or has already
    /// departed. Returns how many were dropped.
    pub fn prune(&mut self, customers: &HashMap<CustomerId, CustomerState>) -> usize {
        let before = self.roster.len();
        self.roster
            .retain(|id| customers.get(id).is_some_and(|c| !c.is_departed()));
        before - self.roster.len()
    }

    /// Removes `id` from the roster. Returns `false` if it was not there.
    pub fn remove_customer(&mut self, id: &CustomerId) -> bool {
        let Some(index) = self.roster.iter().position(|r| r == id) else {
            return false;
        };
        self.roster.remove(index);
        true
    }
}

/// Draws the next spawn delay for `period`, uniform in `[min, max)`.
///
/// A bucket with `min == max` always yields `min`. A missing bucket or an
/// inverted range falls back to `constants.fallback_spawn_delay_s`.
pub fn sample_spawn_delay(content: &GameContent, period: DayPeriod, rng: &mut impl Rng) -> f32 {
    let fallback = content.constants.fallback_spawn_delay_s;
    let Some(bucket) = content.day_periods.iter().find(|d| d.period == period) else {
        return fallback;
    };
    let (min, max) = (bucket.spawn_delay_min_s, bucket.spawn_delay_max_s);
    if min < 0.0 || max < min {
        return fallback;
    }
    if (max - min).abs() < f32::EPSILON {
        return min;
    }
    rng.gen_range(min..max)
}

/// Spawns one customer if the spawner is running and below capacity.
pub(crate) fn attempt_spawn<N: Navigator>(
    state: &mut GameState,
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> Option<CustomerId> {
    if !state.spawner.enabled || state.clock.day_ended {
        return None;
    }
    state.spawner.prune(&state.customers);
    if !state.spawner.has_capacity() {
        if ctx.event_level == EventLevel::Debug {
            events.push(emit(
                &mut state.counters,
                state.meta.tick,
                Event::SpawnSkipped {
                    roster: state.spawner.roster.len(),
                    capacity: state.spawner.capacity,
                },
            ));
        }
        return None;
    }
    Some(spawn_customer(state, ctx, rng, events))
}

/// Roster removal plus an immediate refill attempt. Removing an id that is
/// not on the roster does nothing, so a departure is never counted twice.
pub(crate) fn remove_customer<N: Navigator>(
    state: &mut GameState,
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
    id: &CustomerId,
) -> bool {
    if !state.spawner.remove_customer(id) {
        return false;
    }
    attempt_spawn(state, ctx, rng, events);
    true
}

pub(crate) fn tick_spawner<N: Navigator>(
    state: &mut GameState,
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    if !state.spawner.enabled || state.clock.day_ended {
        return;
    }
    state.spawner.delay_remaining_s -= ctx.dt;
    if state.spawner.delay_remaining_s > 0.0 {
        return;
    }
    attempt_spawn(state, ctx, rng, events);
    state.spawner.delay_remaining_s = sample_spawn_delay(ctx.content, state.clock.period, rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, make_rng};

    #[test]
    fn delay_stays_inside_bucket() {
        let content = base_content();
        let mut rng = make_rng();
        for _ in 0..200 {
            let delay = sample_spawn_delay(&content, DayPeriod::Noon, &mut rng);
            assert!((5.0..8.0).contains(&delay), "noon delay {delay} out of range");
        }
    }

    #[test]
    fn missing_bucket_uses_fallback() {
        let mut content = base_content();
        content.day_periods.retain(|d| d.period != DayPeriod::Afternoon);
        let delay = sample_spawn_delay(&content, DayPeriod::Afternoon, &mut make_rng());
        assert!((delay - content.constants.fallback_spawn_delay_s).abs() < 1e-6);
    }

    #[test]
    fn inverted_range_uses_fallback_and_flat_range_is_fixed() {
        let mut content = base_content();
        content.day_periods[0].spawn_delay_min_s = 9.0;
        content.day_periods[0].spawn_delay_max_s = 3.0;
        let period = content.day_periods[0].period;
        let delay = sample_spawn_delay(&content, period, &mut make_rng());
        assert!((delay - content.constants.fallback_spawn_delay_s).abs() < 1e-6);

        content.day_periods[0].spawn_delay_max_s = 9.0;
        let delay = sample_spawn_delay(&content, period, &mut make_rng());
        assert!((delay - 9.0).abs() < 1e-6);
    }

    #[test]
    fn removing_unknown_id_is_noop() {
        let mut spawner = SpawnerState::new(2, true, 1.0);
        spawner.roster.push(CustomerId("customer_0001".to_string()));
        assert!(!spawner.remove_customer(&CustomerId("customer_0009".to_string())));
        assert!(spawner.remove_customer(&CustomerId("customer_0001".to_string())));
        assert!(!spawner.remove_customer(&CustomerId("customer_0001".to_string())));
        assert!(spawner.roster.is_empty());
    }

    #[test]
    fn prune_drops_vanished_customers() {
        let mut spawner = SpawnerState::new(3, true, 1.0);
        spawner.roster.push(CustomerId("customer_0001".to_string()));
        assert_eq!(spawner.prune(&HashMap::new()), 1);
        assert!(spawner.has_capacity());
    }
}
