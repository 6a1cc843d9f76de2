//! Time of day. Drives which spawn-rate bucket the spawner draws from.

use rand::Rng;

use crate::{
    emit, Constants, DayClock, DayPeriod, DayPeriodDef, Event, EventEnvelope, GameContent,
    GameState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClockTransition {
    PeriodChanged(DayPeriod),
    DayEnded,
}

impl DayClock {
    pub fn start(constants: &Constants, periods: &[DayPeriodDef]) -> Self {
        let minutes = constants.day_start_hour as f32 * 60.0;
        Self {
            minutes,
            period: period_at(minutes, periods),
            day_ended: false,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn hour(&self) -> u32 {
        (self.minutes / 60.0).floor().max(0.0) as u32
    }

    /// `HH:MM`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn formatted(&self) -> String {
        let minute = (self.minutes % 60.0).floor().max(0.0) as u32;
        format!("{:02}:{minute:02}", self.hour())
    }

    /// Fraction of the working day elapsed, `[0, 1]`.
    pub fn day_progress(&self, constants: &Constants) -> f32 {
        let start = constants.day_start_hour as f32 * 60.0;
        let total = (constants.day_end_hour as f32 * 60.0) - start;
        if total <= 0.0 {
            return 1.0;
        }
        ((self.minutes - start) / total).clamp(0.0, 1.0)
    }

    pub(crate) fn advance(
        &mut self,
        dt: f32,
        constants: &Constants,
        periods: &[DayPeriodDef],
    ) -> Option<ClockTransition> {
        if self.day_ended {
            return None;
        }
        self.minutes += dt * constants.game_minutes_per_second;

        let end_minutes = constants.day_end_hour as f32 * 60.0;
        if self.minutes >= end_minutes {
            self.minutes = end_minutes;
            self.day_ended = true;
            return Some(ClockTransition::DayEnded);
        }

        let period = period_at(self.minutes, periods);
        if period == self.period {
            return None;
        }
        self.period = period;
        Some(ClockTransition::PeriodChanged(period))
    }
}

/// The bucket with the latest start hour not after the current hour. Before
/// the first bucket starts, the earliest bucket applies.
pub(crate) fn period_at(minutes: f32, periods: &[DayPeriodDef]) -> DayPeriod {
    let hour = (minutes / 60.0).floor();
    periods
        .iter()
        .filter(|def| def.starts_at_hour as f32 <= hour)
        .max_by_key(|def| def.starts_at_hour)
        .or_else(|| periods.iter().min_by_key(|def| def.starts_at_hour))
        .map_or(DayPeriod::Morning, |def| def.period)
}

pub(crate) fn tick_clock(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    dt: f32,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;
    let Some(transition) = state
        .clock
        .advance(dt, &content.constants, &content.day_periods)
    else {
        return;
    };

    match transition {
        ClockTransition::PeriodChanged(period) => {
            // A new period restarts the spawn wait with that period's rate.
            state.spawner.delay_remaining_s = crate::sample_spawn_delay(content, period, rng);
            tracing::debug!(?period, time = %state.clock.formatted(), "period changed");
            events.push(emit(
                &mut state.counters,
                current_tick,
                Event::PeriodChanged { period },
            ));
        }
        ClockTransition::DayEnded => {
            tracing::info!(time = %state.clock.formatted(), "day ended");
            events.push(emit(&mut state.counters, current_tick, Event::DayEnded));
        }
    }
}
