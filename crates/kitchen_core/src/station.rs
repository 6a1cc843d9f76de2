//! Cooking station state machine.
//!
//! `Idle → Cooking → Ready → {Burnt | Idle via take}`. `Burnt` only leaves
//! through an explicit reset. Timers clamp at their thresholds and `advance`
//! applies at most one transition per call, so a large `dt` never skips a state.

use crate::{
    emit, timer_expired, CookState, Event, EventEnvelope, FoodDef, FoodPortion, GameState,
    StationDef, StationId, StationState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StationTransition {
    Ready,
    Burnt,
}

impl StationState {
    /// Binds a station to its food descriptor. A station whose food is missing
    /// from `foods` (or unassigned) is created disabled.
    pub fn from_def(def: &StationDef, foods: &[FoodDef]) -> Self {
        let food = def
            .food
            .and_then(|food_type| foods.iter().find(|f| f.food_type == food_type))
            .cloned();
        if food.is_none() {
            tracing::warn!(station = %def.id, "station has no food descriptor, disabling");
        }
        Self {
            id: def.id.clone(),
            enabled: food.is_some(),
            food,
            cook_state: CookState::Idle,
            cook_remaining_s: 0.0,
            ready_elapsed_s: 0.0,
            player_nearby: false,
        }
    }

    /// Starts a cook cycle. Fails without side effects unless the station is
    /// enabled and `Idle`.
    pub fn start_cooking(&mut self) -> bool {
        if !self.enabled || self.cook_state != CookState::Idle {
            return false;
        }
        let Some(food) = self.food.as_ref() else {
            return false;
        };
        self.cook_state = CookState::Cooking;
        self.cook_remaining_s = f64::from(food.cook_duration_s);
        self.ready_elapsed_s = 0.0;
        true
    }

    /// Collects ready food. The returned quality is `1 - ready/grace`, clamped
    /// to `[0, 1]`. Returns `None` (and changes nothing) unless `Ready`.
    pub fn take_food(&mut self) -> Option<FoodPortion> {
        if self.cook_state != CookState::Ready {
            return None;
        }
        let food = self.food.as_ref()?;
        let portion = FoodPortion {
            food_type: food.food_type,
            quality: timing_quality(self.ready_elapsed_s, food.burn_grace_s),
        };
        self.clear();
        Some(portion)
    }

    /// Clears burnt food. Only valid from `Burnt`.
    pub fn reset_station(&mut self) -> bool {
        if self.cook_state != CookState::Burnt {
            return false;
        }
        self.clear();
        true
    }

    pub(crate) fn advance(&mut self, dt: f32) -> Option<StationTransition> {
        if !self.enabled {
            return None;
        }
        let food = self.food.as_ref()?;
        let cook_s = f64::from(food.cook_duration_s);
        let grace_s = f64::from(food.burn_grace_s);
        let dt = f64::from(dt);
        match self.cook_state {
            CookState::Cooking => {
                self.cook_remaining_s = (self.cook_remaining_s - dt).max(0.0);
                if !timer_expired(self.cook_remaining_s, cook_s) {
                    return None;
                }
                self.cook_state = CookState::Ready;
                self.cook_remaining_s = 0.0;
                self.ready_elapsed_s = 0.0;
                Some(StationTransition::Ready)
            }
            CookState::Ready => {
                self.ready_elapsed_s = (self.ready_elapsed_s + dt).min(grace_s);
                if !timer_expired(grace_s - self.ready_elapsed_s, grace_s) {
                    return None;
                }
                self.cook_state = CookState::Burnt;
                self.ready_elapsed_s = grace_s;
                Some(StationTransition::Burnt)
            }
            CookState::Idle | CookState::Burnt => None,
        }
    }

    /// 0 while idle, rises to 1 over the cook, stays at 1 once cooked.
    #[allow(clippy::cast_possible_truncation)]
    pub fn cook_progress(&self) -> f32 {
        match self.cook_state {
            CookState::Idle => 0.0,
            CookState::Cooking => {
                let duration = self.food.as_ref().map_or(0.0, |f| f.cook_duration_s);
                if duration <= 0.0 {
                    return 1.0;
                }
                (1.0 - self.cook_remaining_s / f64::from(duration)).clamp(0.0, 1.0) as f32
            }
            CookState::Ready | CookState::Burnt => 1.0,
        }
    }

    /// Fraction of the burn grace used up. Only meaningful while `Ready`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn burn_progress(&self) -> f32 {
        match (self.cook_state, self.food.as_ref()) {
            (CookState::Ready, Some(food)) if food.burn_grace_s > 0.0 => {
                (self.ready_elapsed_s / f64::from(food.burn_grace_s)).clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        }
    }

    pub fn status_text(&self) -> String {
        if !self.enabled {
            return "Disabled - no food assigned".to_string();
        }
        match self.cook_state {
            CookState::Idle => "Ready to cook".to_string(),
            CookState::Cooking => format!("Cooking... {:.1}s", self.cook_remaining_s),
            CookState::Ready => "Food ready - take it".to_string(),
            CookState::Burnt => "Burnt - reset required".to_string(),
        }
    }

    fn clear(&mut self) {
        self.cook_state = CookState::Idle;
        self.cook_remaining_s = 0.0;
        self.ready_elapsed_s = 0.0;
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn timing_quality(ready_elapsed_s: f64, burn_grace_s: f32) -> f32 {
    if burn_grace_s <= 0.0 {
        return 0.0;
    }
    (1.0 - ready_elapsed_s / f64::from(burn_grace_s)).clamp(0.0, 1.0) as f32
}

pub(crate) fn tick_stations(state: &mut GameState, dt: f32, events: &mut Vec<EventEnvelope>) {
    let current_tick = state.meta.tick;

    let mut station_ids: Vec<StationId> = state.stations.keys().cloned().collect();
    station_ids.sort();

    for station_id in station_ids {
        let Some(station) = state.stations.get_mut(&station_id) else {
            continue;
        };
        let Some(transition) = station.advance(dt) else {
            continue;
        };
        let Some(food_type) = station.food.as_ref().map(|f| f.food_type) else {
            continue;
        };

        let event = match transition {
            StationTransition::Ready => Event::FoodReady {
                station_id,
                food_type,
            },
            StationTransition::Burnt => {
                state.score.food_burnt += 1;
                Event::FoodBurnt {
                    station_id,
                    food_type,
                }
            }
        };
        events.push(emit(&mut state.counters, current_tick, event));
    }
}
