//! Dropped items settle and then freeze in place.
//!
//! A released item first ignores contact with whoever dropped it, then
//! freezes on its first contact or when the watch window runs out.

use glam::Vec3;

use crate::{
    emit, Constants, DroppedItem, Event, EventEnvelope, GameState, ItemId, Rejection, SettlePhase,
};

impl DroppedItem {
    pub fn is_frozen(&self) -> bool {
        self.phase == SettlePhase::Frozen
    }

    /// Advances the settle timers. Returns `true` if the item froze.
    pub(crate) fn advance(&mut self, dt: f32, constants: &Constants) -> bool {
        match self.phase {
            SettlePhase::Armed { elapsed_s } => {
                let elapsed_s = elapsed_s + dt;
                self.phase = if elapsed_s >= constants.settle_interval_s {
                    SettlePhase::Watching { elapsed_s: 0.0 }
                } else {
                    SettlePhase::Armed { elapsed_s }
                };
                false
            }
            SettlePhase::Watching { elapsed_s } => {
                let elapsed_s = elapsed_s + dt;
                if elapsed_s >= constants.settle_timeout_s {
                    self.phase = SettlePhase::Frozen;
                    return true;
                }
                self.phase = SettlePhase::Watching { elapsed_s };
                false
            }
            SettlePhase::Frozen => false,
        }
    }

    /// Applies a reported contact. Returns `true` if the item froze.
    pub(crate) fn contact(&mut self, with_holder: bool) -> bool {
        match self.phase {
            SettlePhase::Armed { .. } if with_holder => false,
            SettlePhase::Armed { .. } | SettlePhase::Watching { .. } => {
                self.phase = SettlePhase::Frozen;
                true
            }
            SettlePhase::Frozen => false,
        }
    }
}

pub(crate) fn drop_held(
    state: &mut GameState,
    position: Vec3,
    events: &mut Vec<EventEnvelope>,
) -> Result<ItemId, Rejection> {
    let Some(food) = state.player.held.take() else {
        return Err(Rejection::HandsEmpty);
    };
    state.counters.next_item_id += 1;
    let item_id = ItemId(format!("item_{:04}", state.counters.next_item_id));
    state.dropped_items.push(DroppedItem {
        id: item_id.clone(),
        food,
        position,
        phase: SettlePhase::Armed { elapsed_s: 0.0 },
    });
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::ItemDropped {
            item_id: item_id.clone(),
            food_type: food.food_type,
        },
    ));
    Ok(item_id)
}

pub(crate) fn pick_up(
    state: &mut GameState,
    item_id: &ItemId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    if state.player.held.is_some() {
        return Err(Rejection::HandsFull);
    }
    let Some(index) = state.dropped_items.iter().position(|i| &i.id == item_id) else {
        return Err(Rejection::UnknownItem);
    };
    let item = state.dropped_items.remove(index);
    state.player.held = Some(item.food);
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::ItemPickedUp {
            item_id: item.id,
        },
    ));
    Ok(())
}

pub(crate) fn item_contact(
    state: &mut GameState,
    item_id: &ItemId,
    with_holder: bool,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    let Some(item) = state.dropped_items.iter_mut().find(|i| &i.id == item_id) else {
        return Err(Rejection::UnknownItem);
    };
    if item.contact(with_holder) {
        events.push(emit(
            &mut state.counters,
            state.meta.tick,
            Event::ItemFrozen {
                item_id: item_id.clone(),
            },
        ));
    }
    Ok(())
}

pub(crate) fn tick_settle(
    state: &mut GameState,
    constants: &Constants,
    dt: f32,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;
    let mut frozen = Vec::new();
    for item in &mut state.dropped_items {
        if item.advance(dt, constants) {
            frozen.push(item.id.clone());
        }
    }
    for item_id in frozen {
        events.push(emit(
            &mut state.counters,
            current_tick,
            Event::ItemFrozen { item_id },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_content;
    use crate::{FoodPortion, FoodType};

    fn dropped() -> DroppedItem {
        DroppedItem {
            id: ItemId("item_0001".to_string()),
            food: FoodPortion {
                food_type: FoodType::Coffee,
                quality: 0.8,
            },
            position: Vec3::ZERO,
            phase: SettlePhase::Armed { elapsed_s: 0.0 },
        }
    }

    #[test]
    fn holder_contact_ignored_while_armed() {
        let mut item = dropped();
        assert!(!item.contact(true));
        assert!(!item.is_frozen());
        assert!(item.contact(false));
        assert!(item.is_frozen());
    }

    #[test]
    fn any_contact_freezes_once_watching() {
        let constants = base_content().constants;
        let mut item = dropped();
        assert!(!item.advance(constants.settle_interval_s, &constants));
        assert!(matches!(item.phase, SettlePhase::Watching { .. }));
        assert!(item.contact(true));
        assert!(!item.contact(false), "already frozen");
    }

    #[test]
    fn watch_window_times_out() {
        let constants = base_content().constants;
        let mut item = dropped();
        item.advance(constants.settle_interval_s, &constants);
        assert!(!item.advance(constants.settle_timeout_s * 0.5, &constants));
        assert!(item.advance(constants.settle_timeout_s, &constants));
        assert!(!item.advance(1.0, &constants));
    }
}
