//! Burger assembly counter.
//!
//! The first layer must be bottom bread. Top bread closes the stack; nothing
//! goes on after it.

use crate::{
    emit, BurgerStack, Event, EventEnvelope, FoodPortion, FoodType, GameState, Ingredient,
    Rejection,
};

impl BurgerStack {
    pub fn height(&self) -> usize {
        self.layers.len()
    }

    pub fn has_bottom_bread(&self) -> bool {
        self.layers.first() == Some(&Ingredient::BottomBread)
    }

    pub fn has_top_bread(&self) -> bool {
        self.layers.contains(&Ingredient::TopBread)
    }

    pub fn can_add(&self, ingredient: Ingredient) -> bool {
        if ingredient == Ingredient::BottomBread {
            return self.layers.is_empty();
        }
        self.has_bottom_bread() && !self.has_top_bread()
    }

    pub fn add(&mut self, ingredient: Ingredient) -> bool {
        if !self.can_add(ingredient) {
            return false;
        }
        self.layers.push(ingredient);
        true
    }

    /// Both breads present.
    pub fn is_complete(&self) -> bool {
        self.has_bottom_bread() && self.has_top_bread()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }
}

pub(crate) fn stack_ingredient(
    state: &mut GameState,
    ingredient: Ingredient,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    if !state.assembly.add(ingredient) {
        return Err(Rejection::IngredientNotAllowed);
    }
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::IngredientStacked {
            ingredient,
            height: state.assembly.height(),
        },
    ));
    Ok(())
}

/// Turns a complete stack into a held burger.
pub(crate) fn wrap_burger(
    state: &mut GameState,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    if state.player.held.is_some() {
        return Err(Rejection::HandsFull);
    }
    if !state.assembly.is_complete() {
        return Err(Rejection::BurgerIncomplete);
    }
    state.assembly.clear();
    state.player.held = Some(FoodPortion {
        food_type: FoodType::Burger,
        quality: 1.0,
    });
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::BurgerWrapped,
    ));
    Ok(())
}
