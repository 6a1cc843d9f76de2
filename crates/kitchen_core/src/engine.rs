use rand::Rng;

use crate::assembly::{stack_ingredient, wrap_burger};
use crate::clock::tick_clock;
use crate::customer::{dismiss_customer, serve_customer, tick_customers};
use crate::settle::{drop_held, item_contact, pick_up, tick_settle};
use crate::spawner::tick_spawner;
use crate::station::tick_stations;
use crate::{
    emit, Command, CommandEnvelope, CommandId, Event, EventEnvelope, EventLevel, GameContent,
    GameState, Navigator, Rejection, StationId,
};

/// Per-tick inputs shared by the subsystems.
pub(crate) struct TickContext<'a, N: Navigator> {
    pub content: &'a GameContent,
    pub nav: &'a N,
    pub dt: f32,
    pub event_level: EventLevel,
}

/// Advance the simulation by one tick of `dt` seconds.
///
/// Order of operations:
/// 1. Apply commands scheduled for this tick, in order.
/// 2. Advance the day clock (a period change resamples the spawn delay).
/// 3. Advance cooking stations.
/// 4. Move customers, queue arrivals, drain the front customer's patience.
/// 5. Advance dropped items toward frozen.
/// 6. Count down the spawn delay and spawn when it elapses.
/// 7. Increment tick counter.
///
/// Returns all events produced this tick.
pub fn tick<N: Navigator>(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    content: &GameContent,
    nav: &N,
    rng: &mut impl Rng,
    dt: f32,
    event_level: EventLevel,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();
    let ctx = TickContext {
        content,
        nav,
        dt,
        event_level,
    };

    apply_commands(state, commands, &ctx, rng, &mut events);
    tick_clock(state, content, rng, dt, &mut events);
    tick_stations(state, dt, &mut events);
    tick_customers(state, &ctx, rng, &mut events);
    tick_settle(state, &content.constants, dt, &mut events);
    tick_spawner(state, &ctx, rng, &mut events);

    state.meta.tick += 1;
    state.meta.elapsed_s += f64::from(dt);
    events
}

fn apply_commands<N: Navigator>(
    state: &mut GameState,
    commands: &[CommandEnvelope],
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;

    for envelope in commands {
        if envelope.execute_at_tick != current_tick {
            continue;
        }
        let result = match &envelope.command {
            Command::StartCooking { station_id } => start_cooking(state, station_id, events),
            Command::TakeFood { station_id } => take_food(state, station_id, events),
            Command::ResetStation { station_id } => reset_station(state, station_id, events),
            Command::Serve { customer_id } => serve_customer(state, ctx, rng, events, customer_id),
            Command::DiscardHeld => discard_held(state, events),
            Command::DropHeld { position } => drop_held(state, *position, events).map(|_| ()),
            Command::PickUp { item_id } => pick_up(state, item_id, events),
            Command::ItemContact {
                item_id,
                with_holder,
            } => item_contact(state, item_id, *with_holder, events),
            Command::PlayerOverlap {
                station_id,
                entered,
            } => player_overlap(state, station_id, *entered),
            Command::StackIngredient { ingredient } => stack_ingredient(state, *ingredient, events),
            Command::WrapBurger => wrap_burger(state, events),
            Command::ClearAssembly => {
                state.assembly.clear();
                Ok(())
            }
            Command::DequeueCustomer { customer_id } => {
                dismiss_customer(state, ctx, rng, events, customer_id)
            }
        };
        if let Err(reason) = result {
            reject(state, &envelope.id, reason, ctx.event_level, events);
        }
    }
}

fn reject(
    state: &mut GameState,
    command_id: &CommandId,
    reason: Rejection,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    tracing::debug!(command = %command_id, ?reason, "command rejected");
    if event_level == EventLevel::Debug {
        events.push(emit(
            &mut state.counters,
            state.meta.tick,
            Event::CommandRejected {
                command_id: command_id.clone(),
                reason,
            },
        ));
    }
}

fn start_cooking(
    state: &mut GameState,
    station_id: &StationId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    if state.player.held.is_some() {
        return Err(Rejection::HandsFull);
    }
    let station = state
        .stations
        .get_mut(station_id)
        .ok_or(Rejection::UnknownStation)?;
    if !station.enabled {
        return Err(Rejection::StationDisabled);
    }
    if !station.start_cooking() {
        return Err(Rejection::InvalidTransition {
            state: station.cook_state,
        });
    }
    let Some(food_type) = station.food.as_ref().map(|f| f.food_type) else {
        return Err(Rejection::StationDisabled);
    };
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::CookingStarted {
            station_id: station_id.clone(),
            food_type,
        },
    ));
    Ok(())
}

fn take_food(
    state: &mut GameState,
    station_id: &StationId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    if state.player.held.is_some() {
        return Err(Rejection::HandsFull);
    }
    let station = state
        .stations
        .get_mut(station_id)
        .ok_or(Rejection::UnknownStation)?;
    let portion = station.take_food().ok_or(Rejection::InvalidTransition {
        state: station.cook_state,
    })?;
    state.player.held = Some(portion);
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::FoodTaken {
            station_id: station_id.clone(),
            food_type: portion.food_type,
            quality: portion.quality,
        },
    ));
    Ok(())
}

fn reset_station(
    state: &mut GameState,
    station_id: &StationId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), Rejection> {
    let station = state
        .stations
        .get_mut(station_id)
        .ok_or(Rejection::UnknownStation)?;
    if !station.reset_station() {
        return Err(Rejection::InvalidTransition {
            state: station.cook_state,
        });
    }
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::StationReset {
            station_id: station_id.clone(),
        },
    ));
    Ok(())
}

fn discard_held(state: &mut GameState, events: &mut Vec<EventEnvelope>) -> Result<(), Rejection> {
    let held = state.player.held.take().ok_or(Rejection::HandsEmpty)?;
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::HeldFoodDiscarded {
            food_type: held.food_type,
        },
    ));
    Ok(())
}

fn player_overlap(
    state: &mut GameState,
    station_id: &StationId,
    entered: bool,
) -> Result<(), Rejection> {
    let station = state
        .stations
        .get_mut(station_id)
        .ok_or(Rejection::UnknownStation)?;
    station.player_nearby = entered;
    Ok(())
}
