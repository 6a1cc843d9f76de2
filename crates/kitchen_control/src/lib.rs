use std::collections::HashMap;

use kitchen_core::{
    Command, CommandEnvelope, CommandId, CookState, FoodType, GameContent, GameState,
    PrincipalId, StationId,
};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Runs the truck automatically:
/// 1. Serve the front customer if holding their order; otherwise drop what is held.
/// 2. Reset burnt stations.
/// 3. Start cooking on idle stations while queued orders outnumber food in progress.
/// 4. Take the front customer's order off a ready station.
///
/// Commands are emitted in that order so they apply cleanly within one tick.
pub struct AutopilotController;

const AUTOPILOT_OWNER: &str = "principal_autopilot";

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Allocates a command ID and builds a `CommandEnvelope`.
fn make_cmd(
    owner: &PrincipalId,
    tick: u64,
    next_id: &mut u64,
    command: Command,
) -> CommandEnvelope {
    let cmd_id = CommandId(format!("cmd_{:06}", *next_id));
    *next_id += 1;
    CommandEnvelope {
        id: cmd_id,
        issued_by: owner.clone(),
        issued_tick: tick,
        execute_at_tick: tick,
        command,
    }
}

/// Enabled stations in `state`, sorted by ID for determinism.
fn sorted_stations(state: &GameState) -> Vec<StationId> {
    let mut ids: Vec<StationId> = state
        .stations
        .values()
        .filter(|s| s.enabled)
        .map(|s| s.id.clone())
        .collect();
    ids.sort();
    ids
}

fn station_food(state: &GameState, station_id: &StationId) -> Option<FoodType> {
    state
        .stations
        .get(station_id)
        .and_then(|s| s.food.as_ref())
        .map(|f| f.food_type)
}

/// Orders of everyone waiting in line, by food type.
fn queued_demand(state: &GameState) -> HashMap<FoodType, usize> {
    let mut demand = HashMap::new();
    for id in &state.queue.members {
        if let Some(customer) = state.customers.get(id).filter(|c| !c.is_departed()) {
            *demand.entry(customer.order).or_insert(0) += 1;
        }
    }
    demand
}

/// Food already on its way: cooking or ready on a station.
fn food_in_progress(state: &GameState) -> HashMap<FoodType, usize> {
    let mut supply = HashMap::new();
    for station in state.stations.values() {
        if !matches!(station.cook_state, CookState::Cooking | CookState::Ready) {
            continue;
        }
        if let Some(food) = station.food.as_ref() {
            *supply.entry(food.food_type).or_insert(0) += 1;
        }
    }
    supply
}

/// Priority 1: deliver or drop whatever is in hand.
fn held_food_command(state: &GameState) -> Option<Command> {
    let held = state.player.held?;
    let front = state
        .queue
        .front()
        .and_then(|id| state.customers.get(id))
        .filter(|c| !c.is_departed());
    match front {
        Some(customer) if customer.order == held.food_type => Some(Command::Serve {
            customer_id: customer.id.clone(),
        }),
        _ => Some(Command::DiscardHeld),
    }
}

// ---------------------------------------------------------------------------
// AutopilotController
// ---------------------------------------------------------------------------

impl CommandSource for AutopilotController {
    fn generate_commands(
        &mut self,
        state: &GameState,
        _content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        let owner = PrincipalId(AUTOPILOT_OWNER.to_string());
        let tick = state.meta.tick;
        let mut commands = Vec::new();

        let mut demand = queued_demand(state);

        // Priority 1: hands.
        if let Some(command) = held_food_command(state) {
            if let (Command::Serve { .. }, Some(held)) = (&command, state.player.held) {
                // The front customer is about to be served; don't cook for them.
                if let Some(wanted) = demand.get_mut(&held.food_type) {
                    *wanted = wanted.saturating_sub(1);
                }
            }
            commands.push(make_cmd(&owner, tick, next_command_id, command));
        }

        let stations = sorted_stations(state);

        // Priority 2: burnt stations.
        for station_id in &stations {
            if state.stations[station_id].cook_state == CookState::Burnt {
                commands.push(make_cmd(
                    &owner,
                    tick,
                    next_command_id,
                    Command::ResetStation {
                        station_id: station_id.clone(),
                    },
                ));
            }
        }

        // Priority 3: cook for the line.
        let mut supply = food_in_progress(state);
        for station_id in &stations {
            if state.stations[station_id].cook_state != CookState::Idle {
                continue;
            }
            let Some(food_type) = station_food(state, station_id) else {
                continue;
            };
            let wanted = demand.get(&food_type).copied().unwrap_or(0);
            let on_the_way = supply.entry(food_type).or_insert(0);
            if *on_the_way >= wanted {
                continue;
            }
            *on_the_way += 1;
            commands.push(make_cmd(
                &owner,
                tick,
                next_command_id,
                Command::StartCooking {
                    station_id: station_id.clone(),
                },
            ));
        }

        // Priority 4: pick up the front customer's order.
        let front_order = state
            .queue
            .front()
            .and_then(|id| state.customers.get(id))
            .map(|c| c.order);
        if let Some(order) = front_order {
            let ready = stations.iter().find(|id| {
                state.stations[*id].cook_state == CookState::Ready
                    && station_food(state, id) == Some(order)
            });
            if let Some(station_id) = ready {
                commands.push(make_cmd(
                    &owner,
                    tick,
                    next_command_id,
                    Command::TakeFood {
                        station_id: station_id.clone(),
                    },
                ));
            }
        }

        commands
    }
}
