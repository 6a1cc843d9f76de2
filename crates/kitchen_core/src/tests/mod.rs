use super::*;
use crate::test_fixtures::{base_content, base_state, make_rng, queued_customer};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

mod spawning;
mod stations;

// --- Shared test helpers ------------------------------------------------

/// Seconds per tick in these tests.
const DT: f32 = 1.0;

fn test_content() -> GameContent {
    base_content()
}

fn test_state(content: &GameContent) -> GameState {
    base_state(content)
}

/// Spawner switched off so only the test adds customers.
fn quiet_state(content: &GameContent) -> GameState {
    let mut state = base_state(content);
    state.spawner.enabled = false;
    state
}

fn grill() -> StationId {
    StationId("station_grill".to_string())
}

fn command(state: &GameState, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{:06}", state.meta.tick)),
        issued_by: PrincipalId("principal_player".to_string()),
        issued_tick: state.meta.tick,
        execute_at_tick: state.meta.tick,
        command,
    }
}

/// One tick on open floor at debug event level.
fn step(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut ChaCha8Rng,
    commands: &[CommandEnvelope],
) -> Vec<EventEnvelope> {
    tick(state, commands, content, &OpenFloor, rng, DT, EventLevel::Debug)
}

fn run_command(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut ChaCha8Rng,
    cmd: Command,
) -> Vec<EventEnvelope> {
    let envelope = command(state, cmd);
    step(state, content, rng, &[envelope])
}

fn rejections(events: &[EventEnvelope]) -> Vec<Rejection> {
    events
        .iter()
        .filter_map(|e| match &e.event {
            Event::CommandRejected { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect()
}

fn hold(state: &mut GameState, food_type: FoodType, quality: f32) {
    state.player.held = Some(FoodPortion { food_type, quality });
}
