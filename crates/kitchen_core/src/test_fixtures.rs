//! Shared test fixtures for kitchen_core and downstream crates.
//!
//! `base_content()` is a three-station truck (grill, wrap bar, coffee machine)
//! with the standard day periods. Customers join the line straight from the
//! spawn point so tests do not have to walk them in.

use crate::{
    Agent, BurgerStack, Constants, Counters, CustomerId, CustomerPhase, CustomerState, DayClock,
    DayPeriod, DayPeriodDef, FoodDef, FoodType, GameContent, GameState, LayoutDef, MetaState,
    PlayerState, QueueLayoutDef, QueueState, ScoreState, SpawnerState, StationDef, StationId,
    StationState, Vec3,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;

/// Grill burger: 8 s to cook, 5 s before it burns.
pub fn burger_food() -> FoodDef {
    FoodDef {
        food_type: FoodType::Burger,
        name: "Burger".to_string(),
        cook_duration_s: 8.0,
        burn_grace_s: 5.0,
        perfect_points: 50,
        good_points: 30,
        late_points: 10,
    }
}

pub fn base_content() -> GameContent {
    GameContent {
        content_version: "test".to_string(),
        foods: vec![
            burger_food(),
            FoodDef {
                food_type: FoodType::Wrap,
                name: "Wrap".to_string(),
                cook_duration_s: 6.0,
                burn_grace_s: 4.0,
                perfect_points: 40,
                good_points: 25,
                late_points: 8,
            },
            FoodDef {
                food_type: FoodType::Coffee,
                name: "Coffee".to_string(),
                cook_duration_s: 3.0,
                burn_grace_s: 6.0,
                perfect_points: 20,
                good_points: 12,
                late_points: 5,
            },
        ],
        day_periods: vec![
            DayPeriodDef {
                period: DayPeriod::Morning,
                starts_at_hour: 6,
                spawn_delay_min_s: 15.0,
                spawn_delay_max_s: 20.0,
            },
            DayPeriodDef {
                period: DayPeriod::Noon,
                starts_at_hour: 11,
                spawn_delay_min_s: 5.0,
                spawn_delay_max_s: 8.0,
            },
            DayPeriodDef {
                period: DayPeriod::Afternoon,
                starts_at_hour: 15,
                spawn_delay_min_s: 12.0,
                spawn_delay_max_s: 18.0,
            },
        ],
        layout: LayoutDef {
            stations: vec![
                StationDef {
                    id: StationId("station_coffee".to_string()),
                    food: Some(FoodType::Coffee),
                },
                StationDef {
                    id: StationId("station_grill".to_string()),
                    food: Some(FoodType::Burger),
                },
                StationDef {
                    id: StationId("station_wrap".to_string()),
                    food: Some(FoodType::Wrap),
                },
            ],
            queue: QueueLayoutDef {
                anchor: Some(Vec3::ZERO),
                back_direction: Vec3::new(0.0, 0.0, -1.0),
                spacing_m: 1.0,
                max_slots: 6,
                snap_radius_m: 0.5,
            },
            spawn_point: Vec3::new(0.0, 0.0, -10.0),
            approach_point: None,
            exit_point: Vec3::new(10.0, 0.0, -10.0),
        },
        constants: Constants {
            max_customers: 4,
            customer_patience_s: 30.0,
            customer_walk_speed_mps: 2.0,
            stopping_distance_m: 0.1,
            exit_despawn_distance_m: 0.25,
            day_start_hour: 6,
            day_end_hour: 18,
            game_minutes_per_second: 1.0,
            fallback_spawn_delay_s: 10.0,
            settle_interval_s: 0.15,
            settle_timeout_s: 1.0,
            perfect_quality_threshold: 0.9,
            good_quality_threshold: 0.6,
        },
    }
}

/// Fresh session at 06:00 with every station idle and nobody around. The
/// first spawn is due after the morning minimum delay.
pub fn base_state(content: &GameContent) -> GameState {
    let stations: HashMap<StationId, StationState> = content
        .layout
        .stations
        .iter()
        .map(|def| (def.id.clone(), StationState::from_def(def, &content.foods)))
        .collect();
    let queue = QueueState::from_layout(&content.layout.queue);
    let spawner = SpawnerState::new(
        content.constants.max_customers,
        queue.is_enabled(),
        content.day_periods[0].spawn_delay_min_s,
    );

    GameState {
        meta: MetaState {
            tick: 0,
            elapsed_s: 0.0,
            seed: 42,
            schema_version: 1,
            content_version: content.content_version.clone(),
            run_id: uuid::Uuid::nil(),
        },
        clock: DayClock::start(&content.constants, &content.day_periods),
        stations,
        customers: HashMap::new(),
        queue,
        spawner,
        player: PlayerState::default(),
        dropped_items: Vec::new(),
        assembly: BurgerStack::default(),
        score: ScoreState::default(),
        counters: Counters::default(),
    }
}

/// Places a customer directly in the next free queue slot, standing still and
/// on the spawner's roster.
pub fn queued_customer(state: &mut GameState, content: &GameContent, order: FoodType) -> CustomerId {
    state.counters.next_customer_id += 1;
    let id = CustomerId(format!("customer_{:04}", state.counters.next_customer_id));
    let position = state
        .queue
        .raw_slot_position(state.queue.len())
        .unwrap_or(content.layout.spawn_point);

    let mut agent = Agent::new(position, content.constants.stopping_distance_m);
    agent.destination = Some(position);
    let mut customer = CustomerState::new(
        id.clone(),
        order,
        content.constants.customer_patience_s,
        agent,
        state.meta.elapsed_s,
    );
    customer.phase = CustomerPhase::Queued;

    state.customers.insert(id.clone(), customer);
    state.spawner.roster.push(id.clone());
    state.queue.members.push(id.clone());
    id
}

/// Deterministic RNG seeded with 42.
pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}
