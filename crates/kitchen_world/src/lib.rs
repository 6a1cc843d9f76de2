//! Content loading and session setup shared by the CLI and downstream tools.

use anyhow::{Context, Result};
use kitchen_core::{
    BurgerStack, Constants, Counters, DayClock, DayPeriodDef, FoodDef, GameContent, GameState,
    LayoutDef, MetaState, PlayerState, QueueState, ScoreState, SpawnerState, StationId,
    StationState,
};
use rand::Rng;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

#[derive(Deserialize)]
struct FoodsFile {
    content_version: String,
    foods: Vec<FoodDef>,
}

#[derive(Deserialize)]
struct DayPeriodsFile {
    periods: Vec<DayPeriodDef>,
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like: a station bound to a food with no descriptor, a
/// zero cook time, an inverted spawn-delay bucket, or more customers allowed
/// than the queue has slots for.
pub fn validate_content(content: &GameContent) {
    validate_constants(&content.constants);
    let c = &content.constants;

    // Foods: one descriptor per type, positive timings, points never rise as
    // quality drops.
    let mut food_types = HashSet::new();
    for food in &content.foods {
        assert!(
            food_types.insert(food.food_type),
            "food '{}' is defined more than once",
            food.food_type,
        );
        assert!(
            food.cook_duration_s > 0.0,
            "food '{}' has non-positive cook duration: {}",
            food.food_type,
            food.cook_duration_s,
        );
        assert!(
            food.burn_grace_s > 0.0,
            "food '{}' has non-positive burn grace: {}",
            food.food_type,
            food.burn_grace_s,
        );
        assert!(
            food.perfect_points >= food.good_points && food.good_points >= food.late_points,
            "food '{}' points must not increase as quality drops",
            food.food_type,
        );
    }

    // Day periods: unique, inside the working day, sane buckets.
    let mut periods = HashSet::new();
    for def in &content.day_periods {
        assert!(
            periods.insert(def.period),
            "day period {:?} is defined more than once",
            def.period,
        );
        assert!(
            def.starts_at_hour < c.day_end_hour,
            "day period {:?} starts at hour {} after the day ends",
            def.period,
            def.starts_at_hour,
        );
        assert!(
            def.spawn_delay_min_s >= 0.0,
            "day period {:?} has a negative spawn delay",
            def.period,
        );
        assert!(
            def.spawn_delay_min_s <= def.spawn_delay_max_s,
            "day period {:?} has an inverted spawn delay range [{}, {})",
            def.period,
            def.spawn_delay_min_s,
            def.spawn_delay_max_s,
        );
    }

    validate_layout(content);
}

fn validate_constants(c: &Constants) {
    assert!(
        c.day_start_hour < c.day_end_hour && c.day_end_hour <= 24,
        "day_start_hour {} must be before day_end_hour {} (max 24)",
        c.day_start_hour,
        c.day_end_hour,
    );
    assert!(
        c.game_minutes_per_second > 0.0,
        "game_minutes_per_second must be positive, got {}",
        c.game_minutes_per_second,
    );
    assert!(
        c.customer_patience_s > 0.0,
        "customer_patience_s must be positive, got {}",
        c.customer_patience_s,
    );
    assert!(
        c.customer_walk_speed_mps > 0.0,
        "customer_walk_speed_mps must be positive, got {}",
        c.customer_walk_speed_mps,
    );
    assert!(
        c.fallback_spawn_delay_s > 0.0,
        "fallback_spawn_delay_s must be positive, got {}",
        c.fallback_spawn_delay_s,
    );
    assert!(
        c.settle_interval_s <= c.settle_timeout_s,
        "settle_interval_s {} exceeds settle_timeout_s {}",
        c.settle_interval_s,
        c.settle_timeout_s,
    );
    assert!(
        0.0 < c.good_quality_threshold
            && c.good_quality_threshold <= c.perfect_quality_threshold
            && c.perfect_quality_threshold <= 1.0,
        "quality thresholds must satisfy 0 < good ({}) <= perfect ({}) <= 1",
        c.good_quality_threshold,
        c.perfect_quality_threshold,
    );
}

fn validate_layout(content: &GameContent) {
    let layout = &content.layout;
    let mut station_ids: HashSet<&StationId> = HashSet::new();
    for station in &layout.stations {
        assert!(!station.id.0.is_empty(), "station has empty id");
        assert!(
            station_ids.insert(&station.id),
            "station '{}' is defined more than once",
            station.id,
        );
        if let Some(food_type) = station.food {
            assert!(
                content.food(food_type).is_some(),
                "station '{}' food '{}' is not a known food",
                station.id,
                food_type,
            );
        }
    }

    let queue = &layout.queue;
    assert!(
        queue.spacing_m > 0.0,
        "queue spacing must be positive, got {}",
        queue.spacing_m,
    );
    assert!(
        content.constants.max_customers <= queue.max_slots,
        "max_customers {} exceeds queue max_slots {}",
        content.constants.max_customers,
        queue.max_slots,
    );
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = serde_json::from_str(
        &std::fs::read_to_string(dir.join("constants.json")).context("reading constants.json")?,
    )
    .context("parsing constants.json")?;
    let foods_file: FoodsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("foods.json")).context("reading foods.json")?,
    )
    .context("parsing foods.json")?;
    let periods_file: DayPeriodsFile = serde_json::from_str(
        &std::fs::read_to_string(dir.join("day_periods.json"))
            .context("reading day_periods.json")?,
    )
    .context("parsing day_periods.json")?;
    let layout: LayoutDef = serde_json::from_str(
        &std::fs::read_to_string(dir.join("layout.json")).context("reading layout.json")?,
    )
    .context("parsing layout.json")?;
    let content = GameContent {
        content_version: foods_file.content_version,
        foods: foods_file.foods,
        day_periods: periods_file.periods,
        layout,
        constants,
    };
    validate_content(&content);
    Ok(content)
}

/// Opens the truck at the start of the working day: stations idle, nobody in
/// line, the first spawn due after a delay drawn from the opening period.
pub fn build_initial_state(content: &GameContent, seed: u64, rng: &mut impl Rng) -> GameState {
    let c = &content.constants;
    let run_id = kitchen_core::generate_uuid(rng);

    let stations: HashMap<StationId, StationState> = content
        .layout
        .stations
        .iter()
        .map(|def| (def.id.clone(), StationState::from_def(def, &content.foods)))
        .collect();

    let clock = DayClock::start(c, &content.day_periods);
    let queue = QueueState::from_layout(&content.layout.queue);
    if !queue.is_enabled() {
        tracing::warn!("queue is disabled, spawner will not run");
    }
    let first_delay = kitchen_core::sample_spawn_delay(content, clock.period, rng);
    let spawner = SpawnerState::new(c.max_customers, queue.is_enabled(), first_delay);

    tracing::info!(
        %run_id,
        seed,
        stations = stations.len(),
        capacity = c.max_customers,
        "truck open at {}",
        clock.formatted(),
    );

    GameState {
        meta: MetaState {
            tick: 0,
            elapsed_s: 0.0,
            seed,
            schema_version: 1,
            content_version: content.content_version.clone(),
            run_id,
        },
        clock,
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
