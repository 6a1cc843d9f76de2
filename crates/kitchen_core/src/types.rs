//! Type definitions for `kitchen_core`.
//!
//! All public types, structs, enums, and ID newtypes used by the simulation.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(StationId);
string_id!(CustomerId);
string_id!(ItemId);
string_id!(CommandId);
string_id!(EventId);
string_id!(PrincipalId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

/// The closed set of things a customer can order and a station can cook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    Burger,
    Wrap,
    Coffee,
}

impl FoodType {
    pub const ALL: [FoodType; 3] = [FoodType::Burger, FoodType::Wrap, FoodType::Coffee];

    pub fn label(self) -> &'static str {
        match self {
            FoodType::Burger => "burger",
            FoodType::Wrap => "wrap",
            FoodType::Coffee => "coffee",
        }
    }
}

impl std::fmt::Display for FoodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ingredient {
    BottomBread,
    TopBread,
    Meat,
    Cheese,
    Tomato,
    Salad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPeriod {
    Morning,
    Noon,
    Afternoon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CookState {
    Idle,
    Cooking,
    Ready,
    Burnt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerPhase {
    /// Walking from the spawn point to the approach point; not yet queued.
    Approaching,
    Queued,
    /// Departed and walking to the exit. Removed from the world on arrival.
    Leaving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepartureReason {
    Served,
    PatienceExpired,
    Dismissed,
}

/// Release protocol for a dropped item: armed → watching → frozen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SettlePhase {
    /// Contacts with the previous holder are ignored.
    Armed { elapsed_s: f32 },
    /// Free physics until first contact or timeout.
    Watching { elapsed_s: f32 },
    Frozen,
}

// ---------------------------------------------------------------------------
// State types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    pub clock: DayClock,
    pub stations: HashMap<StationId, StationState>,
    pub customers: HashMap<CustomerId, CustomerState>,
    pub queue: QueueState,
    pub spawner: SpawnerState,
    pub player: PlayerState,
    /// Released items, in drop order.
    pub dropped_items: Vec<DroppedItem>,
    pub assembly: BurgerStack,
    pub score: ScoreState,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub tick: u64,
    /// Simulated seconds since the session started.
    pub elapsed_s: f64,
    pub seed: u64,
    pub schema_version: u32,
    pub content_version: String,
    pub run_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
    pub next_customer_id: u64,
    pub next_item_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayClock {
    /// Game minutes since midnight.
    pub minutes: f32,
    pub period: DayPeriod,
    pub day_ended: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationState {
    pub id: StationId,
    /// `None` means the station was set up without a food and stays disabled.
    pub food: Option<FoodDef>,
    pub enabled: bool,
    pub cook_state: CookState,
    /// Countdown from the food's cook duration to zero.
    pub cook_remaining_s: f64,
    pub ready_elapsed_s: f64,
    pub player_nearby: bool,
}

/// A portion of cooked food: what a station hands out and what the player carries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodPortion {
    pub food_type: FoodType,
    /// Timing quality in `[0, 1]`; 1.0 means collected the instant it was ready.
    pub quality: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerState {
    pub id: CustomerId,
    pub order: FoodType,
    pub patience_s: f64,
    pub max_patience_s: f64,
    /// Write-once. Set through `CustomerState::mark_departed`.
    pub departure: Option<DepartureReason>,
    pub phase: CustomerPhase,
    pub agent: Agent,
    pub spawned_at_s: f64,
}

/// Movement state of one walking entity. The authoritative destination is
/// replaced, never queued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub position: Vec3,
    pub destination: Option<Vec3>,
    /// Set when the destination changes; cleared once the path is computed.
    pub path_pending: bool,
    pub stopping_distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueState {
    /// Front is index 0.
    pub members: Vec<CustomerId>,
    /// `None` disables the queue.
    pub anchor: Option<Vec3>,
    /// Unit vector pointing from the front of the line toward the back.
    pub back_direction: Vec3,
    pub spacing_m: f32,
    pub max_slots: usize,
    pub snap_radius_m: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnerState {
    /// Active customers, in spawn order. Distinct from queue membership.
    pub roster: Vec<CustomerId>,
    pub capacity: usize,
    pub delay_remaining_s: f32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerState {
    pub held: Option<FoodPortion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedItem {
    pub id: ItemId,
    pub food: FoodPortion,
    pub position: Vec3,
    pub phase: SettlePhase,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BurgerStack {
    /// Bottom layer first.
    pub layers: SmallVec<[Ingredient; 8]>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreState {
    pub points: u32,
    pub served: u32,
    pub walked_out: u32,
    pub dismissed: u32,
    pub wrong_deliveries: u32,
    pub food_burnt: u32,
    /// Sum of qualities of correctly served portions.
    pub quality_sum: f32,
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_by: PrincipalId,
    pub issued_tick: u64,
    pub execute_at_tick: u64,
    pub command: Command,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Command {
    StartCooking {
        station_id: StationId,
    },
    TakeFood {
        station_id: StationId,
    },
    ResetStation {
        station_id: StationId,
    },
    /// Hand the held food to a customer. Only the front customer can be served.
    Serve {
        customer_id: CustomerId,
    },
    DiscardHeld,
    DropHeld {
        position: Vec3,
    },
    PickUp {
        item_id: ItemId,
    },
    /// Contact reported by the physics collaborator for a released item.
    ItemContact {
        item_id: ItemId,
        with_holder: bool,
    },
    /// The player entered or left a station's interaction region.
    PlayerOverlap {
        station_id: StationId,
        entered: bool,
    },
    StackIngredient {
        ingredient: Ingredient,
    },
    WrapBurger,
    ClearAssembly,
    DequeueCustomer {
        customer_id: CustomerId,
    },
}

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub tick: u64,
    pub event: Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    UnknownStation,
    StationDisabled,
    InvalidTransition { state: CookState },
    HandsFull,
    HandsEmpty,
    UnknownCustomer,
    NotAtFront,
    AlreadyDeparted,
    UnknownItem,
    IngredientNotAllowed,
    BurgerIncomplete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    CookingStarted {
        station_id: StationId,
        food_type: FoodType,
    },
    FoodReady {
        station_id: StationId,
        food_type: FoodType,
    },
    FoodBurnt {
        station_id: StationId,
        food_type: FoodType,
    },
    FoodTaken {
        station_id: StationId,
        food_type: FoodType,
        quality: f32,
    },
    StationReset {
        station_id: StationId,
    },
    CustomerSpawned {
        customer_id: CustomerId,
        order: FoodType,
    },
    CustomerQueued {
        customer_id: CustomerId,
        slot: usize,
    },
    CustomerServed {
        customer_id: CustomerId,
        food_type: FoodType,
        quality: f32,
        points: u32,
    },
    WrongOrder {
        customer_id: CustomerId,
        expected: FoodType,
        received: FoodType,
    },
    CustomerDeparted {
        customer_id: CustomerId,
        reason: DepartureReason,
    },
    CustomerDespawned {
        customer_id: CustomerId,
    },
    PeriodChanged {
        period: DayPeriod,
    },
    DayEnded,
    HeldFoodDiscarded {
        food_type: FoodType,
    },
    ItemDropped {
        item_id: ItemId,
        food_type: FoodType,
    },
    ItemFrozen {
        item_id: ItemId,
    },
    ItemPickedUp {
        item_id: ItemId,
    },
    IngredientStacked {
        ingredient: Ingredient,
        height: usize,
    },
    BurgerWrapped,
    /// Only emitted at `EventLevel::Debug`.
    SpawnSkipped {
        roster: usize,
        capacity: usize,
    },
    /// Only emitted at `EventLevel::Debug`.
    CommandRejected {
        command_id: CommandId,
        reason: Rejection,
    },
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub foods: Vec<FoodDef>,
    pub day_periods: Vec<DayPeriodDef>,
    pub layout: LayoutDef,
    pub constants: Constants,
}

impl GameContent {
    pub fn food(&self, food_type: FoodType) -> Option<&FoodDef> {
        self.foods.iter().find(|f| f.food_type == food_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodDef {
    pub food_type: FoodType,
    pub name: String,
    pub cook_duration_s: f32,
    /// Window after the food is ready before it burns.
    pub burn_grace_s: f32,
    pub perfect_points: u32,
    pub good_points: u32,
    pub late_points: u32,
}

/// One spawn-rate bucket. Delays are drawn uniformly from `[min, max)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPeriodDef {
    pub period: DayPeriod,
    pub starts_at_hour: u32,
    pub spawn_delay_min_s: f32,
    pub spawn_delay_max_s: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutDef {
    pub stations: Vec<StationDef>,
    pub queue: QueueLayoutDef,
    pub spawn_point: Vec3,
    /// Optional waypoint walked to before joining the queue.
    pub approach_point: Option<Vec3>,
    pub exit_point: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationDef {
    pub id: StationId,
    pub food: Option<FoodType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueLayoutDef {
    pub anchor: Option<Vec3>,
    pub back_direction: Vec3,
    pub spacing_m: f32,
    pub max_slots: usize,
    pub snap_radius_m: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub max_customers: usize,
    pub customer_patience_s: f32,
    pub customer_walk_speed_mps: f32,
    pub stopping_distance_m: f32,
    /// Distance from the exit at which a leaving customer is removed.
    pub exit_despawn_distance_m: f32,
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    /// Game minutes that pass per simulated second.
    pub game_minutes_per_second: f32,
    /// Spawn delay used when the current period has no usable bucket.
    pub fallback_spawn_delay_s: f32,
    pub settle_interval_s: f32,
    pub settle_timeout_s: f32,
    pub perfect_quality_threshold: f32,
    pub good_quality_threshold: f32,
}
