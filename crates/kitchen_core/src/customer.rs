//! Customers: order, patience, and the walk in, through the line, and out.
//!
//! Patience only drains for the customer at the front of the line, and only
//! once it is standing still. Time spent walking or waiting behind others is
//! free.

use rand::Rng;

use crate::engine::TickContext;
use crate::queue::{join_queue, leave_queue};
use crate::{
    emit, timer_expired, Agent, CustomerId, CustomerPhase, CustomerState, DepartureReason, Event,
    EventEnvelope, FoodType, GameState, Navigator, Rejection,
};

impl CustomerState {
    pub fn new(
        id: CustomerId,
        order: FoodType,
        max_patience_s: f32,
        agent: Agent,
        spawned_at_s: f64,
    ) -> Self {
        Self {
            id,
            order,
            patience_s: f64::from(max_patience_s),
            max_patience_s: f64::from(max_patience_s),
            departure: None,
            phase: CustomerPhase::Approaching,
            agent,
            spawned_at_s,
        }
    }

    pub fn is_departed(&self) -> bool {
        self.departure.is_some()
    }

    /// Remaining patience as a percentage.
    #[allow(clippy::cast_possible_truncation)]
    pub fn satisfaction(&self) -> f32 {
        if self.max_patience_s <= 0.0 {
            return 0.0;
        }
        (self.patience_s / self.max_patience_s * 100.0).clamp(0.0, 100.0) as f32
    }

    /// Hands food to the customer. Returns `true` and marks the customer as
    /// served when the food matches the order. A mismatch, or a customer who
    /// already left, changes nothing.
    pub fn receive_food(&mut self, food: FoodType) -> bool {
        if self.is_departed() || food != self.order {
            return false;
        }
        self.mark_departed(DepartureReason::Served)
    }

    /// Sets the departure flag. Write-once: later calls return `false`.
    pub(crate) fn mark_departed(&mut self, reason: DepartureReason) -> bool {
        if self.departure.is_some() {
            return false;
        }
        self.departure = Some(reason);
        true
    }

    /// Drains patience when `at_front` and standing still. Returns `true`
    /// when patience ran out on this call.
    pub(crate) fn decay_patience(&mut self, dt: f32, at_front: bool) -> bool {
        if self.is_departed() || !at_front || !self.agent.is_stationary() {
            return false;
        }
        self.patience_s = (self.patience_s - f64::from(dt)).max(0.0);
        if !timer_expired(self.patience_s, self.max_patience_s) {
            return false;
        }
        self.patience_s = 0.0;
        true
    }
}

/// Creates one customer at the spawn point with a uniformly random order and
/// adds it to the roster. Capacity is the caller's concern.
pub(crate) fn spawn_customer<N: Navigator>(
    state: &mut GameState,
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> CustomerId {
    let current_tick = state.meta.tick;
    let constants = &ctx.content.constants;
    let layout = &ctx.content.layout;

    state.counters.next_customer_id += 1;
    let id = CustomerId(format!("customer_{:04}", state.counters.next_customer_id));
    let order = FoodType::ALL[rng.gen_range(0..FoodType::ALL.len())];

    let mut agent = Agent::new(layout.spawn_point, constants.stopping_distance_m);
    if let Some(approach) = layout.approach_point {
        agent.set_destination(approach);
    }

    state.customers.insert(
        id.clone(),
        CustomerState::new(
            id.clone(),
            order,
            constants.customer_patience_s,
            agent,
            state.meta.elapsed_s,
        ),
    );
    state.spawner.roster.push(id.clone());

    tracing::debug!(customer = %id, %order, active = state.spawner.roster.len(), "customer spawned");
    events.push(emit(
        &mut state.counters,
        current_tick,
        Event::CustomerSpawned {
            customer_id: id.clone(),
            order,
        },
    ));

    if layout.approach_point.is_none() {
        enter_queue(state, ctx.nav, &id, events);
    }
    id
}

fn enter_queue(
    state: &mut GameState,
    nav: &impl Navigator,
    id: &CustomerId,
    events: &mut Vec<EventEnvelope>,
) {
    let Some(slot) = join_queue(state, nav, id) else {
        return;
    };
    if let Some(customer) = state.customers.get_mut(id) {
        customer.phase = CustomerPhase::Queued;
    }
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::CustomerQueued {
            customer_id: id.clone(),
            slot,
        },
    ));
}

/// Completes a departure whose flag is already set: frees the queue slot,
/// sends the customer to the exit, and hands the roster entry back to the
/// spawner (which may refill immediately).
pub(crate) fn finish_departure<N: Navigator>(
    state: &mut GameState,
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
    id: &CustomerId,
) {
    let Some(customer) = state.customers.get_mut(id) else {
        return;
    };
    let Some(reason) = customer.departure else {
        return;
    };
    if customer.phase == CustomerPhase::Leaving {
        return;
    }
    customer.phase = CustomerPhase::Leaving;
    customer.agent.set_destination(ctx.content.layout.exit_point);

    match reason {
        DepartureReason::Served => {}
        DepartureReason::PatienceExpired => state.score.walked_out += 1,
        DepartureReason::Dismissed => state.score.dismissed += 1,
    }

    leave_queue(state, ctx.nav, id);

    tracing::debug!(customer = %id, ?reason, "customer departed");
    events.push(emit(
        &mut state.counters,
        state.meta.tick,
        Event::CustomerDeparted {
            customer_id: id.clone(),
            reason,
        },
    ));

    crate::spawner::remove_customer(state, ctx, rng, events, id);
}

/// Service resolution for the `Serve` command. Held food is consumed whether
/// or not it matches.
pub(crate) fn serve_customer<N: Navigator>(
    state: &mut GameState,
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
    id: &CustomerId,
) -> Result<(), Rejection> {
    let Some(held) = state.player.held else {
        return Err(Rejection::HandsEmpty);
    };
    let Some(customer) = state.customers.get(id) else {
        return Err(Rejection::UnknownCustomer);
    };
    if customer.is_departed() {
        return Err(Rejection::AlreadyDeparted);
    }
    if !state.queue.is_front(id) {
        return Err(Rejection::NotAtFront);
    }

    state.player.held = None;
    let current_tick = state.meta.tick;
    let Some(customer) = state.customers.get_mut(id) else {
        return Err(Rejection::UnknownCustomer);
    };
    let expected = customer.order;

    if !customer.receive_food(held.food_type) {
        state.score.wrong_deliveries += 1;
        events.push(emit(
            &mut state.counters,
            current_tick,
            Event::WrongOrder {
                customer_id: id.clone(),
                expected,
                received: held.food_type,
            },
        ));
        return Ok(());
    }

    let points = ctx
        .content
        .food(held.food_type)
        .map_or(0, |food| food.points_for(held.quality, &ctx.content.constants));
    state.score.points += points;
    state.score.served += 1;
    state.score.quality_sum += held.quality;
    events.push(emit(
        &mut state.counters,
        current_tick,
        Event::CustomerServed {
            customer_id: id.clone(),
            food_type: held.food_type,
            quality: held.quality,
            points,
        },
    ));

    finish_departure(state, ctx, rng, events, id);
    Ok(())
}

/// Sends a waiting customer away without service.
pub(crate) fn dismiss_customer<N: Navigator>(
    state: &mut GameState,
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
    id: &CustomerId,
) -> Result<(), Rejection> {
    let Some(customer) = state.customers.get_mut(id) else {
        return Err(Rejection::UnknownCustomer);
    };
    if !customer.mark_departed(DepartureReason::Dismissed) {
        return Err(Rejection::AlreadyDeparted);
    }
    finish_departure(state, ctx, rng, events, id);
    Ok(())
}

/// Moves every customer, removes those that reached the exit, queues those
/// that finished approaching, and drains the front customer's patience.
pub(crate) fn tick_customers<N: Navigator>(
    state: &mut GameState,
    ctx: &TickContext<'_, N>,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let current_tick = state.meta.tick;
    let constants = &ctx.content.constants;

    let mut ids: Vec<CustomerId> = state.customers.keys().cloned().collect();
    ids.sort();

    for id in &ids {
        if let Some(customer) = state.customers.get_mut(id) {
            ctx.nav
                .step_agent(&mut customer.agent, constants.customer_walk_speed_mps, ctx.dt);
        }
    }

    for id in &ids {
        let reached_exit = state.customers.get(id).is_some_and(|c| {
            c.phase == CustomerPhase::Leaving
                && !c.agent.path_pending
                && c.agent.remaining_distance()
                    <= c.agent.stopping_distance + constants.exit_despawn_distance_m
        });
        if reached_exit {
            state.customers.remove(id);
            events.push(emit(
                &mut state.counters,
                current_tick,
                Event::CustomerDespawned {
                    customer_id: id.clone(),
                },
            ));
        }
    }

    // Arrivals join in spawn order so the line stays first-come-first-served.
    let arrivals: Vec<CustomerId> = state
        .spawner
        .roster
        .iter()
        .filter(|id| {
            state.customers.get(*id).is_some_and(|c| {
                c.phase == CustomerPhase::Approaching && !c.is_departed() && c.agent.is_stationary()
            })
        })
        .cloned()
        .collect();
    for id in &arrivals {
        enter_queue(state, ctx.nav, id, events);
    }

    let Some(front_id) = state.queue.front().cloned() else {
        return;
    };
    let expired = state
        .customers
        .get_mut(&front_id)
        .is_some_and(|c| c.decay_patience(ctx.dt, true));
    if expired {
        if let Some(customer) = state.customers.get_mut(&front_id) {
            customer.mark_departed(DepartureReason::PatienceExpired);
        }
        finish_departure(state, ctx, rng, events, &front_id);
    }
}
