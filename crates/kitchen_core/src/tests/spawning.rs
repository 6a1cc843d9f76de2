use super::*;

/// Spawns every tick while there is room.
fn eager_content(capacity: usize) -> GameContent {
    let mut content = test_content();
    content.constants.max_customers = capacity;
    for bucket in &mut content.day_periods {
        bucket.spawn_delay_min_s = DT;
        bucket.spawn_delay_max_s = DT;
    }
    content
}

fn spawned(events: &[EventEnvelope]) -> Vec<CustomerId> {
    events
        .iter()
        .filter_map(|e| match &e.event {
            Event::CustomerSpawned { customer_id, .. } => Some(customer_id.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_capacity_two_refills_on_departure() {
    let content = eager_content(2);
    let mut state = test_state(&content);
    state.spawner.delay_remaining_s = DT;
    let mut rng = make_rng();

    let first = spawned(&step(&mut state, &content, &mut rng, &[]));
    let second = spawned(&step(&mut state, &content, &mut rng, &[]));
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);

    let events = step(&mut state, &content, &mut rng, &[]);
    assert!(spawned(&events).is_empty(), "third spawn blocked by capacity");
    assert!(events
        .iter()
        .any(|e| matches!(e.event, Event::SpawnSkipped { roster: 2, capacity: 2 })));

    let events = run_command(
        &mut state,
        &content,
        &mut rng,
        Command::DequeueCustomer {
            customer_id: first[0].clone(),
        },
    );
    let refill = spawned(&events);
    assert_eq!(refill.len(), 1, "departure frees a slot that is refilled at once");
    assert_eq!(state.spawner.roster, vec![second[0].clone(), refill[0].clone()]);
    assert_eq!(
        state.queue.members,
        vec![second[0].clone(), refill[0].clone()]
    );
}

#[test]
fn test_roster_never_exceeds_capacity_over_a_day() {
    let content = eager_content(3);
    let mut state = test_state(&content);
    let mut rng = make_rng();

    for _ in 0..400 {
        step(&mut state, &content, &mut rng, &[]);
        assert!(state.spawner.roster.len() <= 3);
        assert!(state.queue.len() <= state.spawner.roster.len());
        for id in &state.spawner.roster {
            assert!(!state.customers[id].is_departed());
        }
    }
    assert!(state.score.walked_out > 0, "nobody serves, so people leave");
}

#[test]
fn test_spawned_customer_joins_queue_immediately() {
    let content = eager_content(1);
    let mut state = test_state(&content);
    state.spawner.delay_remaining_s = DT;
    let mut rng = make_rng();

    let events = step(&mut state, &content, &mut rng, &[]);
    let id = spawned(&events).pop().unwrap();
    assert!(events.iter().any(|e| matches!(
        &e.event,
        Event::CustomerQueued { customer_id, slot: 0 } if *customer_id == id
    )));
    let customer = &state.customers[&id];
    assert_eq!(customer.phase, CustomerPhase::Queued);
    assert!((customer.patience_s - f64::from(content.constants.customer_patience_s)).abs() < 1e-6);
    assert!(customer.agent.position.distance(content.layout.spawn_point) < 1e-6);
}

#[test]
fn test_period_change_resamples_delay() {
    let content = test_content();
    let mut state = test_state(&content);
    let mut rng = make_rng();
    state.clock.minutes = 11.0 * 60.0 - 0.5;
    state.spawner.delay_remaining_s = 100.0;

    let events = step(&mut state, &content, &mut rng, &[]);
    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::PeriodChanged {
            period: DayPeriod::Noon
        }
    )));
    assert_eq!(state.clock.period, DayPeriod::Noon);
    // Resampled from the noon bucket, then this tick's dt counted down.
    let delay = state.spawner.delay_remaining_s;
    assert!((4.0..7.0).contains(&delay), "delay {delay}");
}

#[test]
fn test_no_spawns_after_day_end() {
    let content = eager_content(4);
    let mut state = test_state(&content);
    let mut rng = make_rng();
    state.clock.minutes = content.constants.day_end_hour as f32 * 60.0 - 0.5;
    state.spawner.delay_remaining_s = DT;

    let mut day_ended = 0;
    for _ in 0..5 {
        let events = step(&mut state, &content, &mut rng, &[]);
        assert!(spawned(&events).is_empty());
        day_ended += events
            .iter()
            .filter(|e| matches!(e.event, Event::DayEnded))
            .count();
    }
    assert_eq!(day_ended, 1);
    assert!(state.clock.day_ended);
    assert!(state.customers.is_empty());
}

#[test]
fn test_orders_cover_the_menu() {
    let content = eager_content(4);
    let mut state = test_state(&content);
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..60 {
        let events = step(&mut state, &content, &mut rng, &[]);
        for event in events {
            if let Event::CustomerSpawned { order, .. } = event.event {
                seen.insert(order);
            }
        }
        // Keep the line moving so new customers keep arriving.
        if let Some(front) = state.queue.front().cloned() {
            run_command(
                &mut state,
                &content,
                &mut rng,
                Command::DequeueCustomer { customer_id: front },
            );
        }
    }
    assert_eq!(seen.len(), FoodType::ALL.len());
}
