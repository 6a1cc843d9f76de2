use super::*;

fn start_grill(state: &mut GameState, content: &GameContent, rng: &mut ChaCha8Rng) {
    let events = run_command(
        state,
        content,
        rng,
        Command::StartCooking {
            station_id: grill(),
        },
    );
    assert!(
        events
            .iter()
            .any(|e| matches!(e.event, Event::CookingStarted { .. })),
        "CookingStarted should be emitted"
    );
}

#[test]
fn test_start_cooking_only_from_idle() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    let first = command(
        &state,
        Command::StartCooking {
            station_id: grill(),
        },
    );
    let second = first.clone();
    let events = step(&mut state, &content, &mut rng, &[first, second]);

    assert_eq!(
        rejections(&events),
        vec![Rejection::InvalidTransition {
            state: CookState::Cooking
        }]
    );
    assert_eq!(state.stations[&grill()].cook_state, CookState::Cooking);
}

#[test]
fn test_burger_ready_after_cook_duration_and_taken_at_full_quality() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    start_grill(&mut state, &content, &mut rng);
    let mut ready_at = None;
    for _ in 1..8 {
        let events = step(&mut state, &content, &mut rng, &[]);
        if events
            .iter()
            .any(|e| matches!(e.event, Event::FoodReady { .. }))
        {
            ready_at = Some(state.meta.elapsed_s);
        }
    }
    assert!((ready_at.unwrap() - 8.0).abs() < 1e-9, "ready exactly at 8s");

    let events = run_command(
        &mut state,
        &content,
        &mut rng,
        Command::TakeFood {
            station_id: grill(),
        },
    );
    let held = state.player.held.unwrap();
    assert_eq!(held.food_type, FoodType::Burger);
    assert!((held.quality - 1.0).abs() < 1e-5);
    assert!(events
        .iter()
        .any(|e| matches!(e.event, Event::FoodTaken { .. })));
    assert_eq!(state.stations[&grill()].cook_state, CookState::Idle);
}

#[test]
fn test_late_take_loses_quality() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    start_grill(&mut state, &content, &mut rng);
    // Ready after 8s, then two more seconds on the counter.
    for _ in 1..10 {
        step(&mut state, &content, &mut rng, &[]);
    }
    run_command(
        &mut state,
        &content,
        &mut rng,
        Command::TakeFood {
            station_id: grill(),
        },
    );
    let held = state.player.held.unwrap();
    assert!((held.quality - 0.6).abs() < 1e-5, "got {}", held.quality);
    let burger = content.food(FoodType::Burger).unwrap();
    assert_eq!(burger.points_for(held.quality, &content.constants), 30);
}

#[test]
fn test_untaken_food_burns_after_grace() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    start_grill(&mut state, &content, &mut rng);
    let mut burnt_at = None;
    for _ in 1..20 {
        let events = step(&mut state, &content, &mut rng, &[]);
        if events
            .iter()
            .any(|e| matches!(e.event, Event::FoodBurnt { .. }))
        {
            assert!(burnt_at.is_none(), "burns only once");
            burnt_at = Some(state.meta.elapsed_s);
        }
    }
    assert!((burnt_at.unwrap() - 13.0).abs() < 1e-9);
    assert_eq!(state.score.food_burnt, 1);

    let events = run_command(
        &mut state,
        &content,
        &mut rng,
        Command::TakeFood {
            station_id: grill(),
        },
    );
    assert_eq!(
        rejections(&events),
        vec![Rejection::InvalidTransition {
            state: CookState::Burnt
        }]
    );
    assert!(state.player.held.is_none());
}

#[test]
fn test_cook_progress_is_monotonic() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    let mut last = state.stations[&grill()].cook_progress();
    assert!(last.abs() < 1e-6);
    start_grill(&mut state, &content, &mut rng);
    for _ in 0..20 {
        let progress = state.stations[&grill()].cook_progress();
        assert!(progress >= last, "progress went from {last} to {progress}");
        last = progress;
        step(&mut state, &content, &mut rng, &[]);
    }
    assert!((last - 1.0).abs() < 1e-6);
}

#[test]
fn test_burn_progress_only_moves_while_ready() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    assert!(state.stations[&grill()].burn_progress().abs() < 1e-6);
    start_grill(&mut state, &content, &mut rng);
    for _ in 1..8 {
        assert_eq!(state.stations[&grill()].cook_state, CookState::Cooking);
        assert!(state.stations[&grill()].burn_progress().abs() < 1e-6);
        step(&mut state, &content, &mut rng, &[]);
    }

    assert_eq!(state.stations[&grill()].cook_state, CookState::Ready);
    assert!(state.stations[&grill()].burn_progress().abs() < 1e-6);
    for seconds in 1..5u8 {
        step(&mut state, &content, &mut rng, &[]);
        let progress = state.stations[&grill()].burn_progress();
        let expected = f32::from(seconds) / 5.0;
        assert!(
            (progress - expected).abs() < 1e-6,
            "{seconds}s on the counter: {progress}"
        );
    }

    step(&mut state, &content, &mut rng, &[]);
    assert_eq!(state.stations[&grill()].cook_state, CookState::Burnt);
    assert!(state.stations[&grill()].burn_progress().abs() < 1e-6);
}

#[test]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn test_fractional_steps_hit_cook_and_burn_times() {
    let content = test_content();
    for dt in [0.1_f32, 1.0 / 60.0, 0.02] {
        let mut state = quiet_state(&content);
        let mut rng = make_rng();
        let mut commands = vec![command(
            &state,
            Command::StartCooking {
                station_id: grill(),
            },
        )];

        let (mut ready_tick, mut burnt_tick) = (None, None);
        for n in 1..=2000u32 {
            let events = tick(
                &mut state,
                &commands,
                &content,
                &OpenFloor,
                &mut rng,
                dt,
                EventLevel::Debug,
            );
            commands.clear();
            for event in &events {
                match event.event {
                    Event::FoodReady { .. } => ready_tick = Some(n),
                    Event::FoodBurnt { .. } => burnt_tick = Some(n),
                    _ => {}
                }
            }
            if burnt_tick.is_some() {
                break;
            }
        }

        let ticks_for = |seconds: f32| (seconds / dt).round() as u32;
        assert_eq!(ready_tick, Some(ticks_for(8.0)), "ready tick at dt={dt}");
        assert_eq!(burnt_tick, Some(ticks_for(13.0)), "burnt tick at dt={dt}");
    }
}

#[test]
fn test_quality_falls_while_ready_and_hits_zero_at_burn() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    start_grill(&mut state, &content, &mut rng);
    for _ in 1..8 {
        step(&mut state, &content, &mut rng, &[]);
    }

    let mut last_quality = f32::MAX;
    while state.stations[&grill()].cook_state == CookState::Ready {
        let quality = state.stations[&grill()].clone().take_food().unwrap().quality;
        assert!(quality > 0.0, "ready food always has some quality");
        assert!(quality < last_quality);
        last_quality = quality;
        step(&mut state, &content, &mut rng, &[]);
    }
    let station = &state.stations[&grill()];
    assert_eq!(station.cook_state, CookState::Burnt);
    assert!(
        crate::station::timing_quality(station.ready_elapsed_s, 5.0).abs() < 1e-6,
        "burnt exactly when quality reaches zero"
    );
}

#[test]
fn test_reset_only_after_burn() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    let events = run_command(
        &mut state,
        &content,
        &mut rng,
        Command::ResetStation {
            station_id: grill(),
        },
    );
    assert_eq!(
        rejections(&events),
        vec![Rejection::InvalidTransition {
            state: CookState::Idle
        }]
    );

    start_grill(&mut state, &content, &mut rng);
    for _ in 0..15 {
        step(&mut state, &content, &mut rng, &[]);
    }
    let events = run_command(
        &mut state,
        &content,
        &mut rng,
        Command::ResetStation {
            station_id: grill(),
        },
    );
    assert!(events
        .iter()
        .any(|e| matches!(e.event, Event::StationReset { .. })));
    assert_eq!(state.stations[&grill()].cook_state, CookState::Idle);
}

#[test]
fn test_hands_full_blocks_start_and_take() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();
    hold(&mut state, FoodType::Coffee, 1.0);

    let events = run_command(
        &mut state,
        &content,
        &mut rng,
        Command::StartCooking {
            station_id: grill(),
        },
    );
    assert_eq!(rejections(&events), vec![Rejection::HandsFull]);
    assert_eq!(state.stations[&grill()].cook_state, CookState::Idle);
}

#[test]
fn test_disabled_station_rejects_start() {
    let mut content = test_content();
    content.foods.retain(|f| f.food_type != FoodType::Coffee);
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    let coffee = StationId("station_coffee".to_string());
    assert!(!state.stations[&coffee].enabled);
    let events = run_command(
        &mut state,
        &content,
        &mut rng,
        Command::StartCooking {
            station_id: coffee.clone(),
        },
    );
    assert_eq!(rejections(&events), vec![Rejection::StationDisabled]);
    assert_eq!(
        state.stations[&coffee].status_text(),
        "Disabled - no food assigned"
    );
}

#[test]
fn test_unknown_station_rejected() {
    let content = test_content();
    let mut state = quiet_state(&content);
    let mut rng = make_rng();

    let events = run_command(
        &mut state,
        &content,
        &mut rng,
        Command::StartCooking {
            station_id: StationId("station_fryer".to_string()),
        },
    );
    assert_eq!(rejections(&events), vec![Rejection::UnknownStation]);
}
