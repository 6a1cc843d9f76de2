use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kitchen_control::{AutopilotController, CommandSource};
use kitchen_core::{CookState, DepartureReason, Event, EventLevel, GameState, OpenFloor};
use kitchen_world::{build_initial_state, load_content};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "kitchen_cli", about = "Food truck service sim CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation with the autopilot cooking.
    Run {
        /// Number of ticks to run. Defaults to the whole working day plus closing.
        #[arg(long)]
        ticks: Option<u64>,
        /// Simulated seconds per tick. Must be positive.
        #[arg(long, default_value_t = 0.5, value_parser = positive_seconds)]
        dt: f32,
        /// Open a fresh truck with this seed. Mutually exclusive with --state.
        #[arg(long, conflicts_with = "state_file")]
        seed: Option<u64>,
        /// Load initial GameState from a JSON file. Mutually exclusive with --seed.
        #[arg(long = "state", conflicts_with = "seed")]
        state_file: Option<String>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long, default_value_t = 120)]
        print_every: u64,
        #[arg(long, default_value = "normal", value_parser = ["normal", "debug"])]
        event_level: String,
        /// Sample metrics every N ticks.
        #[arg(long, default_value_t = 20)]
        metrics_every: u64,
        /// Disable automatic metrics collection to runs/ directory.
        #[arg(long)]
        no_metrics: bool,
    },
}

fn positive_seconds(raw: &str) -> Result<f32, String> {
    let seconds: f32 = raw
        .parse()
        .map_err(|e| format!("{raw:?} is not a number: {e}"))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(format!("expected a positive number of seconds, got {raw}"))
    }
}

struct RunOptions {
    ticks: Option<u64>,
    dt: f32,
    seed: Option<u64>,
    state_file: Option<String>,
    content_dir: String,
    print_every: u64,
    event_level: EventLevel,
    metrics_every: u64,
    no_metrics: bool,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Ticks needed to reach closing time from `state`, plus a grace period for
/// the last customers to walk off.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ticks_until_closed(state: &GameState, content: &kitchen_core::GameContent, dt: f32) -> u64 {
    const CLOSING_GRACE_S: f32 = 120.0;
    let c = &content.constants;
    let end_minutes = c.day_end_hour as f32 * 60.0;
    let remaining_s = ((end_minutes - state.clock.minutes) / c.game_minutes_per_second).max(0.0);
    ((remaining_s + CLOSING_GRACE_S) / dt).ceil() as u64
}

fn create_run_dir(run_id: &str) -> Result<std::path::PathBuf> {
    let dir = std::path::PathBuf::from("runs").join(run_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating run directory: {}", dir.display()))?;
    Ok(dir)
}

fn write_run_info(
    dir: &std::path::Path,
    state: &GameState,
    content_version: &str,
    ticks: u64,
    options: &RunOptions,
) -> Result<()> {
    let info = serde_json::json!({
        "run_id": state.meta.run_id,
        "seed": state.meta.seed,
        "content_version": content_version,
        "metrics_every": options.metrics_every,
        "runner": "kitchen_cli",
        "args": {
            "ticks": ticks,
            "dt": options.dt,
            "print_every": options.print_every,
        }
    });
    let path = dir.join("run_info.json");
    let file =
        std::fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &info)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn run(options: &RunOptions) -> Result<()> {
    let content = load_content(&options.content_dir)?;

    let (mut state, mut rng) = if let Some(path) = &options.state_file {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading state file: {path}"))?;
        let loaded: GameState =
            serde_json::from_str(&json).with_context(|| format!("parsing state file: {path}"))?;
        let rng_seed = loaded.meta.seed;
        (loaded, ChaCha8Rng::seed_from_u64(rng_seed))
    } else {
        let resolved_seed = options.seed.unwrap_or_else(rand::random);
        let mut new_rng = ChaCha8Rng::seed_from_u64(resolved_seed);
        let new_state = build_initial_state(&content, resolved_seed, &mut new_rng);
        (new_state, new_rng)
    };

    let ticks = options
        .ticks
        .unwrap_or_else(|| ticks_until_closed(&state, &content, options.dt));
    let print_every = options.print_every.max(1);
    let metrics_every = options.metrics_every.max(1);

    // Set up per-run metrics directory.
    let mut metrics_writer: Option<kitchen_core::MetricsFileWriter> = None;
    if !options.no_metrics {
        let run_dir = create_run_dir(&state.meta.run_id.to_string())?;
        write_run_info(&run_dir, &state, &content.content_version, ticks, options)?;
        let writer = kitchen_core::MetricsFileWriter::new(run_dir.clone())
            .with_context(|| format!("opening metrics CSV in {}", run_dir.display()))?;
        metrics_writer = Some(writer);
        println!("Run directory: {}", run_dir.display());
    }

    let mut autopilot = AutopilotController;
    let mut next_command_id = state.counters.next_command_id;

    println!(
        "Starting service: ticks={ticks} dt={} seed={} stations={} content_version={}",
        options.dt,
        state.meta.seed,
        state.stations.len(),
        content.content_version,
    );
    println!("{}", "-".repeat(80));

    for _ in 0..ticks {
        let commands = autopilot.generate_commands(&state, &content, &mut next_command_id);

        let events = kitchen_core::tick(
            &mut state,
            &commands,
            &content,
            &OpenFloor,
            &mut rng,
            options.dt,
            options.event_level,
        );

        // Print notable events regardless of print_every.
        for event in &events {
            print_notable(&state, &event.event);
        }

        if state.meta.tick % print_every == 0 {
            print_status(&state);
        }

        if let Some(ref mut writer) = metrics_writer {
            if state.meta.tick % metrics_every == 0 {
                let snapshot = kitchen_core::compute_metrics(&state);
                writer.write_row(&snapshot).context("writing metrics row")?;
            }
        }
    }

    println!("{}", "-".repeat(80));
    println!("Done. Final state at tick {}:", state.meta.tick);
    print_status(&state);
    print_summary(&state);

    if let Some(ref mut writer) = metrics_writer {
        writer.flush().context("final metrics flush")?;
        println!("Metrics written to runs/ directory.");
    }

    Ok(())
}

fn print_notable(state: &GameState, event: &Event) {
    let clock = state.clock.formatted();
    match event {
        Event::PeriodChanged { period } => println!("*** {clock} PERIOD: {period:?} ***"),
        Event::DayEnded => println!("*** {clock} CLOSED ***"),
        Event::FoodBurnt {
            station_id,
            food_type,
        } => println!("!!! {clock} {food_type} burnt on {station_id}"),
        Event::CustomerDeparted {
            customer_id,
            reason: DepartureReason::PatienceExpired,
        } => println!("!!! {clock} {customer_id} walked out"),
        _ => {}
    }
}

fn print_status(state: &GameState) {
    let mut station_ids: Vec<_> = state.stations.keys().collect();
    station_ids.sort();
    let stations: Vec<String> = station_ids
        .into_iter()
        .map(|id| {
            let station = &state.stations[id];
            let label = match station.cook_state {
                CookState::Idle => "idle",
                CookState::Cooking => "cooking",
                CookState::Ready => "ready",
                CookState::Burnt => "burnt",
            };
            format!("{}={label}", id.0.trim_start_matches("station_"))
        })
        .collect();

    let front_patience = state
        .queue
        .front()
        .and_then(|id| state.customers.get(id))
        .map_or(100.0, kitchen_core::CustomerState::satisfaction);

    println!(
        "[tick={tick:05}  {clock}  {period:?}]  line={line}/{capacity}  \
         front={front_patience:3.0}%  served={served}  walked={walked}  \
         points={points}  [{stations}]",
        tick = state.meta.tick,
        clock = state.clock.formatted(),
        period = state.clock.period,
        line = state.queue.len(),
        capacity = state.spawner.capacity,
        served = state.score.served,
        walked = state.score.walked_out,
        points = state.score.points,
        stations = stations.join(" "),
    );
}

fn print_summary(state: &GameState) {
    let score = &state.score;
    println!(
        "served={}  walked_out={}  dismissed={}  wrong={}  burnt={}  points={}  avg_quality={:.2}",
        score.served,
        score.walked_out,
        score.dismissed,
        score.wrong_deliveries,
        score.food_burnt,
        score.points,
        score.average_quality(),
    );
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            dt,
            seed,
            state_file,
            content_dir,
            print_every,
            event_level,
            metrics_every,
            no_metrics,
        } => {
            let level = match event_level.as_str() {
                "debug" => EventLevel::Debug,
                _ => EventLevel::Normal,
            };
            run(&RunOptions {
                ticks,
                dt,
                seed,
                state_file,
                content_dir,
                print_every,
                event_level: level,
                metrics_every,
                no_metrics,
            })?;
        }
    }
    Ok(())
}
