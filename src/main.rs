use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use intersection_sim::simulation::{self, PhasePlan, SignalPhase, SimConfig, SimWorld};

#[derive(Parser)]
#[command(name = "intersection_sim")]
#[command(about = "Signalized four-way intersection simulation")]
struct Cli {
    /// Maximum number of simulation ticks to run
    #[arg(long, default_value = "7500")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value_t = 1.0 / 60.0)]
    delta: f32,

    /// Seed for reproducible spawn jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Session length in simulated seconds
    #[arg(long, default_value_t = simulation::DEFAULT_SESSION_SECS)]
    session_secs: f32,

    /// Yellow interval in seconds
    #[arg(long, default_value_t = simulation::DEFAULT_YELLOW_SECS)]
    yellow_secs: f32,

    /// All-red interval in seconds
    #[arg(long, default_value_t = simulation::DEFAULT_ALL_RED_SECS)]
    all_red_secs: f32,

    /// Fraction by which spawn intervals vary randomly (0 disables)
    #[arg(long, default_value_t = 0.0)]
    spawn_jitter: f32,

    /// Phase shown at session start (main-go, main-left, side-go, side-left)
    #[arg(long, default_value = "main-go")]
    initial_phase: String,

    /// Scripted phase requests, e.g. "10:side-go,25:main-left"
    #[arg(long, conflicts_with = "cycle_secs")]
    plan: Option<String>,

    /// Request the next green phase in rotation every N seconds
    #[arg(long)]
    cycle_secs: Option<f32>,

    /// Print the ASCII map with each report
    #[arg(long)]
    map: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,intersection_sim=info"),
    )
    .init();

    let cli = Cli::parse();
    anyhow::ensure!(
        cli.delta.is_finite() && cli.delta > 0.0,
        "Tick delta must be positive, got {}",
        cli.delta
    );

    let initial_phase: SignalPhase = cli
        .initial_phase
        .parse()
        .context("Invalid --initial-phase")?;

    let config = SimConfig {
        yellow_secs: cli.yellow_secs,
        all_red_secs: cli.all_red_secs,
        session_secs: cli.session_secs,
        initial_phase,
        spawn_jitter: cli.spawn_jitter,
        ..SimConfig::default()
    };
    config.validate().context("Invalid simulation configuration")?;

    let plan = match (&cli.plan, cli.cycle_secs) {
        (Some(text), _) => PhasePlan::parse(text).context("Invalid --plan")?,
        (None, Some(period)) => {
            anyhow::ensure!(
                period.is_finite() && period > 0.0,
                "Cycle period must be positive, got {}",
                period
            );
            PhasePlan::cycle(initial_phase, period, config.session_secs)
        }
        (None, None) => PhasePlan::default(),
    };

    let world = match cli.seed {
        Some(seed) => SimWorld::new_with_seed(config, seed),
        None => SimWorld::new(config),
    };

    run_headless(world, plan, cli.ticks, cli.delta, cli.map);
    Ok(())
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(mut world: SimWorld, mut plan: PhasePlan, ticks: u32, delta: f32, map: bool) {
    println!("Running intersection simulation in headless mode...");
    println!("Ticks: {}, Delta: {:.4}s, Planned requests: {}", ticks, delta, plan.len());

    // Report once per simulated second
    let ticks_per_report = (1.0 / delta).ceil() as u32;
    println!();

    world.start();

    let mut tick = 0;
    while tick < ticks && world.is_running() {
        for phase in plan.due(world.time) {
            if !world.request_phase(phase) {
                info!("Planned request for {} at {:.1}s was dropped", phase, world.time);
            }
        }

        tick += 1;
        world.tick(delta);

        if tick % ticks_per_report == 0 {
            println!("--- After tick {} ({:.1}s simulated time) ---", tick, world.time);
            world.print_summary();
            if map {
                world.draw_map();
            }
            println!();
        }
    }

    // Ran out of ticks before the session timer fired
    world.stop();

    println!("=== Final State ===");
    world.print_summary();
    world.draw_map();
}
