//! Binary entrypoint for the Downhill CLI.
//!
//! Commands:
//! - `init` - write a starter `downhill.toml`
//! - `status [--json]` - validate the config and print a summary
//! - `simulate --script <actions> [--frames-per-step N]` - drive the game core headlessly
//!
//! See the library crate docs for module‑level details: `downhill::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use downhill::config::Config;
use downhill::game::collaborators::ScoreStore;
use downhill::game::{
    Collaborators, GameEvent, GameState, GameStateController, InstanceRegistry, Placement,
};
use downhill::headless::{
    parse_script, FileSettingsLoader, HeadlessHost, HighScoreTable, LoggingSceneLoader, RunScore,
};
use downhill::hud::{ThreatBand, ThreatGauge};
use downhill::metrics;
use downhill::track::DecorScroller;

#[derive(Parser)]
#[command(name = "downhill")]
#[command(about = "Headless driver for the Downhill game-state core")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "downhill.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Validate the configuration and show a summary
    Status {
        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run a scripted session against the headless collaborators
    Simulate {
        /// Comma separated actions: new, tutorial, pause, resume, menu, over, quit,
        /// or `set:<state>` for a raw state change
        #[arg(short, long, default_value = "new,pause,resume,over,menu,quit")]
        script: String,
        /// Frames to run between two scripted actions
        #[arg(short, long, default_value_t = 30)]
        frames_per_step: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new Downhill configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Status { json } => {
            let config = Config::load(&cli.config).await.unwrap_or_else(|e| {
                eprintln!("{} (showing defaults)", e);
                Config::default()
            });
            init_logging(&Some(config.clone()), cli.verbose);
            show_status(&config, json)?;
        }
        Commands::Simulate {
            script,
            frames_per_step,
        } => {
            let config = Config::load(&cli.config).await.unwrap_or_else(|e| {
                eprintln!("{} (using defaults)", e);
                Config::default()
            });
            init_logging(&Some(config.clone()), cli.verbose);
            config.validate()?;
            let actions = parse_script(&script)?;
            simulate(&config, &actions, frames_per_step.max(1)).await?;
        }
    }
    Ok(())
}

fn show_status(config: &Config, json: bool) -> Result<()> {
    let validation = config.validate();
    let controller = GameStateController::from_config(Collaborators::new(), config);
    if json {
        let out = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "valid": validation.is_ok(),
            "error": validation.as_ref().err().map(|e| e.to_string()),
            "run_mode": config.game.run_mode,
            "scenes": config.scenes,
            "controller": controller.snapshot(),
            "threat_bands": ThreatBand::legend(),
            "metrics": metrics::snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!("Downhill v{}", env!("CARGO_PKG_VERSION"));
    match &validation {
        Ok(()) => println!("Config: ok"),
        Err(e) => println!("Config: invalid ({})", e),
    }
    println!("Run mode: {:?}", config.game.run_mode);
    println!(
        "Scenes: menu={} gameplay={} tutorial={} game_over={}",
        config.scenes.main_menu,
        config.scenes.gameplay,
        config.scenes.tutorial,
        config.scenes.game_over
    );
    println!(
        "Threat bands: elevated>={} danger>={} critical>={} (blink {}ms)",
        config.threat.elevated,
        config.threat.danger,
        config.threat.critical,
        config.threat.blink_interval_ms
    );
    println!("Initial state: {}", controller.current_state());
    Ok(())
}

async fn simulate(
    config: &Config,
    actions: &[downhill::headless::ScriptAction],
    frames_per_step: u32,
) -> Result<()> {
    let high_score_path = Path::new(&config.game.high_score_file);
    let host = Arc::new(HeadlessHost::new());
    let score = Arc::new(RunScore::new());
    let high_scores = Arc::new(HighScoreTable::load_or_empty(
        high_score_path,
        config.game.high_score_capacity,
    ));
    let scenes = Arc::new(LoggingSceneLoader::new());
    let collaborators = Collaborators::new()
        .with_host(host.clone())
        .with_score(score.clone())
        .with_high_scores(high_scores.clone())
        .with_scene_loader(scenes.clone())
        .with_settings(Arc::new(FileSettingsLoader::new(
            config.game.settings_file.clone(),
        )));

    let registry = InstanceRegistry::global();
    let controller = Arc::new(GameStateController::from_config(collaborators, config));
    let controller = GameStateController::install(registry, controller, Placement::Root)
        .ok_or_else(|| anyhow!("A game state controller is already installed"))?;
    controller.subscribe(Arc::new(|event: &GameEvent| match event {
        GameEvent::StateChanged(state) => info!("[ui] state -> {}", state),
        GameEvent::Paused => info!("[ui] pause overlay shown"),
        GameEvent::Resumed => info!("[ui] pause overlay hidden"),
    }));

    let mut gauge = ThreatGauge::new(config.threat.clone());
    let mut decor = DecorScroller::from_config(&config.decor);
    let frame = Duration::from_secs_f64(1.0 / f64::from(config.simulation.frame_rate));
    let dt = frame.as_secs_f32();
    let mut ticker = tokio::time::interval(frame);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut rng = rand::thread_rng();
    let mut run_time = 0.0f32;

    info!(
        "Simulating {} actions at {} fps",
        actions.len(),
        config.simulation.frame_rate
    );
    'script: for action in actions {
        for _ in 0..frames_per_step {
            ticker.tick().await;
            let scaled = dt * host.time_scale();
            if controller.current_state() == GameState::Playing {
                score.add(rng.gen_range(1..=10));
                run_time += scaled;
            }
            // Threat climbs with time spent on the slope and resets each run.
            gauge.set_threat((run_time * 20.0) % 100.0);
            gauge.tick(scaled);
            // The slope speeds up with threat, reaching double speed at 100%.
            decor.set_speed(config.decor.scroll_speed * (1.0 + gauge.fill()));
            decor.tick(scaled);
            if host.should_stop() {
                break 'script;
            }
        }
        if *action == downhill::headless::ScriptAction::NewGame {
            run_time = 0.0;
        }
        action.apply(&controller);
        if host.should_stop() {
            break;
        }
    }

    info!(
        "Finished in {} (score {}, threat {:?} at {:.0}%, decor speed {:.1} offset {:.2})",
        controller.current_state(),
        score.current_score(),
        gauge.band(),
        gauge.percent(),
        decor.speed(),
        decor.offset()
    );
    info!("Scenes requested: {}", scenes.history().join(" -> "));

    GameStateController::teardown(registry, &controller);
    registry.mark_shutting_down();

    if let Err(e) = high_scores.save(high_score_path) {
        warn!("{}", e);
    }
    match high_scores.best() {
        Some(best) => println!("Best score: {}", best),
        None => println!("No scores recorded"),
    }
    if host.is_terminated() {
        info!("Host terminated; exiting");
        std::process::exit(0);
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .and_then(|cfg| cfg.logging.level.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });
    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Tee to the console only when someone is watching
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
