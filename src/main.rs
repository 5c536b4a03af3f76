//! Headless driver.
//!
//! Runs one round at a fixed render rate, aiming a shot at a live target
//! every few seconds, and logs the gameplay messages as they come out of the
//! simulation (or prints them as JSON lines with `--json`).

use clap::Parser;
use glam::Vec3;
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;

use shatterbox::components::bodykind::BodyKind;
use shatterbox::events::gameplay::SimEvent;
use shatterbox::game::MUZZLE;
use shatterbox::resources::session::Outcome;
use shatterbox::resources::simconfig::SimConfig;
use shatterbox::simulation::Simulation;

/// Shatterbox headless simulation
#[derive(Parser)]
#[command(version, about = "Fixed-timestep shooting-range simulation, run headless.")]
struct Cli {
    /// INI file to load settings from. Defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Simulated wall-clock seconds to run for.
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,

    /// Frames per second fed to the simulation.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Override the RNG seed from the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Try to fire a shot every this many seconds.
    #[arg(long, default_value_t = 2.0)]
    shots_every: f32,

    /// Fire projectiles affected by gravity.
    #[arg(long)]
    gravity: bool,

    /// Print events as JSON lines on stdout.
    #[arg(long)]
    json: bool,

    /// Write the effective configuration to PATH and exit.
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

/// One line of `--json` output.
#[derive(Serialize)]
struct EventRecord {
    t: f32,
    event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    entity: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shots_left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<Outcome>,
}

impl EventRecord {
    fn new(t: f32, event: &SimEvent) -> Self {
        let mut record = Self {
            t,
            event: event.name(),
            entity: None,
            kind: None,
            position: None,
            score: None,
            shots_left: None,
            outcome: None,
        };
        match event {
            SimEvent::TargetDestroyed {
                target,
                position,
                score,
                ..
            } => {
                record.entity = Some(target.to_bits());
                record.position = Some(position.to_array());
                record.score = Some(*score);
            }
            SimEvent::BodyExpired {
                entity,
                kind,
                position,
            } => {
                record.entity = Some(entity.to_bits());
                record.kind = Some(*kind);
                record.position = Some(position.to_array());
            }
            SimEvent::PlayerHit { by } => record.entity = Some(by.to_bits()),
            SimEvent::ShotFired {
                projectile,
                shots_left,
            } => {
                record.entity = Some(projectile.to_bits());
                record.shots_left = Some(*shots_left);
            }
            SimEvent::GameOver { outcome, score } => {
                record.outcome = Some(*outcome);
                record.score = Some(*score);
            }
        }
        record
    }
}

fn load_config(cli: &Cli) -> SimConfig {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = SimConfig::with_path(path);
            if let Err(e) = config.load_from_file() {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
            config
        }
        None => SimConfig::new(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config
}

/// Direction from the muzzle to the first live target, if any.
fn aim(sim: &mut Simulation) -> Option<Vec3> {
    sim.bodies()
        .into_iter()
        .find(|(_, _, kind)| matches!(kind, BodyKind::Target { .. }))
        .map(|(_, body, _)| body.center - MUZZLE)
}

fn report(t: f32, event: &SimEvent, json: bool) {
    if json {
        match serde_json::to_string(&EventRecord::new(t, event)) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("Could not serialize {}: {}", event.name(), e),
        }
    } else {
        info!("[{t:8.3}] {event:?}");
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = load_config(&cli);

    if let Some(path) = cli.write_config.clone() {
        config.config_path = path;
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    sim.set_gravity(cli.gravity);
    sim.start_round();

    let fps = cli.fps.max(1);
    let frame_time = 1.0 / fps as f32;
    let frames = (cli.seconds.max(0.0) * fps as f32).ceil() as u64;
    let mut since_shot = 0.0;

    for _ in 0..frames {
        since_shot += frame_time;
        if since_shot >= cli.shots_every {
            since_shot = 0.0;
            if let Some(direction) = aim(&mut sim) {
                sim.fire_projectile(MUZZLE, direction);
            }
        }

        sim.simulate(frame_time);
        let t = sim.clock().t;
        for event in sim.drain_events() {
            report(t, &event, cli.json);
        }

        if sim.session().is_over() {
            break;
        }
    }

    let session = sim.session();
    info!(
        "Finished at t={:.2}s after {} steps: score {}, {} targets destroyed, outcome {:?}",
        sim.clock().t,
        sim.clock().steps_taken,
        session.score,
        session.targets_destroyed,
        session.outcome
    );
}
