//! Covert Sense - detection trial runner
//!
//! Stages a melee strike at a chosen distance from a watcher and resolves it
//! repeatedly, reporting how often each awareness level and channel wins.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use covert_sense::core::config::DetectionConfig;
use covert_sense::core::error::Result;
use covert_sense::core::types::{EntityId, RegionId};
use covert_sense::detection::OpinionLog;
use covert_sense::perception::AwarenessLevel;
use covert_sense::session::{DetectionSession, Surroundings};
use covert_sense::stealth::{ConcealedAction, SenseChannel, TriggerEvent, WeaponTierPolicy};
use covert_sense::world::{AgentSnapshot, HexCoord, HexMap, Terrain, Untracked};

/// Run repeated detection trials and print the outcome distribution
#[derive(Parser, Debug)]
#[command(name = "covert-sense")]
#[command(about = "Resolve a concealed melee strike against a watcher many times")]
struct Args {
    /// Random seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML detection config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Hexes between watcher and attacker
    #[arg(long, default_value_t = 3)]
    distance: u32,

    /// Number of resolutions to run
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Weapon tier of the strike (1-8)
    #[arg(long)]
    tier: Option<u8>,

    /// Put a wall between watcher and attacker
    #[arg(long)]
    wall: bool,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct TrialReport {
    seed: u64,
    trials: u32,
    distance: u32,
    detected: u32,
    levels: BTreeMap<String, u32>,
    channels: BTreeMap<String, u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DetectionConfig::load(path)?,
        None => DetectionConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;
    let mut session = DetectionSession::new(config)?;

    let width = args.distance + 4;
    let mut map = HexMap::with_region(RegionId::new(1), width, 5);
    let watcher_at = HexCoord::new(1, 2);
    let attacker_at = HexCoord::new(1 + args.distance as i32, 2);
    if args.wall && args.distance > 1 {
        map.set_terrain(HexCoord::new(2, 2), Terrain::Wall);
    }

    let watcher = AgentSnapshot::new(EntityId::new(), map.region, watcher_at);
    let attacker = AgentSnapshot::new(EntityId::new(), map.region, attacker_at);

    let mut senses = session.perception_set(watcher.id);
    for (channel, score, radius) in [
        (SenseChannel::Visual, 20, 5),
        (SenseChannel::Auditory, 15, 4),
        (SenseChannel::Kinesthetic, 10, 2),
    ] {
        senses.add(session.perception(watcher.id, channel, score, radius))?;
    }

    let surroundings = Surroundings {
        geometry: &map,
        tracker: &Untracked,
    };
    let mut log = OpinionLog::new();

    tracing::info!(
        seed,
        trials = args.trials,
        distance = args.distance,
        "running detection trials"
    );

    for _ in 0..args.trials {
        session.advance_tick();
        let mut action = ConcealedAction::builder(attacker.id, attacker_at)
            .event(&TriggerEvent::MeleeStrike {
                weapon_tier: args.tier,
            })
            .build()?;
        action.configure(&[&WeaponTierPolicy]);

        session.resolve(&surroundings, &action, &watcher, &attacker, &mut senses, &mut log);
    }

    let mut levels: BTreeMap<String, u32> = BTreeMap::new();
    let mut channels: BTreeMap<String, u32> = BTreeMap::new();
    for detection in log.iter() {
        *levels.entry(detection.level().name().to_string()).or_default() += 1;
        *channels.entry(format!("{:?}", detection.channel())).or_default() += 1;
    }
    let detected = log.len() as u32;
    levels.insert(AwarenessLevel::None.name().to_string(), args.trials - detected);

    let report = TrialReport {
        seed,
        trials: args.trials,
        distance: args.distance,
        detected,
        levels,
        channels,
    };

    if args.format == "json" {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize report: {}", e),
        }
    } else {
        println!("=== DETECTION TRIALS ===");
        println!("seed {}  trials {}  distance {}", report.seed, report.trials, report.distance);
        let rate = 100.0 * f64::from(report.detected) / f64::from(report.trials.max(1));
        println!("detected {} ({:.1}%)", report.detected, rate);
        println!();
        println!("By level:");
        for (level, count) in &report.levels {
            println!("  {:<8} {}", level, count);
        }
        println!("By channel:");
        for (channel, count) in &report.channels {
            println!("  {:<12} {}", channel, count);
        }
    }

    Ok(())
}
