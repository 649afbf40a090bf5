//! Venture Arcade headless runner
//!
//! Plays one session with a simple autopilot standing in for keyboard or
//! joystick input, then hands the final score to the leaderboard.
//!
//! Usage: `venture-arcade [seed] [settings.json]`

use glam::Vec2;

use venture_arcade::audio::LogSink;
use venture_arcade::consts::FRAME_MS;
use venture_arcade::sim::{RoomScene, SceneStatus, TickInput};
use venture_arcade::{GameResult, HighScores, Settings};

/// Give up after this much game time
const MAX_RUN_MS: u64 = 5 * 60 * 1000;

/// Head for the treasure while it exists, then for the door; keep firing
fn autopilot(scene: &RoomScene) -> TickInput {
    let player = scene.player().pos;
    let target = match (scene.room().treasure(), scene.room().door()) {
        (Some(treasure), _) => treasure.pos,
        (None, Some(door)) => door.center + Vec2::new(0.0, 20.0),
        (None, None) => player,
    };
    let delta = target - player;
    let deadzone = 4.0;

    TickInput {
        left: delta.x < -deadzone,
        right: delta.x > deadzone,
        up: delta.y < -deadzone,
        down: delta.y > deadzone,
        fire: true,
    }
}

fn run(seed: u64, settings: Settings) -> GameResult<()> {
    let mut scene = RoomScene::new(settings, seed)?.with_sink(Box::new(LogSink));
    let mut leaderboard = HighScores::new();

    let status = loop {
        let input = autopilot(&scene);
        let status = scene.tick(&input, FRAME_MS)?;
        for event in scene.drain_events() {
            log::debug!("{:?}", event);
        }
        if status != SceneStatus::Running || scene.now_ms() >= MAX_RUN_MS {
            break status;
        }
    };

    let snapshot = scene.snapshot();
    scene.shutdown();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    match status {
        SceneStatus::Exited {
            final_score,
            rooms_cleared,
        } => {
            println!("Run over: score {} after {} rooms", final_score, rooms_cleared);
            if let Some(rank) = leaderboard.add_score(final_score, rooms_cleared + 1) {
                println!("New high score, rank {}", rank);
            }
        }
        SceneStatus::Running => println!("Time limit reached with score {}", snapshot.score),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("Invalid seed: {}", e);
            std::process::exit(2);
        }
        None => rand::random(),
    };
    let settings = match args.next() {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to load settings from {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => Settings::default(),
    };

    log::info!("Venture Arcade starting with seed {}", seed);
    if let Err(e) = run(seed, settings) {
        log::error!("Run failed: {}", e);
        std::process::exit(1);
    }
}
