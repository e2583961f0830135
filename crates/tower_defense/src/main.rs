//! Headless tower defense run
//!
//! Usage: `tower_defense [CONFIG] [--frames N] [--kind KIND]`
//!
//! Plays a short scripted session: place a turret, wait for it to settle,
//! open its menu and buy a damage upgrade. Logs the outcome.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Arg, ArgMatches, Command};
use scene_engine::config::Config;
use scene_engine::foundation::logging;
use scene_engine::foundation::math::Vec2;
use scene_engine::input::InputEvent;
use scene_engine::{Engine, EngineConfig};
use tower_defense::entities::EnemyKind;
use tower_defense::{GameConfig, TowerDefenseApp};

const DEFAULT_FRAMES: u64 = 600;

#[derive(Debug)]
struct Args {
    config: Option<PathBuf>,
    frames: u64,
    kind: Option<EnemyKind>,
}

fn cli() -> Command {
    Command::new("tower_defense")
        .about("Plays a scripted headless tower defense session")
        .arg(
            Arg::new("config")
                .value_name("CONFIG")
                .help("Game configuration file (.toml or .ron)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("frames")
                .short('f')
                .long("frames")
                .value_name("N")
                .help("Frames to run before stopping")
                .value_parser(clap::value_parser!(u64).range(1..))
                .default_value("600"),
        )
        .arg(
            Arg::new("kind")
                .short('k')
                .long("kind")
                .value_name("KIND")
                .help("Spawn only this enemy kind (redgoblin, blueorc, greentroll)")
                .value_parser(|value: &str| value.parse::<EnemyKind>().map_err(|e| e.to_string())),
        )
}

impl Args {
    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config: matches.get_one::<PathBuf>("config").cloned(),
            frames: matches.get_one::<u64>("frames").copied().unwrap_or(DEFAULT_FRAMES),
            kind: matches.get_one::<EnemyKind>("kind").copied(),
        }
    }
}

fn pointer_at(x: f32, y: f32) -> InputEvent {
    InputEvent::PointerMoved { x, y }
}

/// Queue the demo input: one placement click, a hover, and an upgrade click
fn schedule_script(engine: &mut Engine, game: &GameConfig) {
    let field = game.field;
    let turret = Vec2::new(field.width * 2.0 / 3.0, field.height * 0.5);

    engine.schedule_event(10, pointer_at(field.width / 3.0, field.height * 0.5));
    engine.schedule_event(11, InputEvent::PointerPressed);
    engine.schedule_event(12, InputEvent::PointerReleased);

    engine.schedule_event(200, pointer_at(turret.x, turret.y));
    // Damage button of the initial turret's menu
    engine.schedule_event(202, pointer_at(turret.x + 49.4, turret.y - 7.8));
    engine.schedule_event(203, InputEvent::PointerPressed);
    engine.schedule_event(204, InputEvent::PointerReleased);
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut game = GameConfig::load_or_default(args.config.as_deref())?;
    if args.kind.is_some() {
        game.session.spawn_only = args.kind;
    }

    let engine_config = EngineConfig {
        title: "Tower Defense".to_string(),
        width: game.field.width,
        height: game.field.height,
        frame_limit: Some(args.frames),
        ..EngineConfig::default()
    };

    let mut engine = Engine::new(engine_config)?;
    schedule_script(&mut engine, &game);

    let mut app = TowerDefenseApp::new(game);
    engine.run_app(&mut app)?;

    if let Some(state) = app.session().and_then(|session| session.state()) {
        log::info!(
            "Run finished: {} frames, score {}, health {:.0}, game over: {}",
            app.stats().frames,
            state.score,
            state.health,
            state.game_over
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init_with_filter(&EngineConfig::default().log_filter);

    let args = Args::from_matches(&cli().get_matches());

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Tower defense failed: {err}");
            ExitCode::FAILURE
        }
    }
}
