//! Whole-game scenarios driven through the public API

use approx::assert_relative_eq;
use scene_engine::foundation::math::constants::PI;
use scene_engine::foundation::math::Vec2;
use scene_engine::input::InputEvent;
use scene_engine::scene::{Entity, FrameInfo, Scene, SceneConfig};
use scene_engine::{Engine, EngineConfig};
use tower_defense::config::ArchetypeConfig;
use tower_defense::entities::{Bullet, Enemy, EnemyKind, Turret, BULLET, ENEMY, TURRET};
use tower_defense::state::GameRng;
use tower_defense::{GameConfig, GameSession, GameState, TowerDefenseApp};

fn off_field() -> Vec2 {
    Vec2::new(-100.0, -100.0)
}

fn seeded_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.session.seed = Some(7);
    config
}

fn session(config: GameConfig) -> GameSession {
    GameSession::new(config, SceneConfig::default()).unwrap()
}

fn at(frame: u64, pointer: Vec2) -> FrameInfo {
    FrameInfo {
        frame,
        pointer,
        frame_rate: 60.0,
    }
}

#[test]
fn bullet_kills_enemy_and_scores() {
    let mut config = seeded_config();
    config.archetypes.push(ArchetypeConfig {
        base_health: 10.0,
        ..ArchetypeConfig::builtin(EnemyKind::BlueOrc)
    });

    let mut scene = Scene::new()
        .with_data(GameState::new(100.0))
        .with_data(GameRng::new(Some(1)));
    let enemy = scene
        .add(Enemy::spawn(&config, EnemyKind::BlueOrc, Vec2::new(100.0, 100.0), 0.0, 0))
        .unwrap();
    let bullet = scene
        .add(Bullet::new(Vec2::new(133.0, 100.0), PI, 10.0, 4.0, config.field, 0))
        .unwrap();

    scene.update();

    assert!(!scene.contains(enemy));
    assert!(!scene.contains(bullet));
    assert!(scene.objs_by_type(ENEMY).is_empty());
    assert!(scene.objs_by_type(BULLET).is_empty());
    assert_eq!(scene.data().get::<GameState>().unwrap().score, 10);
}

#[test]
fn game_over_latches_until_restart() {
    let mut game = session(seeded_config());
    game.scene_mut().data_mut().get_mut::<GameState>().unwrap().health = 0.0;

    game.tick(at(1, off_field())).unwrap();
    assert!(game.is_game_over());

    game.scene_mut().data_mut().get_mut::<GameState>().unwrap().health = 50.0;
    game.tick(at(2, off_field())).unwrap();
    assert!(game.is_game_over());

    game.key_pressed('r').unwrap();
    assert!(!game.is_game_over());
    assert_relative_eq!(game.state().unwrap().health, 100.0);
}

#[test]
fn game_over_freezes_the_field() {
    let mut game = session(seeded_config());
    game.scene_mut().data_mut().get_mut::<GameState>().unwrap().health = -1.0;

    for frame in 1..=60 {
        game.tick(at(frame, off_field())).unwrap();
    }

    assert!(game.scene().objs_by_type(ENEMY).is_empty());
}

#[test]
fn turrets_need_clearance_and_the_field() {
    let mut game = session(seeded_config());

    game.pointer_pressed(Vec2::new(400.0, 300.0)).unwrap();
    assert_eq!(game.scene().objs_by_type(TURRET).len(), 2);

    game.pointer_pressed(Vec2::new(420.0, 300.0)).unwrap();
    game.pointer_pressed(Vec2::new(-5.0, 300.0)).unwrap();
    assert_eq!(game.scene().objs_by_type(TURRET).len(), 2);

    game.pointer_pressed(Vec2::new(400.0, 100.0)).unwrap();
    assert_eq!(game.scene().objs_by_type(TURRET).len(), 3);
}

#[test]
fn menu_press_upgrades_only_while_open() {
    let mut game = session(seeded_config());
    let turret = game.scene().objs_by_type(TURRET)[0];
    let damage_button = Vec2::new(849.38, 292.18);

    game.tick(at(10, Vec2::new(800.0, 300.0))).unwrap();
    game.pointer_pressed(damage_button).unwrap();
    assert_relative_eq!(game.scene().get::<Turret>(turret).unwrap().damage(), 1.0);

    game.tick(at(60, Vec2::new(800.0, 300.0))).unwrap();
    assert!(game.scene().get::<Turret>(turret).unwrap().show_menu());

    game.pointer_pressed(damage_button).unwrap();
    assert_relative_eq!(game.scene().get::<Turret>(turret).unwrap().damage(), 2.0);
    assert_eq!(game.scene().objs_by_type(TURRET).len(), 1);
}

#[test]
fn menu_press_upgrades_while_closed_when_ungated() {
    let mut config = seeded_config();
    config.upgrades.require_open_menu = false;
    let mut game = session(config);
    let turret = game.scene().objs_by_type(TURRET)[0];

    game.tick(at(10, Vec2::new(800.0, 300.0))).unwrap();
    assert!(!game.scene().get::<Turret>(turret).unwrap().show_menu());

    game.pointer_pressed(Vec2::new(849.38, 292.18)).unwrap();
    assert_relative_eq!(game.scene().get::<Turret>(turret).unwrap().damage(), 2.0);
}

#[test]
fn enemies_spawn_on_cadence() {
    let mut game = session(seeded_config());

    for frame in 1..=60 {
        game.tick(at(frame, off_field())).unwrap();
    }

    assert_eq!(game.scene().objs_by_type(ENEMY).len(), 2);
}

#[test]
fn enemies_grow_on_scale_interval() {
    let mut config = seeded_config();
    config.session.spawn_interval = 5;
    config.session.scale_interval = 10;
    config.session.spawn_only = Some(EnemyKind::BlueOrc);
    let mut game = session(config);

    for frame in 1..=10 {
        game.tick(at(frame, off_field())).unwrap();
    }

    let enemies = game.scene().objs_by_type(ENEMY);
    assert_eq!(enemies.len(), 2);
    let first = game.scene().get::<Enemy>(enemies[0]).unwrap();
    let second = game.scene().get::<Enemy>(enemies[1]).unwrap();
    assert_relative_eq!(first.core().radius, 37.5);
    assert_relative_eq!(first.max_health(), 460.0);
    assert_relative_eq!(second.core().radius, 30.0);
}

#[test]
fn leaking_enemy_ends_the_game() {
    let config = seeded_config();
    let mut game = session(config.clone());
    game.scene_mut()
        .add(Enemy::spawn(&config, EnemyKind::BlueOrc, Vec2::new(1229.99, 300.0), 0.0, 0))
        .unwrap();

    game.tick(at(1, off_field())).unwrap();
    assert_relative_eq!(game.state().unwrap().health, -300.0);
    assert!(!game.is_game_over());

    game.tick(at(2, off_field())).unwrap();
    assert!(game.is_game_over());
}

#[test]
fn scripted_engine_run() {
    let engine_config = EngineConfig {
        width: 1200.0,
        height: 600.0,
        frame_limit: Some(250),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(engine_config).unwrap();
    engine.schedule_event(10, InputEvent::PointerMoved { x: 400.0, y: 300.0 });
    engine.schedule_event(11, InputEvent::PointerPressed);
    engine.schedule_event(200, InputEvent::PointerMoved { x: 800.0, y: 300.0 });
    engine.schedule_event(202, InputEvent::PointerMoved { x: 849.4, y: 292.2 });
    engine.schedule_event(203, InputEvent::PointerPressed);

    let mut app = TowerDefenseApp::new(seeded_config());
    engine.run_app(&mut app).unwrap();

    assert_eq!(app.stats().frames, 250);
    assert!(app.stats().last_frame_commands > 0);

    let scene = app.session().unwrap().scene();
    let turrets = scene.objs_by_type(TURRET);
    assert_eq!(turrets.len(), 2);
    assert_relative_eq!(scene.get::<Turret>(turrets[0]).unwrap().damage(), 2.0);
    assert_relative_eq!(scene.get::<Turret>(turrets[1]).unwrap().damage(), 1.0);
}

#[test]
fn held_button_reaches_the_session() {
    let engine_config = EngineConfig {
        frame_limit: Some(20),
        ..EngineConfig::default()
    };

    let mut engine = Engine::new(engine_config.clone()).unwrap();
    engine.schedule_event(5, InputEvent::PointerPressed);
    let mut app = TowerDefenseApp::new(seeded_config());
    engine.run_app(&mut app).unwrap();
    assert!(app.session().unwrap().pointer_down());

    let mut engine = Engine::new(engine_config).unwrap();
    engine.schedule_event(5, InputEvent::PointerPressed);
    engine.schedule_event(6, InputEvent::PointerReleased);
    let mut app = TowerDefenseApp::new(seeded_config());
    engine.run_app(&mut app).unwrap();
    assert!(!app.session().unwrap().pointer_down());
}
