//! Session state shared through the scene's data bag

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use scene_engine::scene::Scene;

/// Health, score and UI flags of one session
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Remaining health; leaking enemies subtract theirs
    pub health: f32,
    /// Points from kills
    pub score: u32,
    /// Set once health drops to zero; only a restart clears it
    pub game_over: bool,
    /// Whether a click at the pointer would place a turret
    pub can_add_turret_at_pointer: bool,
}

impl GameState {
    /// Fresh state for a new session
    pub fn new(starting_health: f32) -> Self {
        Self {
            health: starting_health,
            score: 0,
            game_over: false,
            can_add_turret_at_pointer: false,
        }
    }

    /// Latch game over when health is gone; returns the latched flag
    pub fn check_game_over(&mut self) -> bool {
        if self.health <= 0.0 {
            self.game_over = true;
        }
        self.game_over
    }
}

/// Random source for spawning and enemy wobble
#[derive(Debug, Clone)]
pub struct GameRng(pub StdRng);

impl GameRng {
    /// Seeded generator, or one seeded from entropy
    pub fn new(seed: Option<u64>) -> Self {
        Self(seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64))
    }
}

/// Mutable session state, if the scene carries one
pub fn state_mut(scene: &mut Scene) -> Option<&mut GameState> {
    scene.data_mut().get_mut::<GameState>()
}

/// Uniform sample in `[low, high]`
///
/// Falls back to the midpoint when the scene has no generator.
pub fn random_range(scene: &mut Scene, low: f32, high: f32) -> f32 {
    if high <= low {
        return low;
    }
    match scene.data_mut().get_mut::<GameRng>() {
        Some(GameRng(rng)) => rng.gen_range(low..=high),
        None => (low + high) * 0.5,
    }
}
