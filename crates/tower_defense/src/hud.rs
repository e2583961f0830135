//! Heads-up display: health bar, score and the game over banner

use scene_engine::foundation::math::utils::{map_range, map_range_clamped};
use scene_engine::foundation::math::Vec2;
use scene_engine::render::{Color, Renderer};

use crate::config::FieldConfig;
use crate::state::GameState;

const HEALTH_BAR_WIDTH: f32 = 8.0;
const SCORE_SIZE: f32 = 24.0;
const SCORE_MARGIN: f32 = 10.0;

const BANNER: &str = "GAME OVER...R=Restart!";
const BANNER_SIZE: f32 = 100.0;
const BANNER_LAYERS: usize = 5;
const BANNER_MAX_OFFSET: f32 = 4.0;
/// Rough glyph advance as a fraction of the font size
const GLYPH_ASPECT: f32 = 0.5;

/// Vertical health bar hugging the right edge, green when full and red when empty
pub fn draw_health_bar(renderer: &mut dyn Renderer, field: &FieldConfig, state: &GameState, starting_health: f32) {
    let height = map_range(state.health, 0.0, starting_health, 0.0, field.height).max(0.0);
    let fraction = state.health / starting_health;
    let hue = map_range(fraction, 0.0, 1.0, 0.0, 120.0);

    renderer.fill_rect(
        Vec2::new(field.width - HEALTH_BAR_WIDTH * 0.5, field.height * 0.5),
        Vec2::new(HEALTH_BAR_WIDTH, height),
        Color::hsl(hue, 100.0, 50.0),
    );
}

/// Score readout in the top-left corner
pub fn draw_score(renderer: &mut dyn Renderer, state: &GameState) {
    renderer.text(
        Vec2::new(SCORE_MARGIN, SCORE_MARGIN),
        SCORE_SIZE,
        &format!("Score: {}", state.score),
        Color::WHITE,
    );
}

/// Layered game over banner that shifts with the pointer
pub fn draw_game_over(renderer: &mut dyn Renderer, field: &FieldConfig, pointer: Vec2) {
    let step = Vec2::new(
        map_range(pointer.x, 0.0, field.width, BANNER_MAX_OFFSET * 2.0, BANNER_MAX_OFFSET),
        map_range(pointer.y, 0.0, field.height, BANNER_MAX_OFFSET * 2.0, BANNER_MAX_OFFSET),
    );
    let half_extent = Vec2::new(
        BANNER.chars().count() as f32 * BANNER_SIZE * GLYPH_ASPECT,
        BANNER_SIZE,
    ) * 0.5;
    let centered = field.size() * 0.5 - half_extent;

    let mut offset = -step * BANNER_LAYERS as f32;
    for layer in 0..BANNER_LAYERS {
        offset += step;
        let shade = map_range_clamped(layer as f32, -1.0, (BANNER_LAYERS - 1) as f32, 11.0, 100.0);
        renderer.text(centered + offset, BANNER_SIZE, BANNER, Color::gray(shade));
    }
}
