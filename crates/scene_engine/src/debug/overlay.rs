//! Frame-rate and entity-count overlay

use std::collections::VecDeque;

use bitflags::bitflags;

use crate::foundation::math::Vec2;
use crate::render::{Color, Renderer};

bitflags! {
    /// Readouts the overlay draws
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DebugFlags: u8 {
        /// Rolling average frame rate
        const FRAME_RATE = 1 << 0;
        /// Number of live entities in the scene
        const ENTITY_COUNT = 1 << 1;
    }
}

/// Default number of frame-rate samples averaged
pub const DEFAULT_FRAME_RATE_SAMPLES: usize = 60;

const LABEL_MARGIN: f32 = 10.0;
const LABEL_SIZE: f32 = 24.0;
// Rough glyph advance for the monospace-ish debug font
const GLYPH_WIDTH: f32 = LABEL_SIZE * 0.6;
const LABEL_GAP: f32 = 10.0;

/// Debug overlay state
#[derive(Debug, Clone)]
pub struct DebugOverlay {
    flags: DebugFlags,
    samples: VecDeque<f32>,
    capacity: usize,
}

impl DebugOverlay {
    /// Create an overlay averaging over `capacity` samples
    pub fn new(flags: DebugFlags, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            flags,
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Enabled readouts
    pub fn flags(&self) -> DebugFlags {
        self.flags
    }

    /// Turn a readout on or off
    pub fn set(&mut self, flag: DebugFlags, enabled: bool) {
        self.flags.set(flag, enabled);
        if flag.contains(DebugFlags::FRAME_RATE) && !enabled {
            self.samples.clear();
        }
    }

    /// Push a frame-rate sample, evicting the oldest past capacity
    pub fn record_frame_rate(&mut self, fps: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(fps);
    }

    /// Mean of the retained samples, if any
    pub fn average_frame_rate(&self) -> Option<f32> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f32>() / self.samples.len() as f32)
    }

    /// Draw the enabled readouts left to right from the top-left corner
    pub fn draw(&self, renderer: &mut dyn Renderer, entity_count: usize) {
        let mut cursor = Vec2::new(LABEL_MARGIN, LABEL_MARGIN);

        if self.flags.contains(DebugFlags::FRAME_RATE) {
            let fps = self.average_frame_rate().unwrap_or(0.0);
            cursor = draw_label(renderer, cursor, &format!("[FPS: {fps:.0}]"));
        }
        if self.flags.contains(DebugFlags::ENTITY_COUNT) {
            draw_label(renderer, cursor, &format!("[Objs: {entity_count}]"));
        }
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new(DebugFlags::empty(), DEFAULT_FRAME_RATE_SAMPLES)
    }
}

/// Draws one label and returns where the next one starts
fn draw_label(renderer: &mut dyn Renderer, at: Vec2, label: &str) -> Vec2 {
    renderer.text(at, LABEL_SIZE, label, Color::LIME);
    // Advance in whole three-glyph columns so readouts don't jitter
    let column = GLYPH_WIDTH * 3.0;
    let width = label.chars().count() as f32 * GLYPH_WIDTH;
    Vec2::new(at.x + (width / column).ceil() * column + LABEL_GAP, at.y)
}
