//! Stage geometry
//!
//! Everything here is derived from the viewport size (CSS pixels) and is
//! recomputed on resize. Coordinates are screen space, y down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::SlotGeometry;

/// Smallest reel column / symbol edge in px
const MIN_CELL: f32 = 100.0;
/// Half width of the lever shaft
const LEVER_SHAFT_HALF_WIDTH: f32 = 10.0;
/// Lever knob radius
pub const LEVER_KNOB_RADIUS: f32 = 20.0;

/// How pointer input starts a spin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    /// Hold and release the lever; hold time scales the spin
    Lever,
    /// Narrow screens: a tap anywhere spins with default strength
    Stage,
}

/// Screen placement of the reels and the lever
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageLayout {
    pub width: f32,
    pub height: f32,
    pub reel_count: usize,
    /// Width of one reel column
    pub reel_width: f32,
    /// Height of one symbol row
    pub symbol_size: f32,
    /// Top-left of the first reel column; `y` is also the mask height
    pub reel_origin: Vec2,
    /// Top of the lever shaft
    pub lever_origin: Vec2,
    pub input_mode: InputMode,
}

impl StageLayout {
    pub fn new(width: f32, height: f32, reel_count: usize) -> Self {
        let reel_width = (width / 5.0).max(MIN_CELL);
        let symbol_size = (height / 6.0).max(MIN_CELL);

        let reel_origin = Vec2::new(
            (width - reel_width * reel_count as f32) / 2.0,
            (height - symbol_size * VISIBLE_ROWS as f32) / 2.0,
        );
        let lever_origin = Vec2::new(width - 150.0, height / 2.0 - 100.0);

        let input_mode = if width > NARROW_VIEWPORT_PX {
            InputMode::Lever
        } else {
            InputMode::Stage
        };

        Self {
            width,
            height,
            reel_count,
            reel_width,
            symbol_size,
            reel_origin,
            lever_origin,
            input_mode,
        }
    }

    /// Height of the white bands hiding the recycled rows
    pub fn mask_height(&self) -> f32 {
        self.reel_origin.y
    }

    /// Bottom edge of the visible reel window
    pub fn window_bottom(&self) -> f32 {
        self.reel_origin.y + self.symbol_size * VISIBLE_ROWS as f32
    }

    /// Symbol sizing shared by every slot
    pub fn slot_geometry(&self) -> SlotGeometry {
        SlotGeometry::new(
            self.symbol_size as f64,
            self.reel_width as f64,
            SYMBOL_TEXTURE_SIZE,
            SYMBOL_TEXTURE_SIZE,
        )
    }

    /// Whether `point` touches the lever (shaft or knob at `handle_y`)
    pub fn lever_hit(&self, point: Vec2, handle_y: f32) -> bool {
        if self.input_mode != InputMode::Lever {
            return false;
        }
        let local = point - self.lever_origin;
        let on_shaft = local.x.abs() <= LEVER_SHAFT_HALF_WIDTH
            && (0.0..=LEVER_REST_Y as f32).contains(&local.y);
        let on_knob = local.distance(Vec2::new(0.0, handle_y)) <= LEVER_KNOB_RADIUS;
        on_shaft || on_knob
    }
}
