//! Reel state and per-frame visual derivation
//!
//! A reel's `position` is the only authoritative value. Slot y coordinates,
//! motion blur and symbol recycling are all derived from it every frame.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sizing shared by every slot on the stage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotGeometry {
    /// Height of one symbol row
    pub symbol_size: f64,
    /// Uniform sprite scale fitting the texture into a cell
    pub scale: f64,
    /// Horizontal offset centering the scaled sprite in its column
    pub x: f64,
}

impl SlotGeometry {
    pub fn new(symbol_size: f64, reel_width: f64, texture_width: f64, texture_height: f64) -> Self {
        let scale = (symbol_size / texture_height).min(reel_width / texture_width);
        let x = ((reel_width - texture_width * scale) / 2.0).round();
        Self {
            symbol_size,
            scale,
            x,
        }
    }
}

/// One sprite on a reel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSlot {
    /// Index into the symbol set
    pub symbol: usize,
    /// Top edge relative to the reel window, in px
    pub y: f64,
    pub x: f64,
    pub scale: f64,
}

impl SymbolSlot {
    /// Re-apply uniform scale and centering
    fn fit(&mut self, geometry: &SlotGeometry) {
        self.scale = geometry.scale;
        self.x = geometry.x;
    }
}

/// One vertical column of scrolling symbols
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reel {
    /// Scroll progress in symbols; only grows across spins
    pub position: f64,
    /// `position` as of the previous frame
    pub previous_position: f64,
    pub slots: Vec<SymbolSlot>,
    /// Vertical blur strength, proportional to scroll velocity
    pub blur: f64,
}

impl Reel {
    /// Reel with `slot_count` random symbols stacked from the top
    pub fn new<R: Rng>(
        slot_count: usize,
        symbol_count: usize,
        geometry: &SlotGeometry,
        rng: &mut R,
    ) -> Self {
        let slots = (0..slot_count)
            .map(|j| {
                let mut slot = SymbolSlot {
                    symbol: rng.random_range(0..symbol_count.max(1)),
                    y: j as f64 * geometry.symbol_size,
                    x: 0.0,
                    scale: 1.0,
                };
                slot.fit(geometry);
                slot
            })
            .collect();

        Self {
            position: 0.0,
            previous_position: 0.0,
            slots,
            blur: 0.0,
        }
    }

    /// y of slot `j` at `position`: the slots form a band that scrolls up
    pub fn slot_y(position: f64, j: usize, slot_count: usize, symbol_size: f64) -> f64 {
        (position + j as f64).rem_euclid(slot_count as f64) * symbol_size - symbol_size
    }

    /// Derive blur and slot placement from the current position
    ///
    /// A slot that jumps from below the window (`y > symbol_size`) to above it
    /// (`y < 0`) in one frame gets a fresh random symbol. Returns how many slots
    /// were recycled.
    ///
    /// At very high speeds a slot can cross the band without ever being seen
    /// below the window on a frame boundary; it then keeps its symbol.
    pub fn update_visuals<R: Rng>(
        &mut self,
        geometry: &SlotGeometry,
        blur_scale: f64,
        symbol_count: usize,
        rng: &mut R,
    ) -> usize {
        self.blur = (self.position - self.previous_position) * blur_scale;
        self.previous_position = self.position;

        let size = geometry.symbol_size;
        let slot_count = self.slots.len();
        let mut recycled = 0;

        for (j, slot) in self.slots.iter_mut().enumerate() {
            let previous_y = slot.y;
            slot.y = Self::slot_y(self.position, j, slot_count, size);

            if slot.y < 0.0 && previous_y > size {
                slot.symbol = rng.random_range(0..symbol_count.max(1));
                slot.fit(geometry);
                recycled += 1;
            }
        }

        recycled
    }

    /// Move onto a new geometry, keeping every slot's relative place in the band
    pub fn relayout(&mut self, old: &SlotGeometry, new: &SlotGeometry) {
        let ratio = if old.symbol_size > 0.0 {
            new.symbol_size / old.symbol_size
        } else {
            1.0
        };
        for slot in &mut self.slots {
            slot.y *= ratio;
            slot.fit(new);
        }
    }
}
