//! Data-driven spin and lever feel
//!
//! Every number that shapes a spin lives here so the feel can be adjusted
//! without touching the state machine. Defaults come from `consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Reel spin distances and durations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinTuning {
    /// Distance (symbols) the first reel travels at speed 1
    pub base_distance: f64,
    /// Extra distance for each following reel
    pub reel_stagger: f64,
    /// Random extra distance is drawn uniformly from 0..extra_draws
    pub extra_draws: u32,
    /// Duration of the first reel at duration 1 (ms)
    pub base_ms: f64,
    /// Extra duration for each following reel (ms)
    pub reel_stagger_ms: f64,
    /// Extra duration per unit of random extra distance (ms)
    pub extra_ms: f64,
    /// Overshoot of the stopping curve
    pub backout_amount: f64,
}

impl Default for SpinTuning {
    fn default() -> Self {
        Self {
            base_distance: SPIN_BASE_DISTANCE,
            reel_stagger: SPIN_REEL_STAGGER,
            extra_draws: SPIN_EXTRA_DRAWS,
            base_ms: SPIN_BASE_MS,
            reel_stagger_ms: SPIN_REEL_STAGGER_MS,
            extra_ms: SPIN_EXTRA_MS,
            backout_amount: BACKOUT_AMOUNT,
        }
    }
}

impl SpinTuning {
    /// Target position for reel `index` starting at `position`
    pub fn target(&self, position: f64, index: usize, extra: u32, speed_multiplier: f64) -> f64 {
        let distance = self.base_distance + index as f64 * self.reel_stagger + extra as f64;
        (position + distance * speed_multiplier).ceil()
    }

    /// Tween length (ms) for reel `index`
    pub fn duration_ms(&self, index: usize, extra: u32, duration: f64) -> f64 {
        (self.base_ms + index as f64 * self.reel_stagger_ms + extra as f64 * self.extra_ms)
            * duration
    }
}

/// Lever hold-to-pull mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeverTuning {
    /// Holds shorter than this (seconds) are cancelled taps
    pub min_hold: f64,
    /// Spin duration multiplier cap
    pub max_duration: f64,
    /// Full handle travel (px)
    pub travel: f64,
    /// Handle travel speed while held (px per second)
    pub travel_per_second: f64,
    /// Handle y at rest, relative to the lever origin
    pub rest_y: f64,
    /// Snap-back length (ms)
    pub snap_ms: f64,
}

impl Default for LeverTuning {
    fn default() -> Self {
        Self {
            min_hold: LEVER_MIN_HOLD,
            max_duration: LEVER_MAX_DURATION,
            travel: LEVER_TRAVEL,
            travel_per_second: LEVER_TRAVEL_PER_SECOND,
            rest_y: LEVER_REST_Y,
            snap_ms: LEVER_SNAP_MS,
        }
    }
}

/// Complete machine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub reel_count: usize,
    pub slots_per_reel: usize,
    pub symbol_count: usize,
    /// Blur strength per unit of position change per frame
    pub blur_scale: f64,
    pub spin: SpinTuning,
    pub lever: LeverTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            reel_count: REEL_COUNT,
            slots_per_reel: SLOTS_PER_REEL,
            symbol_count: SYMBOL_COUNT,
            blur_scale: BLUR_SCALE,
            spin: SpinTuning::default(),
            lever: LeverTuning::default(),
        }
    }
}

impl Tuning {
    /// Clamp values that would break the state machine
    ///
    /// Counts are raised to at least 1 (slots to at least 2 so a wrap can
    /// happen) and capped at what the renderer draws. Timings and distances
    /// are made non-negative.
    pub fn sanitized(mut self) -> Self {
        let non_negative = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };

        self.reel_count = self.reel_count.clamp(1, MAX_REELS);
        self.slots_per_reel = self.slots_per_reel.clamp(2, MAX_SLOTS_PER_REEL);
        self.symbol_count = self.symbol_count.max(1);
        self.blur_scale = non_negative(self.blur_scale);

        let spin = &mut self.spin;
        spin.base_distance = non_negative(spin.base_distance);
        spin.reel_stagger = non_negative(spin.reel_stagger);
        spin.extra_draws = spin.extra_draws.max(1);
        spin.base_ms = non_negative(spin.base_ms);
        spin.reel_stagger_ms = non_negative(spin.reel_stagger_ms);
        spin.extra_ms = non_negative(spin.extra_ms);
        spin.backout_amount = non_negative(spin.backout_amount);

        let lever = &mut self.lever;
        lever.min_hold = non_negative(lever.min_hold);
        lever.max_duration = non_negative(lever.max_duration);
        lever.travel = non_negative(lever.travel);
        lever.travel_per_second = non_negative(lever.travel_per_second);
        lever.snap_ms = non_negative(lever.snap_ms);
        if !lever.rest_y.is_finite() {
            lever.rest_y = LEVER_REST_Y;
        }

        self
    }
}
