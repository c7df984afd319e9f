//! Easing curves and interpolation
//!
//! An easing maps a normalized phase in [0, 1] to an eased progress value.
//! Overshooting curves may leave [0, 1] before settling on exactly 1.

use serde::{Deserialize, Serialize};

use crate::consts::BACKOUT_AMOUNT;

/// Easing curve applied to a tween's phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Easing {
    /// No shaping
    Linear,
    /// Cubic overshoot-then-settle; `amount` controls the overshoot
    BackOut { amount: f64 },
    /// Ball-drop bounce at the end
    BounceOut,
}

impl Default for Easing {
    fn default() -> Self {
        Easing::BackOut {
            amount: BACKOUT_AMOUNT,
        }
    }
}

impl Easing {
    /// Evaluate the curve at `t`
    #[inline]
    pub fn apply(&self, t: f64) -> f64 {
        match *self {
            Easing::Linear => t,
            Easing::BackOut { amount } => back_out(amount, t),
            Easing::BounceOut => bounce_out(t),
        }
    }
}

/// Linear interpolation: `a` at t=0, `b` at t=1
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Back-out: `(t-1)^2 * ((amount+1)(t-1) + amount) + 1`
///
/// Exactly 0 at t=0 and exactly 1 at t=1. For `amount > 0` the curve rises
/// above 1 shortly before the end, which gives the reels their settle bounce.
#[inline]
pub fn back_out(amount: f64, t: f64) -> f64 {
    let t = t - 1.0;
    t * t * ((amount + 1.0) * t + amount) + 1.0
}

/// Four-segment bounce-out (n1 = 7.5625, d1 = 2.75)
pub fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}
