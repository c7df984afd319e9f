//! Hold-to-pull lever
//!
//! The handle slides down the shaft while held; on release the hold time picks
//! the spin strength. Handle feedback is derived from the frame clock, the
//! snap-back animation is a regular tween scheduled by the machine.

use serde::{Deserialize, Serialize};

use crate::tuning::LeverTuning;

/// Lever gesture state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LeverState {
    /// Ready to be grabbed
    Idle,
    /// Held since the given timestamp (ms)
    Holding { since: f64 },
    /// Released after a pull, snapping back
    Returning,
}

/// Outcome of letting go of the lever
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LeverRelease {
    /// Held too briefly; no spin
    Cancelled { hold: f64 },
    /// Spin with the given strength
    Pull {
        hold: f64,
        duration: f64,
        speed_multiplier: f64,
    },
}

impl LeverRelease {
    /// Map a hold time (seconds) to a release outcome
    pub fn from_hold(hold: f64, tuning: &LeverTuning) -> Self {
        if hold < tuning.min_hold {
            LeverRelease::Cancelled { hold }
        } else {
            LeverRelease::Pull {
                hold,
                duration: hold.min(tuning.max_duration),
                speed_multiplier: 1.0 + hold,
            }
        }
    }
}

/// The lever control
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lever {
    pub state: LeverState,
    /// Knob y relative to the lever origin
    pub handle_y: f64,
}

impl Lever {
    pub fn new(tuning: &LeverTuning) -> Self {
        Self {
            state: LeverState::Idle,
            handle_y: tuning.rest_y,
        }
    }

    /// Held or still snapping back from a pull
    pub fn is_busy(&self) -> bool {
        self.state != LeverState::Idle
    }

    /// Grab the lever; ignored while a spin runs or the lever is busy
    pub fn press(&mut self, now: f64, spin_running: bool) -> bool {
        if spin_running || self.is_busy() {
            return false;
        }
        self.state = LeverState::Holding { since: now };
        true
    }

    /// Seconds held so far, if held
    pub fn hold_seconds(&self, now: f64) -> Option<f64> {
        match self.state {
            LeverState::Holding { since } => Some(((now - since) / 1000.0).max(0.0)),
            _ => None,
        }
    }

    /// Slide the knob to match the current hold time
    pub fn follow(&mut self, now: f64, tuning: &LeverTuning) {
        if let Some(hold) = self.hold_seconds(now) {
            self.handle_y = Self::held_handle_y(hold, tuning);
        }
    }

    /// Knob y after holding for `hold` seconds
    pub fn held_handle_y(hold: f64, tuning: &LeverTuning) -> f64 {
        tuning.rest_y - (hold * tuning.travel_per_second).min(tuning.travel)
    }

    /// Let go; `None` when the lever was not held
    pub fn release(&mut self, now: f64, tuning: &LeverTuning) -> Option<LeverRelease> {
        let hold = self.hold_seconds(now)?;
        self.handle_y = Self::held_handle_y(hold, tuning);

        let release = LeverRelease::from_hold(hold, tuning);
        self.state = match release {
            LeverRelease::Cancelled { .. } => LeverState::Idle,
            LeverRelease::Pull { .. } => LeverState::Returning,
        };
        Some(release)
    }

    /// Snap-back finished
    pub fn settle(&mut self) {
        if self.state == LeverState::Returning {
            self.state = LeverState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_maps_to_spin_strength() {
        let tuning = LeverTuning::default();
        assert_eq!(
            LeverRelease::from_hold(0.3, &tuning),
            LeverRelease::Cancelled { hold: 0.3 }
        );
        assert_eq!(
            LeverRelease::from_hold(0.5, &tuning),
            LeverRelease::Pull {
                hold: 0.5,
                duration: 0.5,
                speed_multiplier: 1.5
            }
        );
        assert_eq!(
            LeverRelease::from_hold(4.0, &tuning),
            LeverRelease::Pull {
                hold: 4.0,
                duration: 3.0,
                speed_multiplier: 5.0
            }
        );
    }

    #[test]
    fn test_handle_follows_hold_and_caps() {
        let tuning = LeverTuning::default();
        let mut lever = Lever::new(&tuning);
        assert!(lever.press(1000.0, false));

        lever.follow(1500.0, &tuning);
        assert_eq!(lever.handle_y, 110.0);

        lever.follow(3000.0, &tuning);
        assert_eq!(lever.handle_y, 20.0);
    }

    #[test]
    fn test_press_ignored_while_running_or_busy() {
        let tuning = LeverTuning::default();
        let mut lever = Lever::new(&tuning);
        assert!(!lever.press(0.0, true));
        assert_eq!(lever.state, LeverState::Idle);

        assert!(lever.press(0.0, false));
        assert!(!lever.press(100.0, false));
        assert_eq!(lever.state, LeverState::Holding { since: 0.0 });
    }

    #[test]
    fn test_short_release_cancels_and_frees_lever() {
        let tuning = LeverTuning::default();
        let mut lever = Lever::new(&tuning);
        lever.press(0.0, false);

        let release = lever.release(200.0, &tuning);
        assert!(matches!(release, Some(LeverRelease::Cancelled { .. })));
        assert_eq!(lever.state, LeverState::Idle);
        assert_eq!(lever.handle_y, 164.0);
    }

    #[test]
    fn test_pull_returns_until_settled() {
        let tuning = LeverTuning::default();
        let mut lever = Lever::new(&tuning);
        lever.press(0.0, false);

        let release = lever.release(2000.0, &tuning);
        assert_eq!(
            release,
            Some(LeverRelease::Pull {
                hold: 2.0,
                duration: 2.0,
                speed_multiplier: 3.0
            })
        );
        assert_eq!(lever.state, LeverState::Returning);
        assert!(!lever.press(2100.0, false));

        lever.settle();
        assert_eq!(lever.state, LeverState::Idle);
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let tuning = LeverTuning::default();
        let mut lever = Lever::new(&tuning);
        assert_eq!(lever.release(5000.0, &tuning), None);
        assert_eq!(lever.handle_y, tuning.rest_y);
    }
}
