//! Deterministic animation core
//!
//! All spin logic lives here. This module must be pure and deterministic:
//! - Time only comes in through `now` arguments (milliseconds)
//! - Seeded RNG only
//! - Stable iteration order (reel index, scheduling order)
//! - No rendering or platform dependencies

pub mod easing;
pub mod lever;
pub mod machine;
pub mod reel;
pub mod tween;

pub use easing::{Easing, back_out, bounce_out, lerp};
pub use lever::{Lever, LeverRelease, LeverState};
pub use machine::{AnimKey, MachineEvent, Scene, SlotMachine};
pub use reel::{Reel, SlotGeometry, SymbolSlot};
pub use tween::{
    Animatable, Hooks, TweenEvent, TweenId, TweenScheduler, TweenSnapshot, TweenSpec,
};
