//! Lever Reels - A three-reel slot machine animation
//!
//! Core modules:
//! - `sim`: Deterministic animation core (tweens, easing, reels, lever)
//! - `layout`: Stage geometry derived from the viewport size
//! - `renderer`: WebGPU rendering pipeline
//! - `tuning`: Data-driven spin and lever feel
//! - `settings`: Player preferences persisted in LocalStorage

pub mod layout;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use layout::{InputMode, StageLayout};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Machine configuration constants
pub mod consts {
    /// Number of reels on the machine
    pub const REEL_COUNT: usize = 3;
    /// Symbol slots per reel (one more than the visible rows)
    pub const SLOTS_PER_REEL: usize = 4;
    /// Distinct symbols a slot can show
    pub const SYMBOL_COUNT: usize = 13;
    /// Visible rows in the reel window
    pub const VISIBLE_ROWS: usize = 3;
    /// Most reels the renderer can draw
    pub const MAX_REELS: usize = 8;
    /// Most symbol slots per reel the renderer can draw
    pub const MAX_SLOTS_PER_REEL: usize = 8;

    /// Blur strength per unit of position change per frame
    pub const BLUR_SCALE: f64 = 8.0;
    /// Overshoot amount of the reel back-out curve
    pub const BACKOUT_AMOUNT: f64 = 0.5;

    /// Spin distance (in symbols) for the first reel
    pub const SPIN_BASE_DISTANCE: f64 = 10.0;
    /// Extra distance for each following reel
    pub const SPIN_REEL_STAGGER: f64 = 5.0;
    /// Random extra distance is drawn from 0..SPIN_EXTRA_DRAWS
    pub const SPIN_EXTRA_DRAWS: u32 = 3;
    /// Spin duration of the first reel (ms)
    pub const SPIN_BASE_MS: f64 = 2500.0;
    /// Extra duration for each following reel (ms)
    pub const SPIN_REEL_STAGGER_MS: f64 = 600.0;
    /// Extra duration per unit of random extra distance (ms)
    pub const SPIN_EXTRA_MS: f64 = 600.0;

    /// Shortest hold (seconds) that still counts as a pull
    pub const LEVER_MIN_HOLD: f64 = 0.5;
    /// Spin duration multiplier cap (seconds of hold)
    pub const LEVER_MAX_DURATION: f64 = 3.0;
    /// Handle travel (px) at full pull
    pub const LEVER_TRAVEL: f64 = 180.0;
    /// Handle travel speed while held (px per second)
    pub const LEVER_TRAVEL_PER_SECOND: f64 = 180.0;
    /// Handle y at rest, relative to the lever origin
    pub const LEVER_REST_Y: f64 = 200.0;
    /// Snap-back animation length (ms)
    pub const LEVER_SNAP_MS: f64 = 500.0;

    /// Viewports at or below this width get tap-to-spin instead of a lever
    pub const NARROW_VIEWPORT_PX: f32 = 768.0;
    /// Nominal symbol texture edge (px) before uniform scaling
    pub const SYMBOL_TEXTURE_SIZE: f64 = 256.0;
}
