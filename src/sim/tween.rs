//! Time-based property tweening
//!
//! The scheduler owns every in-flight interpolation. Targets are addressed by a
//! key through the `Animatable` trait, so the scheduler never holds references
//! into the objects it animates. Completion is reported as `TweenEvent`s that
//! the owner routes; the scheduler knows nothing about reels or levers.

use serde::{Deserialize, Serialize};

use super::easing::{Easing, lerp};

/// Something with numeric properties a tween can read and write
pub trait Animatable {
    /// Address of one property
    type Key: Copy + PartialEq + std::fmt::Debug;

    fn value(&self, key: Self::Key) -> f64;
    fn set_value(&mut self, key: Self::Key, value: f64);
}

/// Handle returned by `TweenScheduler::schedule`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TweenId(pub u32);

/// Which events a tween reports back to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hooks {
    /// Emit `TweenEvent::Ticked` after every write
    pub on_tick: bool,
    /// Emit `TweenEvent::Completed` once the end value is reached
    pub on_complete: bool,
}

impl Hooks {
    pub const NONE: Hooks = Hooks {
        on_tick: false,
        on_complete: false,
    };
    pub const COMPLETE: Hooks = Hooks {
        on_tick: false,
        on_complete: true,
    };
    pub const ALL: Hooks = Hooks {
        on_tick: true,
        on_complete: true,
    };
}

/// Where a tween goes and how it gets there
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSpec {
    pub end: f64,
    pub duration_ms: f64,
    pub easing: Easing,
    pub hooks: Hooks,
}

impl TweenSpec {
    /// Tween toward `end` over `duration_ms` with the default back-out curve
    pub fn to(end: f64, duration_ms: f64) -> Self {
        Self {
            end,
            duration_ms,
            easing: Easing::default(),
            hooks: Hooks::NONE,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }
}

/// Reported by `TweenScheduler::advance`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenEvent<K> {
    /// Property was written this frame
    Ticked {
        id: TweenId,
        key: K,
        value: f64,
        phase: f64,
    },
    /// Property reached its end value; the tween is gone after this frame
    Completed { id: TweenId, key: K },
}

/// Read-only view of an active tween
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSnapshot<K> {
    pub id: TweenId,
    pub key: K,
    pub begin: f64,
    pub end: f64,
    pub start: f64,
    pub duration_ms: f64,
}

#[derive(Debug, Clone)]
struct Tween<K> {
    id: TweenId,
    key: K,
    /// Captured once at schedule time, never re-read
    begin: f64,
    spec: TweenSpec,
    start: f64,
}

impl<K> Tween<K> {
    /// Normalized progress, clamped to [0, 1]
    fn phase(&self, now: f64) -> f64 {
        let duration = self.spec.duration_ms;
        if !duration.is_finite() || duration <= 0.0 {
            return 1.0;
        }
        let phase = (now - self.start) / duration;
        if phase.is_nan() {
            return 1.0;
        }
        phase.clamp(0.0, 1.0)
    }
}

/// Owns and advances all active tweens
#[derive(Debug, Clone)]
pub struct TweenScheduler<K> {
    tweens: Vec<Tween<K>>,
    next_id: u32,
}

impl<K> Default for TweenScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TweenScheduler<K> {
    pub fn new() -> Self {
        Self {
            tweens: Vec::new(),
            next_id: 1,
        }
    }

    /// Number of active tweens
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}

impl<K: Copy + PartialEq> TweenScheduler<K> {
    /// Start animating `key` on `targets` toward `spec.end`, beginning at `now`
    pub fn schedule<T>(&mut self, targets: &T, key: K, spec: TweenSpec, now: f64) -> TweenId
    where
        T: Animatable<Key = K>,
    {
        let id = TweenId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        self.tweens.push(Tween {
            id,
            key,
            begin: targets.value(key),
            spec,
            start: now,
        });
        id
    }

    /// Advance every tween to `now`, writing into `targets`
    ///
    /// Tweens are visited in scheduling order. A tween whose phase reaches 1
    /// is snapped exactly to its end value and removed once the pass is done.
    pub fn advance<T>(&mut self, now: f64, targets: &mut T) -> Vec<TweenEvent<K>>
    where
        T: Animatable<Key = K>,
    {
        let mut events = Vec::new();
        let mut finished = Vec::new();

        for tween in &self.tweens {
            let phase = tween.phase(now);
            let value = lerp(tween.begin, tween.spec.end, tween.spec.easing.apply(phase));
            targets.set_value(tween.key, value);

            if tween.spec.hooks.on_tick {
                events.push(TweenEvent::Ticked {
                    id: tween.id,
                    key: tween.key,
                    value,
                    phase,
                });
            }

            if phase == 1.0 {
                targets.set_value(tween.key, tween.spec.end);
                if tween.spec.hooks.on_complete {
                    events.push(TweenEvent::Completed {
                        id: tween.id,
                        key: tween.key,
                    });
                }
                finished.push(tween.id);
            }
        }

        if !finished.is_empty() {
            self.tweens.retain(|t| !finished.contains(&t.id));
        }

        events
    }

    /// Whether any active tween writes `key`
    pub fn is_animating(&self, key: K) -> bool {
        self.tweens.iter().any(|t| t.key == key)
    }

    /// Copy of the active tweens, in scheduling order
    pub fn snapshot(&self) -> Vec<TweenSnapshot<K>> {
        self.tweens
            .iter()
            .map(|t| TweenSnapshot {
                id: t.id,
                key: t.key,
                begin: t.begin,
                end: t.spec.end,
                start: t.start,
                duration_ms: t.spec.duration_ms,
            })
            .collect()
    }
}
