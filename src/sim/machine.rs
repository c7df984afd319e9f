//! The slot machine: reels, lever and the tweens that drive them
//!
//! `SlotMachine` is the single context object the platform layer talks to.
//! Input handlers call `lever_press` / `lever_release` / `stage_tap`; the frame
//! loop calls `tick` once per displayed frame and renders from the accessors.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::easing::Easing;
use super::lever::{Lever, LeverRelease};
use super::reel::{Reel, SlotGeometry};
use super::tween::{Animatable, Hooks, TweenEvent, TweenScheduler, TweenSpec};
use crate::tuning::Tuning;

/// Tweenable properties of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimKey {
    /// `position` of the reel at this index
    ReelPosition(usize),
    /// Knob y of the lever
    LeverHandle,
}

/// Everything tweens write into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    pub reels: Vec<Reel>,
    pub lever: Lever,
}

impl Animatable for Scene {
    type Key = AnimKey;

    fn value(&self, key: AnimKey) -> f64 {
        match key {
            AnimKey::ReelPosition(i) => self.reels.get(i).map_or(0.0, |r| r.position),
            AnimKey::LeverHandle => self.lever.handle_y,
        }
    }

    fn set_value(&mut self, key: AnimKey, value: f64) {
        match key {
            AnimKey::ReelPosition(i) => {
                if let Some(reel) = self.reels.get_mut(i) {
                    reel.position = value;
                }
            }
            AnimKey::LeverHandle => self.lever.handle_y = value,
        }
    }
}

/// Something the platform layer may want to react to (sound, HUD, logs)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MachineEvent {
    /// Reels were sent spinning
    SpinStarted {
        duration: f64,
        speed_multiplier: f64,
    },
    /// One reel reached its target
    ReelStopped { reel: usize },
    /// All reels stopped and positions were snapped to whole symbols
    SpinFinished,
    /// The lever was let go
    LeverReleased(LeverRelease),
}

/// Reels + lever + tween scheduler, driven by one clock
#[derive(Debug, Clone)]
pub struct SlotMachine {
    scene: Scene,
    tweens: TweenScheduler<AnimKey>,
    tuning: Tuning,
    geometry: SlotGeometry,
    rng: Pcg32,
    seed: u64,
    /// A spin is in flight; gates `start_play`
    running: bool,
    /// Reel tweens of the current spin that have not completed yet
    reels_spinning: usize,
    /// Events raised by input calls, handed out on the next tick
    pending: Vec<MachineEvent>,
}

impl SlotMachine {
    /// Build the machine with random symbols drawn from `seed`
    pub fn new(seed: u64, tuning: Tuning, geometry: SlotGeometry) -> Self {
        let tuning = tuning.sanitized();
        let mut rng = Pcg32::seed_from_u64(seed);

        let reels = (0..tuning.reel_count)
            .map(|_| Reel::new(tuning.slots_per_reel, tuning.symbol_count, &geometry, &mut rng))
            .collect();
        let lever = Lever::new(&tuning.lever);

        Self {
            scene: Scene { reels, lever },
            tweens: TweenScheduler::new(),
            tuning,
            geometry,
            rng,
            seed,
            running: false,
            reels_spinning: 0,
            pending: Vec::new(),
        }
    }

    pub fn reels(&self) -> &[Reel] {
        &self.scene.reels
    }

    pub fn lever(&self) -> &Lever {
        &self.scene.lever
    }

    pub fn tweens(&self) -> &TweenScheduler<AnimKey> {
        &self.tweens
    }

    pub fn geometry(&self) -> &SlotGeometry {
        &self.geometry
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether a spin is in flight
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Send every reel spinning; `false` (and nothing scheduled) if one is already running
    ///
    /// Reel `i` travels `10 + 5i + extra` symbols scaled by `speed_multiplier`
    /// (rounded up to a whole symbol) over `(2500 + 600i + 600 * extra) * duration`
    /// ms, with `extra` drawn from 0..3 per reel.
    pub fn start_play(&mut self, duration: f64, speed_multiplier: f64, now: f64) -> bool {
        if self.running {
            log::debug!("Spin already running, ignoring start");
            return false;
        }
        let duration = if duration.is_finite() {
            duration.max(0.0)
        } else {
            1.0
        };
        let speed_multiplier = if speed_multiplier.is_finite() {
            speed_multiplier.max(0.0)
        } else {
            1.0
        };

        self.running = true;
        self.reels_spinning = self.scene.reels.len();

        let spin = &self.tuning.spin;
        let easing = Easing::BackOut {
            amount: spin.backout_amount,
        };
        let mut targets = Vec::with_capacity(self.scene.reels.len());

        for i in 0..self.scene.reels.len() {
            let extra = self.rng.random_range(0..spin.extra_draws);
            let target = spin.target(self.scene.reels[i].position, i, extra, speed_multiplier);
            let duration_ms = spin.duration_ms(i, extra, duration);

            self.tweens.schedule(
                &self.scene,
                AnimKey::ReelPosition(i),
                TweenSpec::to(target, duration_ms)
                    .easing(easing)
                    .hooks(Hooks::COMPLETE),
                now,
            );
            targets.push(target);
        }

        log::info!(
            "Spin started (duration x{:.2}, speed x{:.2}) targets {:?}",
            duration,
            speed_multiplier,
            targets
        );
        self.pending.push(MachineEvent::SpinStarted {
            duration,
            speed_multiplier,
        });
        true
    }

    /// Narrow-screen input: any tap spins at default strength
    pub fn stage_tap(&mut self, now: f64) -> bool {
        self.start_play(1.0, 1.0, now)
    }

    /// Grab the lever
    pub fn lever_press(&mut self, now: f64) -> bool {
        let grabbed = self.scene.lever.press(now, self.running);
        if !grabbed {
            log::debug!("Lever press ignored (spinning or lever busy)");
        }
        grabbed
    }

    /// Let go of the lever: snap it back and spin if it was held long enough
    pub fn lever_release(&mut self, now: f64) -> Option<LeverRelease> {
        let release = self.scene.lever.release(now, &self.tuning.lever)?;

        self.tweens.schedule(
            &self.scene,
            AnimKey::LeverHandle,
            TweenSpec::to(self.tuning.lever.rest_y, self.tuning.lever.snap_ms)
                .easing(Easing::BounceOut)
                .hooks(Hooks::COMPLETE),
            now,
        );
        self.pending.push(MachineEvent::LeverReleased(release));

        match release {
            LeverRelease::Cancelled { hold } => {
                log::debug!("Lever tap cancelled after {:.2}s", hold);
            }
            LeverRelease::Pull {
                duration,
                speed_multiplier,
                ..
            } => {
                self.start_play(duration, speed_multiplier, now);
            }
        }
        Some(release)
    }

    /// Advance one frame to `now` (ms)
    ///
    /// Tweens run first, then lever feedback, then every reel derives its
    /// visuals from the freshly written positions.
    pub fn tick(&mut self, now: f64) -> Vec<MachineEvent> {
        let mut events = std::mem::take(&mut self.pending);

        for event in self.tweens.advance(now, &mut self.scene) {
            if let TweenEvent::Completed { key, .. } = event {
                match key {
                    AnimKey::ReelPosition(reel) => {
                        events.push(MachineEvent::ReelStopped { reel });
                        self.reels_spinning = self.reels_spinning.saturating_sub(1);
                        if self.running && self.reels_spinning == 0 {
                            self.finish_spin();
                            events.push(MachineEvent::SpinFinished);
                        }
                    }
                    // A newer snap may still be running after a quick re-grab
                    AnimKey::LeverHandle => {
                        if !self.tweens.is_animating(AnimKey::LeverHandle) {
                            self.scene.lever.settle();
                        }
                    }
                }
            }
        }

        self.scene.lever.follow(now, &self.tuning.lever);

        for (i, reel) in self.scene.reels.iter_mut().enumerate() {
            let recycled = reel.update_visuals(
                &self.geometry,
                self.tuning.blur_scale,
                self.tuning.symbol_count,
                &mut self.rng,
            );
            if recycled > 0 {
                log::trace!("Reel {} recycled {} symbol(s)", i, recycled);
            }
        }

        events
    }

    /// Snap positions to whole symbols and accept the next spin
    fn finish_spin(&mut self) {
        for reel in &mut self.scene.reels {
            reel.position = reel.position.round();
        }
        self.running = false;
        log::info!(
            "Spin finished at {:?}",
            self.scene.reels.iter().map(|r| r.position).collect::<Vec<_>>()
        );
    }

    /// Switch to new symbol sizing (viewport resize)
    pub fn relayout(&mut self, geometry: SlotGeometry) {
        if geometry == self.geometry {
            return;
        }
        for reel in &mut self.scene.reels {
            reel.relayout(&self.geometry, &geometry);
        }
        self.geometry = geometry;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::LeverState;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn machine(seed: u64) -> SlotMachine {
        SlotMachine::new(
            seed,
            Tuning::default(),
            SlotGeometry::new(100.0, 100.0, 256.0, 256.0),
        )
    }

    /// Tick at 60 fps from `from` until `to`, collecting events
    fn run(machine: &mut SlotMachine, from: f64, to: f64) -> Vec<MachineEvent> {
        let mut events = Vec::new();
        let mut now = from;
        while now < to {
            now = (now + FRAME_MS).min(to);
            events.extend(machine.tick(now));
        }
        events
    }

    #[test]
    fn test_start_play_schedules_staggered_reels() {
        let mut m = machine(42);
        let before: Vec<f64> = m.reels().iter().map(|r| r.position).collect();

        assert!(m.start_play(1.0, 1.0, 0.0));
        assert!(m.is_running());

        let snapshot = m.tweens().snapshot();
        assert_eq!(snapshot.len(), 3);
        for (i, tween) in snapshot.iter().enumerate() {
            assert_eq!(tween.key, AnimKey::ReelPosition(i));
            assert_eq!(tween.begin, before[i]);
            assert_eq!(tween.start, 0.0);

            // Recover the drawn extra from the duration
            let extra = (tween.duration_ms - 2500.0 - 600.0 * i as f64) / 600.0;
            assert!([0.0, 1.0, 2.0].contains(&extra), "extra was {extra}");
            let expected = (before[i] + 10.0 + 5.0 * i as f64 + extra).ceil();
            assert_eq!(tween.end, expected);
        }
    }

    #[test]
    fn test_spin_completes_on_integer_positions() {
        let mut m = machine(7);
        m.start_play(1.0, 1.0, 0.0);
        let targets: Vec<f64> = m.tweens().snapshot().iter().map(|t| t.end).collect();

        let events = run(&mut m, 0.0, 5000.0);
        assert!(!m.is_running());
        assert!(m.tweens().is_empty());
        for (reel, target) in m.reels().iter().zip(&targets) {
            assert_eq!(reel.position, *target);
            assert_eq!(reel.position.fract(), 0.0);
        }

        let stopped = events
            .iter()
            .filter(|e| matches!(e, MachineEvent::ReelStopped { .. }))
            .count();
        assert_eq!(stopped, 3);
        let finished: Vec<_> = events
            .iter()
            .filter(|e| **e == MachineEvent::SpinFinished)
            .collect();
        assert_eq!(finished.len(), 1);
        assert_eq!(events.last(), Some(&MachineEvent::SpinFinished));
    }

    #[test]
    fn test_spin_finishes_with_longest_reel_not_last_index() {
        let mut m = machine(6);
        m.start_play(1.0, 1.0, 0.0);
        let durations: Vec<f64> = m.tweens().snapshot().iter().map(|t| t.duration_ms).collect();
        assert_eq!(durations, vec![2500.0, 4300.0, 3700.0]);

        let mut order = Vec::new();
        let mut now = 0.0;
        while now < 6000.0 {
            now += FRAME_MS;
            for event in m.tick(now) {
                match event {
                    MachineEvent::ReelStopped { reel: 2 } => {
                        // Reel 1 is still travelling
                        assert!(m.is_running());
                        assert!(m.reels()[1].position.fract() != 0.0);
                    }
                    MachineEvent::SpinFinished => assert!(!m.is_running()),
                    _ => {}
                }
                if !matches!(event, MachineEvent::SpinStarted { .. }) {
                    order.push(event);
                }
            }
        }

        assert_eq!(
            order,
            vec![
                MachineEvent::ReelStopped { reel: 0 },
                MachineEvent::ReelStopped { reel: 2 },
                MachineEvent::ReelStopped { reel: 1 },
                MachineEvent::SpinFinished,
            ]
        );
    }

    #[test]
    fn test_start_play_while_running_is_noop() {
        let mut m = machine(3);
        m.start_play(1.0, 1.0, 0.0);
        run(&mut m, 0.0, 1000.0);
        let before = m.tweens().snapshot();

        assert!(!m.start_play(3.0, 4.0, 1000.0));
        assert_eq!(m.tweens().snapshot(), before);
        assert!(m.is_running());
    }

    #[test]
    fn test_second_spin_starts_from_previous_stop() {
        let mut m = machine(11);
        m.start_play(1.0, 1.0, 0.0);
        run(&mut m, 0.0, 5000.0);
        let stops: Vec<f64> = m.reels().iter().map(|r| r.position).collect();

        assert!(m.start_play(1.0, 1.0, 6000.0));
        for (tween, stop) in m.tweens().snapshot().iter().zip(&stops) {
            assert_eq!(tween.begin, *stop);
            assert!(tween.end >= stop + 10.0);
        }
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let mut a = machine(2024);
        let mut b = machine(2024);
        assert_eq!(a.reels()[1].slots, b.reels()[1].slots);

        a.start_play(1.0, 2.0, 0.0);
        b.start_play(1.0, 2.0, 0.0);
        assert_eq!(a.tweens().snapshot(), b.tweens().snapshot());

        run(&mut a, 0.0, 5000.0);
        run(&mut b, 0.0, 5000.0);
        for (ra, rb) in a.reels().iter().zip(b.reels()) {
            assert_eq!(ra.position, rb.position);
            assert_eq!(ra.slots, rb.slots);
        }
    }

    #[test]
    fn test_blur_while_spinning_and_clear_at_rest() {
        let mut m = machine(5);
        m.start_play(1.0, 1.0, 0.0);
        run(&mut m, 0.0, 500.0);
        assert!(m.reels().iter().all(|r| r.blur > 0.0));

        run(&mut m, 500.0, 5000.0);
        m.tick(5000.0 + FRAME_MS);
        assert!(m.reels().iter().all(|r| r.blur == 0.0));
    }

    #[test]
    fn test_slots_stay_in_band() {
        let mut m = machine(9);
        m.start_play(2.0, 3.0, 0.0);
        let mut now = 0.0;
        // Longest reel: (2500 + 1200 + 1200) * 2 ms
        while now < 10_000.0 {
            now += FRAME_MS;
            m.tick(now);
            for reel in m.reels() {
                for slot in &reel.slots {
                    assert!(slot.y >= -100.0 && slot.y < 300.0, "y out of band: {}", slot.y);
                    assert!(slot.symbol < 13);
                }
            }
        }
        assert!(!m.is_running());
    }

    #[test]
    fn test_lever_tap_cancels_without_spin() {
        let mut m = machine(1);
        assert!(m.lever_press(0.0));
        m.tick(100.0);

        let release = m.lever_release(300.0);
        assert!(matches!(release, Some(LeverRelease::Cancelled { .. })));
        assert!(!m.is_running());
        assert_eq!(m.lever().state, LeverState::Idle);

        let events = m.tick(310.0);
        assert!(matches!(
            events.as_slice(),
            [MachineEvent::LeverReleased(LeverRelease::Cancelled { .. })]
        ));

        // Snap-back lands exactly at rest
        m.tick(900.0);
        assert_eq!(m.lever().handle_y, 200.0);
    }

    #[test]
    fn test_lever_pull_spins_with_hold_strength() {
        let mut m = machine(8);
        let before: Vec<f64> = m.reels().iter().map(|r| r.position).collect();
        assert!(m.lever_press(0.0));
        run(&mut m, 0.0, 2000.0);
        assert_eq!(m.lever().handle_y, 20.0);

        let release = m.lever_release(2000.0);
        assert_eq!(
            release,
            Some(LeverRelease::Pull {
                hold: 2.0,
                duration: 2.0,
                speed_multiplier: 3.0
            })
        );
        assert!(m.is_running());
        assert_eq!(m.lever().state, LeverState::Returning);

        let reels: Vec<_> = m
            .tweens()
            .snapshot()
            .into_iter()
            .filter(|t| matches!(t.key, AnimKey::ReelPosition(_)))
            .collect();
        assert_eq!(reels.len(), 3);
        for (i, tween) in reels.iter().enumerate() {
            let extra = (tween.duration_ms / 2.0 - 2500.0 - 600.0 * i as f64) / 600.0;
            assert!([0.0, 1.0, 2.0].contains(&extra), "extra was {extra}");
            let expected = (before[i] + (10.0 + 5.0 * i as f64 + extra) * 3.0).ceil();
            assert_eq!(tween.end, expected);
        }

        // Lever frees up once the snap-back finishes, but stays locked out
        // until the spin is over
        run(&mut m, 2000.0, 2600.0);
        assert_eq!(m.lever().state, LeverState::Idle);
        assert!(!m.lever_press(2600.0));

        run(&mut m, 2600.0, 20000.0);
        assert!(!m.is_running());
        assert!(m.lever_press(20000.0));
    }

    #[test]
    fn test_stale_snap_does_not_free_returning_lever() {
        let mut tuning = Tuning::default();
        tuning.lever.snap_ms = 2000.0;
        let mut m = SlotMachine::new(3, tuning, SlotGeometry::new(100.0, 100.0, 256.0, 256.0));

        // Cancelled tap starts a long snap-back (200..2200)
        m.lever_press(0.0);
        m.lever_release(200.0);
        m.tick(250.0);

        // Re-grab mid-snap and pull (snap 1000..3000)
        assert!(m.lever_press(250.0));
        assert!(matches!(
            m.lever_release(1000.0),
            Some(LeverRelease::Pull { .. })
        ));

        run(&mut m, 1000.0, 2500.0);
        assert_eq!(m.lever().state, LeverState::Returning);

        run(&mut m, 2500.0, 3100.0);
        assert_eq!(m.lever().state, LeverState::Idle);
    }

    #[test]
    fn test_release_without_press_does_nothing() {
        let mut m = machine(1);
        assert_eq!(m.lever_release(1000.0), None);
        assert!(m.tweens().is_empty());
        assert!(m.tick(1000.0).is_empty());
    }

    #[test]
    fn test_stage_tap_spins_default_strength() {
        let mut m = machine(4);
        assert!(m.stage_tap(0.0));
        let events = m.tick(0.0);
        assert_eq!(
            events,
            vec![MachineEvent::SpinStarted {
                duration: 1.0,
                speed_multiplier: 1.0
            }]
        );
        assert!(!m.stage_tap(10.0));
    }

    #[test]
    fn test_zero_duration_spin_finishes_next_tick() {
        let mut m = machine(6);
        m.start_play(0.0, 1.0, 0.0);
        let events = m.tick(0.0);
        assert!(events.contains(&MachineEvent::SpinFinished));
        assert!(!m.is_running());
    }

    #[test]
    fn test_relayout_rescales_slots() {
        let mut m = machine(12);
        m.tick(0.0);
        let ys: Vec<f64> = m.reels()[0].slots.iter().map(|s| s.y).collect();

        m.relayout(SlotGeometry::new(150.0, 150.0, 256.0, 256.0));
        let scaled: Vec<f64> = m.reels()[0].slots.iter().map(|s| s.y).collect();
        for (a, b) in ys.iter().zip(&scaled) {
            assert!((a * 1.5 - b).abs() < 1e-9);
        }
        assert_eq!(m.geometry().symbol_size, 150.0);
    }
}
