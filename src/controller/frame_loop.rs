//! Per-frame driver for the navigation subsystem.
//!
//! The host scheduler (winit redraw natively, requestAnimationFrame on wasm)
//! calls [`NavigationLoop::advance`] once per display refresh. The loop owns
//! all mutable navigation state, so nothing ambient is shared; tests drive it
//! frame by frame with synthetic timestamps and a cancellation flag instead
//! of a live display.

use std::cell::Cell;
use std::rc::Rc;

use crate::controller::collision::CollisionDetector;
use crate::controller::input::InputState;
use crate::controller::movement::MovementIntegrator;
use crate::model::Camera;

/// Upper bound on a single frame delta, in seconds. A stall (tab hidden,
/// debugger pause) must not turn into one giant teleporting step.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Tracks elapsed time between host ticks. Timestamps are milliseconds from
/// any monotonic-enough source (Instant natively, performance.now() on wasm).
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Seconds since the previous tick, clamped to `[0, MAX_FRAME_DELTA]`.
    /// The first tick reports zero.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let delta = match self.last_ms {
            Some(prev) => (((now_ms - prev) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DELTA),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        delta
    }
}

/// Cooperative cancellation for [`NavigationLoop::run`]. Clonable so the
/// driving side and the stopping side can hold it independently.
#[derive(Clone, Default)]
pub struct CancelFlag(Rc<Cell<bool>>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

/// Owns the camera, input state and collision detector, and advances them
/// exactly once per frame.
pub struct NavigationLoop {
    pub camera: Camera,
    pub input: InputState,
    pub detector: CollisionDetector,
    integrator: MovementIntegrator,
    clock: FrameClock,
}

impl NavigationLoop {
    pub fn new(camera: Camera, input: InputState, detector: CollisionDetector) -> Self {
        Self {
            camera,
            input,
            detector,
            integrator: MovementIntegrator::new(),
            clock: FrameClock::new(),
        }
    }

    /// One host tick: derive the frame delta and step the simulation.
    pub fn advance(&mut self, now_ms: f64) {
        let delta = self.clock.tick(now_ms);
        self.step(delta);
    }

    /// One simulation step with an explicit delta. Input changes are observed
    /// here and nowhere else, so they take effect at frame granularity.
    /// Both look and translation are gated on pointer lock: while the menu is
    /// up the player neither turns nor walks.
    pub fn step(&mut self, delta: f32) {
        let (dx, dy) = self.input.consume_look();
        if self.input.pointer_lock.is_locked() {
            self.integrator.apply_look(&mut self.camera, dx, dy);
            self.integrator.update(&mut self.camera, &self.input, &self.detector, delta);
        }
    }

    /// Drive the loop over a stream of timestamps until it ends or the flag
    /// is cancelled. The renderer-facing paths feed `advance` directly; this
    /// exists so the subsystem can be run headless.
    pub fn run(&mut self, timestamps_ms: impl IntoIterator<Item = f64>, cancel: &CancelFlag) {
        for now_ms in timestamps_ms {
            if cancel.is_cancelled() {
                break;
            }
            self.advance(now_ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;
    use crate::model::{RoomDescription, StaticColliderSet};
    use glam::Vec3;

    fn gallery_loop() -> NavigationLoop {
        let room = RoomDescription::gallery();
        let mut camera = Camera::new(800, 600);
        camera.eye = room.spawn_vec();
        let detector = CollisionDetector::new(StaticColliderSet::build(&room));
        NavigationLoop::new(camera, InputState::new(), detector)
    }

    fn lock(nav: &mut NavigationLoop) {
        nav.input.process_event(&InputEvent::PointerLockChanged { locked: true });
    }

    fn press(nav: &mut NavigationLoop, key: &str) {
        nav.input.process_event(&InputEvent::KeyDown(key.to_string()));
    }

    #[test]
    fn test_clock_first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(1234.5), 0.0);
        assert!((clock.tick(1250.5) - 0.016).abs() < 1e-6);
    }

    #[test]
    fn test_clock_clamps_stalls_and_backward_time() {
        let mut clock = FrameClock::new();
        clock.tick(0.0);
        assert_eq!(clock.tick(5000.0), MAX_FRAME_DELTA, "long stall is clamped");
        assert_eq!(clock.tick(4000.0), 0.0, "backward timestamps never yield negative deltas");
    }

    #[test]
    fn test_movement_is_gated_on_pointer_lock() {
        let mut nav = gallery_loop();
        let start = nav.camera.eye;
        press(&mut nav, "w");

        nav.advance(0.0);
        nav.advance(16.0);
        assert_eq!(nav.camera.eye, start, "menu is up, player stands still");

        lock(&mut nav);
        nav.advance(32.0);
        assert!(nav.camera.eye.z < start.z, "locked player walks forward");
    }

    #[test]
    fn test_walkthrough_stops_at_front_wall() {
        let mut nav = gallery_loop();
        lock(&mut nav);
        press(&mut nav, "w");

        // Walk toward the front wall for far longer than the room is deep
        let mut now = 0.0;
        for _ in 0..2000 {
            nav.advance(now);
            now += 16.0;
        }

        let z = nav.camera.eye.z;
        assert!(z <= -19.0, "player reached the wall, got z={z}");
        assert!(z > -20.0, "player never passed through the wall, got z={z}");
        assert!(!nav.detector.intersects(nav.camera.eye));
    }

    #[test]
    fn test_run_honors_cancellation() {
        let mut nav = gallery_loop();
        lock(&mut nav);
        press(&mut nav, "w");

        let cancel = CancelFlag::new();
        cancel.cancel();
        let start = nav.camera.eye;
        nav.run((0..100).map(|i| i as f64 * 16.0), &cancel);
        assert_eq!(nav.camera.eye, start, "a cancelled loop performs no frames");

        let cancel = CancelFlag::new();
        nav.run((0..100).map(|i| i as f64 * 16.0), &cancel);
        assert!(nav.camera.eye != start, "an uncancelled loop advances");
    }

    #[test]
    fn test_look_delta_is_consumed_at_frame_start() {
        let mut nav = gallery_loop();
        lock(&mut nav);
        let yaw_before = nav.camera.yaw;

        nav.input.process_event(&InputEvent::MouseMove { dx: 100.0, dy: 0.0 });
        nav.advance(0.0);
        let yaw_after_first = nav.camera.yaw;
        assert!(yaw_after_first > yaw_before, "queued look delta applied on the next frame");

        nav.advance(16.0);
        assert_eq!(nav.camera.yaw, yaw_after_first, "delta is not applied twice");
    }

    #[test]
    fn test_unlock_freezes_player_even_with_keys_held() {
        let mut nav = gallery_loop();
        lock(&mut nav);
        press(&mut nav, "w");
        nav.advance(0.0);
        nav.advance(16.0);

        nav.input.process_event(&InputEvent::PointerLockChanged { locked: false });
        let frozen = nav.camera.eye;
        nav.advance(32.0);
        nav.advance(48.0);
        assert_eq!(nav.camera.eye, frozen);
    }
}
