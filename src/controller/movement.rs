//! Turns logical input plus elapsed time into camera motion.

use glam::Vec3;

use crate::controller::collision::CollisionDetector;
use crate::controller::input::{Direction, InputState};
use crate::model::Camera;

/// World units per second, before scaling by the frame delta.
pub const BASE_SPEED: f32 = 5.0;

/// Integrates camera-relative movement with collision rejection.
pub struct MovementIntegrator {
    pub base_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for MovementIntegrator {
    fn default() -> Self {
        Self::new()
    }
}

impl MovementIntegrator {
    pub fn new() -> Self {
        Self { base_speed: BASE_SPEED, mouse_sensitivity: 0.002 }
    }

    /// Mouse look. Rotation alone cannot collide, so this is never gated on
    /// the collision detector.
    pub fn apply_look(&self, camera: &mut Camera, dx: f32, dy: f32) {
        camera.yaw += dx * self.mouse_sensitivity;
        let pi_half = std::f32::consts::PI / 2.0;
        camera.pitch = (camera.pitch - dy * self.mouse_sensitivity).clamp(-pi_half, pi_half);
    }

    /// One movement step. The combined displacement for the frame is applied
    /// tentatively; if the resulting player box overlaps any wall the whole
    /// step is reverted. No partial acceptance and no sliding: a diagonal
    /// move blocked on one axis is rejected entirely, so corner approaches
    /// stop the player.
    pub fn update(
        &self,
        camera: &mut Camera,
        input: &InputState,
        detector: &CollisionDetector,
        delta: f32,
    ) {
        let move_speed = self.base_speed * delta;
        let previous = camera.eye;

        let forward = camera.forward_flat();
        let right = camera.right_flat();

        let mut displacement = Vec3::ZERO;
        if input.is_pressed(Direction::Forward) {
            displacement += forward * move_speed;
        }
        if input.is_pressed(Direction::Back) {
            displacement -= forward * move_speed;
        }
        if input.is_pressed(Direction::StrafeRight) {
            displacement += right * move_speed;
        }
        if input.is_pressed(Direction::StrafeLeft) {
            displacement -= right * move_speed;
        }

        camera.eye += displacement;
        if detector.intersects(camera.eye) {
            camera.eye = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;
    use crate::model::{Aabb, StaticColliderSet};

    fn camera_facing_neg_z(eye: Vec3) -> Camera {
        let mut cam = Camera::new(800, 600);
        cam.eye = eye;
        cam.yaw = -std::f32::consts::FRAC_PI_2;
        cam
    }

    fn front_wall_detector() -> CollisionDetector {
        let wall = Aabb::new(
            Vec3::new(-42.5, -10.0, -20.0005),
            Vec3::new(42.5, 10.0, -19.9995),
        );
        CollisionDetector::new(StaticColliderSet::from_boxes(vec![wall]))
    }

    fn empty_detector() -> CollisionDetector {
        CollisionDetector::new(StaticColliderSet::from_boxes(Vec::new()))
    }

    fn pressing(keys: &[&str]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.process_event(&InputEvent::KeyDown(key.to_string()));
        }
        input
    }

    #[test]
    fn test_blocked_forward_move_is_fully_rejected() {
        // Scenario A: (0,3,-19) attempting to reach (0,3,-19.6)
        let mut cam = camera_facing_neg_z(Vec3::new(0.0, 3.0, -19.0));
        let input = pressing(&["w"]);
        let detector = front_wall_detector();

        MovementIntegrator::new().update(&mut cam, &input, &detector, 0.12);
        assert_eq!(cam.eye, Vec3::new(0.0, 3.0, -19.0), "camera reverts to its pre-update position");
    }

    #[test]
    fn test_clear_forward_move_commits() {
        // Scenario B: (0,3,-15) to (0,3,-14.5), away from the wall
        let mut cam = camera_facing_neg_z(Vec3::new(0.0, 3.0, -15.0));
        let input = pressing(&["s"]);
        let detector = front_wall_detector();

        MovementIntegrator::new().update(&mut cam, &input, &detector, 0.1);
        assert!((cam.eye.z - -14.5).abs() < 1e-4, "got {}", cam.eye.z);
        assert!(cam.eye.x.abs() < 1e-4);
        assert!(!detector.intersects(cam.eye));
    }

    #[test]
    fn test_zero_delta_means_no_motion() {
        let mut cam = camera_facing_neg_z(Vec3::new(0.0, 3.0, -15.0));
        let input = pressing(&["w", "a", "s", "d"]);
        MovementIntegrator::new().update(&mut cam, &input, &empty_detector(), 0.0);
        assert_eq!(cam.eye, Vec3::new(0.0, 3.0, -15.0));
    }

    #[test]
    fn test_displacement_grows_monotonically_with_delta() {
        let integrator = MovementIntegrator::new();
        let detector = empty_detector();
        let input = pressing(&["w"]);

        let mut last = 0.0f32;
        for delta in [0.0, 0.004, 0.016, 0.033, 0.1, 0.5] {
            let start = Vec3::new(0.0, 3.0, 0.0);
            let mut cam = camera_facing_neg_z(start);
            integrator.update(&mut cam, &input, &detector, delta);
            let moved = (cam.eye - start).length();
            assert!(moved >= last, "displacement may not shrink as delta grows");
            last = moved;
        }
    }

    #[test]
    fn test_diagonal_input_combines_axes() {
        let mut cam = camera_facing_neg_z(Vec3::new(0.0, 3.0, 0.0));
        let input = pressing(&["w", "d"]);
        MovementIntegrator::new().update(&mut cam, &input, &empty_detector(), 0.1);

        // facing -Z: forward is -Z, strafe-right is +X
        assert!(cam.eye.z < -0.4, "forward component applied");
        assert!(cam.eye.x > 0.4, "strafe component applied");
    }

    #[test]
    fn test_blocked_diagonal_rejects_both_axes() {
        // Hugging the front wall, moving diagonally into it. The X component
        // alone would be clear, but the frame is discarded as a whole.
        let mut cam = camera_facing_neg_z(Vec3::new(0.0, 3.0, -19.45));
        let input = pressing(&["w", "d"]);
        let detector = front_wall_detector();

        MovementIntegrator::new().update(&mut cam, &input, &detector, 0.1);
        assert_eq!(cam.eye, Vec3::new(0.0, 3.0, -19.45), "no sliding along the wall");
    }

    #[test]
    fn test_opposed_keys_cancel_out() {
        let mut cam = camera_facing_neg_z(Vec3::new(0.0, 3.0, -5.0));
        let input = pressing(&["w", "s"]);
        MovementIntegrator::new().update(&mut cam, &input, &empty_detector(), 0.1);
        assert!((cam.eye - Vec3::new(0.0, 3.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn test_movement_follows_camera_yaw() {
        // Facing +X instead: forward must move along +X
        let mut cam = Camera::new(800, 600);
        cam.eye = Vec3::new(0.0, 3.0, 0.0);
        cam.yaw = 0.0;
        let input = pressing(&["w"]);
        MovementIntegrator::new().update(&mut cam, &input, &empty_detector(), 0.1);
        assert!(cam.eye.x > 0.4);
        assert!(cam.eye.z.abs() < 1e-4);
    }

    #[test]
    fn test_look_clamps_pitch() {
        let mut cam = Camera::new(800, 600);
        let integrator = MovementIntegrator::new();
        integrator.apply_look(&mut cam, 0.0, -1e6);
        assert!(cam.pitch <= std::f32::consts::FRAC_PI_2 + 1e-6);
        integrator.apply_look(&mut cam, 0.0, 1e6);
        assert!(cam.pitch >= -std::f32::consts::FRAC_PI_2 - 1e-6);
    }
}
