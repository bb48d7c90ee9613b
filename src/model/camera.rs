use glam::{Mat4, Vec3};

/// First-person camera. Doubles as the player body: there is no separate
/// player entity, collision is tested against a box centered on `eye`.
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, 0.0),
            // facing -Z, toward the front wall
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            aspect: width as f32 / height as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-1.5533, 1.5533); // Slightly less than π/2 to avoid gimbal lock
        Vec3::new(cy.cos() * cp.cos(), cp.sin(), cy.sin() * cp.cos()).normalize()
    }

    /// Movement basis: look direction projected into the horizontal plane.
    /// Walking stays level no matter how far up or down the player looks.
    pub fn forward_flat(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    pub fn right_flat(&self) -> Vec3 {
        self.forward_flat().cross(self.up).normalize()
    }

    pub fn target(&self) -> Vec3 {
        self.eye + self.forward()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye, self.target(), self.up);
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_basis_ignores_pitch() {
        let mut cam = Camera::new(800, 600);
        cam.pitch = 1.2;

        let fwd = cam.forward_flat();
        assert!(fwd.y.abs() < 1e-6, "flat forward must stay horizontal");
        assert!((fwd.length() - 1.0).abs() < 1e-5, "flat forward must be unit length");

        let right = cam.right_flat();
        assert!(right.y.abs() < 1e-6, "flat right must stay horizontal");
        assert!(fwd.dot(right).abs() < 1e-5, "basis vectors must be orthogonal");
    }

    #[test]
    fn test_default_camera_faces_front_wall() {
        let cam = Camera::new(800, 600);
        let fwd = cam.forward_flat();
        assert!(fwd.z < -0.99, "spawn orientation looks toward -Z");
    }
}
