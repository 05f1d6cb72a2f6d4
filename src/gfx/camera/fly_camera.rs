use cgmath::*;

use super::camera_utils::{matrix_to_array, Camera, CameraUniform};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Pitch limit in radians. Yaw-about-up composed with a pitch at
/// exactly ±90° would leave the forward axis parallel to world-up and
/// break the look-at basis, so pitch is clamped just inside the poles.
pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 1e-3;

/// First-person free-look camera.
///
/// Orientation is pitch/yaw collapsed into a quaternion: a yaw
/// rotation about world-up composed with a pitch rotation about the
/// local right axis. Nothing is persisted; position and orientation
/// reset to their defaults on every run.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for FlyCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        let target = eye + self.forward();
        let view = Matrix4::look_at_rh(eye, target, Vector3::unit_y());
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl FlyCamera {
    pub fn new(position: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            aspect,
            fovy: Deg(70.0).into(),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
        };
        camera.update_view_proj();
        camera
    }

    pub fn rotation(&self) -> Quaternion<f32> {
        Quaternion::from_angle_y(Rad(self.yaw)) * Quaternion::from_angle_x(Rad(self.pitch))
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.rotation() * Vector3::unit_z()
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.yaw += delta;
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.pitch = (self.pitch + delta).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Distance from the world origin, used for point size falloff.
    pub fn distance_to_origin(&self) -> f32 {
        self.position.magnitude()
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position =
            [self.position.x, self.position.y, self.position.z, 1.0];
        self.uniform.view_proj = matrix_to_array(self.build_view_projection_matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pitch_is_clamped_to_vertical() {
        let mut camera = FlyCamera::new(Vector3::zero(), 1.0);
        camera.add_pitch(10.0);
        assert_relative_eq!(camera.pitch, MAX_PITCH);
        camera.add_pitch(-25.0);
        assert_relative_eq!(camera.pitch, -MAX_PITCH);
    }

    #[test]
    fn default_forward_is_positive_z() {
        let camera = FlyCamera::new(Vector3::zero(), 1.0);
        let forward = camera.forward();
        assert_relative_eq!(forward.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(forward.z, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn yaw_rotates_forward_about_up() {
        let mut camera = FlyCamera::new(Vector3::zero(), 1.0);
        camera.add_yaw(std::f32::consts::FRAC_PI_2);
        let forward = camera.forward();
        assert_relative_eq!(forward.x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(forward.z, 0.0, epsilon = 1e-6);
    }
}
