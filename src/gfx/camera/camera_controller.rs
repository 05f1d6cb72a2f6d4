use cgmath::{InnerSpace, Vector2, Vector3, Zero};
use winit::{
    event::{DeviceEvent, ElementState, KeyEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::fly_camera::FlyCamera;

/// Maps keyboard and mouse-drag input onto a [`FlyCamera`].
///
/// Two logical modes: free look is active only while the right mouse
/// button is held, and mouse motion is ignored otherwise. Translation
/// from W/A/S/D applies in either mode. Mouse deltas accumulate
/// between frames and are consumed by [`update`](Self::update).
pub struct CameraController {
    pub move_speed: f32,
    pub look_sensitivity: f32,
    forward: bool,
    back: bool,
    left: bool,
    right: bool,
    free_look: bool,
    look_delta: (f32, f32),
}

impl CameraController {
    pub fn new(move_speed: f32, look_sensitivity: f32) -> Self {
        Self {
            move_speed,
            look_sensitivity,
            forward: false,
            back: false,
            left: false,
            right: false,
            free_look: false,
            look_delta: (0.0, 0.0),
        }
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        match event {
            DeviceEvent::Button {
                button: 1, // right mouse button
                state,
            } => {
                self.free_look = *state == ElementState::Pressed;
            }
            DeviceEvent::MouseMotion { delta } if self.free_look => {
                self.look_delta.0 += delta.0 as f32;
                self.look_delta.1 += delta.1 as f32;
            }
            _ => (),
        }
    }

    pub fn process_key_event(&mut self, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed;
        match event.physical_key {
            PhysicalKey::Code(KeyCode::KeyW) => self.forward = pressed,
            PhysicalKey::Code(KeyCode::KeyS) => self.back = pressed,
            PhysicalKey::Code(KeyCode::KeyA) => self.left = pressed,
            PhysicalKey::Code(KeyCode::KeyD) => self.right = pressed,
            _ => (),
        }
    }

    /// Movement intent in camera-local coordinates: x is strafe, y is
    /// forward. Normalized when its magnitude exceeds 1 so diagonal
    /// movement is never faster than axis movement.
    pub fn movement_intent(&self) -> Vector2<f32> {
        let mut intent = Vector2::new(0.0, 0.0);
        if self.forward {
            intent.y += 1.0;
        }
        if self.back {
            intent.y -= 1.0;
        }
        if self.left {
            intent.x += 1.0;
        }
        if self.right {
            intent.x -= 1.0;
        }
        if intent.magnitude2() > 1.0 {
            intent = intent.normalize();
        }
        intent
    }

    pub fn is_free_look(&self) -> bool {
        self.free_look
    }

    /// Consumes accumulated look deltas and held keys, moving the
    /// camera for this frame and refreshing its matrices.
    pub fn update(&mut self, camera: &mut FlyCamera, dt: f32) {
        let (dx, dy) = std::mem::take(&mut self.look_delta);
        if dx != 0.0 || dy != 0.0 {
            camera.add_yaw(dx * self.look_sensitivity);
            camera.add_pitch(-dy * self.look_sensitivity);
        }

        let intent = self.movement_intent();
        if !intent.is_zero() && dt > 0.0 {
            let local = Vector3::new(intent.x, 0.0, intent.y);
            camera.translate(camera.rotation() * local * self.move_speed * dt);
        }

        camera.update_view_proj();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Vector3;

    fn controller_with_keys(w: bool, s: bool, a: bool, d: bool) -> CameraController {
        let mut controller = CameraController::new(2.0, 0.005);
        controller.forward = w;
        controller.back = s;
        controller.left = a;
        controller.right = d;
        controller
    }

    #[test]
    fn intent_magnitude_never_exceeds_one() {
        for mask in 0u8..16 {
            let controller = controller_with_keys(
                mask & 1 != 0,
                mask & 2 != 0,
                mask & 4 != 0,
                mask & 8 != 0,
            );
            let intent = controller.movement_intent();
            assert!(
                intent.magnitude() <= 1.0 + 1e-6,
                "keys {mask:04b} gave |intent| = {}",
                intent.magnitude()
            );
        }
    }

    #[test]
    fn opposing_keys_cancel() {
        let controller = controller_with_keys(true, true, true, true);
        assert!(controller.movement_intent().is_zero());
    }

    #[test]
    fn zero_elapsed_time_does_not_move_camera() {
        let mut camera = FlyCamera::new(Vector3::new(0.0, 0.0, -1.0), 1.0);
        let mut controller = controller_with_keys(true, false, true, false);
        let before = camera.position;
        controller.update(&mut camera, 0.0);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn mouse_motion_is_ignored_without_free_look() {
        let mut camera = FlyCamera::new(Vector3::zero(), 1.0);
        let mut controller = CameraController::new(2.0, 0.005);
        controller.process_device_event(&DeviceEvent::MouseMotion {
            delta: (500.0, 500.0),
        });
        controller.update(&mut camera, 0.016);
        assert_eq!(camera.yaw, 0.0);
        assert_eq!(camera.pitch, 0.0);
    }

    #[test]
    fn pitch_stays_clamped_under_long_drags() {
        let mut camera = FlyCamera::new(Vector3::zero(), 1.0);
        let mut controller = CameraController::new(2.0, 0.005);
        controller.process_device_event(&DeviceEvent::Button {
            button: 1,
            state: ElementState::Pressed,
        });
        for _ in 0..100 {
            controller.process_device_event(&DeviceEvent::MouseMotion {
                delta: (37.0, -412.0),
            });
            controller.update(&mut camera, 0.016);
            assert!(camera.pitch.abs() <= super::super::fly_camera::MAX_PITCH);
        }
        assert_relative_eq!(camera.pitch, super::super::fly_camera::MAX_PITCH);
    }

    #[test]
    fn movement_follows_yaw() {
        let mut camera = FlyCamera::new(Vector3::zero(), 1.0);
        camera.add_yaw(std::f32::consts::FRAC_PI_2);
        let mut controller = controller_with_keys(true, false, false, false);
        controller.update(&mut camera, 1.0);
        // forward now points along +x
        assert_relative_eq!(camera.position.x, controller.move_speed, epsilon = 1e-4);
        assert_relative_eq!(camera.position.z, 0.0, epsilon = 1e-4);
    }
}
