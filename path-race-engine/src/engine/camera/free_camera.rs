use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;

use crate::engine::camera::rig::MainCamera;
use crate::engine::core::session::Session;
use crate::engine::scene::ground::GroundQuery;

const YAW_SENSITIVITY: f32 = 0.0035;
const PITCH_SENSITIVITY: f32 = 0.0030;
const PITCH_LIMIT: f32 = 1.55;
const DOLLY_STEP: f32 = 2.0;
const MOVE_SPEED: f32 = 20.0;
const FOLLOW_RATE: f32 = 12.0;

/// Fly camera state used while free cam is enabled.
#[derive(Resource, Debug, Clone)]
pub struct FreeCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// False until the controller has adopted the rig's last pose.
    engaged: bool,
}

impl Default for FreeCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 30.0, 60.0),
            yaw: 0.0,
            pitch: -0.6,
            engaged: false,
        }
    }
}

impl FreeCamera {
    /// Adopt an existing camera pose so toggling free cam does not jump.
    pub fn engage(&mut self, transform: &Transform) {
        let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
        self.position = transform.translation;
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.engaged = true;
    }

    pub fn release(&mut self) {
        self.engaged = false;
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn view_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    pub fn look(&mut self, mouse_delta: Vec2) {
        self.yaw -= mouse_delta.x * YAW_SENSITIVITY;
        self.pitch = (self.pitch - mouse_delta.y * PITCH_SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move by a local input vector: x right, y up, z back.
    pub fn fly(&mut self, input: Vec3, distance: f32) {
        let rotation = self.view_rotation();
        let delta = rotation * Vec3::X * input.x + Vec3::Y * input.y + rotation * Vec3::Z * input.z;
        self.position += delta.normalize_or_zero() * distance;
    }

    pub fn dolly(&mut self, amount: f32) {
        self.position += self.view_rotation() * Vec3::NEG_Z * amount * DOLLY_STEP;
    }
}

/// World point under the cursor on the ground surface.
pub fn cursor_to_ground(
    cursor: Vec2,
    camera: &Camera,
    camera_transform: &GlobalTransform,
    ground: &dyn GroundQuery,
    max_distance: f32,
) -> Option<Vec3> {
    let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
    ground.ray_hit(ray.origin, *ray.direction, max_distance)
}

/// Mouse look, scroll dolly and keyboard flight while free cam is on.
///
/// WASD flight is only available when no vehicle is being driven, since the
/// same keys steer the active vehicle.
pub fn free_camera_controller(
    session: Res<Session>,
    mut free_camera: ResMut<FreeCamera>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    time: Res<Time>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    let scroll: f32 = scroll_events
        .read()
        .map(|event| match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y * 0.05,
        })
        .sum();

    if !session.free_cam {
        if free_camera.is_engaged() {
            free_camera.release();
        }
        return;
    }

    let Ok(mut transform) = camera.single_mut() else {
        return;
    };

    if !free_camera.is_engaged() {
        free_camera.engage(&transform);
        info!("[CAM] Free camera engaged at {:?}", transform.translation);
    }

    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        free_camera.look(mouse_delta);
    }

    if scroll.abs() > f32::EPSILON {
        free_camera.dolly(scroll);
    }

    if session.active_vehicle.is_none() {
        let mut input = Vec3::ZERO;
        if keyboard.pressed(KeyCode::KeyW) {
            input.z -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyS) {
            input.z += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) {
            input.x += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyA) {
            input.x -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyE) {
            input.y += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyQ) {
            input.y -= 1.0;
        }

        if input != Vec3::ZERO {
            let mut speed = MOVE_SPEED;
            if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
                speed *= 3.5;
            }
            free_camera.fly(input, speed * time.delta_secs());
        }
    }

    let blend = (FOLLOW_RATE * time.delta_secs()).min(1.0);
    transform.translation = transform.translation.lerp(free_camera.position, blend);
    transform.rotation = transform.rotation.slerp(free_camera.view_rotation(), blend);
}
