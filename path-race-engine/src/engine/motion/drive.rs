use bevy::prelude::*;
use constants::drive::{
    DRIVE_WHEEL_SPIN_FACTOR, MOTION_EPSILON, REVERSE_ACCELERATION_RATIO, REVERSE_SPEED_RATIO,
    STEER_SMOOTHING, STOP_SPEED_THRESHOLD,
};
use constants::race::WHEEL_STEER_FACTOR;

use crate::engine::core::config::DriveConfig;
use crate::engine::core::frame::frame_delta;
use crate::engine::core::session::Session;
use crate::engine::motion::race::under_race_control;
use crate::engine::motion::wheels::{WheelPart, WheelRig};
use crate::engine::scene::vehicles::Vehicle;
use crate::tools::path_library::PathLibrary;

/// Held drive keys. Level-triggered: set while a key is down.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveInput {
    pub forward: bool,
    pub reverse: bool,
    pub left: bool,
    pub right: bool,
}

impl DriveInput {
    /// Steering target: left is +1, right is -1 and wins when both are held.
    pub fn steer_target(&self) -> f32 {
        if self.right {
            -1.0
        } else if self.left {
            1.0
        } else {
            0.0
        }
    }
}

/// Integrate speed and steering, then move along local -Z.
pub fn step_drive(
    transform: &mut Transform,
    speed: &mut f32,
    steer: &mut f32,
    input: &DriveInput,
    config: &DriveConfig,
    dt: f32,
) {
    if input.forward {
        *speed = (*speed + config.acceleration * dt).min(config.max_speed);
    } else if input.reverse {
        *speed = (*speed - REVERSE_ACCELERATION_RATIO * config.acceleration * dt)
            .max(-REVERSE_SPEED_RATIO * config.max_speed);
    } else {
        *speed *= config.friction;
        if speed.abs() < STOP_SPEED_THRESHOLD {
            *speed = 0.0;
        }
    }

    *steer += (input.steer_target() - *steer) * STEER_SMOOTHING;

    if speed.abs() > MOTION_EPSILON {
        let forward = transform.forward();
        transform.translation += forward * *speed * dt;
        transform.rotate_y(*steer * config.steer_speed * dt * speed.signum());
    }
}

pub fn drive_system(
    time: Res<Time>,
    config: Res<DriveConfig>,
    input: Res<DriveInput>,
    session: Res<Session>,
    library: Res<PathLibrary>,
    mut vehicles: Query<(&mut Transform, &mut Vehicle, Option<&WheelRig>)>,
    mut wheel_parts: Query<&mut Transform, (With<WheelPart>, Without<Vehicle>)>,
) {
    let Some(active) = session.active_vehicle else {
        return;
    };
    if under_race_control(&session, &library, active) {
        return;
    }

    let dt = frame_delta(&time);
    let Some((mut transform, mut vehicle, rig)) = vehicles
        .iter_mut()
        .find(|(_, vehicle, _)| vehicle.slot == active)
    else {
        return;
    };

    let Vehicle { speed, steer, .. } = &mut *vehicle;
    step_drive(&mut transform, speed, steer, &input, &config, dt);

    if let Some(rig) = rig {
        rig.apply(
            vehicle.speed * DRIVE_WHEEL_SPIN_FACTOR * dt,
            vehicle.steer * WHEEL_STEER_FACTOR,
            &mut wheel_parts,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(input: DriveInput, frames: usize, speed: &mut f32, steer: &mut f32) -> Transform {
        let mut transform = Transform::default();
        let config = DriveConfig::default();
        for _ in 0..frames {
            step_drive(&mut transform, speed, steer, &input, &config, 0.1);
        }
        transform
    }

    #[test]
    fn forward_moves_along_negative_z() {
        let (mut speed, mut steer) = (0.0, 0.0);
        let input = DriveInput {
            forward: true,
            ..default()
        };
        let transform = drive(input, 10, &mut speed, &mut steer);
        assert!((speed - 0.5).abs() < 1e-4);
        assert!(transform.translation.z < 0.0);
        assert!(transform.translation.x.abs() < 1e-5);
    }

    #[test]
    fn reverse_is_capped_at_half_top_speed() {
        let config = DriveConfig::default();
        let (mut speed, mut steer) = (0.0, 0.0);
        let input = DriveInput {
            reverse: true,
            ..default()
        };
        drive(input, 1000, &mut speed, &mut steer);
        assert_eq!(speed, -0.5 * config.max_speed);
    }

    #[test]
    fn forward_is_capped_at_top_speed() {
        let config = DriveConfig::default();
        let (mut speed, mut steer) = (34.99, 0.0);
        let input = DriveInput {
            forward: true,
            ..default()
        };
        drive(input, 5, &mut speed, &mut steer);
        assert_eq!(speed, config.max_speed);
    }

    #[test]
    fn coasting_snaps_to_rest() {
        let (mut speed, mut steer) = (0.0101, 0.0);
        let transform = drive(DriveInput::default(), 1, &mut speed, &mut steer);
        assert_eq!(speed, 0.0);
        assert_eq!(transform, Transform::default());

        let (mut speed, mut steer) = (10.0, 0.0);
        drive(DriveInput::default(), 1, &mut speed, &mut steer);
        assert!((speed - 9.8).abs() < 1e-4);
    }

    #[test]
    fn right_wins_and_steering_is_smoothed() {
        let both = DriveInput {
            left: true,
            right: true,
            ..default()
        };
        assert_eq!(both.steer_target(), -1.0);

        let (mut speed, mut steer) = (0.0, 0.0);
        drive(both, 1, &mut speed, &mut steer);
        assert!((steer + 0.1).abs() < 1e-6);
    }

    #[test]
    fn steering_turns_opposite_when_reversing() {
        let left_forward = DriveInput {
            forward: true,
            left: true,
            ..default()
        };
        let left_reverse = DriveInput {
            reverse: true,
            left: true,
            ..default()
        };

        let (mut speed, mut steer) = (5.0, 1.0);
        let forward = drive(left_forward, 1, &mut speed, &mut steer);
        let (mut speed, mut steer) = (-5.0, 1.0);
        let reverse = drive(left_reverse, 1, &mut speed, &mut steer);

        let forward_yaw = forward.rotation.to_euler(EulerRot::YXZ).0;
        let reverse_yaw = reverse.rotation.to_euler(EulerRot::YXZ).0;
        assert!(forward_yaw > 0.0);
        assert!(reverse_yaw < 0.0);
    }
}
