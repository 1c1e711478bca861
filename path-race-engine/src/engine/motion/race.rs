//! Distance-parameterised race along an assigned curve.
//!
//! Each frame the vehicle accelerates towards the configured top speed, moves
//! along the curve by arc length, and yaws into a drift proportional to how
//! sharply the curve turns just ahead of it.

use std::f32::consts::PI;

use bevy::prelude::*;
use constants::race::{
    DRIFT_GAIN, DRIFT_LOOKAHEAD, DRIFT_LOOKAHEAD_LIMIT, DRIFT_SMOOTHING, MAX_DRIFT_ANGLE,
    RACE_WHEEL_SPIN_FACTOR, START_FACING_OFFSET, WHEEL_STEER_FACTOR,
};

use crate::engine::core::config::RaceConfig;
use crate::engine::core::errors::RaceError;
use crate::engine::core::frame::frame_delta;
use crate::engine::core::session::{Session, VehicleSlot};
use crate::engine::curve::Curve;
use crate::engine::motion::wheels::{WheelPart, WheelRig};
use crate::engine::scene::vehicles::Vehicle;
use crate::tools::path_library::PathLibrary;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RaceState {
    /// Arc length travelled since the start, never reset by lapping.
    pub distance: f32,
    pub speed: f32,
    /// Current oversteer angle in radians.
    pub current_drift: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RacePose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl RaceState {
    /// Advance by `dt` seconds along `curve` and return the resulting pose.
    pub fn advance(&mut self, curve: &Curve, config: &RaceConfig, dt: f32) -> RacePose {
        self.speed = (self.speed + config.acceleration * dt)
            .min(config.max_speed)
            .max(0.0);
        self.distance += self.speed * dt;

        let length = curve.length();
        let t = if length > f32::EPSILON {
            (self.distance / length).rem_euclid(1.0)
        } else {
            0.0
        };

        let position = curve.point_at(t);
        let tangent = curve.tangent_at(t);
        let ahead = curve.tangent_at((t + DRIFT_LOOKAHEAD).min(DRIFT_LOOKAHEAD_LIMIT));

        let target_drift = drift_target(tangent, ahead);
        self.current_drift += (target_drift - self.current_drift) * (DRIFT_SMOOTHING * dt).min(1.0);

        RacePose {
            position,
            rotation: race_heading(tangent, self.current_drift),
        }
    }
}

/// Oversteer angle for the turn between two unit tangents.
pub fn drift_target(tangent: Vec3, ahead: Vec3) -> f32 {
    let turn = tangent.x * ahead.z - tangent.z * ahead.x;
    (turn * DRIFT_GAIN).clamp(-MAX_DRIFT_ANGLE, MAX_DRIFT_ANGLE)
}

/// Pure yaw that points the vehicle's -Z axis along `tangent`, offset by `drift`.
pub fn race_heading(tangent: Vec3, drift: f32) -> Quat {
    let heading = tangent.x.atan2(tangent.z) + PI;
    Quat::from_rotation_y(heading - drift)
}

/// Pose at the start of a curve, facing slightly down the path.
pub fn start_pose(curve: &Curve) -> Transform {
    let start = curve.point_at(0.0);
    Transform::from_translation(start).looking_at(curve.point_at(START_FACING_OFFSET), Vec3::Y)
}

/// True when the slot's vehicle is being moved by the race solver.
pub fn under_race_control(session: &Session, library: &PathLibrary, slot: VehicleSlot) -> bool {
    session.racing && library.assignment(slot).is_some()
}

/// Begin a race for every assigned slot.
pub fn start_race(session: &mut Session, library: &mut PathLibrary) -> Result<(), RaceError> {
    let mut assigned = 0;
    for slot in VehicleSlot::ALL {
        if let Some(assignment) = library.assignment_mut(slot) {
            assignment.race_state = Some(RaceState::default());
            assigned += 1;
        }
    }

    if assigned == 0 {
        return Err(RaceError::NothingAssigned);
    }

    session.racing = true;
    session.race_time = 0.0;
    Ok(())
}

/// Stop the race and return each assigned slot's start pose.
pub fn reset_race(session: &mut Session, library: &mut PathLibrary) -> Vec<(VehicleSlot, Transform)> {
    session.racing = false;
    session.race_time = 0.0;

    VehicleSlot::ALL
        .into_iter()
        .filter_map(|slot| {
            let assignment = library.assignment_mut(slot)?;
            assignment.race_state = None;
            Some((slot, start_pose(&assignment.curve)))
        })
        .collect()
}

pub fn race_motion_system(
    time: Res<Time>,
    config: Res<RaceConfig>,
    mut session: ResMut<Session>,
    mut library: ResMut<PathLibrary>,
    mut vehicles: Query<(&mut Transform, &mut Vehicle, Option<&WheelRig>)>,
    mut wheel_parts: Query<&mut Transform, (With<WheelPart>, Without<Vehicle>)>,
) {
    if !session.racing {
        return;
    }

    let dt = frame_delta(&time);
    session.race_time += dt * config.clock_rate;

    for (mut transform, mut vehicle, rig) in &mut vehicles {
        let Some(assignment) = library.assignment_mut(vehicle.slot) else {
            continue;
        };
        let Some(state) = assignment.race_state.as_mut() else {
            continue;
        };

        let pose = state.advance(&assignment.curve, &config, dt);
        transform.translation = pose.position;
        transform.rotation = pose.rotation;
        vehicle.velocity = Vec3::ZERO;

        if let Some(rig) = rig {
            rig.apply(
                state.speed * RACE_WHEEL_SPIN_FACTOR * dt,
                state.current_drift * WHEEL_STEER_FACTOR,
                &mut wheel_parts,
            );
        }
    }
}
