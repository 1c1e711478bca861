//! Runtime tuning resources seeded from the `constants` crate.

use std::path::PathBuf;

use bevy::prelude::*;
use constants::{camera::*, drive::*, path::*, physics::*, race::*};
use serde::{Deserialize, Serialize};

#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub acceleration: f32,
    pub max_speed: f32,
    /// Race seconds per elapsed second.
    pub clock_rate: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            acceleration: RACE_ACCELERATION,
            max_speed: RACE_MAX_SPEED,
            clock_rate: RACE_CLOCK_RATE,
        }
    }
}

impl RaceConfig {
    /// Apply the provided fields, ignoring negative values.
    pub fn apply(&mut self, update: RaceConfigUpdate) {
        if let Some(acceleration) = update.acceleration.filter(|v| *v >= 0.0) {
            self.acceleration = acceleration;
        }
        if let Some(max_speed) = update.max_speed.filter(|v| *v >= 0.0) {
            self.max_speed = max_speed;
        }
        if let Some(clock_rate) = update.clock_rate.filter(|v| *v >= 0.0) {
            self.clock_rate = clock_rate;
        }
    }
}

/// Partial race settings change coming from the settings sliders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceConfigUpdate {
    pub acceleration: Option<f32>,
    pub max_speed: Option<f32>,
    pub clock_rate: Option<f32>,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DriveConfig {
    pub acceleration: f32,
    pub max_speed: f32,
    pub steer_speed: f32,
    pub friction: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            acceleration: DRIVE_ACCELERATION,
            max_speed: DRIVE_MAX_SPEED,
            steer_speed: DRIVE_STEER_SPEED,
            friction: DRIVE_FRICTION,
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub probe_lift: f32,
    pub contact_tolerance: f32,
    pub world_floor: f32,
    pub respawn_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            probe_lift: GROUND_PROBE_LIFT,
            contact_tolerance: GROUND_CONTACT_TOLERANCE,
            world_floor: WORLD_FLOOR,
            respawn_height: RESPAWN_HEIGHT,
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub chase_distance: f32,
    pub chase_height: f32,
    pub chase_smoothing: f32,
    pub floor_clearance: f32,
    pub floor_probe_lift: f32,
    pub angle_deadband: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            chase_distance: CHASE_DISTANCE,
            chase_height: CHASE_HEIGHT,
            chase_smoothing: CHASE_SMOOTHING,
            floor_clearance: CAMERA_FLOOR_CLEARANCE,
            floor_probe_lift: CAMERA_FLOOR_PROBE_LIFT,
            angle_deadband: KEYFRAME_ANGLE_DEADBAND,
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    pub auto_close_epsilon: f32,
    pub drag_snap_distance: f32,
    pub waypoint_lift: f32,
    pub drag_probe_lift: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            auto_close_epsilon: AUTO_CLOSE_EPSILON,
            drag_snap_distance: DRAG_SNAP_DISTANCE,
            waypoint_lift: WAYPOINT_LIFT,
            drag_probe_lift: DRAG_PROBE_LIFT,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ExportConfig {
    /// Native builds write exported documents here.
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("exports"),
        }
    }
}
