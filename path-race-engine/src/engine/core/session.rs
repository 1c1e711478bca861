use bevy::prelude::*;
use constants::camera::DEFAULT_CHASE_NAME;
use serde::{Deserialize, Serialize};

use crate::tools::camera_recorder::CameraRecorder;

/// One of the two fixed vehicle slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleSlot {
    Primary,
    Secondary,
}

impl VehicleSlot {
    pub const ALL: [Self; 2] = [Self::Primary, Self::Secondary];

    pub fn index(self) -> usize {
        match self {
            Self::Primary => 0,
            Self::Secondary => 1,
        }
    }

    /// Convert a numeric slot identifier for RPC compatibility.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// User camera adjustments in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl CameraAngles {
    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Pitch, yaw and roll converted to radians.
    pub fn radians(&self) -> (f32, f32, f32) {
        (
            self.pitch.to_radians(),
            self.yaw.to_radians(),
            self.roll.to_radians(),
        )
    }

    /// True when any component moved by at least `threshold` degrees.
    pub fn differs_from(&self, other: &Self, threshold: f32) -> bool {
        (self.pitch - other.pitch).abs() >= threshold
            || (self.yaw - other.yaw).abs() >= threshold
            || (self.roll - other.roll).abs() >= threshold
    }
}

/// Per-run interaction state shared by the editor, race and camera systems.
#[derive(Resource, Debug)]
pub struct Session {
    pub active_vehicle: Option<VehicleSlot>,
    /// `None` selects the default chase camera.
    active_camera: Option<String>,
    pub free_cam: bool,
    pub racing: bool,
    pub race_time: f32,
    pub angles: CameraAngles,
    pub hud_visible: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            active_vehicle: None,
            active_camera: None,
            free_cam: false,
            racing: false,
            race_time: 0.0,
            angles: CameraAngles::default(),
            hud_visible: true,
        }
    }
}

impl Session {
    pub fn active_camera(&self) -> Option<&str> {
        self.active_camera.as_deref()
    }

    /// Display name of the active camera, including the default chase camera.
    pub fn active_camera_name(&self) -> &str {
        self.active_camera.as_deref().unwrap_or(DEFAULT_CHASE_NAME)
    }

    /// Time stamp for camera keyframes; zero outside a race.
    pub fn keyframe_time(&self) -> f32 {
        if self.racing { self.race_time } else { 0.0 }
    }

    /// Switch the active camera and let the recorder log the switch.
    /// Returns false when the camera was already active.
    pub fn switch_camera(&mut self, camera: Option<String>, recorder: &mut CameraRecorder) -> bool {
        let camera = camera.filter(|name| name != DEFAULT_CHASE_NAME);
        if self.active_camera == camera {
            return false;
        }

        self.active_camera = camera;
        let time = self.keyframe_time();
        recorder.log_switch(time, self.active_camera_name(), self.angles);
        true
    }

    /// Toggle driving for a slot. Returns true when the slot became active.
    pub fn toggle_drive(&mut self, slot: VehicleSlot) -> bool {
        if self.active_vehicle == Some(slot) {
            self.active_vehicle = None;
            false
        } else {
            self.active_vehicle = Some(slot);
            true
        }
    }

    /// Vehicle the camera follows: the driven vehicle, else the primary slot during a race.
    pub fn followed_vehicle(&self) -> Option<VehicleSlot> {
        self.active_vehicle
            .or(self.racing.then_some(VehicleSlot::Primary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_camera_logs_while_recording() {
        let mut session = Session::default();
        let mut recorder = CameraRecorder::default();
        recorder.start_recording(0.0, session.active_camera_name(), session.angles);

        assert!(session.switch_camera(Some("Hood".into()), &mut recorder));
        assert!(!session.switch_camera(Some("Hood".into()), &mut recorder));
        assert_eq!(recorder.keyframes().len(), 2);
        assert_eq!(recorder.keyframes()[1].camera_name, "Hood");
    }

    #[test]
    fn default_chase_name_maps_to_none() {
        let mut session = Session::default();
        let mut recorder = CameraRecorder::default();
        session.switch_camera(Some("Hood".into()), &mut recorder);
        session.switch_camera(Some(DEFAULT_CHASE_NAME.into()), &mut recorder);
        assert_eq!(session.active_camera(), None);
    }

    #[test]
    fn drive_toggle_clears_active_slot() {
        let mut session = Session::default();
        assert!(session.toggle_drive(VehicleSlot::Secondary));
        assert!(session.toggle_drive(VehicleSlot::Primary));
        assert!(!session.toggle_drive(VehicleSlot::Primary));
        assert_eq!(session.active_vehicle, None);
    }

    #[test]
    fn race_follows_primary_without_driver() {
        let mut session = Session::default();
        assert_eq!(session.followed_vehicle(), None);
        session.racing = true;
        assert_eq!(session.followed_vehicle(), Some(VehicleSlot::Primary));
        session.active_vehicle = Some(VehicleSlot::Secondary);
        assert_eq!(session.followed_vehicle(), Some(VehicleSlot::Secondary));
    }
}
