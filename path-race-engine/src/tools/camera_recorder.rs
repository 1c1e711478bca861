use bevy::prelude::*;
use constants::camera::KEYFRAME_ANGLE_DEADBAND;
use serde::{Deserialize, Serialize};

use crate::engine::core::config::CameraConfig;
use crate::engine::core::session::CameraAngles;

/// Camera selection and orientation at a point in race time. Angles are degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraKeyframe {
    pub time: f32,
    #[serde(rename = "cameraName")]
    pub camera_name: String,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl CameraKeyframe {
    pub fn new(time: f32, camera_name: &str, angles: CameraAngles) -> Self {
        Self {
            time: time.max(0.0),
            camera_name: camera_name.to_string(),
            pitch: angles.pitch,
            yaw: angles.yaw,
            roll: angles.roll,
        }
    }

    pub fn angles(&self) -> CameraAngles {
        CameraAngles::new(self.pitch, self.yaw, self.roll)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecorderMode {
    #[default]
    Idle,
    Recording,
    Playing,
}

/// Records camera switches and angle changes against race time, and plays them back.
#[derive(Resource, Debug)]
pub struct CameraRecorder {
    keyframes: Vec<CameraKeyframe>,
    mode: RecorderMode,
    /// Smallest angle change in degrees worth a keyframe.
    deadband: f32,
}

impl Default for CameraRecorder {
    fn default() -> Self {
        Self::with_deadband(KEYFRAME_ANGLE_DEADBAND)
    }
}

impl CameraRecorder {
    pub fn with_deadband(deadband: f32) -> Self {
        Self {
            keyframes: Vec::new(),
            mode: RecorderMode::Idle,
            deadband,
        }
    }

    pub fn deadband(&self) -> f32 {
        self.deadband
    }

    pub fn set_deadband(&mut self, deadband: f32) {
        self.deadband = deadband.max(0.0);
    }

    pub fn mode(&self) -> RecorderMode {
        self.mode
    }

    pub fn is_recording(&self) -> bool {
        self.mode == RecorderMode::Recording
    }

    pub fn is_playing(&self) -> bool {
        self.mode == RecorderMode::Playing
    }

    pub fn keyframes(&self) -> &[CameraKeyframe] {
        &self.keyframes
    }

    /// Clear previous keyframes, stop any playback and log the starting camera.
    pub fn start_recording(&mut self, time: f32, camera: &str, angles: CameraAngles) {
        self.keyframes.clear();
        self.mode = RecorderMode::Recording;
        self.log_switch(time, camera, angles);
    }

    /// Stop recording and hand back the recorded keyframes, if any.
    pub fn stop_recording(&mut self) -> Option<Vec<CameraKeyframe>> {
        if !self.is_recording() {
            return None;
        }
        self.mode = RecorderMode::Idle;
        (!self.keyframes.is_empty()).then(|| self.keyframes.clone())
    }

    pub fn log_switch(&mut self, time: f32, camera: &str, angles: CameraAngles) {
        if !self.is_recording() {
            return;
        }
        self.keyframes.push(CameraKeyframe::new(time, camera, angles));
    }

    /// Append a keyframe only when the angles moved past the dead-band.
    /// Returns true when a keyframe was written.
    pub fn log_angle_change(&mut self, time: f32, camera: &str, angles: CameraAngles) -> bool {
        if !self.is_recording() {
            return false;
        }

        let deadband = self.deadband;
        let changed = self
            .keyframes
            .last()
            .is_none_or(|last| angles.differs_from(&last.angles(), deadband));

        if changed {
            self.keyframes.push(CameraKeyframe::new(time, camera, angles));
        }
        changed
    }

    /// Replace the keyframes with a loaded replay and start playing it.
    pub fn load_replay(&mut self, keyframes: Vec<CameraKeyframe>) {
        self.keyframes = keyframes;
        self.mode = RecorderMode::Playing;
    }

    pub fn stop_playing(&mut self) {
        if self.is_playing() {
            self.mode = RecorderMode::Idle;
        }
    }

    /// Keyframe in effect at `time` while playing.
    ///
    /// Scans in stored order and stops at the first keyframe later than `time`,
    /// so an out-of-order document never skips ahead past an earlier keyframe.
    pub fn update(&self, time: f32) -> Option<&CameraKeyframe> {
        if !self.is_playing() {
            return None;
        }

        let mut active = None;
        for keyframe in &self.keyframes {
            if keyframe.time > time {
                break;
            }
            active = Some(keyframe);
        }
        active
    }
}

/// Keep the recorder dead-band in step with [`CameraConfig`].
pub fn apply_camera_config(config: Res<CameraConfig>, mut recorder: ResMut<CameraRecorder>) {
    if !config.is_changed() || recorder.deadband() == config.angle_deadband {
        return;
    }
    recorder.set_deadband(config.angle_deadband);
    debug!("[REC] Keyframe dead-band set to {:.2} degrees", config.angle_deadband);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyframe(time: f32, name: &str) -> CameraKeyframe {
        CameraKeyframe::new(time, name, CameraAngles::default())
    }

    #[test]
    fn playback_selects_latest_keyframe_not_after_time() {
        let mut recorder = CameraRecorder::default();
        recorder.load_replay(vec![keyframe(0.0, "A"), keyframe(5.0, "B")]);

        assert_eq!(recorder.update(3.0).unwrap().camera_name, "A");
        assert_eq!(recorder.update(5.0).unwrap().camera_name, "B");
        assert_eq!(recorder.update(6.0).unwrap().camera_name, "B");
    }

    #[test]
    fn playback_before_first_keyframe_and_empty_is_none() {
        let mut recorder = CameraRecorder::default();
        recorder.load_replay(vec![keyframe(2.0, "A")]);
        assert!(recorder.update(1.0).is_none());

        recorder.load_replay(Vec::new());
        assert!(recorder.update(10.0).is_none());
    }

    #[test]
    fn unsorted_keyframes_stop_at_first_later_entry() {
        let mut recorder = CameraRecorder::default();
        recorder.load_replay(vec![
            keyframe(0.0, "A"),
            keyframe(8.0, "C"),
            keyframe(4.0, "B"),
        ]);
        assert_eq!(recorder.update(5.0).unwrap().camera_name, "A");
        assert_eq!(recorder.update(9.0).unwrap().camera_name, "B");
    }

    #[test]
    fn dead_band_filters_small_angle_changes() {
        let mut recorder = CameraRecorder::default();
        recorder.start_recording(0.0, "A", CameraAngles::default());

        assert!(!recorder.log_angle_change(1.0, "A", CameraAngles::new(0.4, -0.4, 0.2)));
        assert!(recorder.log_angle_change(1.5, "A", CameraAngles::new(0.0, 0.5, 0.0)));
        assert!(!recorder.log_angle_change(2.0, "A", CameraAngles::new(0.0, 0.7, 0.0)));
        assert_eq!(recorder.keyframes().len(), 2);
    }

    #[test]
    fn wider_dead_band_drops_more_keyframes() {
        let mut recorder = CameraRecorder::with_deadband(10.0);
        recorder.start_recording(0.0, "A", CameraAngles::default());

        assert!(!recorder.log_angle_change(1.0, "A", CameraAngles::new(5.0, -9.0, 0.0)));
        assert!(recorder.log_angle_change(2.0, "A", CameraAngles::new(0.0, 0.0, 10.0)));
        assert_eq!(recorder.keyframes().len(), 2);
    }

    #[test]
    fn stop_playing_only_ends_playback() {
        let mut recorder = CameraRecorder::default();
        recorder.start_recording(0.0, "A", CameraAngles::default());
        recorder.stop_playing();
        assert!(recorder.is_recording());

        recorder.load_replay(vec![keyframe(0.0, "A")]);
        recorder.stop_playing();
        assert_eq!(recorder.mode(), RecorderMode::Idle);
        assert!(recorder.update(1.0).is_none());
    }

    #[test]
    fn switches_always_log_while_recording() {
        let mut recorder = CameraRecorder::default();
        recorder.log_switch(0.0, "ignored", CameraAngles::default());
        assert!(recorder.keyframes().is_empty());

        recorder.start_recording(0.0, "A", CameraAngles::default());
        recorder.log_switch(1.0, "A", CameraAngles::default());
        recorder.log_switch(1.0, "B", CameraAngles::default());
        assert_eq!(recorder.keyframes().len(), 3);
    }

    #[test]
    fn recording_and_playing_are_exclusive() {
        let mut recorder = CameraRecorder::default();
        recorder.load_replay(vec![keyframe(0.0, "A")]);
        recorder.start_recording(0.0, "B", CameraAngles::default());
        assert!(recorder.is_recording());
        assert!(recorder.update(1.0).is_none());

        let recorded = recorder.stop_recording().unwrap();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorder.mode(), RecorderMode::Idle);
        assert!(recorder.stop_recording().is_none());
    }
}
