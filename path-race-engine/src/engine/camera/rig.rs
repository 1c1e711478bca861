use bevy::prelude::*;

use crate::engine::core::config::CameraConfig;
use crate::engine::core::errors::CameraError;
use crate::engine::core::session::{CameraAngles, Session};
use crate::engine::scene::ground::{Ground, GroundQuery};
use crate::engine::scene::vehicles::Vehicle;
use crate::tools::camera_recorder::CameraRecorder;

/// The camera driven by the rig.
#[derive(Component)]
pub struct MainCamera;

/// Camera pose stored relative to a vehicle.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDefinition {
    pub name: String,
    pub offset: Vec3,
    pub rotation: Quat,
}

impl CameraDefinition {
    /// Express a world camera pose in the vehicle's local frame.
    pub fn capture(name: impl Into<String>, vehicle: &Transform, camera: &Transform) -> Self {
        let inverse = vehicle.rotation.inverse();
        Self {
            name: name.into(),
            offset: inverse * (camera.translation - vehicle.translation),
            rotation: inverse * camera.rotation,
        }
    }

    /// World pose of this camera on the vehicle, before slider adjustments.
    pub fn world_pose(&self, vehicle: &Transform) -> Transform {
        Transform {
            translation: vehicle.translation + vehicle.rotation * self.offset,
            rotation: vehicle.rotation * self.rotation,
            ..default()
        }
    }
}

/// Point the chase camera moves towards, from the vehicle's transform.
pub fn chase_target(vehicle: &Transform, angles: CameraAngles, config: &CameraConfig) -> Vec3 {
    let (pitch, yaw, _) = angles.radians();
    let local = Vec3::new(
        yaw.sin() * config.chase_distance,
        config.chase_height + pitch.sin() * config.chase_distance,
        yaw.cos() * config.chase_distance,
    );
    vehicle.transform_point(local)
}

/// Next chase camera pose: ease towards the target, look at the vehicle, then roll.
pub fn chase_pose(
    current: &Transform,
    vehicle: &Transform,
    angles: CameraAngles,
    config: &CameraConfig,
) -> Transform {
    let target = chase_target(vehicle, angles, config);
    let position = current.translation.lerp(target, config.chase_smoothing);

    let mut pose = Transform::from_translation(position).looking_at(vehicle.translation, Vec3::Y);
    pose.rotate_local_z(angles.radians().2);
    pose
}

/// Saved camera pose with local yaw, pitch and roll applied in that order.
pub fn custom_pose(vehicle: &Transform, definition: &CameraDefinition, angles: CameraAngles) -> Transform {
    let (pitch, yaw, roll) = angles.radians();
    let mut pose = definition.world_pose(vehicle);
    pose.rotate_local_y(yaw);
    pose.rotate_local_x(pitch);
    pose.rotate_local_z(roll);
    pose
}

/// Raised camera height when `position` sits too close to the ground below it.
pub fn floor_clamp(position: Vec3, ground: &dyn GroundQuery, config: &CameraConfig) -> Option<f32> {
    let probe = position + Vec3::Y * config.floor_probe_lift;
    let floor = ground.surface_below(probe)?.y + config.floor_clearance;
    (position.y < floor).then_some(floor)
}

/// Store the current camera pose on the vehicle under `name`, or "Camera N" when blank.
pub fn save_camera(
    vehicle: &mut Vehicle,
    vehicle_transform: &Transform,
    camera_transform: &Transform,
    name: Option<&str>,
) -> Result<String, CameraError> {
    let name = match name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => format!("Camera {}", vehicle.cameras.len() + 1),
    };

    if vehicle.camera(&name).is_some() {
        return Err(CameraError::DuplicateName(name));
    }

    vehicle
        .cameras
        .push(CameraDefinition::capture(name.clone(), vehicle_transform, camera_transform));
    Ok(name)
}

/// Re-capture the active camera, optionally renaming it. Returns the final name.
pub fn overwrite_camera(
    vehicle: &mut Vehicle,
    vehicle_transform: &Transform,
    camera_transform: &Transform,
    active: Option<&str>,
    new_name: Option<&str>,
) -> Result<String, CameraError> {
    let Some(active) = active else {
        return Err(CameraError::UnknownCamera(None));
    };
    let Some(index) = vehicle.cameras.iter().position(|camera| camera.name == active) else {
        return Err(CameraError::UnknownCamera(Some(active.to_string())));
    };

    let name = new_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(active)
        .to_string();

    if name != active && vehicle.camera(&name).is_some() {
        return Err(CameraError::DuplicateName(name));
    }

    vehicle.cameras[index] = CameraDefinition::capture(name.clone(), vehicle_transform, camera_transform);
    Ok(name)
}

/// Apply replay keyframes and log angle changes while racing.
pub fn camera_selection_system(
    mut session: ResMut<Session>,
    mut recorder: ResMut<CameraRecorder>,
) {
    if session.free_cam || !session.racing {
        return;
    }

    if recorder.is_playing() {
        if let Some(keyframe) = recorder.update(session.race_time).cloned() {
            if session.active_camera_name() != keyframe.camera_name {
                session.switch_camera(Some(keyframe.camera_name.clone()), &mut recorder);
                info!("[REC] Replay switched to \"{}\"", keyframe.camera_name);
            }
            session.angles = keyframe.angles();
        }
    }

    if recorder.is_recording() {
        let time = session.race_time;
        recorder.log_angle_change(time, session.active_camera_name(), session.angles);
    }
}

/// Position the main camera on the followed vehicle.
pub fn camera_rig_system(
    session: Res<Session>,
    config: Res<CameraConfig>,
    vehicles: Query<(&Transform, &Vehicle), Without<MainCamera>>,
    mut camera: Query<&mut Transform, (With<MainCamera>, Without<Vehicle>)>,
) {
    if session.free_cam {
        return;
    }
    let Some(slot) = session.followed_vehicle() else {
        return;
    };
    let Some((vehicle_transform, vehicle)) = vehicles.iter().find(|(_, v)| v.slot == slot) else {
        return;
    };
    let Ok(mut camera_transform) = camera.single_mut() else {
        return;
    };

    let custom = session
        .active_camera()
        .and_then(|name| vehicle.camera(name));

    *camera_transform = match custom {
        Some(definition) => custom_pose(vehicle_transform, definition, session.angles),
        None => chase_pose(&camera_transform, vehicle_transform, session.angles, &config),
    };
}

/// Keep the main camera above the terrain in every mode.
pub fn camera_floor_clamp_system(
    ground: Res<Ground>,
    config: Res<CameraConfig>,
    mut camera: Query<&mut Transform, With<MainCamera>>,
) {
    for mut transform in &mut camera {
        if let Some(height) = floor_clamp(transform.translation, &**ground, &config) {
            transform.translation.y = height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::session::VehicleSlot;
    use crate::engine::scene::ground::FlatGround;
    use std::f32::consts::FRAC_PI_2;

    fn vehicle_pose() -> Transform {
        Transform::from_xyz(10.0, 2.0, -4.0).with_rotation(Quat::from_rotation_y(0.7))
    }

    #[test]
    fn capture_then_world_pose_restores_camera() {
        let vehicle = vehicle_pose();
        let camera = Transform::from_xyz(12.0, 5.0, 1.0).looking_at(vehicle.translation, Vec3::Y);

        let definition = CameraDefinition::capture("Hood", &vehicle, &camera);
        let restored = definition.world_pose(&vehicle);
        assert!(restored.translation.distance(camera.translation) < 1e-4);
        assert!(restored.rotation.angle_between(camera.rotation) < 1e-4);
    }

    #[test]
    fn custom_pose_without_angles_matches_definition() {
        let vehicle = vehicle_pose();
        let definition = CameraDefinition {
            name: "Side".into(),
            offset: Vec3::new(3.0, 1.0, 0.0),
            rotation: Quat::from_rotation_y(FRAC_PI_2),
        };
        let pose = custom_pose(&vehicle, &definition, CameraAngles::default());
        let expected = vehicle.translation + vehicle.rotation * Vec3::new(3.0, 1.0, 0.0);
        assert!(pose.translation.distance(expected) < 1e-5);

        let yawed = custom_pose(&vehicle, &definition, CameraAngles::new(0.0, 90.0, 0.0));
        let expected_rotation = vehicle.rotation * definition.rotation * Quat::from_rotation_y(FRAC_PI_2);
        assert!(yawed.rotation.angle_between(expected_rotation) < 1e-5);
    }

    #[test]
    fn chase_target_sits_behind_and_above() {
        let vehicle = Transform::from_xyz(0.0, 0.0, 0.0);
        let target = chase_target(&vehicle, CameraAngles::default(), &CameraConfig::default());
        // Forward is -Z, so behind is +Z.
        assert!(target.distance(Vec3::new(0.0, 5.0, 10.0)) < 1e-5);
    }

    #[test]
    fn chase_pose_eases_and_looks_at_vehicle() {
        let config = CameraConfig::default();
        let vehicle = Transform::default();
        let current = Transform::from_xyz(0.0, 5.0, 20.0);
        let pose = chase_pose(&current, &vehicle, CameraAngles::default(), &config);

        assert!(pose.translation.distance(Vec3::new(0.0, 5.0, 19.0)) < 1e-4);
        let forward = pose.forward();
        let to_vehicle = (vehicle.translation - pose.translation).normalize();
        assert!(forward.dot(to_vehicle) > 0.9999);
    }

    #[test]
    fn floor_clamp_lifts_low_cameras_only() {
        let ground = FlatGround { height: 3.0 };
        let config = CameraConfig::default();
        let raised = floor_clamp(Vec3::new(0.0, 3.5, 0.0), &ground, &config).unwrap();
        assert!((raised - 4.2).abs() < 1e-5);
        assert_eq!(floor_clamp(Vec3::new(0.0, 6.0, 0.0), &ground, &config), None);
        // Probe starts above the camera, so a camera under the surface is still found.
        let buried = floor_clamp(Vec3::new(0.0, -2.0, 0.0), &ground, &config).unwrap();
        assert!((buried - 4.2).abs() < 1e-5);
    }

    #[test]
    fn saving_rejects_duplicates_and_names_defaults() {
        let mut vehicle = Vehicle::new(VehicleSlot::Primary, 0.0);
        let pose = vehicle_pose();
        let camera = Transform::from_xyz(0.0, 4.0, 0.0);

        assert_eq!(save_camera(&mut vehicle, &pose, &camera, None).unwrap(), "Camera 1");
        assert_eq!(save_camera(&mut vehicle, &pose, &camera, Some("  ")).unwrap(), "Camera 2");
        assert_eq!(
            save_camera(&mut vehicle, &pose, &camera, Some("Camera 1")),
            Err(CameraError::DuplicateName("Camera 1".into()))
        );
        assert_eq!(vehicle.cameras.len(), 2);
    }

    #[test]
    fn overwrite_can_rename_active_camera() {
        let mut vehicle = Vehicle::new(VehicleSlot::Primary, 0.0);
        let pose = vehicle_pose();
        let first = Transform::from_xyz(0.0, 4.0, 0.0);
        let second = Transform::from_xyz(1.0, 6.0, 2.0);
        save_camera(&mut vehicle, &pose, &first, Some("Roof")).unwrap();
        save_camera(&mut vehicle, &pose, &first, Some("Hood")).unwrap();

        assert_eq!(
            overwrite_camera(&mut vehicle, &pose, &second, None, None),
            Err(CameraError::UnknownCamera(None))
        );
        assert_eq!(
            overwrite_camera(&mut vehicle, &pose, &second, Some("Roof"), Some("Hood")),
            Err(CameraError::DuplicateName("Hood".into()))
        );

        let name = overwrite_camera(&mut vehicle, &pose, &second, Some("Roof"), Some("Wing")).unwrap();
        assert_eq!(name, "Wing");
        let stored = vehicle.camera("Wing").unwrap().world_pose(&pose);
        assert!(stored.translation.distance(second.translation) < 1e-4);
        assert!(vehicle.camera("Roof").is_none());
    }
}
