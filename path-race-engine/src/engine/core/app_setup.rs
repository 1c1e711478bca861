use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;

use crate::engine::assets::DocumentPlugin;
use crate::engine::camera::rig::{
    camera_floor_clamp_system, camera_rig_system, camera_selection_system,
};
use crate::engine::core::config::{
    CameraConfig, DriveConfig, EditorConfig, ExportConfig, PhysicsConfig, RaceConfig,
};
use crate::engine::core::frame::{FrameSet, configure_frame_sets};
use crate::engine::core::session::Session;
use crate::engine::core::window_config::create_window_config;
use crate::engine::motion::drive::{DriveInput, drive_system};
use crate::engine::motion::free_roam::free_roam_system;
use crate::engine::motion::race::race_motion_system;
use crate::engine::scene::ScenePlugin;
use crate::engine::scene::ground::Ground;
use crate::rpc::web_rpc::{WebRpcInterface, WebRpcPlugin};
use crate::tools::ControlsPlugin;
use crate::tools::camera_recorder::{CameraRecorder, apply_camera_config};
use crate::tools::intents::{Intent, dispatch_intents};
use crate::tools::path_editor::PathEditor;
use crate::tools::path_library::PathLibrary;

/// State, intents and the per-frame motion and camera pipeline.
///
/// Runs without a window or renderer, which is how the schedule is tested.
/// Until a scene inserts terrain the ground is flat at zero.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        configure_frame_sets(app);

        app.init_resource::<Session>()
            .init_resource::<PathEditor>()
            .init_resource::<PathLibrary>()
            .init_resource::<CameraRecorder>()
            .init_resource::<DriveInput>()
            .init_resource::<Ground>()
            .init_resource::<RaceConfig>()
            .init_resource::<DriveConfig>()
            .init_resource::<PhysicsConfig>()
            .init_resource::<CameraConfig>()
            .init_resource::<EditorConfig>()
            .init_resource::<ExportConfig>()
            .init_resource::<WebRpcInterface>()
            .add_event::<Intent>();

        app.add_systems(
            Update,
            (
                (apply_camera_config, dispatch_intents)
                    .chain()
                    .in_set(FrameSet::Intents),
                (drive_system, race_motion_system)
                    .chain()
                    .in_set(FrameSet::Motion),
                free_roam_system.in_set(FrameSet::Physics),
                camera_selection_system.in_set(FrameSet::CameraSelection),
                camera_rig_system.in_set(FrameSet::CameraPose),
                camera_floor_clamp_system.in_set(FrameSet::FloorClamp),
            ),
        );
    }
}

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(SimulationPlugin)
        .add_plugins(DocumentPlugin)
        .add_plugins(ScenePlugin)
        .add_plugins(ControlsPlugin)
        .add_plugins(WebRpcPlugin);

    app
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::documents::CameraDocument;
    use crate::engine::core::session::{CameraAngles, VehicleSlot};
    use crate::tools::camera_recorder::{CameraKeyframe, RecorderMode};
    use crate::engine::scene::vehicles::Vehicle;
    use std::time::Duration;

    fn headless_app(export_directory: std::path::PathBuf) -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .add_plugins(SimulationPlugin)
            .insert_resource(ExportConfig {
                directory: export_directory,
            });
        app
    }

    fn step(app: &mut App, millis: u64) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(millis));
        app.update();
    }

    fn send(app: &mut App, intent: Intent) {
        app.world_mut().send_event(intent);
    }

    fn rejections(app: &App) -> Vec<String> {
        app.world()
            .resource::<WebRpcInterface>()
            .pending_notifications()
            .iter()
            .filter(|notification| notification.method == "action_rejected")
            .filter_map(|notification| notification.params["action"].as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn intents_drive_editing_and_racing_through_the_schedule() {
        let directory = std::env::temp_dir().join(format!(
            "path-race-schedule-{}",
            crate::engine::assets::export::timestamp_millis()
        ));
        let mut app = headless_app(directory.clone());
        let vehicle = app
            .world_mut()
            .spawn((
                Transform::from_xyz(-20.0, 0.5, 0.0),
                Vehicle::new(VehicleSlot::Primary, 0.5),
            ))
            .id();

        send(&mut app, Intent::AddPoint(Vec3::ZERO));
        send(&mut app, Intent::AddPoint(Vec3::new(20.0, 0.0, 0.0)));
        send(&mut app, Intent::AddPoint(Vec3::new(40.0, 0.0, 10.0)));
        send(&mut app, Intent::Undo);
        step(&mut app, 16);

        let editor = app.world().resource::<PathEditor>();
        assert_eq!(editor.len(), 2);
        assert!(editor.positions().iter().all(|point| (point.y - 0.5).abs() < 1e-5));

        send(&mut app, Intent::StartRace);
        step(&mut app, 16);
        assert_eq!(rejections(&app), vec!["start_race".to_string()]);
        assert!(!app.world().resource::<Session>().racing);

        send(
            &mut app,
            Intent::SavePath {
                name: "Straight".to_string(),
                overwrite: false,
            },
        );
        send(
            &mut app,
            Intent::Assign {
                slot: VehicleSlot::Primary,
                index: Some(0),
            },
        );
        step(&mut app, 16);

        let start = app.world().get::<Transform>(vehicle).unwrap().translation;
        assert!(start.distance(Vec3::new(0.0, 0.5, 0.0)) < 1e-3);

        send(&mut app, Intent::StartRace);
        for _ in 0..20 {
            step(&mut app, 50);
        }

        let library = app.world().resource::<PathLibrary>();
        let race_state = library
            .assignment(VehicleSlot::Primary)
            .and_then(|assignment| assignment.race_state)
            .unwrap();
        assert!(race_state.distance > 0.0);
        assert!(app.world().resource::<Session>().racing);

        let moved = app.world().get::<Transform>(vehicle).unwrap().translation;
        assert!(moved.x > start.x);

        send(&mut app, Intent::Deassign(VehicleSlot::Primary));
        step(&mut app, 16);
        assert!(!app.world().resource::<Session>().racing);

        let _ = std::fs::remove_dir_all(directory);
    }

    #[test]
    fn camera_intents_need_an_active_vehicle() {
        let mut app = headless_app(std::env::temp_dir().join("path-race-unused"));

        send(&mut app, Intent::SaveCamera(Some("Hood".to_string())));
        step(&mut app, 16);
        assert_eq!(rejections(&app), vec!["save_camera".to_string()]);

        app.world_mut().spawn((
            Transform::from_xyz(0.0, 0.5, 0.0),
            Vehicle::new(VehicleSlot::Secondary, 0.5),
        ));
        send(&mut app, Intent::DriveToggle(VehicleSlot::Secondary));
        send(&mut app, Intent::SaveCamera(Some("Hood".to_string())));
        step(&mut app, 16);

        let session = app.world().resource::<Session>();
        assert_eq!(session.active_vehicle, Some(VehicleSlot::Secondary));
        assert_eq!(session.active_camera(), Some("Hood"));
        assert_eq!(rejections(&app).len(), 1);
    }

    #[test]
    fn stop_playback_returns_recorder_to_idle() {
        let mut app = headless_app(std::env::temp_dir().join("path-race-unused"));
        let replay = CameraDocument::replay(vec![
            CameraKeyframe::new(0.0, "Hood", CameraAngles::default()),
            CameraKeyframe::new(4.0, "Wing", CameraAngles::default()),
        ]);

        send(
            &mut app,
            Intent::LoadDocument {
                name: "lap.replay.json".to_string(),
                json: serde_json::to_string(&replay).unwrap(),
            },
        );
        step(&mut app, 16);
        assert_eq!(app.world().resource::<CameraRecorder>().mode(), RecorderMode::Playing);

        send(&mut app, Intent::StopPlayback);
        step(&mut app, 16);
        let recorder = app.world().resource::<CameraRecorder>();
        assert_eq!(recorder.mode(), RecorderMode::Idle);
        assert!(recorder.update(5.0).is_none());
        assert!(rejections(&app).is_empty());
    }

    #[test]
    fn configured_dead_band_filters_recorded_angles() {
        let mut app = headless_app(std::env::temp_dir().join("path-race-unused"));
        app.insert_resource(CameraConfig {
            angle_deadband: 10.0,
            ..default()
        });
        app.world_mut().spawn((
            Transform::from_xyz(0.0, 0.5, 0.0),
            Vehicle::new(VehicleSlot::Primary, 0.5),
        ));

        send(&mut app, Intent::AddPoint(Vec3::ZERO));
        send(&mut app, Intent::AddPoint(Vec3::new(200.0, 0.0, 0.0)));
        send(
            &mut app,
            Intent::SavePath {
                name: "Runway".to_string(),
                overwrite: false,
            },
        );
        send(
            &mut app,
            Intent::Assign {
                slot: VehicleSlot::Primary,
                index: Some(0),
            },
        );
        send(&mut app, Intent::StartRace);
        send(&mut app, Intent::RecordToggle);
        step(&mut app, 16);

        let recorder = app.world().resource::<CameraRecorder>();
        assert!((recorder.deadband() - 10.0).abs() < 1e-6);
        assert!(recorder.is_recording());
        assert_eq!(recorder.keyframes().len(), 1);

        send(&mut app, Intent::SetCameraAngles(CameraAngles::new(6.0, -6.0, 0.0)));
        step(&mut app, 16);
        assert_eq!(app.world().resource::<CameraRecorder>().keyframes().len(), 1);

        send(&mut app, Intent::SetCameraAngles(CameraAngles::new(12.0, 0.0, 0.0)));
        step(&mut app, 16);
        assert_eq!(app.world().resource::<CameraRecorder>().keyframes().len(), 2);
    }
}
