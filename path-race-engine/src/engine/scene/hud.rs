use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::engine::camera::rig::MainCamera;
use crate::engine::core::session::Session;
use crate::engine::scene::vehicles::Vehicle;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::camera_recorder::{CameraRecorder, RecorderMode};

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct FpsText;

/// Camera and race status readout.
#[derive(Component)]
pub struct TrackerText;

pub fn spawn_hud(commands: &mut Commands) {
    commands
        .spawn((
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                ..default()
            },
            HudRoot,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    top: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                TrackerText,
            ));

            #[cfg(not(target_arch = "wasm32"))]
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

/// Text shown by the tracker: camera, angles, race clock and camera position.
pub fn tracker_text(
    session: &Session,
    mode: RecorderMode,
    camera_position: Vec3,
    relative_to_vehicle: Option<Vec3>,
) -> String {
    let vehicle = match session.active_vehicle {
        Some(slot) => format!("Vehicle {}", slot.index() + 1),
        None => "None".to_string(),
    };
    let recorder = match mode {
        RecorderMode::Idle => "Idle",
        RecorderMode::Recording => "Recording",
        RecorderMode::Playing => "Playing",
    };
    let angles = session.angles;

    let mut text = format!(
        "Driving: {vehicle}\nCamera: {}{}\nPitch {:.1}  Yaw {:.1}  Roll {:.1}\nRace: {} {:.2}s\nReplay: {recorder}\nCamera pos: ({:.2}, {:.2}, {:.2})",
        session.active_camera_name(),
        if session.free_cam { " (free)" } else { "" },
        angles.pitch,
        angles.yaw,
        angles.roll,
        if session.racing { "running" } else { "stopped" },
        session.race_time,
        camera_position.x,
        camera_position.y,
        camera_position.z,
    );

    if let Some(offset) = relative_to_vehicle {
        text.push_str(&format!(
            "\nOffset: ({:.2}, {:.2}, {:.2})",
            offset.x, offset.y, offset.z
        ));
    }
    text
}

pub fn tracker_text_system(
    session: Res<Session>,
    recorder: Res<CameraRecorder>,
    camera: Query<&Transform, With<MainCamera>>,
    vehicles: Query<(&Transform, &Vehicle), Without<MainCamera>>,
    mut texts: Query<&mut Text, With<TrackerText>>,
) {
    let Ok(camera_transform) = camera.single() else {
        return;
    };

    let relative = session.followed_vehicle().and_then(|slot| {
        vehicles
            .iter()
            .find(|(_, vehicle)| vehicle.slot == slot)
            .map(|(transform, _)| {
                transform.rotation.inverse() * (camera_transform.translation - transform.translation)
            })
    });

    let content = tracker_text(&session, recorder.mode(), camera_transform.translation, relative);
    for mut text in &mut texts {
        if text.0 != content {
            text.0.clone_from(&content);
        }
    }
}

pub fn hud_visibility_system(
    session: Res<Session>,
    mut roots: Query<&mut Visibility, With<HudRoot>>,
) {
    if !session.is_changed() {
        return;
    }
    let visibility = if session.hud_visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut root in &mut roots {
        root.set_if_neq(visibility);
    }
}

pub fn fps_text_update_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    for mut text in &mut query {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                text.0 = format!("FPS: {value:.1}");
            }
        }
    }
}

pub fn fps_notification_system(
    mut rpc_interface: ResMut<WebRpcInterface>,
    diagnostics: Res<DiagnosticsStore>,
    mut last_send_time: Local<f32>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    // Send FPS every 0.5 seconds
    if current_time - *last_send_time >= 0.5 {
        if let Some(fps) = diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS) {
            if let Some(value) = fps.smoothed() {
                rpc_interface.send_notification(
                    "fps_update",
                    serde_json::json!({
                        "fps": value as f32
                    }),
                );
                *last_send_time = current_time;
            }
        }
    }
}
