use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::engine::camera::free_camera::cursor_to_ground;
use crate::engine::camera::rig::{CameraDefinition, MainCamera};
use crate::engine::core::config::EditorConfig;
use crate::engine::core::session::{CameraAngles, Session, VehicleSlot};
use crate::engine::motion::drive::DriveInput;
use crate::engine::scene::ground::Ground;
use crate::engine::scene::vehicles::Vehicle;
use crate::tools::intents::Intent;
use crate::tools::path_editor::{PathEditor, WaypointId};

/// Degrees per second while an angle key is held.
const ANGLE_RATE: f32 = 45.0;

/// Furthest ground hit the cursor may pick.
const PICK_DISTANCE: f32 = 2000.0;

/// Cursor distance from a waypoint that starts a drag instead of adding a point.
const PICK_RADIUS: f32 = 1.5;

/// Mirror the held drive keys into [`DriveInput`].
pub fn drive_input_system(keyboard: Res<ButtonInput<KeyCode>>, mut drive_input: ResMut<DriveInput>) {
    let input = DriveInput {
        forward: keyboard.pressed(KeyCode::KeyW),
        reverse: keyboard.pressed(KeyCode::KeyS),
        left: keyboard.pressed(KeyCode::KeyA),
        right: keyboard.pressed(KeyCode::KeyD),
    };
    drive_input.set_if_neq(input);
}

/// Left click adds a waypoint on the ground, or grabs one close to the cursor.
pub fn editor_mouse_system(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    ground: Res<Ground>,
    editor: Res<PathEditor>,
    editor_config: Res<EditorConfig>,
    mut dragging: Local<Option<WaypointId>>,
    mut intents: EventWriter<Intent>,
) {
    if mouse_button.just_released(MouseButton::Left) {
        if let Some(id) = dragging.take() {
            intents.write(Intent::EndDrag(id));
        }
        return;
    }

    // Right button is reserved for mouse look.
    if mouse_button.pressed(MouseButton::Right) {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Some(hit) = cursor_to_ground(cursor, camera, camera_transform, &**ground, PICK_DISTANCE)
    else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Left) {
        let lifted = hit + Vec3::Y * editor_config.waypoint_lift;
        match editor.nearest_waypoint(lifted, PICK_RADIUS) {
            Some(id) => {
                *dragging = Some(id);
                intents.write(Intent::BeginDrag(id));
            }
            None => {
                intents.write(Intent::AddPoint(hit));
            }
        }
    } else if let Some(id) = *dragging {
        if mouse_button.pressed(MouseButton::Left) {
            intents.write(Intent::DragWaypoint { id, target: hit });
        }
    }
}

/// Camera after `current` in a vehicle's list. Past the last camera the
/// default chase camera (`None`) comes back round.
pub fn next_camera(current: Option<&str>, cameras: &[CameraDefinition]) -> Option<String> {
    let next = match current {
        None => 0,
        Some(name) => match cameras.iter().position(|camera| camera.name == name) {
            Some(index) => index + 1,
            None => 0,
        },
    };
    cameras.get(next).map(|camera| camera.name.clone())
}

/// Angle change from the held arrow and bracket keys.
pub fn adjust_angles(keyboard: &ButtonInput<KeyCode>, angles: CameraAngles, dt: f32) -> CameraAngles {
    let axis = |positive: KeyCode, negative: KeyCode| {
        (keyboard.pressed(positive) as i32 - keyboard.pressed(negative) as i32) as f32
    };
    let step = ANGLE_RATE * dt;

    CameraAngles::new(
        angles.pitch + axis(KeyCode::ArrowUp, KeyCode::ArrowDown) * step,
        angles.yaw + axis(KeyCode::ArrowLeft, KeyCode::ArrowRight) * step,
        angles.roll + axis(KeyCode::BracketRight, KeyCode::BracketLeft) * step,
    )
}

/// Native keyboard shortcuts. W, A, S, D, E and Q stay free for driving and
/// free-cam flight.
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    session: Res<Session>,
    vehicles: Query<&Vehicle>,
    time: Res<Time>,
    mut intents: EventWriter<Intent>,
) {
    let ctrl = keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    let shift = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    if ctrl && keyboard.just_pressed(KeyCode::KeyZ) {
        intents.write(if shift { Intent::Redo } else { Intent::Undo });
    }
    if ctrl && keyboard.just_pressed(KeyCode::KeyY) {
        intents.write(Intent::Redo);
    }
    if keyboard.just_pressed(KeyCode::Enter) {
        intents.write(Intent::SavePath {
            name: String::new(),
            overwrite: shift,
        });
    }

    let bindings = [
        (KeyCode::KeyC, Intent::CloseLoop),
        (KeyCode::Delete, Intent::ClearPath),
        (KeyCode::Digit1, Intent::DriveToggle(VehicleSlot::Primary)),
        (KeyCode::Digit2, Intent::DriveToggle(VehicleSlot::Secondary)),
        (KeyCode::Space, Intent::StartRace),
        (KeyCode::Backspace, Intent::ResetRace),
        (KeyCode::KeyR, Intent::RecordToggle),
        (KeyCode::KeyP, Intent::StopPlayback),
        (KeyCode::KeyF, Intent::ToggleFreeCam),
        (KeyCode::KeyH, Intent::ToggleHud),
        (KeyCode::KeyK, Intent::SaveCamera(None)),
        (KeyCode::Home, Intent::ResetCameraAngles),
    ];
    for (key, intent) in bindings {
        if keyboard.just_pressed(key) {
            intents.write(intent);
        }
    }

    if keyboard.just_pressed(KeyCode::Tab) {
        if let Some(slot) = session.followed_vehicle() {
            if let Some(vehicle) = vehicles.iter().find(|vehicle| vehicle.slot == slot) {
                intents.write(Intent::SelectCamera(next_camera(
                    session.active_camera(),
                    &vehicle.cameras,
                )));
            }
        }
    }

    let angles = adjust_angles(&keyboard, session.angles, time.delta_secs());
    if angles != session.angles {
        intents.write(Intent::SetCameraAngles(angles));
    }
}

/// Placeholder system for WASM builds where the host page drives actions over RPC.
#[cfg(target_arch = "wasm32")]
pub fn handle_keyboard_shortcuts() {}
