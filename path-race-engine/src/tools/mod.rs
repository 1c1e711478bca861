//! Interactive tools: path editing, the path library, camera recording and the
//! intent layer that drives them.
//!
//! ## Intent Flow
//!
//! ```text
//! Keyboard / mouse / RPC input
//!   └─> Intent event
//!       └─> dispatch_intents()          (FrameSet::Intents)
//!           ├─> PathEditor / PathLibrary / CameraRecorder / Session
//!           └─> action_rejected notification on failure
//! ```
//!
//! Manual driving is the exception: held keys are mirrored into the
//! `DriveInput` resource every frame rather than sent as events.
//!
//! ## Cross-Platform Considerations
//!
//! Native builds get keyboard shortcuts on top of mouse editing. WASM builds
//! take actions from the host page over JSON-RPC and keep only mouse editing,
//! drive keys and free-cam look.

use bevy::prelude::*;

use crate::engine::camera::free_camera::{FreeCamera, free_camera_controller};
use crate::engine::core::frame::FrameSet;

/// Camera keyframe recording and replay playback.
pub mod camera_recorder;

/// Typed user actions and the dispatcher applying them.
pub mod intents;

/// Waypoint editing with undo/redo and drag handling.
pub mod path_editor;

/// Named stored paths and per-vehicle assignments.
pub mod path_library;

/// Keyboard shortcuts, drive keys and mouse waypoint editing.
pub mod shortcuts;

use shortcuts::{drive_input_system, editor_mouse_system, handle_keyboard_shortcuts};

/// Raw input handling. Needs a window and the input plugins, so headless
/// apps leave it out and send intents directly.
pub struct ControlsPlugin;

impl Plugin for ControlsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FreeCamera>()
            .add_systems(
                Update,
                (handle_keyboard_shortcuts, drive_input_system, editor_mouse_system)
                    .before(FrameSet::Intents),
            )
            .add_systems(Update, free_camera_controller.in_set(FrameSet::CameraPose));
    }
}
