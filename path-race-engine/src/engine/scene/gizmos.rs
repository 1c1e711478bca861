use bevy::prelude::*;
use constants::path::CURVE_SAMPLES;
use constants::render_settings::{
    ASSIGNED_CURVE_COLOURS, EDITOR_CURVE_COLOUR, PREVIEW_CURVE_COLOUR, WAYPOINT_COLOUR,
    WAYPOINT_MARKER_RADIUS,
};

use crate::engine::core::session::VehicleSlot;
use crate::engine::curve::Curve;
use crate::tools::path_editor::PathEditor;
use crate::tools::path_library::PathLibrary;

/// Dragged waypoints are drawn slightly larger.
const DRAG_HIGHLIGHT_SCALE: f32 = 1.6;

/// Waypoint markers and the live curve being sketched.
pub fn draw_editor_gizmos(mut gizmos: Gizmos, editor: Res<PathEditor>) {
    for waypoint in editor.waypoints() {
        let radius = if editor.dragging() == Some(waypoint.id) {
            WAYPOINT_MARKER_RADIUS * DRAG_HIGHLIGHT_SCALE
        } else {
            WAYPOINT_MARKER_RADIUS
        };
        gizmos.sphere(
            Isometry3d::from_translation(waypoint.position),
            radius,
            WAYPOINT_COLOUR,
        );
    }

    if let Some(curve) = editor.curve() {
        gizmos.linestrip(curve.sample_points(CURVE_SAMPLES), EDITOR_CURVE_COLOUR);
    }
}

/// Preview of the selected stored path and each slot's assigned path.
pub fn draw_library_gizmos(mut gizmos: Gizmos, library: Res<PathLibrary>) {
    if let Some(path) = library.selected_path() {
        if let Ok(curve) = Curve::build(&path.points, path.closed) {
            gizmos.linestrip(curve.sample_points(CURVE_SAMPLES), PREVIEW_CURVE_COLOUR);
        }
    }

    for slot in VehicleSlot::ALL {
        if let Some(assignment) = library.assignment(slot) {
            gizmos.linestrip(
                assignment.curve.sample_points(CURVE_SAMPLES),
                ASSIGNED_CURVE_COLOURS[slot.index()],
            );
        }
    }
}
