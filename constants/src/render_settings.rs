use bevy::prelude::*;

/// Live editor curve
pub const EDITOR_CURVE_COLOUR: Color = Color::srgb(1.0, 1.0, 0.0);

/// Stored path preview
pub const PREVIEW_CURVE_COLOUR: Color = Color::srgba(0.0, 1.0, 1.0, 0.7);

/// Assigned path for each vehicle slot
pub const ASSIGNED_CURVE_COLOURS: [Color; 2] = [
    Color::srgb(0.0, 1.0, 1.0),
    Color::srgb(1.0, 0.65, 0.0),
];

/// Waypoint markers
pub const WAYPOINT_COLOUR: Color = Color::srgb(1.0, 0.0, 0.0);

pub const WAYPOINT_MARKER_RADIUS: f32 = 0.5;

/// Terrain grid lines
pub const GRID_COLOUR: Color = Color::srgba(0.5, 0.5, 0.5, 0.3);

/// Target spacing between terrain grid lines in metres
pub const GRID_CELL_SIZE: f32 = 4.0;

/// Vertical offset of the grid above the terrain surface
pub const GRID_LIFT: f32 = 0.05;

/// Vehicle body colour per slot
pub const VEHICLE_COLOURS: [Color; 2] = [Color::srgb(0.9, 0.9, 0.9), Color::srgb(0.8, 0.1, 0.1)];
