/// Endpoints closer than this close the path automatically
pub const AUTO_CLOSE_EPSILON: f32 = 0.1;

/// Dragging the last waypoint within this distance of the first snaps it closed
pub const DRAG_SNAP_DISTANCE: f32 = 3.0;

/// Height waypoints sit above the clicked surface
pub const WAYPOINT_LIFT: f32 = 0.5;

/// Height above a dragged waypoint where the ground probe starts
pub const DRAG_PROBE_LIFT: f32 = 50.0;

/// Samples used when drawing a curve
pub const CURVE_SAMPLES: usize = 200;

/// Divisions of the arc-length lookup table
pub const ARC_LENGTH_DIVISIONS: usize = 200;

/// Minimum control points for a curve
pub const MIN_PATH_POINTS: usize = 2;

/// Minimum control points for a closed loop
pub const MIN_LOOP_POINTS: usize = 3;
