/// Name shown for the built-in chase camera
pub const DEFAULT_CHASE_NAME: &str = "Default Chase";

/// Horizontal distance of the chase camera from the vehicle
pub const CHASE_DISTANCE: f32 = 10.0;

/// Height of the chase camera above the vehicle before pitch is applied
pub const CHASE_HEIGHT: f32 = 5.0;

/// Per-frame approach factor of the chase camera
pub const CHASE_SMOOTHING: f32 = 0.1;

/// Clearance kept between the camera and the terrain below it
pub const CAMERA_FLOOR_CLEARANCE: f32 = 1.2;

/// Height above the camera where the floor probe starts
pub const CAMERA_FLOOR_PROBE_LIFT: f32 = 10.0;

/// Smallest angle change (degrees) that produces a new keyframe while recording
pub const KEYFRAME_ANGLE_DEADBAND: f32 = 0.5;
