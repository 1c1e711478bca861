/// Downward acceleration for free-roaming vehicles (units/s²)
pub const GRAVITY: f32 = 20.0;

/// Upper bound on a single frame step in seconds
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Height above the vehicle origin where the ground probe starts
pub const GROUND_PROBE_LIFT: f32 = 1.0;

/// Extra probe reach accepted as ground contact
pub const GROUND_CONTACT_TOLERANCE: f32 = 0.1;

/// Heights below this are treated as having fallen through the world
pub const WORLD_FLOOR: f32 = -50.0;

/// Height a fallen vehicle is placed back at
pub const RESPAWN_HEIGHT: f32 = 10.0;
