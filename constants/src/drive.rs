/// Forward acceleration while the accelerate intent is held (units/s²)
pub const DRIVE_ACCELERATION: f32 = 0.5;

/// Forward top speed for manual driving (units/s)
pub const DRIVE_MAX_SPEED: f32 = 35.0;

/// Yaw rate at full steering lock (rad/s)
pub const DRIVE_STEER_SPEED: f32 = 2.0;

/// Per-frame speed retention when coasting
pub const DRIVE_FRICTION: f32 = 0.98;

/// Reverse top speed as a fraction of the forward top speed
pub const REVERSE_SPEED_RATIO: f32 = 0.5;

/// Braking/reverse acceleration multiplier
pub const REVERSE_ACCELERATION_RATIO: f32 = 2.0;

/// Coasting speed below which the vehicle is considered stopped
pub const STOP_SPEED_THRESHOLD: f32 = 0.01;

/// Speed below which the vehicle neither translates nor yaws
pub const MOTION_EPSILON: f32 = 0.001;

/// Per-frame low-pass factor for steering input
pub const STEER_SMOOTHING: f32 = 0.1;

/// Wheel spin per unit of distance while driving
pub const DRIVE_WHEEL_SPIN_FACTOR: f32 = 5.0;
