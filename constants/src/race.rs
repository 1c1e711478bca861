/// Longitudinal acceleration applied while racing (units/s²)
pub const RACE_ACCELERATION: f32 = 10.0;

/// Top speed a racing vehicle can reach (units/s)
pub const RACE_MAX_SPEED: f32 = 40.0;

/// Race clock advance per elapsed second. Camera keyframes are stamped in race time.
pub const RACE_CLOCK_RATE: f32 = 0.5;

/// Parameter offset used to look ahead along the curve when estimating curvature
pub const DRIFT_LOOKAHEAD: f32 = 0.02;

/// Upper bound for the look-ahead parameter so it never wraps past the seam
pub const DRIFT_LOOKAHEAD_LIMIT: f32 = 0.999;

/// Turn intensity to drift angle gain
pub const DRIFT_GAIN: f32 = 4.0;

/// Largest oversteer angle in radians
pub const MAX_DRIFT_ANGLE: f32 = 0.8;

/// Drift smoothing rate (per second)
pub const DRIFT_SMOOTHING: f32 = 5.0;

/// Wheel spin per unit of distance while racing
pub const RACE_WHEEL_SPIN_FACTOR: f32 = 0.5;

/// Fraction of the drift angle fed into front wheel counter-steer
pub const WHEEL_STEER_FACTOR: f32 = 0.5;

/// Arc-length parameter the vehicle faces when teleported to a path start
pub const START_FACING_OFFSET: f32 = 0.01;
