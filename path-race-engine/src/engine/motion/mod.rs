//! Vehicle motion: curve-following races, manual driving and free-roam physics.
//!
//! Every solver here is a pure step function plus a thin Bevy system that
//! applies it to vehicle entities in the `Motion` and `Physics` frame sets.

/// Keyboard-driven speed and steering for the active vehicle.
pub mod drive;

/// Gravity, ground snap and fall-through respawn.
pub mod free_roam;

/// Distance-parameterised race solver with drift.
pub mod race;

/// Declarative wheel hierarchy and its spin/steer kinematics.
pub mod wheels;
