//! Path drawing, racing and camera replay on a procedural terrain.
//!
//! Users sketch waypoint paths over the ground, store and assign them to two
//! vehicles, race them with a drifting motion model or drive them manually,
//! and record camera switches for later replay.

pub mod engine;
pub mod rpc;
pub mod tools;
