//! Tuning constants shared across the path race engine.

pub mod camera;
pub mod drive;
pub mod path;
pub mod physics;
pub mod race;
pub mod render_settings;
