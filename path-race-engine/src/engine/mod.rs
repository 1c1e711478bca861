pub mod assets;
pub mod camera;
pub mod core;
pub mod curve;
pub mod motion;
pub mod scene;
