//! Camera rig for following vehicles, plus the free-flying camera.

/// Fly camera controller and cursor-to-ground picking.
pub mod free_camera;

/// Chase and saved vehicle-relative cameras, replay selection and floor clamp.
pub mod rig;
