use bevy::prelude::*;
use constants::physics::MAX_FRAME_DELTA;

/// Fixed per-frame update order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Intents,
    Motion,
    Physics,
    CameraSelection,
    CameraPose,
    FloorClamp,
}

pub fn configure_frame_sets(app: &mut App) {
    app.configure_sets(
        Update,
        (
            FrameSet::Intents,
            FrameSet::Motion,
            FrameSet::Physics,
            FrameSet::CameraSelection,
            FrameSet::CameraPose,
            FrameSet::FloorClamp,
        )
            .chain(),
    );
}

/// Frame delta in seconds, clamped so a stalled frame cannot tunnel through terrain.
pub fn frame_delta(time: &Time) -> f32 {
    time.delta_secs().min(MAX_FRAME_DELTA)
}
