//! Persisted documents: stored paths, camera configurations and replays.
//!
//! Documents are plain serde models registered as JSON assets. Loads are
//! requested through intents and resolved in `PreUpdate`, so a frame never
//! sees a half-applied document.

use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::engine::core::frame::FrameSet;

/// Serde models for the three document kinds.
pub mod documents;

/// JSON export to disk (native) or to the host page (WASM).
pub mod export;

/// Asynchronous load requests and their resolution.
pub mod loading;

use documents::{CameraDocument, PathDocument};
use loading::{DocumentLoader, queue_document_requests, resolve_document_loads};

pub struct DocumentPlugin;

impl Plugin for DocumentPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(JsonAssetPlugin::<PathDocument>::new(&["path.json"]))
            .add_plugins(JsonAssetPlugin::<CameraDocument>::new(&[
                "cameras.json",
                "replay.json",
            ]))
            .init_resource::<DocumentLoader>()
            .add_systems(PreUpdate, resolve_document_loads)
            .add_systems(Update, queue_document_requests.in_set(FrameSet::Intents));
    }
}
