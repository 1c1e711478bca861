use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::engine::assets::documents::{CameraDocument, PathDocument};
use crate::engine::camera::rig::CameraDefinition;
use crate::engine::core::errors::DocumentError;
use crate::engine::core::session::Session;
use crate::engine::scene::vehicles::Vehicle;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::camera_recorder::CameraRecorder;
use crate::tools::intents::Intent;
use crate::tools::path_library::PathLibrary;

#[derive(Debug, Clone)]
enum PendingHandle {
    Path(Handle<PathDocument>),
    Camera(Handle<CameraDocument>),
}

#[derive(Debug, Clone)]
struct PendingLoad {
    source: String,
    handle: PendingHandle,
}

/// Document loads requested but not yet resolved.
#[derive(Resource, Default)]
pub struct DocumentLoader {
    pending: Vec<PendingLoad>,
}

impl DocumentLoader {
    /// Start loading a document; the kind is chosen by its extension.
    pub fn request(&mut self, source: &str, asset_server: &AssetServer) -> Result<(), DocumentError> {
        let handle = if source.ends_with(".path.json") {
            PendingHandle::Path(asset_server.load(source.to_string()))
        } else if source.ends_with(".cameras.json") || source.ends_with(".replay.json") {
            PendingHandle::Camera(asset_server.load(source.to_string()))
        } else {
            return Err(DocumentError::UnsupportedExtension(source.to_string()));
        };

        self.pending.push(PendingLoad {
            source: source.to_string(),
            handle,
        });
        Ok(())
    }
}

/// What a camera document changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraDocumentOutcome {
    pub definitions_replaced: usize,
    pub definitions_added: usize,
    pub replay_keyframes: Option<usize>,
}

/// Apply a camera configuration and/or replay document.
///
/// Definitions need a vehicle to land on and replace existing cameras by
/// name. Keyframes replace the recorder contents and start playback. Nothing
/// changes when the document is rejected.
pub fn apply_camera_document(
    document: &CameraDocument,
    vehicle: Option<&mut Vehicle>,
    recorder: &mut CameraRecorder,
) -> Result<CameraDocumentOutcome, DocumentError> {
    document.validate()?;
    let mut outcome = CameraDocumentOutcome::default();

    if let Some(records) = document.definitions() {
        let vehicle = vehicle.ok_or(DocumentError::NoActiveVehicle)?;
        for record in records {
            let definition = CameraDefinition::from(record);
            match vehicle.cameras.iter_mut().find(|camera| camera.name == definition.name) {
                Some(existing) => {
                    *existing = definition;
                    outcome.definitions_replaced += 1;
                }
                None => {
                    vehicle.cameras.push(definition);
                    outcome.definitions_added += 1;
                }
            }
        }
    }

    if let Some(keyframes) = document.replay_keyframes() {
        recorder.load_replay(keyframes.to_vec());
        outcome.replay_keyframes = Some(keyframes.len());
    }

    Ok(outcome)
}

/// Document name without directories or the `.json` suffix.
pub fn document_name(source: &str) -> &str {
    let file_name = source.rsplit(['/', '\\']).next().unwrap_or(source);
    file_name.strip_suffix(".json").unwrap_or(file_name)
}

fn reject_load(rpc_interface: &mut WebRpcInterface, err: &DocumentError) {
    rpc_interface.send_notification(
        "action_rejected",
        serde_json::json!({
            "action": "load_document",
            "reason": err.to_string(),
        }),
    );
}

/// Queue asset loads for `RequestLoad` intents.
pub fn queue_document_requests(
    mut intents: EventReader<Intent>,
    mut loader: ResMut<DocumentLoader>,
    asset_server: Res<AssetServer>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for intent in intents.read() {
        let Intent::RequestLoad(source) = intent else {
            continue;
        };

        match loader.request(source, &asset_server) {
            Ok(()) => info!("[DOC] Loading {}", source),
            Err(err) => {
                warn!("[DOC] Load request rejected: {}", err);
                reject_load(&mut rpc_interface, &err);
            }
        }
    }
}

/// Apply finished loads before the frame's update runs.
pub fn resolve_document_loads(
    mut loader: ResMut<DocumentLoader>,
    asset_server: Res<AssetServer>,
    path_documents: Res<Assets<PathDocument>>,
    camera_documents: Res<Assets<CameraDocument>>,
    session: Res<Session>,
    mut library: ResMut<PathLibrary>,
    mut recorder: ResMut<CameraRecorder>,
    mut vehicles: Query<&mut Vehicle>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if loader.pending.is_empty() {
        return;
    }

    let pending = std::mem::take(&mut loader.pending);
    for load in pending {
        let id = match &load.handle {
            PendingHandle::Path(handle) => handle.id().untyped(),
            PendingHandle::Camera(handle) => handle.id().untyped(),
        };

        match asset_server.load_state(id) {
            LoadState::Loaded => {}
            LoadState::Failed(err) => {
                error!("[DOC] Failed to load {}: {}", load.source, err);
                let err = DocumentError::Unreadable {
                    path: load.source.clone(),
                    reason: err.to_string(),
                };
                reject_load(&mut rpc_interface, &err);
                continue;
            }
            _ => {
                loader.pending.push(load);
                continue;
            }
        }

        let name = document_name(&load.source);
        let result = match &load.handle {
            PendingHandle::Path(handle) => path_documents
                .get(handle)
                .ok_or(DocumentError::Unrecognised)
                .and_then(|document| library.load_document(name, document))
                .map(|index| format!("stored path {index}")),
            PendingHandle::Camera(handle) => {
                let active = session.active_vehicle;
                let vehicle = vehicles
                    .iter_mut()
                    .find(|vehicle| Some(vehicle.slot) == active);
                camera_documents
                    .get(handle)
                    .ok_or(DocumentError::Unrecognised)
                    .and_then(|document| {
                        apply_camera_document(
                            document,
                            vehicle.map(|vehicle| vehicle.into_inner()),
                            &mut recorder,
                        )
                    })
                    .map(|outcome| format!("{outcome:?}"))
            }
        };

        match result {
            Ok(summary) => {
                info!("[DOC] Loaded {} ({})", load.source, summary);
                rpc_interface.send_notification(
                    "document_loaded",
                    serde_json::json!({ "source": load.source }),
                );
            }
            Err(err) => {
                warn!("[DOC] Skipped {}: {}", load.source, err);
                reject_load(&mut rpc_interface, &err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::session::{CameraAngles, VehicleSlot};
    use crate::tools::camera_recorder::{CameraKeyframe, RecorderMode};

    fn definition(name: &str, offset: Vec3) -> CameraDefinition {
        CameraDefinition {
            name: name.to_string(),
            offset,
            rotation: Quat::from_rotation_y(0.4),
        }
    }

    #[test]
    fn configs_replace_by_name_and_append_new() {
        let mut vehicle = Vehicle::new(VehicleSlot::Primary, 0.0);
        vehicle.cameras.push(definition("Hood", Vec3::Y));
        let mut recorder = CameraRecorder::default();

        let document = CameraDocument::camera_configs(&[
            definition("Hood", Vec3::new(0.0, 2.0, 1.0)),
            definition("Wing", Vec3::X),
        ]);
        let outcome = apply_camera_document(&document, Some(&mut vehicle), &mut recorder).unwrap();

        assert_eq!(outcome.definitions_replaced, 1);
        assert_eq!(outcome.definitions_added, 1);
        assert_eq!(vehicle.cameras.len(), 2);
        assert!(vehicle.camera("Hood").unwrap().offset.distance(Vec3::new(0.0, 2.0, 1.0)) < 1e-5);
        assert_eq!(recorder.mode(), RecorderMode::Idle);
    }

    #[test]
    fn configs_without_vehicle_are_rejected() {
        let mut recorder = CameraRecorder::default();
        let document = CameraDocument::camera_configs(&[definition("Hood", Vec3::Y)]);
        assert!(matches!(
            apply_camera_document(&document, None, &mut recorder),
            Err(DocumentError::NoActiveVehicle)
        ));
    }

    #[test]
    fn replay_loads_without_vehicle_and_stops_recording() {
        let mut recorder = CameraRecorder::default();
        recorder.start_recording(0.0, "Default Chase", CameraAngles::default());

        let document = CameraDocument::replay(vec![
            CameraKeyframe::new(0.0, "A", CameraAngles::default()),
            CameraKeyframe::new(5.0, "B", CameraAngles::default()),
        ]);
        let outcome = apply_camera_document(&document, None, &mut recorder).unwrap();

        assert_eq!(outcome.replay_keyframes, Some(2));
        assert!(recorder.is_playing());
        assert_eq!(recorder.update(6.0).unwrap().camera_name, "B");
    }

    #[test]
    fn document_names_drop_directories_and_json_suffix() {
        assert_eq!(document_name("paths/touge.path.json"), "touge.path");
        assert_eq!(document_name("C:\\exports\\replay_1.replay.json"), "replay_1.replay");
        assert_eq!(document_name("plain"), "plain");
    }

    #[test]
    fn unreadable_documents_are_reported_as_rejected_loads() {
        let mut rpc_interface = WebRpcInterface::default();
        let err = DocumentError::Unreadable {
            path: "paths/missing.path.json".to_string(),
            reason: "file not found".to_string(),
        };
        reject_load(&mut rpc_interface, &err);

        let notifications = rpc_interface.pending_notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].method, "action_rejected");
        assert_eq!(notifications[0].params["action"], "load_document");
        assert_eq!(
            notifications[0].params["reason"],
            "could not read paths/missing.path.json: file not found"
        );
    }
}
