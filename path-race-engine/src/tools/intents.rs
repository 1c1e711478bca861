//! Typed user actions and the single system that applies them.
//!
//! Keyboard shortcuts, mouse editing and JSON-RPC requests all produce
//! [`Intent`] events. [`dispatch_intents`] applies them in arrival order at the
//! start of the frame; a rejected intent leaves state untouched, is logged, and
//! is reported to the host as an `action_rejected` notification.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use constants::camera::DEFAULT_CHASE_NAME;
use serde::Serialize;

use crate::engine::assets::documents::{CameraDocument, Document};
use crate::engine::assets::export::{
    camera_configs_file_name, export_document, path_file_name, replay_file_name, timestamp_millis,
};
use crate::engine::assets::loading::apply_camera_document;
use crate::engine::camera::rig::{MainCamera, overwrite_camera, save_camera};
use crate::engine::core::config::{EditorConfig, ExportConfig, RaceConfig, RaceConfigUpdate};
use crate::engine::core::errors::{ActionError, CameraError, PathError};
use crate::engine::core::session::{CameraAngles, Session, VehicleSlot};
use crate::engine::motion::race::{RaceState, reset_race, start_race, start_pose};
use crate::engine::scene::ground::Ground;
use crate::engine::scene::vehicles::Vehicle;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::camera_recorder::CameraRecorder;
use crate::tools::path_editor::{PathEditor, WaypointId};
use crate::tools::path_library::PathLibrary;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum Intent {
    /// Surface point under the cursor; the editor lifts it.
    AddPoint(Vec3),
    Undo,
    Redo,
    ClearPath,
    CloseLoop,
    /// Save the editor contents. `overwrite` replaces the path being edited.
    SavePath { name: String, overwrite: bool },
    SelectPath(Option<usize>),
    RenamePath { index: usize, name: String },
    EditPath(usize),
    /// Assign a stored path, or the selected one when `index` is `None`.
    Assign { slot: VehicleSlot, index: Option<usize> },
    Deassign(VehicleSlot),
    StartRace,
    ResetRace,
    DriveToggle(VehicleSlot),
    RecordToggle,
    /// End replay playback and hand the camera back to the user.
    StopPlayback,
    /// Raw document JSON, e.g. dropped or posted by the host page.
    LoadDocument { name: String, json: String },
    /// Asset path of a document to load asynchronously.
    RequestLoad(String),
    SaveCamera(Option<String>),
    OverwriteCamera(Option<String>),
    /// `None` or "Default Chase" selects the chase camera.
    SelectCamera(Option<String>),
    SetCameraAngles(CameraAngles),
    ResetCameraAngles,
    ToggleFreeCam,
    ExportCameraConfigs,
    SetRaceConfig(RaceConfigUpdate),
    ToggleHud,
    BeginDrag(WaypointId),
    /// Move a dragged waypoint over the ground below `target`.
    DragWaypoint { id: WaypointId, target: Vec3 },
    EndDrag(WaypointId),
}

impl Intent {
    /// Action name reported to the host, matching the RPC method names.
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::AddPoint(_) => "add_point",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::ClearPath => "clear_path",
            Self::CloseLoop => "close_loop",
            Self::SavePath { .. } => "save_path",
            Self::SelectPath(_) => "select_path",
            Self::RenamePath { .. } => "rename_path",
            Self::EditPath(_) => "edit_path",
            Self::Assign { .. } => "assign_path",
            Self::Deassign(_) => "deassign_path",
            Self::StartRace => "start_race",
            Self::ResetRace => "reset_race",
            Self::DriveToggle(_) => "drive_toggle",
            Self::RecordToggle => "record_toggle",
            Self::StopPlayback => "stop_playback",
            Self::LoadDocument { .. } | Self::RequestLoad(_) => "load_document",
            Self::SaveCamera(_) => "save_camera",
            Self::OverwriteCamera(_) => "overwrite_camera",
            Self::SelectCamera(_) => "select_camera",
            Self::SetCameraAngles(_) => "set_camera_angles",
            Self::ResetCameraAngles => "reset_camera_angles",
            Self::ToggleFreeCam => "toggle_free_cam",
            Self::ExportCameraConfigs => "export_camera_configs",
            Self::SetRaceConfig(_) => "set_race_config",
            Self::ToggleHud => "toggle_hud",
            Self::BeginDrag(_) => "begin_drag",
            Self::DragWaypoint { .. } => "drag_waypoint",
            Self::EndDrag(_) => "end_drag",
        }
    }
}

/// Everything an intent may touch.
#[derive(SystemParam)]
pub struct EngineState<'w, 's> {
    session: ResMut<'w, Session>,
    editor: ResMut<'w, PathEditor>,
    library: ResMut<'w, PathLibrary>,
    recorder: ResMut<'w, CameraRecorder>,
    race_config: ResMut<'w, RaceConfig>,
    editor_config: Res<'w, EditorConfig>,
    export_config: Res<'w, ExportConfig>,
    ground: Res<'w, Ground>,
    rpc_interface: ResMut<'w, WebRpcInterface>,
    vehicles: Query<'w, 's, (&'static mut Transform, &'static mut Vehicle), Without<MainCamera>>,
    camera: Query<'w, 's, &'static Transform, (With<MainCamera>, Without<Vehicle>)>,
}

pub fn dispatch_intents(mut intents: EventReader<Intent>, mut state: EngineState) {
    for intent in intents.read() {
        if let Err(err) = state.apply(intent) {
            warn!("[{}] {} rejected: {}", log_tag(intent), intent.action_name(), err);
            state.rpc_interface.send_notification(
                "action_rejected",
                serde_json::json!({
                    "action": intent.action_name(),
                    "reason": err.to_string(),
                }),
            );
        }
    }
}

fn log_tag(intent: &Intent) -> &'static str {
    match intent {
        Intent::StartRace
        | Intent::ResetRace
        | Intent::DriveToggle(_)
        | Intent::SetRaceConfig(_)
        | Intent::Assign { .. }
        | Intent::Deassign(_) => "RACE",
        Intent::RecordToggle | Intent::StopPlayback => "REC",
        Intent::LoadDocument { .. } | Intent::RequestLoad(_) | Intent::ExportCameraConfigs => "DOC",
        Intent::SaveCamera(_)
        | Intent::OverwriteCamera(_)
        | Intent::SelectCamera(_)
        | Intent::SetCameraAngles(_)
        | Intent::ResetCameraAngles
        | Intent::ToggleFreeCam
        | Intent::ToggleHud => "CAM",
        _ => "PATH",
    }
}

impl EngineState<'_, '_> {
    fn apply(&mut self, intent: &Intent) -> Result<(), ActionError> {
        match intent {
            Intent::AddPoint(surface_point) => {
                let id = self.editor.add_waypoint(*surface_point, true);
                debug!("[PATH] Added waypoint {:?} at {:?}", id, surface_point);
            }
            Intent::Undo => {
                if !self.editor.undo() {
                    debug!("[PATH] Nothing to undo");
                }
            }
            Intent::Redo => {
                if !self.editor.redo() {
                    debug!("[PATH] Nothing to redo");
                }
            }
            Intent::ClearPath => {
                self.editor.remove_all();
                info!("[PATH] Cleared waypoints");
            }
            Intent::CloseLoop => {
                self.editor.close_loop()?;
                info!("[PATH] Closed loop with {} waypoints", self.editor.len());
            }
            Intent::SavePath { name, overwrite } => self.save_path(name, *overwrite)?,
            Intent::SelectPath(index) => self.library.select(*index)?,
            Intent::RenamePath { index, name } => {
                self.library.rename(*index, name)?;
                info!("[PATH] Renamed path {} to \"{}\"", index, name.trim());
            }
            Intent::EditPath(index) => {
                self.library.begin_edit(*index, &mut self.editor)?;
                info!("[PATH] Editing path {}", index);
            }
            Intent::Assign { slot, index } => self.assign(*slot, *index)?,
            Intent::Deassign(slot) => self.deassign(*slot),
            Intent::StartRace => {
                start_race(&mut self.session, &mut self.library)?;
                info!("[RACE] Race started");
            }
            Intent::ResetRace => {
                for (slot, pose) in reset_race(&mut self.session, &mut self.library) {
                    self.place_vehicle(slot, pose);
                }
                info!("[RACE] Race reset");
            }
            Intent::DriveToggle(slot) => {
                if self.session.toggle_drive(*slot) {
                    if let Some((_, mut vehicle)) = self.vehicle_mut(*slot) {
                        vehicle.halt();
                    }
                    info!("[RACE] Driving vehicle {}", slot.index() + 1);
                } else {
                    info!("[RACE] Stopped driving vehicle {}", slot.index() + 1);
                }
            }
            Intent::RecordToggle => self.toggle_recording(),
            Intent::StopPlayback => {
                if self.recorder.is_playing() {
                    self.recorder.stop_playing();
                    info!("[REC] Playback stopped");
                } else {
                    debug!("[REC] No replay playing");
                }
            }
            Intent::LoadDocument { name, json } => self.load_document(name, json)?,
            // Asset loads are queued by the document plugin.
            Intent::RequestLoad(_) => {}
            Intent::SaveCamera(name) => self.save_camera(name.as_deref())?,
            Intent::OverwriteCamera(name) => self.overwrite_camera(name.as_deref())?,
            Intent::SelectCamera(name) => self.select_camera(name.clone())?,
            Intent::SetCameraAngles(angles) => self.session.angles = *angles,
            Intent::ResetCameraAngles => self.session.angles = CameraAngles::default(),
            Intent::ToggleFreeCam => {
                self.session.free_cam = !self.session.free_cam;
                info!("[CAM] Free camera {}", if self.session.free_cam { "on" } else { "off" });
            }
            Intent::ExportCameraConfigs => self.export_camera_configs()?,
            Intent::SetRaceConfig(update) => {
                self.race_config.apply(*update);
                info!("[RACE] Race settings now {:?}", *self.race_config);
            }
            Intent::ToggleHud => self.session.hud_visible = !self.session.hud_visible,
            Intent::BeginDrag(id) => {
                if !self.editor.begin_drag(*id) {
                    debug!("[PATH] No waypoint {:?} to drag", id);
                }
            }
            Intent::DragWaypoint { id, target } => {
                let probe = *target + Vec3::Y * self.editor_config.drag_probe_lift;
                let surface = self.ground.surface_below(probe).unwrap_or(*target);
                self.editor
                    .move_waypoint(*id, surface + Vec3::Y * self.editor_config.waypoint_lift);
            }
            Intent::EndDrag(id) => {
                if self.editor.end_drag(*id) {
                    info!("[PATH] Snapped last waypoint onto the first");
                }
            }
        }
        Ok(())
    }

    fn vehicle_mut(&mut self, slot: VehicleSlot) -> Option<(Mut<'_, Transform>, Mut<'_, Vehicle>)> {
        self.vehicles
            .iter_mut()
            .find(|(_, vehicle)| vehicle.slot == slot)
    }

    fn camera_transform(&self) -> Transform {
        self.camera.single().ok().copied().unwrap_or_default()
    }

    /// Teleport a vehicle and stop it.
    fn place_vehicle(&mut self, slot: VehicleSlot, pose: Transform) {
        if let Some((mut transform, mut vehicle)) = self.vehicle_mut(slot) {
            *transform = pose;
            vehicle.halt();
        }
    }

    fn export<T: Serialize>(&mut self, file_name: &str, document: &T) {
        match export_document(&self.export_config, file_name, document, &mut self.rpc_interface) {
            Ok(location) => info!("[DOC] Exported {}", location),
            Err(err) => error!("[DOC] Export of {} failed: {:#}", file_name, err),
        }
    }

    fn save_path(&mut self, name: &str, overwrite: bool) -> Result<(), ActionError> {
        let outcome = self.library.save_from_editor(&self.editor, name, overwrite)?;
        let index = outcome.index;
        let stored_name = self.library.get(index)?.name.clone();

        if outcome.overwritten {
            info!("[PATH] Updated \"{}\"", stored_name);
        } else {
            info!("[PATH] Saved \"{}\" as path {}", stored_name, index);
            let document = self.library.export(index)?;
            self.export(&path_file_name(&stored_name), &document);
        }
        Ok(())
    }

    fn assign(&mut self, slot: VehicleSlot, index: Option<usize>) -> Result<(), ActionError> {
        let index = index
            .or(self.library.selected())
            .ok_or(PathError::NothingSelected)?;
        let assignment = self.library.assign(slot, index)?;
        let pose = start_pose(&assignment.curve);
        let name = assignment.name.clone();

        if self.session.racing {
            if let Some(assignment) = self.library.assignment_mut(slot) {
                assignment.race_state = Some(RaceState::default());
            }
        }

        self.place_vehicle(slot, pose);
        info!("[RACE] Assigned \"{}\" to vehicle {}", name, slot.index() + 1);
        Ok(())
    }

    fn deassign(&mut self, slot: VehicleSlot) {
        match self.library.deassign(slot) {
            Some(assignment) => info!(
                "[RACE] Removed \"{}\" from vehicle {}",
                assignment.name,
                slot.index() + 1
            ),
            None => debug!("[RACE] Vehicle {} had no path", slot.index() + 1),
        }

        let any_assigned = VehicleSlot::ALL
            .into_iter()
            .any(|slot| self.library.assignment(slot).is_some());
        if self.session.racing && !any_assigned {
            self.session.racing = false;
            info!("[RACE] Race stopped, no paths assigned");
        }
    }

    fn toggle_recording(&mut self) {
        if self.recorder.is_recording() {
            match self.recorder.stop_recording() {
                Some(keyframes) => {
                    info!("[REC] Recording stopped with {} keyframes", keyframes.len());
                    let document = CameraDocument::replay(keyframes);
                    self.export(&replay_file_name(timestamp_millis()), &document);
                }
                None => warn!("[REC] Recording stopped with no keyframes, nothing exported"),
            }
        } else {
            let time = self.session.keyframe_time();
            self.recorder
                .start_recording(time, self.session.active_camera_name(), self.session.angles);
            info!("[REC] Recording from race time {:.2}", time);
        }
    }

    fn load_document(&mut self, name: &str, json: &str) -> Result<(), ActionError> {
        match Document::parse(json)? {
            Document::Path(document) => {
                let index = self.library.load_document(name, &document)?;
                info!("[DOC] Loaded {} as path {}", name, index);
            }
            Document::Camera(document) => {
                let active = self.session.active_vehicle;
                let vehicle = self
                    .vehicles
                    .iter_mut()
                    .map(|(_, vehicle)| vehicle)
                    .find(|vehicle| Some(vehicle.slot) == active)
                    .map(Mut::into_inner);
                let outcome = apply_camera_document(&document, vehicle, &mut self.recorder)?;
                info!("[DOC] Loaded {}: {:?}", name, outcome);
            }
        }
        Ok(())
    }

    fn save_camera(&mut self, name: Option<&str>) -> Result<(), ActionError> {
        let slot = self.session.active_vehicle.ok_or(CameraError::NoActiveVehicle)?;
        let camera = self.camera_transform();
        let (transform, mut vehicle) = self.vehicle_mut(slot).ok_or(CameraError::NoActiveVehicle)?;
        let saved = save_camera(&mut vehicle, &transform, &camera, name)?;

        self.session.switch_camera(Some(saved.clone()), &mut self.recorder);
        info!("[CAM] Saved camera \"{}\" on vehicle {}", saved, slot.index() + 1);
        Ok(())
    }

    fn overwrite_camera(&mut self, new_name: Option<&str>) -> Result<(), ActionError> {
        let slot = self.session.active_vehicle.ok_or(CameraError::NoActiveVehicle)?;
        let active = self.session.active_camera().map(str::to_string);
        let camera = self.camera_transform();
        let (transform, mut vehicle) = self.vehicle_mut(slot).ok_or(CameraError::NoActiveVehicle)?;
        let name = overwrite_camera(&mut vehicle, &transform, &camera, active.as_deref(), new_name)?;

        self.session.switch_camera(Some(name.clone()), &mut self.recorder);
        info!("[CAM] Overwrote camera \"{}\"", name);
        Ok(())
    }

    fn select_camera(&mut self, name: Option<String>) -> Result<(), ActionError> {
        let name = name.filter(|name| name != DEFAULT_CHASE_NAME);

        if let (Some(name), Some(slot)) = (&name, self.session.followed_vehicle()) {
            let known = self
                .vehicles
                .iter()
                .any(|(_, vehicle)| vehicle.slot == slot && vehicle.camera(name).is_some());
            if !known {
                return Err(CameraError::UnknownCamera(Some(name.clone())).into());
            }
        }

        if self.session.switch_camera(name, &mut self.recorder) {
            info!("[CAM] Switched to \"{}\"", self.session.active_camera_name());
        }
        Ok(())
    }

    fn export_camera_configs(&mut self) -> Result<(), ActionError> {
        let slot = self.session.active_vehicle.ok_or(CameraError::NoActiveVehicle)?;
        let document = self
            .vehicles
            .iter()
            .find(|(_, vehicle)| vehicle.slot == slot)
            .map(|(_, vehicle)| CameraDocument::camera_configs(&vehicle.cameras))
            .ok_or(CameraError::NoActiveVehicle)?;

        self.export(&camera_configs_file_name(timestamp_millis()), &document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_names_match_rpc_methods() {
        assert_eq!(Intent::Assign { slot: VehicleSlot::Primary, index: None }.action_name(), "assign_path");
        assert_eq!(Intent::RequestLoad("a.path.json".into()).action_name(), "load_document");
        assert_eq!(Intent::SetCameraAngles(CameraAngles::default()).action_name(), "set_camera_angles");
    }

    #[test]
    fn log_tags_group_actions_by_subsystem() {
        assert_eq!(log_tag(&Intent::StartRace), "RACE");
        assert_eq!(log_tag(&Intent::RecordToggle), "REC");
        assert_eq!(log_tag(&Intent::StopPlayback), "REC");
        assert_eq!(log_tag(&Intent::SelectCamera(None)), "CAM");
        assert_eq!(log_tag(&Intent::CloseLoop), "PATH");
    }
}
