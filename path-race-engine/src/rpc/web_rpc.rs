use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::engine::core::frame::FrameSet;
use crate::engine::core::config::RaceConfigUpdate;
use crate::engine::core::session::{CameraAngles, Session, VehicleSlot};
use crate::tools::camera_recorder::{CameraRecorder, RecorderMode};
use crate::tools::intents::Intent;
use crate::tools::path_library::PathLibrary;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the host page.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Notifications queued since the last flush.
    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing the postMessage RPC bridge.
///
/// Incoming requests become [`Intent`] events ahead of the dispatcher;
/// outgoing messages are flushed once the frame has settled.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (process_incoming_messages, handle_rpc_messages)
                    .chain()
                    .before(FrameSet::Intents),
            )
            .add_systems(Update, send_outgoing_messages.after(FrameSet::FloorClamp));

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Hands strings from the JS callback to the frame loop.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    match window() {
        Some(window) => {
            if let Err(err) = window
                .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            {
                error!("[RPC] Failed to register message listener: {:?}", err);
            }
        }
        None => error!("[RPC] Window object not available"),
    }

    // Ownership moves to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Raw RPC message received from the host page.
#[derive(Event)]
pub struct IncomingRpcMessage {
    pub content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Read-only state the query methods report on.
struct StateView<'a> {
    session: &'a Session,
    library: &'a PathLibrary,
    recorder_mode: RecorderMode,
    fps: f32,
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Option<Res<DiagnosticsStore>>,
    session: Res<Session>,
    library: Res<PathLibrary>,
    recorder: Res<CameraRecorder>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut intents: EventWriter<Intent>,
) {
    let fps = diagnostics
        .as_deref()
        .and_then(|diagnostics| diagnostics.get(&FrameTimeDiagnosticsPlugin::FPS))
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;
    let view = StateView {
        session: &session,
        library: &library,
        recorder_mode: recorder.mode(),
        fps,
    };

    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("[RPC] Processing method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &view, &mut intents) {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("[RPC] Parse error: {}", parse_error);
                rpc_interface.queue_response(create_error_response(
                    serde_json::Value::Null,
                    -32600,
                    "Invalid request",
                    Some(serde_json::json!({ "reason": parse_error.to_string() })),
                ));
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
///
/// Action methods queue an [`Intent`]; the response only acknowledges the
/// request, and a later rejection arrives as an `action_rejected` notification.
fn handle_rpc_request(
    request: &RpcRequest,
    view: &StateView,
    intents: &mut EventWriter<Intent>,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "get_state" => handle_get_state(view),
        "get_fps" => Ok(serde_json::json!({ "fps": view.fps })),
        method => parse_intent(method, &request.params).map(|intent| {
            let action = intent.action_name();
            intents.write(intent);
            serde_json::json!({ "accepted": true, "action": action })
        }),
    };

    // Only requests with IDs get responses.
    let Some(id) = request.id.clone() else {
        if let Err(error) = result {
            warn!("[RPC] {} failed: {}", request.method, error.message);
        }
        return None;
    };

    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => {
            warn!("[RPC] {} failed: {}", request.method, error.message);
            Some(RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(error),
                id: Some(id),
            })
        }
    }
}

#[derive(Serialize)]
struct PathSummary<'a> {
    name: &'a str,
    points: usize,
    closed: bool,
}

#[derive(Serialize)]
struct StateSnapshot<'a> {
    active_vehicle: Option<usize>,
    active_camera: &'a str,
    angles: CameraAngles,
    free_cam: bool,
    racing: bool,
    race_time: f32,
    recorder: String,
    paths: Vec<PathSummary<'a>>,
    selected_path: Option<usize>,
    assignments: Vec<Option<&'a str>>,
}

fn handle_get_state(view: &StateView) -> Result<serde_json::Value, RpcError> {
    let snapshot = StateSnapshot {
        active_vehicle: view.session.active_vehicle.map(|slot| slot.index() + 1),
        active_camera: view.session.active_camera_name(),
        angles: view.session.angles,
        free_cam: view.session.free_cam,
        racing: view.session.racing,
        race_time: view.session.race_time,
        recorder: format!("{:?}", view.recorder_mode),
        paths: view
            .library
            .paths()
            .iter()
            .map(|path| PathSummary {
                name: &path.name,
                points: path.points.len(),
                closed: path.closed,
            })
            .collect(),
        selected_path: view.library.selected(),
        assignments: VehicleSlot::ALL
            .into_iter()
            .map(|slot| view.library.assignment(slot).map(|assigned| assigned.name.as_str()))
            .collect(),
    };

    serde_json::to_value(snapshot).map_err(|err| {
        error!("[RPC] Failed to serialize state: {}", err);
        RpcError::internal_error(&err.to_string())
    })
}

fn params<T: DeserializeOwned>(params: &serde_json::Value, expected: &str) -> Result<T, RpcError> {
    // Methods without arguments may omit params entirely.
    let value = if params.is_null() {
        serde_json::json!({})
    } else {
        params.clone()
    };
    serde_json::from_value(value).map_err(|_| RpcError::invalid_params(expected))
}

/// 1-based vehicle number as shown in the UI.
fn vehicle_slot(vehicle: usize) -> Result<VehicleSlot, RpcError> {
    vehicle
        .checked_sub(1)
        .and_then(VehicleSlot::from_index)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown vehicle: {vehicle}")))
}

/// Map an RPC method and its params onto an [`Intent`].
pub fn parse_intent(method: &str, raw: &serde_json::Value) -> Result<Intent, RpcError> {
    #[derive(Deserialize)]
    struct Point {
        x: f32,
        y: f32,
        z: f32,
    }

    #[derive(Deserialize)]
    struct SavePathParams {
        #[serde(default)]
        name: String,
        #[serde(default)]
        overwrite: bool,
    }

    #[derive(Deserialize)]
    struct IndexParams {
        index: usize,
    }

    #[derive(Deserialize)]
    struct OptionalIndexParams {
        #[serde(default)]
        index: Option<usize>,
    }

    #[derive(Deserialize)]
    struct RenameParams {
        index: usize,
        name: String,
    }

    #[derive(Deserialize)]
    struct VehicleParams {
        vehicle: usize,
        #[serde(default)]
        index: Option<usize>,
    }

    #[derive(Deserialize)]
    struct LoadParams {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        json: Option<serde_json::Value>,
        #[serde(default)]
        path: Option<String>,
    }

    #[derive(Deserialize)]
    struct NameParams {
        #[serde(default)]
        name: Option<String>,
    }

    let intent = match method {
        "add_point" => {
            let point: Point = params(raw, "Expected 'x', 'y' and 'z'")?;
            Intent::AddPoint(Vec3::new(point.x, point.y, point.z))
        }
        "undo" => Intent::Undo,
        "redo" => Intent::Redo,
        "clear_path" => Intent::ClearPath,
        "close_loop" => Intent::CloseLoop,
        "save_path" => {
            let save: SavePathParams = params(raw, "Expected optional 'name' and 'overwrite'")?;
            Intent::SavePath {
                name: save.name,
                overwrite: save.overwrite,
            }
        }
        "select_path" => {
            let select: OptionalIndexParams = params(raw, "Expected optional 'index'")?;
            Intent::SelectPath(select.index)
        }
        "rename_path" => {
            let rename: RenameParams = params(raw, "Expected 'index' and 'name'")?;
            Intent::RenamePath {
                index: rename.index,
                name: rename.name,
            }
        }
        "edit_path" => {
            let edit: IndexParams = params(raw, "Expected 'index'")?;
            Intent::EditPath(edit.index)
        }
        "assign_path" => {
            let assign: VehicleParams = params(raw, "Expected 'vehicle' and optional 'index'")?;
            Intent::Assign {
                slot: vehicle_slot(assign.vehicle)?,
                index: assign.index,
            }
        }
        "deassign_path" => {
            let deassign: VehicleParams = params(raw, "Expected 'vehicle'")?;
            Intent::Deassign(vehicle_slot(deassign.vehicle)?)
        }
        "start_race" => Intent::StartRace,
        "reset_race" => Intent::ResetRace,
        "drive_toggle" => {
            let drive: VehicleParams = params(raw, "Expected 'vehicle'")?;
            Intent::DriveToggle(vehicle_slot(drive.vehicle)?)
        }
        "record_toggle" => Intent::RecordToggle,
        "stop_playback" => Intent::StopPlayback,
        "load_document" => {
            let load: LoadParams = params(raw, "Expected 'path' or 'json'")?;
            match (load.path, load.json) {
                (Some(path), _) => Intent::RequestLoad(path),
                (None, Some(json)) => Intent::LoadDocument {
                    name: load.name.unwrap_or_else(|| "document".to_string()),
                    // Hosts may send the document inline or as a string.
                    json: match json {
                        serde_json::Value::String(text) => text,
                        other => other.to_string(),
                    },
                },
                (None, None) => return Err(RpcError::invalid_params("Expected 'path' or 'json'")),
            }
        }
        "save_camera" => {
            let save: NameParams = params(raw, "Expected optional 'name'")?;
            Intent::SaveCamera(save.name)
        }
        "overwrite_camera" => {
            let overwrite: NameParams = params(raw, "Expected optional 'name'")?;
            Intent::OverwriteCamera(overwrite.name)
        }
        "select_camera" => {
            let select: NameParams = params(raw, "Expected optional 'name'")?;
            Intent::SelectCamera(select.name)
        }
        "set_camera_angles" => {
            let angles: CameraAngles = params(raw, "Expected 'pitch', 'yaw' and 'roll'")?;
            Intent::SetCameraAngles(angles)
        }
        "reset_camera_angles" => Intent::ResetCameraAngles,
        "toggle_free_cam" => Intent::ToggleFreeCam,
        "toggle_hud" => Intent::ToggleHud,
        "export_camera_configs" => Intent::ExportCameraConfigs,
        "set_race_config" => {
            let update: RaceConfigUpdate =
                params(raw, "Expected 'acceleration', 'max_speed' or 'clock_rate'")?;
            Intent::SetRaceConfig(update)
        }
        _ => return Err(RpcError::method_not_found(method)),
    };
    Ok(intent)
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("[RPC] Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("[RPC] No parent window available for message transmission");
                    }
                } else {
                    error!("[RPC] Window object not available");
                }
            }
            Err(e) => {
                error!("[RPC] Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No host page on native builds.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(reason: &str) -> Self {
        Self {
            code: -32603,
            message: "Internal error".to_string(),
            data: Some(serde_json::json!({ "reason": reason })),
        }
    }
}
