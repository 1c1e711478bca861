//! JSON-RPC 2.0 bridge between the engine and its host page.
//!
//! The WASM build runs inside an iframe; the host sends requests with
//! `postMessage` and receives responses and notifications the same way.
//!
//! ## Message Flow
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Engine (iframe)
//!        │                                          │
//!        ├─ Request (with ID) ────────────────────> ├─ parse_intent → Intent event
//!        │ <──────────────── Response (accepted) ───┤
//!        │                                          ├─ dispatcher applies the intent
//!        │ <──────── action_rejected notification ──┤  (only on failure)
//! ```
//!
//! Action methods only acknowledge the request: the intent runs later in the
//! same frame, so failures are reported through the `action_rejected`
//! notification `{ action, reason }`.
//!
//! ## Methods
//!
//! ### Path editing
//! - `add_point {x, y, z}`, `undo`, `redo`, `clear_path`, `close_loop`
//! - `save_path {name?, overwrite?}`, `select_path {index?}`,
//!   `rename_path {index, name}`, `edit_path {index}`
//!
//! ### Racing and driving
//! - `assign_path {vehicle, index?}`, `deassign_path {vehicle}`
//! - `start_race`, `reset_race`, `drive_toggle {vehicle}`
//! - `set_race_config {acceleration?, max_speed?, clock_rate?}`
//!
//! Vehicles are numbered 1 and 2.
//!
//! ### Cameras and replays
//! - `save_camera {name?}`, `overwrite_camera {name?}`, `select_camera {name?}`
//! - `set_camera_angles {pitch, yaw, roll}`, `reset_camera_angles`
//! - `toggle_free_cam`, `toggle_hud`, `record_toggle`, `stop_playback`, `export_camera_configs`
//! - `load_document {path}` or `load_document {name?, json}`
//!
//! ### Queries
//! - `get_state`: session, library and recorder summary
//! - `get_fps`: current frame rate
//!
//! ## Notifications
//! - `fps_update {fps}` every half second
//! - `action_rejected {action, reason}`
//! - `document_loaded {source}`
//! - `document_exported {file_name, document}` (WASM only)
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error, when a query result cannot be serialized

/// Request parsing, intent mapping and the postMessage transport.
pub mod web_rpc;
