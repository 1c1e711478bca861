//! Core application setup and shared state.
//!
//! Handles plugin assembly, window configuration, per-frame ordering, the
//! session context, runtime tuning and the error types every module reports.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Assembles the headless simulation with documents, scene, controls and the
/// RPC bridge for native and WASM builds.
pub mod app_setup;

/// Runtime tuning resources.
pub mod config;

/// Typed errors for rejected actions and malformed documents.
pub mod errors;

/// Per-frame system ordering and delta clamping.
pub mod frame;

/// Session context: active vehicle, camera, race clock and user angles.
pub mod session;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
