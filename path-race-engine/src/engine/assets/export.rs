use anyhow::Context;
use serde::Serialize;

use crate::engine::core::config::ExportConfig;
use crate::rpc::web_rpc::WebRpcInterface;

/// Milliseconds since the Unix epoch, used to stamp exported file names.
pub fn timestamp_millis() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// File name for a stored path: whitespace runs become underscores.
pub fn path_file_name(name: &str) -> String {
    let stem = name.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}.path.json")
}

pub fn replay_file_name(timestamp: u64) -> String {
    format!("replay_{timestamp}.replay.json")
}

pub fn camera_configs_file_name(timestamp: u64) -> String {
    format!("cameras_{timestamp}.cameras.json")
}

/// Write a document as pretty JSON. Native builds write into the export
/// directory; WASM builds hand the document to the host page instead.
/// Returns where the document went.
pub fn export_document<T: Serialize>(
    config: &ExportConfig,
    file_name: &str,
    document: &T,
    rpc_interface: &mut WebRpcInterface,
) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = config;
        let value = serde_json::to_value(document)
            .with_context(|| format!("failed to serialise {file_name}"))?;
        rpc_interface.send_notification(
            "document_exported",
            serde_json::json!({
                "file_name": file_name,
                "document": value,
            }),
        );
        Ok(file_name.to_string())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = rpc_interface;
        write_document(&config.directory.join(file_name), document)
            .map(|path| path.display().to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_document<T: Serialize>(
    path: &std::path::Path,
    document: &T,
) -> anyhow::Result<std::path::PathBuf> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export directory {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(document)
        .with_context(|| format!("failed to serialise {}", path.display()))?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path.to_path_buf())
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::engine::assets::documents::PathDocument;
    use bevy::math::Vec3;

    #[test]
    fn file_names_follow_document_kinds() {
        assert_eq!(path_file_name("  Hill   Climb 2 "), "Hill_Climb_2.path.json");
        assert_eq!(replay_file_name(42), "replay_42.replay.json");
        assert_eq!(camera_configs_file_name(7), "cameras_7.cameras.json");
    }

    #[test]
    fn native_export_writes_pretty_json() {
        let directory = std::env::temp_dir().join(format!("path-race-export-{}", timestamp_millis()));
        let config = ExportConfig {
            directory: directory.clone(),
        };
        let document = PathDocument::new(&[Vec3::ZERO, Vec3::X], true);
        let mut rpc_interface = WebRpcInterface::default();

        let written = export_document(&config, "loop.path.json", &document, &mut rpc_interface).unwrap();
        let contents = std::fs::read_to_string(&written).unwrap();
        assert!(contents.contains("\"isClosed\": true"));

        let _ = std::fs::remove_dir_all(directory);
    }
}
