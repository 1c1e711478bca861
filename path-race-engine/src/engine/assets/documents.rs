use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::camera::rig::CameraDefinition;
use crate::engine::core::errors::DocumentError;
use crate::tools::camera_recorder::CameraKeyframe;
use constants::path::{MIN_LOOP_POINTS, MIN_PATH_POINTS};

const CAMERA_CONFIGS_TYPE: &str = "CameraConfigs";
const RACE_REPLAY_TYPE: &str = "RaceReplay";

/// `{x, y, z}` point as written in documents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for PointRecord {
    fn from(point: Vec3) -> Self {
        Self {
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

impl From<PointRecord> for Vec3 {
    fn from(record: PointRecord) -> Self {
        Vec3::new(record.x, record.y, record.z)
    }
}

/// Stored path. Loaded from `*.path.json`; a bare point array is accepted as an open path.
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PathDocumentRepr")]
pub struct PathDocument {
    pub points: Vec<PointRecord>,
    #[serde(rename = "isClosed")]
    pub is_closed: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathDocumentRepr {
    Bare(Vec<PointRecord>),
    Object {
        points: Vec<PointRecord>,
        #[serde(rename = "isClosed", default)]
        is_closed: bool,
    },
}

impl From<PathDocumentRepr> for PathDocument {
    fn from(repr: PathDocumentRepr) -> Self {
        match repr {
            PathDocumentRepr::Bare(points) => Self {
                points,
                is_closed: false,
            },
            PathDocumentRepr::Object { points, is_closed } => Self { points, is_closed },
        }
    }
}

impl PathDocument {
    pub fn new(points: &[Vec3], is_closed: bool) -> Self {
        Self {
            points: points.iter().copied().map(PointRecord::from).collect(),
            is_closed,
        }
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.points.iter().copied().map(Vec3::from).collect()
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.points.len() < MIN_PATH_POINTS {
            return Err(DocumentError::TooFewPoints {
                found: self.points.len(),
            });
        }
        if self.is_closed && self.points.len() < MIN_LOOP_POINTS {
            return Err(DocumentError::LoopNeedsThreePoints {
                found: self.points.len(),
            });
        }
        Ok(())
    }
}

/// Euler angles in radians, applied in YXZ order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EulerRecord {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDefinitionRecord {
    pub name: String,
    pub offset: PointRecord,
    pub rotation: EulerRecord,
}

impl From<&CameraDefinition> for CameraDefinitionRecord {
    fn from(definition: &CameraDefinition) -> Self {
        let (yaw, pitch, roll) = definition.rotation.to_euler(EulerRot::YXZ);
        Self {
            name: definition.name.clone(),
            offset: definition.offset.into(),
            rotation: EulerRecord { pitch, yaw, roll },
        }
    }
}

impl From<&CameraDefinitionRecord> for CameraDefinition {
    fn from(record: &CameraDefinitionRecord) -> Self {
        let EulerRecord { pitch, yaw, roll } = record.rotation;
        Self {
            name: record.name.clone(),
            offset: record.offset.into(),
            rotation: Quat::from_euler(EulerRot::YXZ, yaw, pitch, roll),
        }
    }
}

/// Camera configurations and/or a recorded replay. Loaded from `*.cameras.json`
/// and `*.replay.json`; recognised by `type` or by which fields are present.
#[derive(Asset, TypePath, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraDocument {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        rename = "cameraDefinitions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub camera_definitions: Option<Vec<CameraDefinitionRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyframes: Option<Vec<CameraKeyframe>>,
}

impl CameraDocument {
    pub fn camera_configs(definitions: &[CameraDefinition]) -> Self {
        Self {
            kind: Some(CAMERA_CONFIGS_TYPE.to_string()),
            camera_definitions: Some(definitions.iter().map(Into::into).collect()),
            keyframes: None,
        }
    }

    pub fn replay(keyframes: Vec<CameraKeyframe>) -> Self {
        Self {
            kind: Some(RACE_REPLAY_TYPE.to_string()),
            camera_definitions: None,
            keyframes: Some(keyframes),
        }
    }

    /// Camera definitions carried by the document, if it is a configuration document.
    pub fn definitions(&self) -> Option<&[CameraDefinitionRecord]> {
        match (&self.camera_definitions, self.kind.as_deref()) {
            (Some(definitions), _) => Some(definitions.as_slice()),
            (None, Some(CAMERA_CONFIGS_TYPE)) => Some(&[]),
            _ => None,
        }
    }

    /// Keyframes carried by the document. A replay `type` without keyframes loads nothing.
    pub fn replay_keyframes(&self) -> Option<&[CameraKeyframe]> {
        self.keyframes.as_deref()
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        let is_replay = self.kind.as_deref() == Some(RACE_REPLAY_TYPE) || self.keyframes.is_some();
        if self.definitions().is_none() && !is_replay {
            return Err(DocumentError::Unrecognised);
        }
        Ok(())
    }
}

/// Any document the engine understands, parsed from raw JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Path(PathDocument),
    Camera(CameraDocument),
}

impl Document {
    pub fn parse(json: &str) -> Result<Self, DocumentError> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        if value.is_array() || value.get("points").is_some() {
            let document: PathDocument = serde_json::from_value(value)?;
            document.validate()?;
            return Ok(Self::Path(document));
        }

        let document: CameraDocument = serde_json::from_value(value)?;
        document.validate()?;
        Ok(Self::Camera(document))
    }
}
