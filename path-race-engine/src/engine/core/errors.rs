use std::fmt;

/// Rejected path editing, library or curve operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    TooFewPoints { required: usize, found: usize },
    LoopNeedsThreePoints { found: usize },
    UnknownPath(usize),
    EmptyName,
    NothingSelected,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewPoints { required, found } => {
                write!(f, "path needs at least {required} points, found {found}")
            }
            Self::LoopNeedsThreePoints { found } => {
                write!(f, "need at least 3 points to close a loop, found {found}")
            }
            Self::UnknownPath(index) => write!(f, "no stored path at index {index}"),
            Self::EmptyName => write!(f, "path name must not be empty"),
            Self::NothingSelected => write!(f, "select a path from the list first"),
        }
    }
}

impl std::error::Error for PathError {}

#[derive(Debug, Clone, PartialEq)]
pub enum RaceError {
    NothingAssigned,
}

impl fmt::Display for RaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingAssigned => write!(f, "assign paths to vehicles first"),
        }
    }
}

impl std::error::Error for RaceError {}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    NoActiveVehicle,
    DuplicateName(String),
    UnknownCamera(Option<String>),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveVehicle => write!(f, "no vehicle is selected"),
            Self::DuplicateName(name) => write!(
                f,
                "camera \"{name}\" already exists, overwrite it or choose a new name"
            ),
            Self::UnknownCamera(Some(name)) => write!(f, "no saved camera named \"{name}\""),
            Self::UnknownCamera(None) => write!(f, "the default chase camera cannot be overwritten"),
        }
    }
}

impl std::error::Error for CameraError {}

/// Malformed or unusable persisted documents.
#[derive(Debug)]
pub enum DocumentError {
    Parse(serde_json::Error),
    Unrecognised,
    TooFewPoints { found: usize },
    LoopNeedsThreePoints { found: usize },
    NoActiveVehicle,
    UnsupportedExtension(String),
    Unreadable { path: String, reason: String },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to parse document: {err}"),
            Self::Unrecognised => {
                write!(f, "document has neither camera definitions nor keyframes")
            }
            Self::TooFewPoints { found } => {
                write!(f, "path document needs at least 2 points, found {found}")
            }
            Self::LoopNeedsThreePoints { found } => {
                write!(f, "closed path document needs at least 3 points, found {found}")
            }
            Self::NoActiveVehicle => write!(f, "select a vehicle to load camera configs into"),
            Self::UnsupportedExtension(path) => write!(
                f,
                "{path} is not a .path.json, .cameras.json or .replay.json document"
            ),
            Self::Unreadable { path, reason } => write!(f, "could not read {path}: {reason}"),
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DocumentError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Any rejected user action, as reported back to the host.
#[derive(Debug)]
pub enum ActionError {
    Path(PathError),
    Race(RaceError),
    Camera(CameraError),
    Document(DocumentError),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(err) => err.fmt(f),
            Self::Race(err) => err.fmt(f),
            Self::Camera(err) => err.fmt(f),
            Self::Document(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Path(err) => Some(err),
            Self::Race(err) => Some(err),
            Self::Camera(err) => Some(err),
            Self::Document(err) => Some(err),
        }
    }
}

impl From<PathError> for ActionError {
    fn from(err: PathError) -> Self {
        Self::Path(err)
    }
}

impl From<RaceError> for ActionError {
    fn from(err: RaceError) -> Self {
        Self::Race(err)
    }
}

impl From<CameraError> for ActionError {
    fn from(err: CameraError) -> Self {
        Self::Camera(err)
    }
}

impl From<DocumentError> for ActionError {
    fn from(err: DocumentError) -> Self {
        Self::Document(err)
    }
}
