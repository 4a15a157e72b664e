use std::fmt;
use std::path::PathBuf;

/// Error returned by the `try_load_*` family of registry calls.
#[derive(Debug)]
pub enum ResourceError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The file was read but its contents could not be decoded.
    Decode { path: PathBuf, reason: String },
    /// The file header is not the expected format.
    Malformed { path: PathBuf, reason: &'static str },
    /// Pixel data does not match the stated dimensions.
    Dimensions { width: u32, height: u32, len: usize },
    /// The registry cannot hand out more handles.
    Exhausted,
}

impl ResourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::Decode { path: path.into(), reason: reason.to_string() }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Decode { path, reason } => write!(f, "cannot decode {}: {reason}", path.display()),
            Self::Malformed { path, reason } => write!(f, "malformed {}: {reason}", path.display()),
            Self::Dimensions { width, height, len } => {
                write!(f, "{len} bytes of pixel data do not fit {width}x{height} RGBA8")
            }
            Self::Exhausted => write!(f, "resource registry is full"),
        }
    }
}

impl std::error::Error for ResourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
