//! Error types for the scene core.
//!
//! Playback and layout operations are deliberately forgiving (missing children and
//! unknown labels are skipped), so errors only surface from configuration and
//! construction APIs.

use crate::ids::NodeId;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SceneError {
    /// The node id does not refer to a live node.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Target frame rate must be finite and positive.
    #[error("invalid fps: {0}")]
    InvalidFps(f64),

    /// Attaching would produce a cycle or otherwise break the tree.
    #[error("invalid hierarchy: cannot attach {child} under {parent}")]
    InvalidHierarchy { parent: NodeId, child: NodeId },

    /// Orientation strings are `"portrait"` or `"landscape"`.
    #[error("unknown orientation: {0}")]
    UnknownOrientation(String),

    /// Scene data could not be parsed.
    #[error("scene data parse error: {0}")]
    Parse(String),
}

impl SceneError {
    /// Category string used in log lines.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnknownNode(_) | Self::InvalidHierarchy { .. } => "graph",
            Self::InvalidFps(_) => "scheduler",
            Self::UnknownOrientation(_) => "layout",
            Self::Parse(_) => "data",
        }
    }
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(SceneError::UnknownNode(NodeId(1)).category(), "graph");
        assert_eq!(SceneError::InvalidFps(0.0).category(), "scheduler");
        assert_eq!(SceneError::Parse("x".into()).category(), "data");
    }

    #[test]
    fn json_errors_convert_to_parse() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let scene_err: SceneError = err.into();
        assert!(matches!(scene_err, SceneError::Parse(_)));
        assert!(scene_err.to_string().starts_with("scene data parse error"));
    }
}
