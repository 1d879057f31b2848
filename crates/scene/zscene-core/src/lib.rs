//! zscene core (engine-agnostic)
//!
//! Playback and layout for scenes exported from a 2D scene editor: a throttled
//! update scheduler, a cue point bus, frame-snapping timelines, exclusive state
//! containers and a dual portrait/landscape transform model with anchoring and
//! fit-to-screen. Rendering stays with the host; adapters drain
//! [`Outputs`] and apply them to their display objects.

pub mod clock;
pub mod config;
pub mod cue_points;
pub mod display;
pub mod error;
pub mod ids;
pub mod node;
pub mod orientation;
pub mod outputs;
pub mod scene;
pub mod scene_data;
pub mod state;
pub mod text;
pub mod timeline;
pub mod transform;
pub mod updatables;
pub mod walk;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, Resolution, Viewport};
pub use cue_points::{CueCallback, CuePointEvent, CuePoints};
pub use display::{DisplayProps, Prop, Size};
pub use error::SceneError;
pub use ids::NodeId;
pub use node::{Node, NodeKind};
pub use orientation::{AnchorPercentage, InstanceAttrs, InstanceData, Orientation, OrientationData};
pub use outputs::{Change, Outputs, SceneEvent, TextChange};
pub use scene::Scene;
pub use scene_data::{parse_scene_json, SceneData, TemplateData};
pub use state::{StateComponent, IDLE_STATE};
pub use text::{TextContent, TextFit, TextMeasurer};
pub use timeline::{
    Animatable, CuePointMap, EndCallback, FrameEntry, FrameMap, FrameTrack, NodeMut, Timeline,
};
pub use transform::TransformComponent;
pub use updatables::{Updatable, Updatables};
pub use walk::{Capability, HasState, HasText, HasTimeline, HasTransform};

/// Crate result alias.
pub type Result<T> = core::result::Result<T, SceneError>;
