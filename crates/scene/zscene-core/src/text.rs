//! Text content and fixed-box shrink-to-fit.
//!
//! Glyph layout belongs to the host, so measuring goes through a
//! [`TextMeasurer`]. A container's text field is its child named `"label"`
//! when that child is a text node, otherwise its first text child.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::display::Size;
use crate::ids::NodeId;
use crate::node::NodeKind;
use crate::scene::Scene;

pub const LABEL_CHILD: &str = "label";

/// Smallest font size shrink-to-fit will reach.
pub const MIN_FONT_SIZE: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    pub font_size: f64,
}

/// Reference box captured from the text field when instance data is applied.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextFit {
    pub fixed_box_size: bool,
    pub original_width: Option<f64>,
    pub original_height: Option<f64>,
    pub original_font_size: Option<f64>,
}

/// Host text metrics.
pub trait TextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> Size;
}

impl<F> TextMeasurer for F
where
    F: Fn(&str, f64) -> Size,
{
    fn measure(&self, text: &str, font_size: f64) -> Size {
        self(text, font_size)
    }
}

impl Scene {
    /// Create a text node measured at `font_size`.
    pub fn create_text(
        &mut self,
        name: impl Into<String>,
        text: impl Into<String>,
        font_size: f64,
        measurer: &dyn TextMeasurer,
    ) -> NodeId {
        let id = self.create_node(NodeKind::Text, name);
        let text = text.into();
        let size = measurer.measure(&text, font_size);
        if let Some(node) = self.node_mut(id) {
            node.text = Some(TextContent { text, font_size });
        }
        self.set_size(id, size);
        id
    }

    pub fn text_field(&self, id: NodeId) -> Option<NodeId> {
        let is_text = |c: NodeId| self.node(c).is_some_and(|n| n.text.is_some());
        self.child_by_name(id, LABEL_CHILD)
            .filter(|&c| is_text(c))
            .or_else(|| self.children(id).iter().copied().find(|&c| is_text(c)))
    }

    pub fn set_fixed_box_size(&mut self, id: NodeId, fixed: bool) {
        if let Some(node) = self.node_mut(id) {
            node.text_fit.get_or_insert_with(TextFit::default).fixed_box_size = fixed;
        }
    }

    /// Replace the text field's content, restore the captured font size, then
    /// shrink to fit when fixed-box mode is on.
    pub fn set_text(&mut self, id: NodeId, text: &str, measurer: &dyn TextMeasurer) {
        let Some(tf) = self.text_field(id) else {
            trace!("text: {id} has no text field");
            return;
        };
        let original = self
            .node(id)
            .and_then(|n| n.text_fit.as_ref())
            .and_then(|f| f.original_font_size);
        let Some(content) = self.node_mut(tf).and_then(|n| n.text.as_mut()) else {
            return;
        };
        content.text = text.to_string();
        if let Some(size) = original {
            content.font_size = size;
        }
        let font_size = content.font_size;
        self.set_size(tf, measurer.measure(text, font_size));
        self.resize_text(id, tf, measurer);
    }

    /// Shrink `tf`'s font one point at a time until it fits the captured box.
    pub fn resize_text(&mut self, id: NodeId, tf: NodeId, measurer: &dyn TextMeasurer) {
        let Some(fit) = self.node(id).and_then(|n| n.text_fit.clone()) else {
            return;
        };
        if !fit.fixed_box_size {
            return;
        }
        let max_w = fit.original_width.filter(|w| *w > 0.0);
        let max_h = fit.original_height.filter(|h| *h > 0.0);
        if max_w.is_none() && max_h.is_none() {
            return;
        }
        let overflows = |scene: &Scene| {
            max_w.is_some_and(|w| scene.width(tf) > w) || max_h.is_some_and(|h| scene.height(tf) > h)
        };
        while overflows(&*self) {
            let Some(content) = self.node_mut(tf).and_then(|n| n.text.as_mut()) else {
                return;
            };
            if content.font_size - 1.0 < MIN_FONT_SIZE {
                break;
            }
            content.font_size -= 1.0;
            let size = measurer.measure(&content.text, content.font_size);
            self.set_size(tf, size);
        }
    }
}
