//! Boundary to the host graph engine
//!
//! The canvas, connection routing, and execution all live in the host; this
//! crate hands it synthesized node types and receives callbacks through the
//! capability traits below. Capabilities are attached per node *type* and
//! shared across instances, so they take the instance they act on as an
//! argument.

use crate::nodes::{GraphNode, NodeId, SynthesizedNodeType};
use crate::preview::PointerFrame;
use egui::Painter;
use std::collections::HashMap;

/// Host-side registry of node types plus the few services node behavior
/// needs from the surrounding application
pub trait GraphEngine {
    /// Make a synthesized type available on the canvas under its schema id
    fn register_node_type(&mut self, id: &str, node_type: SynthesizedNodeType);

    /// Schedule a repaint outside the normal damage tracking
    fn request_redraw(&self);

    /// Open a URL in whatever viewer the host prefers
    fn open_url(&self, url: &str);
}

/// Mutable access to node instances by id, for deferred work and decode
/// results that arrive after the originating call returned
pub trait NodeLookup {
    fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode>;
}

impl NodeLookup for HashMap<NodeId, GraphNode> {
    fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.get_mut(&id)
    }
}

/// One entry contributed to a node's context menu
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub label: String,
    pub action: MenuAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuAction {
    OpenUrl(String),
}

/// Draws extra content inside a node's body each frame
pub trait Drawable: Send + Sync {
    /// Returns true when the node wants another repaint soon
    fn draw(&self, node: &mut GraphNode, painter: &Painter, pointer: &PointerFrame) -> bool;
}

/// Contributes entries to a node's context menu
pub trait MenuContributor: Send + Sync {
    fn contribute(&self, node: &GraphNode, entries: &mut Vec<MenuEntry>);
}
