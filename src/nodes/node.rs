//! Node instance: geometry, ports, widgets, and preview state
//!
//! Instances are owned by the host graph engine; this crate only defines the
//! fields it attaches behavior to. Connections flow top to bottom: inputs on
//! the top edge, outputs on the bottom edge.

use super::port::{Port, PortDirection};
use crate::constants;
use crate::outputs::OutputStore;
use crate::preview::{BatchResult, ImageLoader, PreviewState};
use crate::widgets::WidgetSpec;
use egui::{Pos2, Rect, Vec2};

/// Unique identifier for a node, assigned by the host engine
pub type NodeId = usize;

/// A live node placed on the graph
#[derive(Debug)]
pub struct GraphNode {
    pub id: NodeId,
    pub title: String,
    /// Schema identifier of the type this instance came from
    pub class_name: String,
    pub position: Pos2,
    pub size: Vec2,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub widgets: Vec<WidgetSpec>,
    /// Tells the host to persist widget values with the graph
    pub serialize_widgets: bool,
    pub preview: PreviewState,
}

impl GraphNode {
    pub fn new(id: NodeId, title: impl Into<String>, class_name: impl Into<String>, position: Pos2) -> Self {
        Self {
            id,
            title: title.into(),
            class_name: class_name.into(),
            position,
            size: Vec2::new(constants::node::BASE_WIDTH, constants::node::TITLE_HEIGHT),
            inputs: vec![],
            outputs: vec![],
            widgets: vec![],
            serialize_widgets: false,
            preview: PreviewState::new(),
        }
    }

    /// Adds an input port typed by a schema type name
    pub fn add_input(&mut self, name: impl Into<String>, type_name: impl Into<String>) -> &mut Self {
        let port_id = self.inputs.len();
        self.inputs
            .push(Port::new(port_id, name, type_name, PortDirection::Input));
        self
    }

    /// Adds an output port typed by a schema type name
    pub fn add_output(&mut self, name: impl Into<String>, type_name: impl Into<String>) -> &mut Self {
        let port_id = self.outputs.len();
        self.outputs
            .push(Port::new(port_id, name, type_name, PortDirection::Output));
        self
    }

    pub fn add_widget(&mut self, widget: WidgetSpec) -> &mut Self {
        self.widgets.push(widget);
        self
    }

    /// Updates the positions of all ports based on the node's position and
    /// size: inputs spread along the top edge, outputs along the bottom
    pub fn update_port_positions(&mut self) {
        let spacing = constants::node::PORT_SPACING;

        let start_x = |count: usize, width: f32| -> f32 {
            if count > 1 {
                (width - (count - 1) as f32 * spacing) / 2.0
            } else {
                width / 2.0
            }
        };

        let input_start = start_x(self.inputs.len(), self.size.x);
        for (i, input) in self.inputs.iter_mut().enumerate() {
            input.position = self.position + Vec2::new(input_start + i as f32 * spacing, 0.0);
        }

        let output_start = start_x(self.outputs.len(), self.size.x);
        for (i, output) in self.outputs.iter_mut().enumerate() {
            output.position =
                self.position + Vec2::new(output_start + i as f32 * spacing, self.size.y);
        }
    }

    /// Size the node wants before any widget minima or bias are applied
    pub fn natural_size(&self) -> Vec2 {
        use constants::node::*;

        let mut width = BASE_WIDTH;
        for widget in &self.widgets {
            width = width.max(widget.field.len() as f32 * CHAR_WIDTH + WIDGET_PADDING);
        }

        let height = TITLE_HEIGHT + self.widgets.len() as f32 * WIDGET_ROW_HEIGHT + BODY_PADDING;
        Vec2::new(width, height)
    }

    /// Canvas-space y coordinate where the widget area ends; image previews
    /// are anchored below this line
    pub fn content_top(&self) -> f32 {
        self.position.y
            + constants::node::TITLE_HEIGHT
            + self.widgets.len() as f32 * constants::node::WIDGET_ROW_HEIGHT
    }

    /// Canvas-space rectangle available for image previews
    pub fn preview_area(&self) -> Rect {
        let margin = constants::preview::AREA_MARGIN;
        let top = self.content_top() + margin;
        let bottom = self.position.y + self.size.y - margin;
        Rect::from_min_max(
            Pos2::new(self.position.x + margin, top),
            Pos2::new(self.position.x + self.size.x - margin, bottom),
        )
    }

    /// Returns the bounding rectangle of the node
    pub fn get_rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    /// Checks this node's outputs for a new image payload and schedules its
    /// decode; call once per frame
    pub fn sync_preview(&mut self, store: &OutputStore, loader: &ImageLoader) {
        self.preview.sync(self.id, store, loader);
    }

    /// Adopts a finished decode batch. A node showing its first images grows
    /// to make room for them when its body is still compact. Returns true
    /// when the batch was adopted.
    pub fn commit_images(&mut self, batch: BatchResult) -> bool {
        if !self.preview.commit(batch) {
            return false;
        }
        if self.preview.has_images() && self.size.y < constants::preview::GROW_THRESHOLD {
            self.size.y = constants::preview::PREVIEW_HEIGHT;
            self.update_port_positions();
        }
        true
    }
}
