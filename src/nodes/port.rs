//! Port types and functionality for node connections

use egui::Pos2;

/// Unique identifier for a port within one node
pub type PortId = usize;

/// Type of port (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Input,
    Output,
}

/// Represents a connection point on a node. The schema type name doubles as
/// the port label when no explicit name is given.
#[derive(Debug, Clone)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub type_name: String,
    pub direction: PortDirection,
    pub position: Pos2,
}

impl Port {
    pub fn new(
        id: PortId,
        name: impl Into<String>,
        type_name: impl Into<String>,
        direction: PortDirection,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            type_name: type_name.into(),
            direction,
            position: Pos2::ZERO,
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self.direction, PortDirection::Input)
    }

    pub fn is_output(&self) -> bool {
        matches!(self.direction, PortDirection::Output)
    }
}
