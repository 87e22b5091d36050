//! Node types and instances
//!
//! `factory` synthesizes registrable types from schema definitions,
//! `registrar` drives the registration pipeline, and `node`/`port` hold the
//! instance data the host graph engine owns.

pub mod factory;
pub mod node;
pub mod port;
pub mod registrar;

pub use factory::{FactoryError, FieldDef, FieldKind, NodeTypeBuilder, SynthesizedNodeType};
pub use node::{GraphNode, NodeId};
pub use port::{Port, PortDirection, PortId};
pub use registrar::{register_nodes, RegistrationReport};
