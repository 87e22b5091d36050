//! Schema-driven node graph core
//!
//! Turns a server-delivered node schema into live, registrable node types:
//! every definition becomes a type with typed ports, data-described widgets,
//! and an image preview drawn inside the node body. Independently authored
//! extensions customize the pipeline through isolated hooks; one broken
//! extension never takes down registration for the rest.
//!
//! The host application owns the canvas, the graph, and execution. This
//! crate plugs into it through the traits in [`engine`].

pub mod constants;
pub mod context;
pub mod engine;
pub mod extensions;
pub mod nodes;
pub mod outputs;
pub mod preview;
pub mod schema;
pub mod tasks;
pub mod widgets;

pub use context::AppContext;
pub use engine::{Drawable, GraphEngine, MenuAction, MenuContributor, MenuEntry, NodeLookup};
pub use extensions::{Extension, HookBus};
pub use nodes::{
    register_nodes, GraphNode, NodeId, NodeTypeBuilder, RegistrationReport, SynthesizedNodeType,
};
pub use outputs::{ImageRef, NodeOutput, OutputStore};
pub use preview::{GridLayout, ImageLoader, PointerFrame, PreviewState};
pub use schema::{FieldSpec, FieldType, FileSchemaSource, NodeDef, NodeDefs, SchemaSource};
pub use tasks::{DeferredTask, TaskQueue};
pub use widgets::{WidgetConfig, WidgetRegistry, WidgetSpec};
