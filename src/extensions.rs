//! Extension hooks and the fan-out bus that invokes them
//!
//! Extensions are independently authored; one misbehaving extension must not
//! break node registration for the whole graph. Every hook call is therefore
//! isolated: a panicking callback is caught, logged with the extension's
//! identity and the call context, and contributes `None` to the result
//! sequence while its siblings keep running.

use crate::context::AppContext;
use crate::engine::GraphEngine;
use crate::nodes::GraphNode;
use crate::schema::{NodeDef, NodeDefs};
use crate::widgets::WidgetConstructor;
use log::{debug, error};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// A named extension point. All hooks are optional; the default
/// implementations do nothing, so an extension implements only the subset it
/// cares about.
#[allow(unused_variables)]
pub trait Extension: Send + Sync {
    /// Identity used in logs when a hook fails
    fn name(&self) -> &str;

    /// Invoked once at application startup
    fn init(&self, ctx: &AppContext) {}

    /// Extra node definitions to register alongside the server's
    fn add_custom_node_defs(&self) -> NodeDefs {
        NodeDefs::new()
    }

    /// Widget constructors to merge into the registry before any node type
    /// is built. Keys may be plain type names or `Type:field` composites.
    fn get_custom_widgets(&self) -> Vec<(String, WidgetConstructor)> {
        Vec::new()
    }

    /// Invoked per definition immediately before it is registered; the
    /// definition may be augmented in place
    fn before_register_node_def(&self, def: &mut NodeDef) {}

    /// Invoked per node instance immediately after construction
    fn node_created(&self, node: &mut GraphNode) {}

    /// Invoked once after every definition has been processed
    fn register_custom_nodes(&self, engine: &mut dyn GraphEngine) {}
}

/// Dispatches one hook across every registered extension, in registration
/// order, isolating failures
pub struct HookBus {
    extensions: Vec<Box<dyn Extension>>,
}

impl HookBus {
    pub fn new() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    pub fn register(&mut self, extension: Box<dyn Extension>) {
        debug!("registered extension {:?}", extension.name());
        self.extensions.push(extension);
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Call `hook` on every extension. The result sequence always has one
    /// slot per extension: `Some` with the callback's result, or `None` when
    /// the callback panicked. `args` is a human-readable snapshot of the
    /// arguments for the failure log.
    pub fn invoke<R>(
        &self,
        hook: &str,
        args: &str,
        mut call: impl FnMut(&dyn Extension) -> R,
    ) -> Vec<Option<R>> {
        self.extensions
            .iter()
            .map(|ext| match catch_unwind(AssertUnwindSafe(|| call(ext.as_ref()))) {
                Ok(result) => Some(result),
                Err(_) => {
                    error!(
                        "extension {:?} failed in hook {hook}({args}); continuing without it",
                        ext.name()
                    );
                    None
                }
            })
            .collect()
    }
}

impl Default for HookBus {
    fn default() -> Self {
        Self::new()
    }
}
