//! Shared application context
//!
//! One instance lives for the whole application run and is threaded through
//! registration, instantiation, and per-frame work. Graph resets clear the
//! per-graph members but keep extensions and widget constructors.

use crate::engine::NodeLookup;
use crate::extensions::{Extension, HookBus};
use crate::outputs::OutputStore;
use crate::tasks::{DeferredTask, TaskQueue};
use crate::widgets::WidgetRegistry;
use log::info;

pub struct AppContext {
    pub hooks: HookBus,
    pub widgets: WidgetRegistry,
    pub outputs: OutputStore,
    pub tasks: TaskQueue,
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            hooks: HookBus::new(),
            widgets: WidgetRegistry::with_builtin(),
            outputs: OutputStore::new(),
            tasks: TaskQueue::new(),
        }
    }

    pub fn register_extension(&mut self, extension: Box<dyn Extension>) {
        self.hooks.register(extension);
    }

    /// Give every extension its one-time setup call
    pub fn setup(&self) {
        info!("initializing {} extension(s)", self.hooks.len());
        self.hooks.invoke("init", "", |ext| ext.init(self));
    }

    /// Drop all per-graph state; registered extensions and widget
    /// constructors survive
    pub fn reset_graph(&mut self) {
        self.outputs.clear();
        self.tasks.clear();
    }

    /// Run everything the deferred queue accumulated. Tasks whose node has
    /// disappeared in the meantime are dropped silently.
    pub fn run_deferred(&self, nodes: &mut dyn NodeLookup) {
        for task in self.tasks.drain() {
            match task {
                DeferredTask::NodeCreated(id) => {
                    if let Some(node) = nodes.node_mut(id) {
                        let args = format!("node {id}");
                        self.hooks
                            .invoke("node_created", &args, |ext| ext.node_created(node));
                    }
                }
            }
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}
