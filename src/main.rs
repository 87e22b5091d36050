//! Command-line registration driver
//!
//! Loads a node-definition JSON file, runs the full registration pipeline
//! against a logging engine, and instantiates each registered type once.
//! Useful for validating a server's `object_info` payload without a canvas.

use aicreate::nodes::register_nodes;
use aicreate::{AppContext, FileSchemaSource, GraphEngine, GraphNode, SynthesizedNodeType};
use egui::Pos2;
use log::info;
use std::collections::HashMap;

/// Engine that records registrations instead of painting them
#[derive(Default)]
struct LoggingEngine {
    types: Vec<SynthesizedNodeType>,
}

impl GraphEngine for LoggingEngine {
    fn register_node_type(&mut self, id: &str, node_type: SynthesizedNodeType) {
        info!(
            "registered {id} ({} field(s), {} output(s))",
            node_type.fields.len(),
            node_type.outputs.len()
        );
        self.types.push(node_type);
    }

    fn request_redraw(&self) {}

    fn open_url(&self, url: &str) {
        info!("would open {url}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args().nth(1).ok_or("usage: aicreate <object_info.json>")?;

    let mut ctx = AppContext::new();
    ctx.setup();

    let mut engine = LoggingEngine::default();
    let report = register_nodes(&mut ctx, &FileSchemaSource::new(&path), &mut engine)?;

    let mut nodes: HashMap<usize, GraphNode> = HashMap::new();
    for (id, node_type) in engine.types.iter().enumerate() {
        let node = node_type.instantiate(id, Pos2::new(50.0, 50.0 + 100.0 * id as f32), &ctx);
        info!(
            "instantiated {} at {:?} sized {}x{}",
            node.class_name, node.position, node.size.x, node.size.y
        );
        nodes.insert(id, node);
    }
    ctx.run_deferred(&mut nodes);

    println!(
        "{} type(s) registered, {} skipped, {} instantiated",
        report.registered,
        report.failed,
        nodes.len()
    );
    Ok(())
}
