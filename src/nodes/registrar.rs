//! Node type registration pipeline
//!
//! Ordering contract, relied on by extensions: definitions are fetched, then
//! extension-contributed definitions and widget constructors are merged in,
//! then each definition gets its pre-registration hook immediately before it
//! is built and handed to the engine, and finally extensions may register
//! fully custom types. One malformed definition never aborts the rest.

use crate::context::AppContext;
use crate::engine::GraphEngine;
use crate::schema::{SchemaError, SchemaSource};
use log::{debug, error, info};

use super::factory::NodeTypeBuilder;

/// Outcome summary of one registration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistrationReport {
    pub registered: usize,
    pub failed: usize,
}

/// Fetch node definitions from `source` and register every resulting type
/// with `engine`, running the extension hooks along the way
pub fn register_nodes(
    ctx: &mut AppContext,
    source: &dyn SchemaSource,
    engine: &mut dyn GraphEngine,
) -> Result<RegistrationReport, SchemaError> {
    let mut defs = source.fetch_defs()?;
    info!("fetched {} node definition(s)", defs.len());

    // Extensions contribute whole definitions and widget constructors
    // before any type is built
    let contributed = ctx
        .hooks
        .invoke("add_custom_node_defs", "", |ext| ext.add_custom_node_defs());
    for extra in contributed.into_iter().flatten() {
        for (id, def) in extra {
            if defs.contains_key(&id) {
                debug!("extension definition {id:?} overrides an existing one");
            }
            defs.insert(id, def);
        }
    }

    let widget_batches = ctx
        .hooks
        .invoke("get_custom_widgets", "", |ext| ext.get_custom_widgets());
    for batch in widget_batches.into_iter().flatten() {
        for (key, constructor) in batch {
            ctx.widgets.register(key, constructor);
        }
    }

    let mut report = RegistrationReport::default();
    for (class_name, def) in defs.iter_mut() {
        let args = format!("def {class_name}");
        ctx.hooks
            .invoke("before_register_node_def", &args, |ext| {
                ext.before_register_node_def(def)
            });

        match NodeTypeBuilder::build(class_name, def, &ctx.widgets) {
            Ok(node_type) => {
                engine.register_node_type(class_name, node_type);
                report.registered += 1;
            }
            Err(err) => {
                error!("skipping malformed definition {class_name:?}: {err}");
                report.failed += 1;
            }
        }
    }

    ctx.hooks
        .invoke("register_custom_nodes", "", |ext| {
            ext.register_custom_nodes(engine)
        });

    info!(
        "registered {} node type(s), {} skipped",
        report.registered, report.failed
    );
    Ok(report)
}
