//! Node type synthesis from schema definitions
//!
//! Each schema entry becomes one [`SynthesizedNodeType`]: fields are
//! classified up front (enumeration, widget-backed, or connection) so that
//! instantiation cannot fail, and the image-preview capability is composed in
//! at construction. Malformed definitions are rejected here, before
//! registration.

use crate::context::AppContext;
use crate::engine::{Drawable, MenuContributor};
use crate::preview::ImagePreview;
use crate::schema::{FieldSpec, FieldType, NodeDef};
use crate::tasks::DeferredTask;
use crate::widgets::{WidgetConfig, WidgetRegistry, WidgetSpec};
use egui::{Pos2, Vec2};
use log::warn;
use serde_json::Value;
use thiserror::Error;

use super::node::{GraphNode, NodeId};

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("field {field:?} of {node:?} is an enumeration with no values")]
    EmptyEnum { node: String, field: String },
}

/// How one required field materializes on a node instance
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Combo widget over a fixed set of values
    Enum { values: Vec<String>, default: String },
    /// Built by the widget constructor registered under `key`
    Widget { key: String },
    /// No widget claims the type; the field becomes an input port
    Connection { type_name: String },
}

/// One classified field, in schema declaration order
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub spec: FieldSpec,
    pub kind: FieldKind,
}

/// Behavior composed into a node type at synthesis time. Shared by all
/// instances of the type; per-instance state lives on the node.
pub struct NodeBehavior {
    drawable: Box<dyn Drawable>,
    menu: Box<dyn MenuContributor>,
}

impl NodeBehavior {
    pub fn image_preview() -> Self {
        Self {
            drawable: Box::new(ImagePreview),
            menu: Box::new(ImagePreview),
        }
    }
}

/// A registrable node type built from one schema definition
pub struct SynthesizedNodeType {
    pub title: String,
    pub category: String,
    pub description: String,
    /// Schema identifier the type was registered under
    pub class_name: String,
    pub fields: Vec<FieldDef>,
    /// Output type names, one port each, in declaration order
    pub outputs: Vec<String>,
    behavior: NodeBehavior,
}

impl std::fmt::Debug for SynthesizedNodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesizedNodeType")
            .field("class_name", &self.class_name)
            .field("fields", &self.fields)
            .field("outputs", &self.outputs)
            .finish()
    }
}

/// Enumeration values may be any JSON scalar; widgets hold them as text
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct NodeTypeBuilder;

impl NodeTypeBuilder {
    /// Classify every required field of `def` against the current widget
    /// registry and produce a registrable type
    pub fn build(
        class_name: &str,
        def: &NodeDef,
        widgets: &WidgetRegistry,
    ) -> Result<SynthesizedNodeType, FactoryError> {
        let mut fields = Vec::with_capacity(def.input.required.len());

        for (name, spec) in &def.input.required {
            let kind = match &spec.kind {
                FieldType::Values(values) => {
                    if values.is_empty() {
                        return Err(FactoryError::EmptyEnum {
                            node: class_name.to_string(),
                            field: name.clone(),
                        });
                    }
                    let values: Vec<String> = values.iter().map(value_to_string).collect();
                    let default = spec
                        .default_value()
                        .map(value_to_string)
                        .unwrap_or_else(|| values[0].clone());
                    FieldKind::Enum { values, default }
                }
                FieldType::Name(type_name) => match widgets.resolve(type_name, name) {
                    Some(key) => FieldKind::Widget { key },
                    None => FieldKind::Connection {
                        type_name: type_name.clone(),
                    },
                },
            };
            fields.push(FieldDef {
                name: name.clone(),
                spec: spec.clone(),
                kind,
            });
        }

        Ok(SynthesizedNodeType {
            title: def.name.clone(),
            category: def.category.clone(),
            description: def.description.clone(),
            class_name: class_name.to_string(),
            fields,
            outputs: def.output.clone(),
            behavior: NodeBehavior::image_preview(),
        })
    }
}

impl SynthesizedNodeType {
    pub fn drawable(&self) -> &dyn Drawable {
        self.behavior.drawable.as_ref()
    }

    pub fn menu(&self) -> &dyn MenuContributor {
        self.behavior.menu.as_ref()
    }

    /// Create a node instance: widgets and ports wired in declaration order,
    /// then sized, then announced to extensions through the deferred queue
    pub fn instantiate(&self, id: NodeId, position: Pos2, ctx: &AppContext) -> GraphNode {
        use crate::constants::node::WIDTH_BIAS;

        let mut node = GraphNode::new(id, &self.title, &self.class_name, position);
        let mut config = WidgetConfig::default();

        for field in &self.fields {
            match &field.kind {
                FieldKind::Enum { values, default } => {
                    node.add_widget(WidgetSpec::combo(
                        &field.name,
                        values.clone(),
                        default.clone(),
                    ));
                }
                FieldKind::Widget { key } => {
                    match ctx.widgets.construct(key, &mut node, &field.name, &field.spec, ctx) {
                        Some(demands) => config.merge_max(demands),
                        None => {
                            // The constructor was unregistered after this type
                            // was built; degrade to a connection input
                            warn!(
                                "widget constructor {key:?} is gone, field {:?} of {:?} becomes an input",
                                field.name, self.class_name
                            );
                            let type_name = key.split(':').next().unwrap_or(key);
                            node.add_input(&field.name, type_name);
                        }
                    }
                }
                FieldKind::Connection { type_name } => {
                    node.add_input(&field.name, type_name);
                }
            }
        }

        for type_name in &self.outputs {
            node.add_output(type_name, type_name);
        }

        let natural = node.natural_size();
        node.size = Vec2::new(
            config.min_width.max(natural.x * WIDTH_BIAS),
            config.min_height.max(natural.y),
        );
        node.serialize_widgets = true;
        node.update_port_positions();

        ctx.tasks.push(DeferredTask::NodeCreated(id));
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_defs;
    use crate::widgets::{WidgetKind, WidgetValue};

    const DEFS: &str = r#"{
        "LoadImage": {
            "name": "Load Image",
            "category": "image",
            "input": { "required": {
                "image": ["IMAGE"],
                "rotation": [["0", "90", "180", "270"]],
                "strength": ["FLOAT", { "default": 0.5, "min": 0.0, "max": 1.0, "step": 0.05 }],
                "prompt": ["STRING", { "multiline": true }]
            } },
            "output": ["IMAGE", "MASK"]
        }
    }"#;

    fn build_load_image() -> SynthesizedNodeType {
        let defs = parse_defs(DEFS).unwrap();
        NodeTypeBuilder::build("LoadImage", &defs["LoadImage"], &WidgetRegistry::with_builtin())
            .unwrap()
    }

    #[test]
    fn fields_are_classified_in_declaration_order() {
        let node_type = build_load_image();
        let kinds: Vec<&FieldKind> = node_type.fields.iter().map(|f| &f.kind).collect();

        assert!(matches!(kinds[0], FieldKind::Connection { type_name } if type_name == "IMAGE"));
        assert!(matches!(kinds[1], FieldKind::Enum { .. }));
        assert!(matches!(kinds[2], FieldKind::Widget { key } if key == "FLOAT"));
        assert!(matches!(kinds[3], FieldKind::Widget { key } if key == "STRING"));
    }

    #[test]
    fn enum_defaults_to_its_first_value() {
        let node_type = build_load_image();
        match &node_type.fields[1].kind {
            FieldKind::Enum { values, default } => {
                assert_eq!(values, &["0", "90", "180", "270"]);
                assert_eq!(default, "0");
            }
            other => panic!("expected enum, got {other:?}"),
        }
    }

    #[test]
    fn empty_enum_is_rejected() {
        let raw = r#"{ "Broken": {
            "name": "Broken",
            "category": "x",
            "input": { "required": { "mode": [[]] } },
            "output": []
        } }"#;
        let defs = parse_defs(raw).unwrap();
        let result = NodeTypeBuilder::build("Broken", &defs["Broken"], &WidgetRegistry::with_builtin());
        assert!(matches!(
            result,
            Err(FactoryError::EmptyEnum { node, field }) if node == "Broken" && field == "mode"
        ));
    }

    #[test]
    fn instantiation_wires_widgets_and_ports() {
        let ctx = AppContext::new();
        let node = build_load_image().instantiate(5, Pos2::new(100.0, 100.0), &ctx);

        assert_eq!(node.id, 5);
        assert_eq!(node.class_name, "LoadImage");
        assert!(node.serialize_widgets);

        // One input from the connection field, two output ports
        assert_eq!(node.inputs.len(), 1);
        assert_eq!(node.inputs[0].name, "image");
        assert_eq!(node.outputs.len(), 2);
        assert_eq!(node.outputs[0].type_name, "IMAGE");
        assert_eq!(node.outputs[1].type_name, "MASK");

        // Widgets in declaration order with schema-supplied values
        assert_eq!(node.widgets.len(), 3);
        assert!(matches!(&node.widgets[0].value, WidgetValue::Choice(v) if v == "0"));
        assert!(matches!(&node.widgets[1].value, WidgetValue::Number(v) if *v == 0.5));
        assert!(matches!(&node.widgets[2].kind, WidgetKind::Text { multiline: true }));
    }

    #[test]
    fn node_size_applies_bias_and_widget_minima() {
        let ctx = AppContext::new();
        let node_type = build_load_image();
        let node = node_type.instantiate(1, Pos2::ZERO, &ctx);

        // Width is the biased natural width; the multiline editor's height
        // demand (120) exceeds the natural stack of three widget rows
        let mut probe = GraphNode::new(0, "p", "p", Pos2::ZERO);
        for widget in &node.widgets {
            probe.add_widget(widget.clone());
        }
        let natural = probe.natural_size();
        assert_eq!(node.size.x, natural.x * crate::constants::node::WIDTH_BIAS);
        assert_eq!(node.size.y, natural.y.max(120.0));
    }

    #[test]
    fn instantiation_defers_the_created_notification() {
        let ctx = AppContext::new();
        build_load_image().instantiate(7, Pos2::ZERO, &ctx);
        assert_eq!(ctx.tasks.drain(), vec![DeferredTask::NodeCreated(7)]);
    }
}
