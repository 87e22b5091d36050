//! Widget registry and widget value objects
//!
//! Widgets are described as plain data attached to a node instance; the host
//! canvas decides how to paint them. Constructors are registered under a type
//! name (`"FLOAT"`) or a type:field composite (`"IMAGE:seed"`); the composite
//! key always wins for the field it names.

use crate::context::AppContext;
use crate::nodes::GraphNode;
use crate::schema::FieldSpec;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

/// Sizing demands a widget places on its node. Accumulated across all
/// widgets of one node via component-wise maximum, so later widgets may
/// raise the minima but never lower them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WidgetConfig {
    pub min_width: f32,
    pub min_height: f32,
}

impl WidgetConfig {
    pub fn new(min_width: f32, min_height: f32) -> Self {
        Self {
            min_width,
            min_height,
        }
    }

    /// Merge another config in, keeping the larger minimum on each axis
    pub fn merge_max(&mut self, other: WidgetConfig) {
        self.min_width = self.min_width.max(other.min_width);
        self.min_height = self.min_height.max(other.min_height);
    }
}

/// Current value of a widget
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetValue {
    Number(f64),
    Text(String),
    Choice(String),
    Toggle(bool),
}

/// What kind of control the host should paint for a widget
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    /// Selection among an ordered set of allowed values
    Combo { options: Vec<String> },
    Number { min: f64, max: f64, step: f64 },
    Text { multiline: bool },
    Toggle,
}

/// One widget attached to a node body, bound to a schema field
#[derive(Debug, Clone)]
pub struct WidgetSpec {
    pub field: String,
    pub kind: WidgetKind,
    pub value: WidgetValue,
}

impl WidgetSpec {
    pub fn combo(field: impl Into<String>, options: Vec<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: WidgetKind::Combo { options },
            value: WidgetValue::Choice(value.into()),
        }
    }

    pub fn number(field: impl Into<String>, value: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            field: field.into(),
            kind: WidgetKind::Number { min, max, step },
            value: WidgetValue::Number(value),
        }
    }

    pub fn text(field: impl Into<String>, value: impl Into<String>, multiline: bool) -> Self {
        Self {
            field: field.into(),
            kind: WidgetKind::Text { multiline },
            value: WidgetValue::Text(value.into()),
        }
    }
}

/// Builds a widget onto a node for one field and reports its sizing demands
pub type WidgetConstructor =
    Box<dyn Fn(&mut GraphNode, &str, &FieldSpec, &AppContext) -> WidgetConfig + Send + Sync>;

/// Mapping from type name (or `Type:field` composite) to widget constructor
pub struct WidgetRegistry {
    constructors: HashMap<String, WidgetConstructor>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry pre-populated with the standard scalar widget types
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("FLOAT", Box::new(build_float_widget));
        registry.register("INT", Box::new(build_int_widget));
        registry.register("STRING", Box::new(build_string_widget));
        registry
    }

    pub fn register(&mut self, key: impl Into<String>, constructor: WidgetConstructor) {
        let key = key.into();
        if self.constructors.insert(key.clone(), constructor).is_some() {
            debug!("widget constructor for {key:?} replaced");
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Resolve the registration key for a field: `Type:field` beats `Type`
    pub fn resolve(&self, type_name: &str, field: &str) -> Option<String> {
        let composite = format!("{type_name}:{field}");
        if self.constructors.contains_key(&composite) {
            return Some(composite);
        }
        if self.constructors.contains_key(type_name) {
            return Some(type_name.to_string());
        }
        None
    }

    /// Run the constructor registered under `key`, if any
    pub fn construct(
        &self,
        key: &str,
        node: &mut GraphNode,
        field: &str,
        spec: &FieldSpec,
        ctx: &AppContext,
    ) -> Option<WidgetConfig> {
        let constructor = self.constructors.get(key)?;
        Some(constructor(node, field, spec, ctx))
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

fn option_f64(spec: &FieldSpec, key: &str, fallback: f64) -> f64 {
    spec.options
        .get(key)
        .and_then(Value::as_f64)
        .unwrap_or(fallback)
}

fn build_float_widget(
    node: &mut GraphNode,
    field: &str,
    spec: &FieldSpec,
    _ctx: &AppContext,
) -> WidgetConfig {
    let value = option_f64(spec, "default", 0.0);
    let min = option_f64(spec, "min", f64::MIN);
    let max = option_f64(spec, "max", f64::MAX);
    let step = option_f64(spec, "step", 0.01);
    node.add_widget(WidgetSpec::number(field, value, min, max, step));
    WidgetConfig::default()
}

fn build_int_widget(
    node: &mut GraphNode,
    field: &str,
    spec: &FieldSpec,
    _ctx: &AppContext,
) -> WidgetConfig {
    let value = option_f64(spec, "default", 0.0).round();
    let min = option_f64(spec, "min", i64::MIN as f64);
    let max = option_f64(spec, "max", i64::MAX as f64);
    node.add_widget(WidgetSpec::number(field, value, min, max, 1.0));
    WidgetConfig::default()
}

fn build_string_widget(
    node: &mut GraphNode,
    field: &str,
    spec: &FieldSpec,
    _ctx: &AppContext,
) -> WidgetConfig {
    let value = spec
        .default_value()
        .and_then(Value::as_str)
        .unwrap_or_default();
    let multiline = spec
        .options
        .get("multiline")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    node.add_widget(WidgetSpec::text(field, value, multiline));
    if multiline {
        // Multi-line editors need room below the other widgets
        WidgetConfig::new(0.0, 120.0)
    } else {
        WidgetConfig::default()
    }
}
