//! Process-wide store of the last-known output payload per node
//!
//! Owned by [`crate::context::AppContext`]; created at application start and
//! cleared on graph reset. The result-delivery channel is the single writer
//! (`set`); draw code only reads. New data is detected by `Arc` identity, so
//! re-delivering the same sequence never triggers work and a replacement is
//! atomic from the reader's point of view.

use crate::nodes::NodeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Opaque reference to one produced image, resolvable to a fetchable
/// location by the fixed `/view` URL convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub filename: String,
    pub subfolder: String,
    /// Output collection the file lives in (`"output"`, `"temp"`, ...)
    pub kind: String,
}

impl ImageRef {
    pub fn new(
        filename: impl Into<String>,
        subfolder: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            subfolder: subfolder.into(),
            kind: kind.into(),
        }
    }

    /// URL the host can open to show this image at full size
    pub fn view_url(&self) -> String {
        format!(
            "/view?filename={}&subfolder={}&type={}",
            self.filename, self.subfolder, self.kind
        )
    }
}

/// Last-known output payload of one node
#[derive(Debug, Clone, Default)]
pub struct NodeOutput {
    /// Ordered image references, shared so identity comparison is possible
    pub images: Option<Arc<[ImageRef]>>,
}

impl NodeOutput {
    pub fn with_images(images: Vec<ImageRef>) -> Self {
        Self {
            images: Some(images.into()),
        }
    }
}

/// Node-id keyed output map; single writer, read during every repaint
#[derive(Debug, Default)]
pub struct OutputStore {
    outputs: HashMap<NodeId, NodeOutput>,
}

impl OutputStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the payload for a node
    pub fn set(&mut self, node: NodeId, output: NodeOutput) {
        self.outputs.insert(node, output);
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeOutput> {
        self.outputs.get(&node)
    }

    pub fn remove(&mut self, node: NodeId) -> Option<NodeOutput> {
        self.outputs.remove(&node)
    }

    /// Dropped wholesale on graph reset
    pub fn clear(&mut self) {
        self.outputs.clear();
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_url_follows_the_convention() {
        let image = ImageRef::new("img_0001.png", "batch", "output");
        assert_eq!(
            image.view_url(),
            "/view?filename=img_0001.png&subfolder=batch&type=output"
        );
    }

    #[test]
    fn replacement_changes_identity_but_redelivery_does_not() {
        let mut store = OutputStore::new();
        store.set(7, NodeOutput::with_images(vec![ImageRef::new("a.png", "", "output")]));

        let first = store.get(7).unwrap().images.clone().unwrap();
        let again = store.get(7).unwrap().images.clone().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        store.set(7, NodeOutput::with_images(vec![ImageRef::new("a.png", "", "output")]));
        let replaced = store.get(7).unwrap().images.clone().unwrap();
        assert!(!Arc::ptr_eq(&first, &replaced));
    }
}
