#![allow(dead_code)]

use std::sync::Arc;

use docstep_model::{Attrs, Mark, Node, Pos, Schema};

pub fn pos(path: &[usize], offset: usize) -> Pos {
    Pos::new(path.to_vec(), offset)
}

/// Builds trees against one schema, panicking on invalid nesting.
pub struct Builder {
    pub schema: Schema,
}

impl Builder {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn basic() -> Self {
        Self::new(Schema::basic())
    }

    pub fn node(&self, name: &str, content: Vec<Node>) -> Node {
        self.schema.node(name, Attrs::new(), content).unwrap()
    }

    pub fn node_with(&self, name: &str, key: &str, value: &str, content: Vec<Node>) -> Node {
        let mut attrs = Attrs::new();
        attrs.insert(key.to_string(), value.to_string());
        self.schema.node(name, attrs, content).unwrap()
    }

    pub fn doc(&self, content: Vec<Node>) -> Arc<Node> {
        Arc::new(self.node("doc", content))
    }

    pub fn p(&self, value: &str) -> Node {
        self.node("paragraph", vec![self.text(value)])
    }

    pub fn text(&self, value: &str) -> Node {
        self.schema.text(value, Vec::new()).unwrap()
    }

    pub fn strong(&self, value: &str) -> Node {
        self.schema.text(value, vec![Mark::new("strong")]).unwrap()
    }

    pub fn template(&self, name: &str) -> Node {
        self.schema.template(name, Attrs::new()).unwrap()
    }
}
