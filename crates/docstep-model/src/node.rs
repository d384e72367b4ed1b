use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::schema::NodeType;

/// Node and mark attributes.
pub type Attrs = BTreeMap<String, String>;

/// An inline annotation such as `strong`, `em` or `link`.
///
/// Marks order by name, then attributes. Nodes keep their marks sorted so two
/// runs carrying the same set compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Mark {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: Attrs,
}

impl Mark {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attrs: Attrs::new(),
        }
    }

    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }
}

/// A document tree node.
///
/// Children are held behind `Arc` so that edits only clone the spine from the
/// root to the edited container; every other subtree is shared between the
/// old and the new document. A `&mut Node` can only be obtained for a node the
/// caller owns outright, or through [`crate::tree::copy_to`], which clones
/// shared nodes before handing them out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    node_type: Arc<NodeType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    content: Vec<Arc<Node>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    marks: Vec<Mark>,
}

impl Node {
    pub fn new(node_type: Arc<NodeType>, attrs: Attrs, content: Vec<Node>) -> Self {
        Self::from_shared(node_type, attrs, content.into_iter().map(Arc::new).collect())
    }

    pub fn from_shared(node_type: Arc<NodeType>, attrs: Attrs, content: Vec<Arc<Node>>) -> Self {
        Self {
            node_type,
            attrs,
            content,
            text: None,
            marks: Vec::new(),
        }
    }

    pub fn text(node_type: Arc<NodeType>, text: &str, mut marks: Vec<Mark>) -> Self {
        marks.sort();
        marks.dedup();
        Self {
            node_type,
            attrs: Attrs::new(),
            content: Vec::new(),
            text: Some(text.to_string()),
            marks,
        }
    }

    pub fn node_type(&self) -> &Arc<NodeType> {
        &self.node_type
    }

    pub fn name(&self) -> &str {
        &self.node_type.name
    }

    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn content(&self) -> &[Arc<Node>] {
        &self.content
    }

    /// Mutable access to the child list of a node this caller owns.
    pub fn content_mut(&mut self) -> &mut Vec<Arc<Node>> {
        &mut self.content
    }

    pub fn child(&self, index: usize) -> &Arc<Node> {
        &self.content[index]
    }

    pub fn text_content(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    pub fn has_mark(&self, name: &str) -> bool {
        self.marks.iter().any(|m| m.name == name)
    }

    /// Insert `mark` in sorted position. Returns false when already present.
    pub fn add_mark(&mut self, mark: Mark) -> bool {
        match self.marks.binary_search(&mark) {
            Ok(_) => false,
            Err(index) => {
                self.marks.insert(index, mark);
                true
            }
        }
    }

    /// Returns false when the mark was not present.
    pub fn remove_mark(&mut self, mark: &Mark) -> bool {
        match self.marks.binary_search(mark) {
            Ok(index) => {
                self.marks.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Highest valid offset into this node's content.
    pub fn max_offset(&self) -> usize {
        self.content.len()
    }

    /// Same type, attributes, text and marks with different children.
    pub fn copy(&self, content: Vec<Arc<Node>>) -> Node {
        Node {
            node_type: self.node_type.clone(),
            attrs: self.attrs.clone(),
            content,
            text: self.text.clone(),
            marks: self.marks.clone(),
        }
    }

    /// Resolve a path to a descendant.
    ///
    /// # Panics
    /// Panics when an index along the path does not exist. Paths are produced
    /// by the engine itself, so a bad one is a caller bug.
    pub fn path(&self, path: &[usize]) -> &Node {
        self.try_path(path).unwrap_or_else(|| {
            panic!("path {path:?} does not exist in {}", self.name())
        })
    }

    pub fn try_path(&self, path: &[usize]) -> Option<&Node> {
        let mut node = self;
        for &index in path {
            node = node.content.get(index)?;
        }
        Some(node)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{text:?}")?,
            None => {
                f.write_str(self.name())?;
                if !self.attrs.is_empty() {
                    let attrs: Vec<String> =
                        self.attrs.iter().map(|(k, v)| format!("{k}={v}")).collect();
                    write!(f, "{{{}}}", attrs.join(","))?;
                }
                if !self.content.is_empty() {
                    f.write_str("(")?;
                    for (i, child) in self.content.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{child}")?;
                    }
                    f.write_str(")")?;
                }
            }
        }
        if !self.marks.is_empty() {
            let marks: Vec<&str> = self.marks.iter().map(|m| m.name.as_str()).collect();
            write!(f, "[{}]", marks.join(","))?;
        }
        Ok(())
    }
}
