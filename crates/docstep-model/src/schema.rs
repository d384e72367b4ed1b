use std::collections::{HashSet, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{Attrs, Mark, Node};

/// Group name of inline content (text runs, images, breaks).
pub const INLINE: &str = "inline";
/// Group name of ordinary block content.
pub const BLOCK: &str = "block";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown node type: {0}")]
    UnknownType(String),

    #[error("duplicate node type: {0}")]
    DuplicateType(String),

    #[error("{parent} cannot contain {child}")]
    InvalidContent { parent: String, child: String },

    #[error("schema has no text node type")]
    NoTextType,
}

/// The kind of a node plus the nesting rules attached to it.
///
/// `group` is the category a node of this type belongs to and `contains` is
/// the category its children must belong to. A type with no `contains` is a
/// leaf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    /// Content must be unmarked text only.
    #[serde(default)]
    pub plain_text: bool,
    /// This is the text leaf type.
    #[serde(default)]
    pub text: bool,
}

impl NodeType {
    pub fn new(name: &str, group: Option<&str>, contains: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            group: group.map(str::to_string),
            contains: contains.map(str::to_string),
            plain_text: false,
            text: false,
        }
    }

    pub fn plain_text(mut self) -> Self {
        self.plain_text = true;
        self
    }

    pub fn text_leaf(name: &str) -> Self {
        Self {
            text: true,
            ..Self::new(name, Some(INLINE), None)
        }
    }

    /// Whether children of this type are inline content.
    pub fn is_textblock(&self) -> bool {
        self.contains.as_deref() == Some(INLINE)
    }

    pub fn is_leaf(&self) -> bool {
        self.contains.is_none()
    }

    pub fn can_contain(&self, child: &NodeType) -> bool {
        self.contains.is_some() && self.contains == child.group
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for NodeType {}

impl Hash for NodeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Finds the chain of intermediate node types needed to nest one type inside
/// another.
pub trait ConnectionResolver {
    /// Types to insert, outermost first, so that `container` can hold `target`
    /// through them. `Some(vec![])` when `container` accepts `target` directly,
    /// `None` when no chain exists.
    fn find_connection(
        &self,
        container: &NodeType,
        target: &NodeType,
    ) -> Option<Vec<Arc<NodeType>>>;
}

/// An ordered set of node types with one designated top (document) type.
#[derive(Debug, Clone)]
pub struct Schema {
    types: Vec<Arc<NodeType>>,
    top: Arc<NodeType>,
}

impl Schema {
    pub fn new(types: Vec<NodeType>, top: &str) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        for node_type in &types {
            if !seen.insert(node_type.name.clone()) {
                return Err(SchemaError::DuplicateType(node_type.name.clone()));
            }
        }
        let types: Vec<Arc<NodeType>> = types.into_iter().map(Arc::new).collect();
        let top = types
            .iter()
            .find(|t| t.name == top)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownType(top.to_string()))?;
        Ok(Self { types, top })
    }

    /// A small rich-text schema: paragraphs, headings, plain-text code blocks,
    /// blockquotes, bullet and ordered lists, rules, text, images and breaks.
    pub fn basic() -> Self {
        let types = vec![
            NodeType::new("doc", None, Some(BLOCK)),
            NodeType::new("paragraph", Some(BLOCK), Some(INLINE)),
            NodeType::new("heading", Some(BLOCK), Some(INLINE)),
            NodeType::new("code_block", Some(BLOCK), Some(INLINE)).plain_text(),
            NodeType::new("blockquote", Some(BLOCK), Some(BLOCK)),
            NodeType::new("bullet_list", Some(BLOCK), Some("list_item")),
            NodeType::new("ordered_list", Some(BLOCK), Some("list_item")),
            NodeType::new("list_item", Some("list_item"), Some(BLOCK)),
            NodeType::new("horizontal_rule", Some(BLOCK), None),
            NodeType::text_leaf("text"),
            NodeType::new("image", Some(INLINE), None),
            NodeType::new("hard_break", Some(INLINE), None),
        ];
        let types: Vec<Arc<NodeType>> = types.into_iter().map(Arc::new).collect();
        let top = types[0].clone();
        Self { types, top }
    }

    pub fn top(&self) -> &Arc<NodeType> {
        &self.top
    }

    pub fn types(&self) -> impl Iterator<Item = &Arc<NodeType>> {
        self.types.iter()
    }

    pub fn node_type(&self, name: &str) -> Result<&Arc<NodeType>, SchemaError> {
        self.types
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemaError::UnknownType(name.to_string()))
    }

    pub fn text_type(&self) -> Result<&Arc<NodeType>, SchemaError> {
        self.types
            .iter()
            .find(|t| t.text)
            .ok_or(SchemaError::NoTextType)
    }

    /// Build a node, checking that every child is allowed in it.
    pub fn node(
        &self,
        name: &str,
        attrs: Attrs,
        content: Vec<Node>,
    ) -> Result<Node, SchemaError> {
        let node_type = self.node_type(name)?;
        for child in &content {
            if !node_type.can_contain(child.node_type()) {
                return Err(SchemaError::InvalidContent {
                    parent: node_type.name.clone(),
                    child: child.node_type().name.clone(),
                });
            }
        }
        Ok(Node::new(node_type.clone(), attrs, content))
    }

    /// An empty node of the given type, suitable as a wrapper template.
    pub fn template(&self, name: &str, attrs: Attrs) -> Result<Node, SchemaError> {
        self.node(name, attrs, Vec::new())
    }

    pub fn text(&self, text: &str, marks: Vec<Mark>) -> Result<Node, SchemaError> {
        Ok(Node::text(self.text_type()?.clone(), text, marks))
    }
}

impl ConnectionResolver for Schema {
    fn find_connection(
        &self,
        container: &NodeType,
        target: &NodeType,
    ) -> Option<Vec<Arc<NodeType>>> {
        if container.can_contain(target) {
            return Some(Vec::new());
        }

        // Breadth-first over wrapper types so the shortest chain wins; ties go
        // to the type declared first in the schema.
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&NodeType, Vec<Arc<NodeType>>)> = VecDeque::new();
        queue.push_back((container, Vec::new()));

        while let Some((current, chain)) = queue.pop_front() {
            for candidate in &self.types {
                if candidate.text || candidate.is_leaf() || !current.can_contain(candidate) {
                    continue;
                }
                if !seen.insert(candidate.name.as_str()) {
                    continue;
                }
                let mut next = chain.clone();
                next.push(candidate.clone());
                if candidate.can_contain(target) {
                    return Some(next);
                }
                queue.push_back((candidate.as_ref(), next));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(chain: Option<Vec<Arc<NodeType>>>) -> Option<Vec<String>> {
        chain.map(|types| types.iter().map(|t| t.name.clone()).collect())
    }

    #[test]
    fn test_direct_connection_is_empty_chain() {
        let schema = Schema::basic();
        let doc = schema.node_type("doc").unwrap();
        let blockquote = schema.node_type("blockquote").unwrap();
        assert_eq!(names(schema.find_connection(doc, blockquote)), Some(vec![]));
    }

    #[test]
    fn test_list_item_needs_a_list() {
        let schema = Schema::basic();
        let doc = schema.node_type("doc").unwrap();
        let item = schema.node_type("list_item").unwrap();
        assert_eq!(
            names(schema.find_connection(doc, item)),
            Some(vec!["bullet_list".to_string()])
        );
    }

    #[test]
    fn test_list_to_paragraph_goes_through_item() {
        let schema = Schema::basic();
        let list = schema.node_type("ordered_list").unwrap();
        let paragraph = schema.node_type("paragraph").unwrap();
        assert_eq!(
            names(schema.find_connection(list, paragraph)),
            Some(vec!["list_item".to_string()])
        );
    }

    #[test]
    fn test_leaf_cannot_connect() {
        let schema = Schema::basic();
        let rule = schema.node_type("horizontal_rule").unwrap();
        let text = schema.node_type("text").unwrap();
        assert_eq!(names(schema.find_connection(rule, text)), None);
    }

    #[test]
    fn test_duplicate_types_rejected() {
        let result = Schema::new(
            vec![
                NodeType::new("doc", None, Some(BLOCK)),
                NodeType::new("doc", None, Some(BLOCK)),
            ],
            "doc",
        );
        assert_eq!(result.unwrap_err(), SchemaError::DuplicateType("doc".into()));
    }

    #[test]
    fn test_missing_top_rejected() {
        let result = Schema::new(vec![NodeType::text_leaf("text")], "doc");
        assert_eq!(result.unwrap_err(), SchemaError::UnknownType("doc".into()));
    }

    #[test]
    fn test_node_checks_content() {
        let schema = Schema::basic();
        let text = schema.text("a", vec![]).unwrap();
        let err = schema.node("doc", Attrs::new(), vec![text]).unwrap_err();
        assert_eq!(
            err,
            SchemaError::InvalidContent {
                parent: "doc".into(),
                child: "text".into()
            }
        );
    }

    #[test]
    fn test_type_flags() {
        let schema = Schema::basic();
        assert!(schema.node_type("paragraph").unwrap().is_textblock());
        assert!(schema.node_type("code_block").unwrap().plain_text);
        assert!(!schema.node_type("blockquote").unwrap().is_textblock());
        assert!(schema.node_type("hard_break").unwrap().is_leaf());
        assert!(schema.text_type().unwrap().text);
    }
}
