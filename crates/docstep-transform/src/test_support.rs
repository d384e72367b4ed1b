//! Tree builders for unit tests, over the basic schema.

use std::sync::{Arc, LazyLock};

use docstep_model::{Attrs, Mark, Node, Pos, Schema};

static SCHEMA: LazyLock<Schema> = LazyLock::new(Schema::basic);

pub fn schema() -> &'static Schema {
    &SCHEMA
}

pub fn pos(path: &[usize], offset: usize) -> Pos {
    Pos::new(path.to_vec(), offset)
}

fn node(name: &str, attrs: Attrs, content: Vec<Node>) -> Node {
    SCHEMA.node(name, attrs, content).unwrap()
}

fn attr(key: &str, value: &str) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert(key.to_string(), value.to_string());
    attrs
}

pub fn doc(content: Vec<Node>) -> Arc<Node> {
    Arc::new(node("doc", Attrs::new(), content))
}

pub fn p(content: Vec<Node>) -> Node {
    node("paragraph", Attrs::new(), content)
}

pub fn h(level: u8, content: Vec<Node>) -> Node {
    node("heading", attr("level", &level.to_string()), content)
}

pub fn code(content: Vec<Node>) -> Node {
    node("code_block", Attrs::new(), content)
}

pub fn blockquote(content: Vec<Node>) -> Node {
    node("blockquote", Attrs::new(), content)
}

pub fn ul(content: Vec<Node>) -> Node {
    node("bullet_list", Attrs::new(), content)
}

pub fn ol_from(order: usize, content: Vec<Node>) -> Node {
    node("ordered_list", attr("order", &order.to_string()), content)
}

pub fn li(content: Vec<Node>) -> Node {
    node("list_item", Attrs::new(), content)
}

pub fn hr() -> Node {
    node("horizontal_rule", Attrs::new(), Vec::new())
}

pub fn br() -> Node {
    node("hard_break", Attrs::new(), Vec::new())
}

pub fn text(value: &str) -> Node {
    SCHEMA.text(value, Vec::new()).unwrap()
}

pub fn marked(value: &str, mark: Mark) -> Node {
    SCHEMA.text(value, vec![mark]).unwrap()
}
