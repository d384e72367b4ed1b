//! Steps, the step-kind registry, and the result of applying a step.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use docstep_model::{Attrs, Mark, Node, Pos};
use serde::{Deserialize, Serialize};

use crate::ancestor::{ANCESTOR, AncestorStep};
use crate::error::StepError;
use crate::join::{JOIN, JoinStep};
use crate::map::PosMap;
use crate::mark::{ADD_MARK, AddMarkStep, REMOVE_MARK, RemoveMarkStep};
use crate::split::{SPLIT, SplitStep};

/// Kind-specific parameters of a step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepParam {
    #[default]
    None,
    /// Strip `depth` ancestor levels, then wrap the range in `wrappers`
    /// (outermost first).
    Ancestor {
        #[serde(default)]
        depth: usize,
        #[serde(default)]
        wrappers: Vec<Node>,
    },
    Mark { mark: Mark },
    /// Free-form parameters for step kinds registered outside this crate.
    Custom(Attrs),
}

/// One edit, described as data so it can be stored, sent, inverted and
/// replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: String,
    pub from: Pos,
    pub to: Pos,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<Node>,
    #[serde(default)]
    pub param: StepParam,
}

impl Step {
    pub fn new(kind: &str, from: Pos, to: Pos, node: Option<Node>, param: StepParam) -> Self {
        Self {
            kind: kind.to_string(),
            from,
            to,
            node,
            param,
        }
    }

    pub fn ancestor(from: Pos, to: Pos, depth: usize, wrappers: Vec<Node>) -> Self {
        Self::new(
            ANCESTOR,
            from,
            to,
            None,
            StepParam::Ancestor { depth, wrappers },
        )
    }

    /// Split the container at `pos`; the second half takes the type and
    /// attributes of `node_after` when given.
    pub fn split(pos: Pos, node_after: Option<Node>) -> Self {
        Self::new(SPLIT, pos.clone(), pos, node_after, StepParam::None)
    }

    /// Join the node ending at `from` with its next sibling starting at `to`.
    pub fn join(from: Pos, to: Pos) -> Self {
        Self::new(JOIN, from, to, None, StepParam::None)
    }

    pub fn add_mark(from: Pos, to: Pos, mark: Mark) -> Self {
        Self::new(ADD_MARK, from, to, None, StepParam::Mark { mark })
    }

    pub fn remove_mark(from: Pos, to: Pos, mark: Mark) -> Self {
        Self::new(REMOVE_MARK, from, to, None, StepParam::Mark { mark })
    }

    pub fn apply(&self, registry: &StepRegistry, doc: &Arc<Node>) -> StepResult {
        registry.apply(doc, self)
    }

    pub fn invert(
        &self,
        registry: &StepRegistry,
        old_doc: &Node,
        map: &PosMap,
    ) -> Result<Step, StepError> {
        registry.invert(self, old_doc, map)
    }

    pub(crate) fn invalid_param(&self) -> StepError {
        StepError::InvalidParam {
            kind: self.kind.clone(),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}..{}", self.kind, self.from, self.to)
    }
}

/// The document produced by a step together with its position map.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub doc: Arc<Node>,
    pub map: PosMap,
}

impl TransformResult {
    pub fn new(doc: Arc<Node>, map: PosMap) -> Self {
        Self { doc, map }
    }
}

pub type StepResult = Result<TransformResult, StepError>;

/// The behaviour behind a step kind name.
pub trait StepKind: Send + Sync {
    /// Apply `step` to `doc`. Must not modify `doc` and must return an error,
    /// not panic, when the step does not fit the document.
    fn apply(&self, doc: &Arc<Node>, step: &Step) -> StepResult;

    /// Build the step that undoes `step`, given the document it was applied
    /// to and the map it produced.
    fn invert(&self, step: &Step, old_doc: &Node, map: &PosMap) -> Step;
}

static DEFAULT_REGISTRY: LazyLock<Arc<StepRegistry>> =
    LazyLock::new(|| Arc::new(StepRegistry::new()));

/// Step kinds by name.
#[derive(Clone)]
pub struct StepRegistry {
    kinds: HashMap<String, Arc<dyn StepKind>>,
}

impl StepRegistry {
    /// A registry with the built-in kinds: `ancestor`, `split`, `join`,
    /// `addMark` and `removeMark`.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry
            .register(ANCESTOR, AncestorStep)
            .register(SPLIT, SplitStep)
            .register(JOIN, JoinStep)
            .register(ADD_MARK, AddMarkStep)
            .register(REMOVE_MARK, RemoveMarkStep);
        registry
    }

    pub fn empty() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// The process-wide registry of built-in kinds.
    pub fn shared() -> Arc<StepRegistry> {
        DEFAULT_REGISTRY.clone()
    }

    /// Add a kind, replacing any kind already registered under `name`.
    pub fn register(&mut self, name: &str, kind: impl StepKind + 'static) -> &mut Self {
        self.kinds.insert(name.to_string(), Arc::new(kind));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn StepKind>> {
        self.kinds.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kinds.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn lookup(&self, name: &str) -> Result<&Arc<dyn StepKind>, StepError> {
        self.get(name)
            .ok_or_else(|| StepError::UnknownKind(name.to_string()))
    }

    pub fn apply(&self, doc: &Arc<Node>, step: &Step) -> StepResult {
        self.lookup(&step.kind)?.apply(doc, step)
    }

    pub fn invert(&self, step: &Step, old_doc: &Node, map: &PosMap) -> Result<Step, StepError> {
        Ok(self.lookup(&step.kind)?.invert(step, old_doc, map))
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("kinds", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;

    /// Swaps the attributes of a node in place; exists only to exercise
    /// registration of outside kinds.
    struct SetAttrs;

    impl StepKind for SetAttrs {
        fn apply(&self, doc: &Arc<Node>, step: &Step) -> StepResult {
            let StepParam::Custom(attrs) = &step.param else {
                return Err(step.invalid_param());
            };
            let path = step.from.to_path();
            let old = doc
                .try_path(&path)
                .ok_or_else(|| StepError::OutOfRange(step.from.to_string()))?;
            let replaced = Node::from_shared(old.node_type().clone(), attrs.clone(), old.content().to_vec());
            let mut copy = doc.clone();
            let parent = docstep_model::copy_to(&mut copy, &step.from.path);
            parent.content_mut()[step.from.offset] = Arc::new(replaced);
            Ok(TransformResult::new(copy, PosMap::identity()))
        }

        fn invert(&self, step: &Step, old_doc: &Node, _map: &PosMap) -> Step {
            let old = old_doc.path(&step.from.to_path());
            Step::new(
                &step.kind,
                step.from.clone(),
                step.to.clone(),
                None,
                StepParam::Custom(old.attrs().clone()),
            )
        }
    }

    #[test]
    fn test_builtin_kinds_registered() {
        let registry = StepRegistry::new();
        assert_eq!(
            registry.names(),
            vec!["addMark", "ancestor", "join", "removeMark", "split"]
        );
        assert!(StepRegistry::shared().contains(ANCESTOR));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let registry = StepRegistry::empty();
        let doc = doc(vec![p(vec![text("a")])]);
        let step = Step::split(pos(&[0], 0), None);
        assert_eq!(
            step.apply(&registry, &doc).unwrap_err(),
            StepError::UnknownKind("split".into())
        );
    }

    #[test]
    fn test_custom_kind_round_trip() {
        let mut registry = StepRegistry::new();
        registry.register("setAttrs", SetAttrs);

        let before = doc(vec![h(1, vec![text("a")])]);
        let mut attrs = Attrs::new();
        attrs.insert("level".into(), "3".into());
        let step = Step::new(
            "setAttrs",
            pos(&[], 0),
            pos(&[], 1),
            None,
            StepParam::Custom(attrs),
        );

        let result = step.apply(&registry, &before).unwrap();
        assert_eq!(result.doc.to_string(), r#"doc(heading{level=3}("a"))"#);

        let inverse = step.invert(&registry, &before, &result.map).unwrap();
        let restored = inverse.apply(&registry, &result.doc).unwrap();
        assert_eq!(restored.doc, before);
    }

    #[test]
    fn test_wrong_param_shape_is_rejected() {
        let registry = StepRegistry::new();
        let doc = doc(vec![p(vec![text("a")])]);
        let step = Step::new(ANCESTOR, pos(&[], 0), pos(&[], 1), None, StepParam::None);
        assert_eq!(
            step.apply(&registry, &doc).unwrap_err(),
            StepError::InvalidParam {
                kind: "ancestor".into()
            }
        );
    }

    #[test]
    fn test_step_serializes() {
        let step = Step::ancestor(pos(&[0], 0), pos(&[0], 2), 1, vec![blockquote(vec![])]);
        let json = serde_json::to_string(&step).unwrap();
        let back: Step = serde_json::from_str(&json).unwrap();
        assert_eq!(back, step);
        assert_eq!(step.to_string(), "ancestor 0:0..0:2");
    }
}
