//! Head finding for constituency trees.
//!
//! A head finder picks, for each phrasal node, the child that carries the
//! node's lexical head. The rule-table finders (Collins, ModCollins) drive
//! annotation; the semantic finders drive dependency extraction.

pub mod registry;
pub mod rules;
pub mod semantic;

use treebank_protocol::Tree;

pub use registry::{lookup, HeadFinderKind, REGISTRY};
pub use rules::{Direction, HeadRule};

/// Stateless head-selection policy.
pub trait HeadFinder: Send + Sync {
    /// Registry name of this finder.
    fn name(&self) -> &'static str;

    /// Index of the head child. `None` for leaves and childless nodes.
    fn determine_head(&self, tree: &Tree) -> Option<usize>;

    fn head_child<'t>(&self, tree: &'t Tree) -> Option<&'t Tree> {
        self.determine_head(tree)
            .and_then(|idx| tree.children().get(idx))
    }

    /// Follows head children down to the head preterminal.
    fn head_terminal<'t>(&self, tree: &'t Tree) -> Option<&'t Tree> {
        let mut current = tree;
        while !current.is_preterminal() {
            current = self.head_child(current)?;
        }
        Some(current)
    }
}

/// A head finder built from a `HeadFinderKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleBasedHeadFinder {
    kind: HeadFinderKind,
    copula_head: bool,
}

impl RuleBasedHeadFinder {
    pub fn new(kind: HeadFinderKind, copula_head: bool) -> Self {
        Self { kind, copula_head }
    }

    pub fn kind(&self) -> HeadFinderKind {
        self.kind
    }

    /// Whether a copula heads its copular VP (semantic variants only).
    pub fn copula_head(&self) -> bool {
        self.copula_head
    }
}

impl Default for RuleBasedHeadFinder {
    fn default() -> Self {
        Self::new(HeadFinderKind::default(), false)
    }
}

impl HeadFinder for RuleBasedHeadFinder {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn determine_head(&self, tree: &Tree) -> Option<usize> {
        let children = tree.children();
        if children.is_empty() {
            return None;
        }
        if tree.is_preterminal() || children.len() == 1 {
            return Some(0);
        }
        let category = tree.basic_category();
        match self.kind {
            HeadFinderKind::Left => Some(0),
            HeadFinderKind::Right => Some(children.len() - 1),
            HeadFinderKind::Collins => rules::locate(category, children, rules::collins),
            HeadFinderKind::ModCollins => rules::locate(category, children, rules::mod_collins),
            HeadFinderKind::Semantic | HeadFinderKind::UniversalSemantic => {
                let universal = self.kind == HeadFinderKind::UniversalSemantic;
                semantic::determine_head(category, children, universal, self.copula_head)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(tag: &str, word: &str) -> Tree {
        Tree::preterminal(tag, word)
    }

    fn n(label: &str, children: Vec<Tree>) -> Tree {
        Tree::node(label, children)
    }

    #[test]
    fn test_head_terminal_descends() {
        let tree = n(
            "S",
            vec![
                n("NP", vec![pt("PRP", "She")]),
                n("VP", vec![pt("VBD", "left"), n("ADVP", vec![pt("RB", "early")])]),
            ],
        );
        let hf = RuleBasedHeadFinder::default();
        assert_eq!(hf.head_terminal(&tree).and_then(|t| t.word()), Some("left"));
    }

    #[test]
    fn test_leaf_and_empty_have_no_head() {
        let hf = RuleBasedHeadFinder::default();
        assert_eq!(hf.determine_head(&Tree::leaf("x")), None);
        assert_eq!(hf.determine_head(&n("NP", vec![])), None);
        assert!(hf.head_terminal(&n("NP", vec![])).is_none());
    }

    #[test]
    fn test_left_and_right_finders() {
        let tree = n("X", vec![pt("A", "a"), pt("B", "b"), pt("C", "c")]);
        assert_eq!(HeadFinderKind::Left.build(false).determine_head(&tree), Some(0));
        assert_eq!(HeadFinderKind::Right.build(false).determine_head(&tree), Some(2));
    }

    fn arb_tree() -> impl Strategy<Value = Tree> {
        let labels = prop::sample::select(vec!["NP", "VP", "PP", "S", "SBAR", "ADJP", "QP", "FOO"]);
        let tags = prop::sample::select(vec!["NN", "VBD", "IN", "DT", "JJ", "TO", "CD", "POS"]);
        let leaf = (tags, "[a-z]{1,6}").prop_map(|(tag, word)| Tree::preterminal(tag, word));
        leaf.prop_recursive(4, 32, 4, move |inner| {
            (labels.clone(), prop::collection::vec(inner, 1..4))
                .prop_map(|(label, children)| Tree::node(label, children))
        })
    }

    proptest! {
        #[test]
        fn test_head_index_in_bounds(tree in arb_tree()) {
            for kind in REGISTRY.iter().map(|(_, kind)| *kind) {
                for copula in [false, true] {
                    let hf = kind.build(copula);
                    let head = hf.determine_head(&tree);
                    prop_assert!(head.is_some());
                    prop_assert!(head.unwrap() < tree.children().len());
                    prop_assert!(hf.head_terminal(&tree).is_some());
                }
            }
        }
    }
}
