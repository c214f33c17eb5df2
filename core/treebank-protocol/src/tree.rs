use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use crate::category::basic_category;

/// A constituency tree node.
///
/// A `Leaf` carries a surface word. A `Node` carries a category label and owns
/// its children. A preterminal is a `Node` with exactly one `Leaf` child;
/// every other `Node` is phrasal, including the degenerate `(NP)` with no
/// children at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum Tree {
    Leaf(String),
    Node { label: String, children: Vec<Tree> },
}

impl Tree {
    pub fn leaf(word: impl Into<String>) -> Self {
        Tree::Leaf(word.into())
    }

    pub fn node(label: impl Into<String>, children: Vec<Tree>) -> Self {
        Tree::Node {
            label: label.into(),
            children,
        }
    }

    pub fn preterminal(tag: impl Into<String>, word: impl Into<String>) -> Self {
        Tree::node(tag, alloc::vec![Tree::leaf(word)])
    }

    /// The category label of a node, or the word of a leaf.
    pub fn label(&self) -> &str {
        match self {
            Tree::Leaf(word) => word,
            Tree::Node { label, .. } => label,
        }
    }

    /// Basic category of the label (function tags and marks removed).
    pub fn basic_category(&self) -> &str {
        basic_category(self.label())
    }

    /// Basic category of a node; `None` for a leaf.
    pub fn category(&self) -> Option<&str> {
        match self {
            Tree::Leaf(_) => None,
            Tree::Node { label, .. } => Some(basic_category(label)),
        }
    }

    pub fn children(&self) -> &[Tree] {
        match self {
            Tree::Leaf(_) => &[],
            Tree::Node { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Tree::Leaf(_))
    }

    pub fn is_preterminal(&self) -> bool {
        match self {
            Tree::Leaf(_) => false,
            Tree::Node { children, .. } => children.len() == 1 && children[0].is_leaf(),
        }
    }

    pub fn is_phrasal(&self) -> bool {
        !self.is_leaf() && !self.is_preterminal()
    }

    /// The word under a preterminal.
    pub fn word(&self) -> Option<&str> {
        if self.is_preterminal() {
            Some(self.children()[0].label())
        } else {
            None
        }
    }

    pub fn first_child(&self) -> Option<&Tree> {
        self.children().first()
    }

    pub fn last_child(&self) -> Option<&Tree> {
        self.children().last()
    }

    /// Rebuilds the node with a new label, keeping its children.
    pub fn with_label(&self, label: impl Into<String>) -> Tree {
        match self {
            Tree::Leaf(_) => Tree::Leaf(label.into()),
            Tree::Node { children, .. } => Tree::node(label, children.clone()),
        }
    }

    /// Preterminals in left-to-right order.
    pub fn preterminals(&self) -> Vec<&Tree> {
        let mut out = Vec::new();
        self.collect_preterminals(&mut out);
        out
    }

    fn collect_preterminals<'t>(&'t self, out: &mut Vec<&'t Tree>) {
        if self.is_preterminal() {
            out.push(self);
            return;
        }
        for child in self.children() {
            child.collect_preterminals(out);
        }
    }

    /// Surface words in left-to-right order.
    pub fn words(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_words(&mut out);
        out
    }

    fn collect_words<'t>(&'t self, out: &mut Vec<&'t str>) {
        match self {
            Tree::Leaf(word) => out.push(word),
            Tree::Node { children, .. } => {
                for child in children {
                    child.collect_words(out);
                }
            }
        }
    }

    /// True if any node strictly below this one satisfies `pred`. Leaves
    /// are words, not categories, and are never tested.
    pub fn dominates(&self, pred: &dyn Fn(&Tree) -> bool) -> bool {
        self.children()
            .iter()
            .filter(|child| !child.is_leaf())
            .any(|child| pred(child) || child.dominates(pred))
    }

    /// Ancestors of `target` inside `self`, outermost first.
    ///
    /// Identity is checked first, so a borrowed subtree is located exactly.
    /// A detached copy falls back to the first structurally equal subtree.
    /// Returns an empty path when `target` is `self` and `None` when it is
    /// absent.
    pub fn path_to(&self, target: &Tree) -> Option<Vec<&Tree>> {
        let mut path = Vec::new();
        if self.find_path(target, &mut path, &|a, b| core::ptr::eq(a, b)) {
            return Some(path);
        }
        path.clear();
        if self.find_path(target, &mut path, &|a, b| a == b) {
            return Some(path);
        }
        None
    }

    fn find_path<'t>(
        &'t self,
        target: &Tree,
        path: &mut Vec<&'t Tree>,
        same: &dyn Fn(&Tree, &Tree) -> bool,
    ) -> bool {
        if same(self, target) {
            return true;
        }
        path.push(self);
        for child in self.children() {
            if child.find_path(target, path, same) {
                return true;
            }
        }
        path.pop();
        false
    }
}

/// Penn bracket notation: `(NP (DT The) (NN day))`.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Leaf(word) => write!(f, "{}", word),
            Tree::Node { label, children } => {
                write!(f, "({}", label)?;
                for child in children {
                    write!(f, " {}", child)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    fn sample() -> Tree {
        Tree::node(
            "S",
            vec![
                Tree::node("NP", vec![Tree::preterminal("PRP", "I")]),
                Tree::node(
                    "VP",
                    vec![
                        Tree::preterminal("VBD", "saw"),
                        Tree::node("NP", vec![Tree::preterminal("PRP", "her")]),
                    ],
                ),
            ],
        )
    }

    #[test]
    fn test_display_nested() {
        assert_eq!(
            sample().to_string(),
            "(S (NP (PRP I)) (VP (VBD saw) (NP (PRP her))))"
        );
    }

    #[test]
    fn test_words_and_preterminals() {
        let tree = sample();
        assert_eq!(tree.words(), vec!["I", "saw", "her"]);
        let tags: Vec<&str> = tree.preterminals().iter().map(|t| t.label()).collect();
        assert_eq!(tags, vec!["PRP", "VBD", "PRP"]);
    }

    #[test]
    fn test_path_to_borrowed_subtree() {
        let tree = sample();
        let vp = &tree.children()[1];
        let obj = &vp.children()[1];
        let path = tree.path_to(obj).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].label(), "S");
        assert_eq!(path[1].label(), "VP");
        assert!(tree.path_to(&tree).unwrap().is_empty());
    }

    #[test]
    fn test_path_to_detached_copy() {
        let tree = sample();
        let copy = tree.children()[1].clone();
        let path = tree.path_to(&copy).unwrap();
        assert_eq!(path.len(), 1);
        assert!(tree.path_to(&Tree::preterminal("NN", "absent")).is_none());
    }

    #[test]
    fn test_dominates() {
        let tree = sample();
        assert!(tree.dominates(&|t| t.basic_category() == "VBD"));
        assert!(!tree.dominates(&|t| t.basic_category() == "CC"));
    }

    #[test]
    fn test_words_are_not_categories() {
        let tree = Tree::node(
            "NP",
            vec![Tree::preterminal("JJ", "senior"), Tree::preterminal("NNP", "VP")],
        );
        assert!(!tree.dominates(&|t| t.basic_category() == "VP"));
        assert_eq!(tree.children()[1].category(), Some("NNP"));
        assert_eq!(tree.children()[1].children()[0].category(), None);
    }
}
