use treebank_protocol::{base_len, function_tags, Tree, FUNCTION_TAG_CHARS};

use crate::config::Configuration;

/// First pass: reduces labels to their base category, keeping only the
/// function tags the configuration retains, and prunes empty nodes.
#[derive(Debug, Clone, Copy)]
pub struct SubcategoryStripper<'c> {
    config: &'c Configuration,
}

impl<'c> SubcategoryStripper<'c> {
    pub fn new(config: &'c Configuration) -> Self {
        Self { config }
    }

    /// Returns `None` when nothing of `tree` survives: an unlabelled node, or
    /// a node left without children.
    pub fn strip(&self, tree: &Tree) -> Option<Tree> {
        let (label, children) = match tree {
            Tree::Leaf(_) => return Some(tree.clone()),
            Tree::Node { label, children } => (label, children),
        };
        if label.is_empty() {
            return None;
        }
        let children: Vec<Tree> = children.iter().filter_map(|c| self.strip(c)).collect();
        if children.is_empty() {
            return None;
        }

        let label = self.strip_label(label);
        if self.config.split_poss >= 2 && label == "POSSP" {
            return Some(merge_possessive(children));
        }
        Some(Tree::node(label, children))
    }

    fn strip_label(&self, label: &str) -> String {
        match self.config.leave_it_all {
            n if n >= 2 => return label.to_string(),
            1 => return drop_coindexation(label),
            _ => {}
        }
        let base = &label[..base_len(label, FUNCTION_TAG_CHARS)];
        let mut out = base.to_string();
        for seg in function_tags(label) {
            let keep = match seg.strip_prefix('-') {
                Some("TMP") => self.config.strip_keeps_tmp(base),
                Some("ADV") => self.config.retain_adv_subcategories,
                _ => false,
            };
            if keep {
                out.push_str(seg);
            }
        }
        out
    }
}

/// Removes coindexation (`=2`, `-1`) and keeps every other function tag.
fn drop_coindexation(label: &str) -> String {
    let start = base_len(label, FUNCTION_TAG_CHARS);
    let tags = function_tags(label);
    let tags_len: usize = tags.iter().map(|seg| seg.len()).sum();
    let mut out = label[..start].to_string();
    for seg in tags {
        let is_index = seg.len() > 1 && seg[1..].chars().all(|c| c.is_ascii_digit());
        if !is_index {
            out.push_str(seg);
        }
    }
    out.push_str(&label[start + tags_len..]);
    out
}

/// `(POSSP (NP a b) (POS 's))` -> `(NP a b (POS 's))`.
fn merge_possessive(children: Vec<Tree>) -> Tree {
    let mut merged = Vec::with_capacity(children.len() + 1);
    for child in children {
        match child {
            Tree::Node { label, children } if label == "NP" => merged.extend(children),
            other => merged.push(other),
        }
    }
    Tree::node("NP", merged)
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

    fn strip_with(flags: &[&str], tree: &Tree) -> Option<Tree> {
        let (config, _) = Configuration::from_flags(flags).unwrap();
        SubcategoryStripper::new(&config).strip(tree)
    }

    #[test]
    fn test_strips_function_tags() {
        let tree = n(
            "S",
            vec![
                n("NP-SBJ-1", vec![pt("PRP", "We")]),
                n("VP", vec![pt("VBD", "left"), n("NP-TMP", vec![pt("NN", "today")])]),
            ],
        );
        let out = strip_with(&[], &tree).unwrap();
        assert_eq!(out.to_string(), "(S (NP (PRP We)) (VP (VBD left) (NP (NN today))))");
    }

    #[test]
    fn test_retains_tmp_and_adv() {
        let tree = n("PP-TMP-ADV", vec![pt("IN", "after")]);
        assert_eq!(strip_with(&["-retainTMPSubcategories"], &tree).unwrap().label(), "PP-TMP");
        assert_eq!(
            strip_with(&["-retainTMPSubcategories", "-retainADVSubcategories"], &tree)
                .unwrap()
                .label(),
            "PP-TMP-ADV"
        );
        assert_eq!(strip_with(&["-retainNPTMPSubcategories"], &tree).unwrap().label(), "PP");

        let reordered = n("PP-ADV-TMP", vec![pt("IN", "after")]);
        assert_eq!(
            strip_with(&["-retainTMPSubcategories", "-retainADVSubcategories"], &reordered)
                .unwrap()
                .label(),
            "PP-ADV-TMP"
        );
        assert_eq!(
            strip_with(&["-retainTMPSubcategories"], &n("PP-ADV-TMP-2", vec![pt("IN", "after")]))
                .unwrap()
                .label(),
            "PP-TMP"
        );

        let np = n("NP-TMP", vec![pt("NN", "today")]);
        assert_eq!(strip_with(&["-retainNPTMPSubcategories"], &np).unwrap().label(), "NP-TMP");
        assert_eq!(strip_with(&["-splitTMP", "1"], &np).unwrap().label(), "NP-TMP");
    }

    #[test]
    fn test_prunes_empty_nodes() {
        assert_eq!(strip_with(&[], &n("NP", vec![])), None);
        let tree = n("S", vec![n("NP", vec![]), n("VP", vec![pt("VBD", "ran")])]);
        assert_eq!(strip_with(&[], &tree).unwrap().children().len(), 1);
        assert_eq!(strip_with(&[], &n("S", vec![n("NP", vec![])])), None);
        assert_eq!(strip_with(&[], &n("", vec![pt("NN", "x")])), None);
    }

    #[test]
    fn test_bracketed_labels_survive() {
        let tree = n("NP", vec![pt("-NONE-", "*T*-1"), pt("-LRB-", "-LRB-")]);
        let out = strip_with(&[], &tree).unwrap();
        assert_eq!(out.children()[0].label(), "-NONE-");
        assert_eq!(out.children()[1].label(), "-LRB-");
    }

    #[test]
    fn test_leave_it_all() {
        let tree = n("NP-SBJ-1=2", vec![pt("NN", "x")]);
        assert_eq!(strip_with(&["-leaveItAll", "1"], &tree).unwrap().label(), "NP-SBJ");
        assert_eq!(strip_with(&["-leaveItAll", "2"], &tree).unwrap().label(), "NP-SBJ-1=2");
    }

    #[test]
    fn test_possp_is_merged_back() {
        let tree = n(
            "POSSP",
            vec![n("NP", vec![pt("NNP", "John")]), pt("POS", "'s")],
        );
        let out = strip_with(&["-splitPoss", "2"], &tree).unwrap();
        assert_eq!(out.to_string(), "(NP (NNP John) (POS 's))");
        assert_eq!(strip_with(&[], &tree).unwrap().label(), "POSSP");
    }

    #[test]
    fn test_leaf_is_identity() {
        assert_eq!(strip_with(&[], &Tree::leaf("NP-TMP")), Some(Tree::leaf("NP-TMP")));
    }

    fn arb_tree() -> impl Strategy<Value = Tree> {
        let labels = prop::sample::select(vec![
            "NP", "NP-TMP", "PP-LOC-1", "S-ADV", "VP=2", "ADVP-TMP-ADV", "POSSP", "", "SBAR",
        ]);
        let tags = prop::sample::select(vec!["NN", "POS", "IN", "-NONE-", "RB-TMP"]);
        let leaf = (tags, "[a-z]{1,4}").prop_map(|(tag, word)| Tree::preterminal(tag, word));
        leaf.prop_recursive(4, 24, 3, move |inner| {
            (labels.clone(), prop::collection::vec(inner, 0..3))
                .prop_map(|(label, children)| Tree::node(label, children))
        })
    }

    fn arb_config() -> impl Strategy<Value = Configuration> {
        (any::<bool>(), any::<bool>(), any::<bool>(), 0i32..3, 0i32..3, 0i32..3).prop_map(
            |(tmp, np_tmp, adv, split_poss, leave_it_all, split_tmp)| Configuration {
                retain_tmp_subcategories: tmp,
                retain_np_tmp_subcategories: np_tmp,
                retain_adv_subcategories: adv,
                split_poss,
                leave_it_all,
                split_tmp,
                ..Configuration::default()
            },
        )
    }

    proptest! {
        #[test]
        fn test_strip_is_idempotent(tree in arb_tree(), config in arb_config()) {
            let stripper = SubcategoryStripper::new(&config);
            if let Some(once) = stripper.strip(&tree) {
                prop_assert_eq!(stripper.strip(&once), Some(once.clone()));
            }
        }

        #[test]
        fn test_tmp_kept_iff_retained(retain in any::<bool>()) {
            let tree = n("NP-TMP", vec![pt("DT", "The"), pt("NN", "day")]);
            let flags: &[&str] = if retain { &["-retainTMPSubcategories"] } else { &[] };
            let out = strip_with(flags, &tree).unwrap();
            prop_assert_eq!(out.label().contains("-TMP"), retain);
        }
    }
}
