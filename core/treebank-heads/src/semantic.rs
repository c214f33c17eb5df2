//! Semantic head finding for dependency extraction.
//!
//! Content words head their phrases: auxiliaries give way to the verb phrase
//! they govern, copulas give way to their predicate, and a subordinate
//! clause heads its `SBAR`. The universal variant also treats `get` as a
//! passive auxiliary and lets a preposition's object head the `PP`.

use treebank_protocol::{lexicon, BaseCategory, Tree};

use crate::rules::{self, HeadRule};

const SEMANTIC_SBAR: &[HeadRule] = &[HeadRule {
    direction: rules::Direction::Left,
    categories: &[
        "S", "SQ", "SINV", "SBAR", "FRAG", "VP", "WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT",
    ],
}];

const AUX_TARGETS: &[&str] = &["VP", "ADJP"];

const PREDICATES: &[&str] = &[
    "VP", "ADJP", "NP", "WHADJP", "WHNP", "WHPP", "WHADVP", "UCP", "PP", "ADVP",
];

pub fn determine_head(
    category: &str,
    children: &[Tree],
    universal: bool,
    copula_head: bool,
) -> Option<usize> {
    if children.is_empty() {
        return None;
    }
    match BaseCategory::from(category) {
        BaseCategory::Sbar => Some(rules::apply(SEMANTIC_SBAR, children)),
        BaseCategory::Vp | BaseCategory::Sq | BaseCategory::Sinv => {
            verbal_head(children, universal, copula_head)
                .or_else(|| rules::locate(category, children, rules::mod_collins))
        }
        BaseCategory::Pp if universal => prepositional_object(children)
            .or_else(|| rules::locate(category, children, rules::mod_collins)),
        _ => rules::locate(category, children, rules::mod_collins),
    }
}

fn is_auxiliary(child: &Tree, universal: bool) -> bool {
    let Some(word) = child.word() else {
        return false;
    };
    let tag = BaseCategory::of_label(child.label());
    match tag {
        BaseCategory::To => true,
        BaseCategory::Md => true,
        t if t.is_verbal() => lexicon::is_auxiliary(word) || (universal && lexicon::is_get(word)),
        _ => false,
    }
}

fn is_copula(child: &Tree) -> bool {
    child.word().map_or(false, lexicon::is_be)
        && BaseCategory::of_label(child.label()).is_verbal()
}

/// First child after `from` whose category is in `priority`, trying the
/// categories in priority order.
fn first_after(children: &[Tree], from: usize, priority: &[&str]) -> Option<usize> {
    priority.iter().find_map(|wanted| {
        children
            .iter()
            .enumerate()
            .skip(from + 1)
            .find(|(_, c)| c.category() == Some(*wanted))
            .map(|(idx, _)| idx)
    })
}

fn verbal_head(children: &[Tree], universal: bool, copula_head: bool) -> Option<usize> {
    if let Some(aux) = children.iter().position(|c| is_auxiliary(c, universal)) {
        let governs_vp = children[aux + 1..]
            .iter()
            .any(|c| c.category() == Some("VP"));
        if governs_vp {
            if let Some(idx) = first_after(children, aux, AUX_TARGETS) {
                return Some(idx);
            }
        }
    }
    if copula_head {
        return None;
    }
    let copula = children.iter().position(is_copula)?;
    first_after(children, copula, PREDICATES)
}

fn prepositional_object(children: &[Tree]) -> Option<usize> {
    let prep = children.iter().position(|c| {
        c.is_preterminal()
            && matches!(
                BaseCategory::of_label(c.label()),
                BaseCategory::In | BaseCategory::To
            )
    })?;
    first_after(children, prep, &["NP", "S", "SBAR"])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(tag: &str, word: &str) -> Tree {
        Tree::preterminal(tag, word)
    }

    fn n(label: &str, children: Vec<Tree>) -> Tree {
        Tree::node(label, children)
    }

    #[test]
    fn test_auxiliary_yields_to_vp() {
        // has [eaten]
        let kids = vec![pt("VBZ", "has"), n("VP", vec![pt("VBN", "eaten")])];
        assert_eq!(determine_head("VP", &kids, false, false), Some(1));
    }

    #[test]
    fn test_copula_yields_to_predicate() {
        // is [happy]
        let kids = vec![pt("VBZ", "is"), n("ADJP", vec![pt("JJ", "happy")])];
        assert_eq!(determine_head("VP", &kids, false, false), Some(1));
        assert_eq!(determine_head("VP", &kids, false, true), Some(0));
    }

    #[test]
    fn test_copula_head_keeps_auxiliary_behaviour() {
        // is [running]
        let kids = vec![pt("VBZ", "is"), n("VP", vec![pt("VBG", "running")])];
        assert_eq!(determine_head("VP", &kids, false, true), Some(1));
    }

    #[test]
    fn test_get_passive_only_in_universal() {
        let kids = vec![pt("VBD", "got"), n("VP", vec![pt("VBN", "fired")])];
        assert_eq!(determine_head("VP", &kids, true, false), Some(1));
        assert_eq!(determine_head("VP", &kids, false, false), Some(0));
    }

    #[test]
    fn test_sbar_headed_by_clause() {
        let kids = vec![
            pt("IN", "that"),
            n("S", vec![n("NP", vec![pt("PRP", "he")]), n("VP", vec![pt("VBD", "left")])]),
        ];
        assert_eq!(determine_head("SBAR", &kids, false, false), Some(1));
    }

    #[test]
    fn test_universal_pp_headed_by_object() {
        let kids = vec![pt("IN", "in"), n("NP", vec![pt("NN", "town")])];
        assert_eq!(determine_head("PP", &kids, true, false), Some(1));
        assert_eq!(determine_head("PP", &kids, false, false), Some(0));
    }
}
