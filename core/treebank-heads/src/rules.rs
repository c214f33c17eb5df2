use treebank_protocol::Tree;

/// Search order for one head rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// For each category in priority order, scan children left to right.
    Left,
    /// For each category in priority order, scan children right to left.
    Right,
    /// Scan children left to right; the first child in the set wins.
    LeftDis,
    /// Scan children right to left; the first child in the set wins.
    RightDis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadRule {
    pub direction: Direction,
    pub categories: &'static [&'static str],
}

macro_rules! rule {
    ($dir:ident $(, $cat:literal)* $(,)?) => {
        HeadRule { direction: Direction::$dir, categories: &[$($cat),*] }
    };
}

pub type RuleTable = fn(&str) -> Option<&'static [HeadRule]>;

/// Collins (1999) head table.
pub fn collins(category: &str) -> Option<&'static [HeadRule]> {
    let rules: &'static [HeadRule] = match category {
        "ADJP" => &[rule!(
            Left, "NNS", "QP", "NN", "$", "ADVP", "JJ", "VBN", "VBG", "ADJP", "JJR", "NP", "JJS",
            "DT", "FW", "RBR", "RBS", "SBAR", "RB"
        )],
        "ADVP" => &[rule!(
            Right, "RB", "RBR", "RBS", "FW", "ADVP", "TO", "CD", "JJR", "JJ", "IN", "NP", "JJS", "NN"
        )],
        "CONJP" => &[rule!(Right, "CC", "RB", "IN")],
        "FRAG" => &[rule!(Right)],
        "INTJ" => &[rule!(Left)],
        "LST" => &[rule!(Right, "LS", ":")],
        "NAC" => &[rule!(
            Left, "NN", "NNS", "NNP", "NNPS", "NP", "NAC", "EX", "$", "CD", "QP", "PRP", "VBG",
            "JJ", "JJS", "JJR", "ADJP", "FW"
        )],
        "PP" => &[rule!(Right, "IN", "TO", "VBG", "VBN", "RP", "FW")],
        "PRN" => &[rule!(Left)],
        "PRT" => &[rule!(Right, "RP")],
        "QP" => &[rule!(
            Left, "$", "IN", "NNS", "NN", "JJ", "RB", "DT", "CD", "NCD", "QP", "JJR", "JJS"
        )],
        "RRC" => &[rule!(Right, "VP", "NP", "ADVP", "ADJP", "PP")],
        "S" => &[rule!(Left, "TO", "IN", "VP", "S", "SBAR", "ADJP", "UCP", "NP")],
        "SBAR" => &[rule!(
            Left, "WHNP", "WHPP", "WHADVP", "WHADJP", "IN", "DT", "S", "SQ", "SINV", "SBAR", "FRAG"
        )],
        "SBARQ" => &[rule!(Left, "SQ", "S", "SINV", "SBARQ", "FRAG")],
        "SINV" => &[rule!(Left, "VBZ", "VBD", "VBP", "VB", "MD", "VP", "S", "SINV", "ADJP", "NP")],
        "SQ" => &[rule!(Left, "VBZ", "VBD", "VBP", "VB", "MD", "VP", "SQ")],
        "UCP" => &[rule!(Right)],
        "VP" => &[rule!(
            Left, "TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "ADJP", "NN", "NNS", "NP"
        )],
        "WHADJP" => &[rule!(Left, "CC", "WRB", "JJ", "ADJP")],
        "WHADVP" => &[rule!(Right, "CC", "WRB")],
        "WHNP" => &[rule!(Left, "WDT", "WP", "WP$", "WHADJP", "WHPP", "WHNP")],
        "WHPP" => &[rule!(Right, "IN", "TO", "FW")],
        "X" => &[rule!(Right)],
        "POSSP" => &[rule!(Right, "POS")],
        "ROOT" => &[rule!(Left, "S", "SINV", "SBARQ", "SQ", "FRAG")],
        _ => return None,
    };
    Some(rules)
}

/// Collins table with the revisions used for annotation by default.
pub fn mod_collins(category: &str) -> Option<&'static [HeadRule]> {
    let rules: &'static [HeadRule] = match category {
        "ADJP" => &[
            rule!(Left, "$"),
            rule!(RightDis, "NNS", "NN", "JJ", "QP", "VBN", "VBG"),
            rule!(Left, "ADJP"),
            rule!(RightDis, "JJR", "JJS", "DT", "RB", "RBR", "CD", "IN", "VBD"),
            rule!(Left, "ADVP", "NP"),
        ],
        "ADVP" => &[
            rule!(Left, "ADVP", "IN"),
            rule!(RightDis, "RB", "RBR", "RBS", "JJ", "JJR", "JJS"),
            rule!(RightDis, "RP", "DT", "NN", "CD", "NP", "VBN", "NNP", "CC", "FW", "NNS", "ADJP"),
        ],
        "PP" => &[
            rule!(Right, "IN", "TO", "VBG", "VBN", "RP", "FW", "JJ", "SYM"),
            rule!(Left, "PP"),
        ],
        "PRN" => &[rule!(
            Left, "VP", "NP", "PP", "SQ", "S", "SINV", "SBAR", "ADJP", "ADVP", "INTJ", "WHNP",
            "NAC", "VBP", "JJ", "NN", "NNP"
        )],
        "S" => &[rule!(Left, "TO", "VP", "S", "FRAG", "SBAR", "ADJP", "UCP", "NP")],
        "SQ" => &[rule!(Left, "VBZ", "VBD", "VBP", "VB", "MD", "AUX", "VP", "SQ")],
        "VP" => &[rule!(
            Left, "TO", "VBD", "VBN", "MD", "VBZ", "VB", "VBG", "VBP", "VP", "AUX", "ADJP", "NN",
            "NNS", "JJ", "NP", "NNP"
        )],
        other => return collins(other),
    };
    Some(rules)
}

/// Head of a noun phrase (the Collins special case).
pub fn np_head(children: &[Tree]) -> Option<usize> {
    let cats: Vec<&str> = children.iter().map(|c| c.category().unwrap_or("")).collect();
    let last = cats.len().checked_sub(1)?;
    if cats[last] == "POS" {
        return Some(last);
    }
    let passes: [(Direction, &[&str]); 5] = [
        (Direction::RightDis, &["NN", "NNP", "NNPS", "NNS", "NX", "POS", "JJR"]),
        (Direction::LeftDis, &["NP"]),
        (Direction::RightDis, &["$", "ADJP", "PRN"]),
        (Direction::RightDis, &["CD"]),
        (Direction::RightDis, &["JJ", "JJS", "RB", "QP"]),
    ];
    for (direction, set) in passes {
        if let Some(idx) = scan(&cats, HeadRule { direction, categories: set }) {
            return Some(idx);
        }
    }
    Some(last)
}

fn scan(cats: &[&str], rule: HeadRule) -> Option<usize> {
    match rule.direction {
        Direction::Left => rule
            .categories
            .iter()
            .find_map(|wanted| cats.iter().position(|c| c == wanted)),
        Direction::Right => rule
            .categories
            .iter()
            .find_map(|wanted| cats.iter().rposition(|c| c == wanted)),
        Direction::LeftDis => cats.iter().position(|c| rule.categories.contains(c)),
        Direction::RightDis => cats.iter().rposition(|c| rule.categories.contains(c)),
    }
}

/// Applies `rules` in order; when none matches, the first rule's direction
/// decides between the leftmost and the rightmost child.
pub fn apply(rules: &[HeadRule], children: &[Tree]) -> usize {
    let cats: Vec<&str> = children.iter().map(|c| c.category().unwrap_or("")).collect();
    for rule in rules {
        if let Some(idx) = scan(&cats, *rule) {
            return idx;
        }
    }
    match rules.first().map(|r| r.direction) {
        Some(Direction::Right) | Some(Direction::RightDis) => children.len().saturating_sub(1),
        _ => 0,
    }
}

/// Head index of a node with category `category` and non-empty `children`.
pub fn locate(category: &str, children: &[Tree], table: RuleTable) -> Option<usize> {
    if children.is_empty() {
        return None;
    }
    if matches!(category, "NP" | "NX" | "NML") {
        return np_head(children);
    }
    match table(category) {
        Some(rules) => Some(apply(rules, children)),
        None => Some(0),
    }
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
    fn test_np_prefers_rightmost_noun() {
        let kids = vec![pt("DT", "the"), pt("NN", "stock"), pt("NN", "market")];
        assert_eq!(np_head(&kids), Some(2));
    }

    #[test]
    fn test_np_possessive_heads_on_pos() {
        let kids = vec![pt("NNP", "John"), pt("POS", "'s")];
        assert_eq!(np_head(&kids), Some(1));
    }

    #[test]
    fn test_np_falls_back_to_leftmost_np() {
        let kids = vec![
            n("NP", vec![pt("DT", "the"), pt("NN", "man")]),
            n("PP", vec![pt("IN", "in"), n("NP", vec![pt("NN", "town")])]),
        ];
        assert_eq!(np_head(&kids), Some(0));
    }

    #[test]
    fn test_bare_words_are_not_categories() {
        let kids = vec![Tree::leaf("NN"), pt("DT", "the")];
        assert_eq!(np_head(&kids), Some(1));
        let kids = vec![Tree::leaf("VBD"), pt("VBD", "gave")];
        assert_eq!(locate("VP", &kids, collins), Some(1));
    }

    #[test]
    fn test_vp_prefers_verb() {
        let kids = vec![pt("VBD", "gave"), n("NP", vec![pt("PRP", "him")])];
        assert_eq!(locate("VP", &kids, collins), Some(0));
    }

    #[test]
    fn test_mod_collins_overrides_pp() {
        let kids = vec![n("PP", vec![pt("IN", "of")]), n("PP", vec![pt("IN", "to")])];
        assert_eq!(locate("PP", &kids, mod_collins), Some(0));
        assert_eq!(locate("PP", &kids, collins), Some(1));
    }

    #[test]
    fn test_unknown_category_takes_leftmost() {
        let kids = vec![pt("A", "a"), pt("B", "b")];
        assert_eq!(locate("ZZZ", &kids, mod_collins), Some(0));
    }

    #[test]
    fn test_fallback_follows_first_rule_direction() {
        let kids = vec![pt("A", "a"), pt("B", "b")];
        assert_eq!(locate("UCP", &kids, collins), Some(1));
        assert_eq!(locate("INTJ", &kids, collins), Some(0));
    }
}
