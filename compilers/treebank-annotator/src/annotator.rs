//! Second pass: context-sensitive relabelling.
//!
//! The engine rebuilds the tree bottom-up. Every strategy reads its context
//! (parent, grandparent, siblings, children, heads) from the input tree and
//! extends the label being built for the current node, so a strategy sees
//! the marks appended by the strategies that ran before it on the same node.

use treebank_heads::{HeadFinder, RuleBasedHeadFinder};
use treebank_protocol::{
    basic_category, change_base_category, has_function_tag, lexicon, remove_function_tag,
    BaseCategory, Tree, WhCollapse,
};

use crate::config::Configuration;

/// Where a node sits in the input tree.
struct Context<'a, 't> {
    node: &'t Tree,
    /// Ancestors of `node`, outermost first.
    ancestors: &'a [&'t Tree],
}

impl<'a, 't> Context<'a, 't> {
    fn parent(&self) -> Option<&'t Tree> {
        self.ancestors.last().copied()
    }

    fn grandparent(&self) -> Option<&'t Tree> {
        let len = self.ancestors.len();
        len.checked_sub(2).map(|idx| self.ancestors[idx])
    }

    fn parent_category(&self) -> &'t str {
        self.parent().map_or("", Tree::basic_category)
    }

    fn grandparent_category(&self) -> &'t str {
        self.grandparent().map_or("", Tree::basic_category)
    }

    fn siblings(&self) -> &'t [Tree] {
        match self.parent() {
            Some(parent) => parent.children(),
            None => &[],
        }
    }

    /// Index of `node` among its siblings.
    fn position(&self) -> Option<usize> {
        let siblings = self.siblings();
        siblings
            .iter()
            .position(|s| std::ptr::eq(s, self.node))
            .or_else(|| siblings.iter().position(|s| s == self.node))
    }

    fn later_siblings(&self) -> &'t [Tree] {
        let siblings = self.siblings();
        match self.position() {
            Some(idx) => &siblings[idx + 1..],
            None => &[],
        }
    }

    fn has_ancestor(&self, pred: impl Fn(&BaseCategory) -> bool) -> bool {
        self.ancestors
            .iter()
            .any(|a| pred(&BaseCategory::of_label(a.label())))
    }
}

fn any_child(tree: &Tree, cats: &[&str]) -> bool {
    tree.children()
        .iter()
        .any(|c| !c.is_leaf() && cats.contains(&c.basic_category()))
}

fn is_word(tree: &Tree, word: &str) -> bool {
    tree.word().map_or(false, |w| w.eq_ignore_ascii_case(word))
}

/// Deduces a verb tag from the word form alone.
fn deduce_verb_tag(word: &str) -> &'static str {
    let lower = word.to_ascii_lowercase();
    if lower == "to" {
        "TO"
    } else if lower.ends_with("ing") {
        "VBG"
    } else if lower.ends_with("ed") {
        "VBD"
    } else if lower.ends_with('s') {
        "VBZ"
    } else {
        "VB"
    }
}

/// The tree annotation engine.
#[derive(Debug, Clone, Copy)]
pub struct TreeAnnotator<'c> {
    config: &'c Configuration,
    head_finder: RuleBasedHeadFinder,
}

impl<'c> TreeAnnotator<'c> {
    pub fn new(config: &'c Configuration) -> Self {
        Self {
            config,
            head_finder: config.head_finder.build(config.make_copula_head),
        }
    }

    /// Head finder consulted by the head-sensitive strategies.
    pub fn head_finder(&self) -> &RuleBasedHeadFinder {
        &self.head_finder
    }

    /// Annotates `tree`. `root` is the tree that encloses it; ancestor
    /// context is looked up there, and strategies that need an ancestor do
    /// nothing when `root` is `None` or does not contain `tree`.
    ///
    /// Returns `None` for a node with an empty label or with no children
    /// left after annotating them. Leaves come back unchanged.
    pub fn transform<'t>(&self, tree: &'t Tree, root: Option<&'t Tree>) -> Option<Tree> {
        let mut path = root.and_then(|r| r.path_to(tree)).unwrap_or_default();
        self.annotate(tree, &mut path)
    }

    fn annotate<'t>(&self, tree: &'t Tree, path: &mut Vec<&'t Tree>) -> Option<Tree> {
        let (label, children) = match tree {
            Tree::Leaf(_) => return Some(tree.clone()),
            Tree::Node { label, children } => (label, children),
        };
        if label.is_empty() || children.is_empty() {
            return None;
        }

        path.push(tree);
        let annotated: Vec<Tree> = children
            .iter()
            .filter_map(|child| self.annotate(child, path))
            .collect();
        path.pop();
        if annotated.is_empty() {
            return None;
        }

        let ctx = Context {
            node: tree,
            ancestors: path,
        };
        let mut label = self.handle_tmp(label);
        if tree.is_preterminal() {
            self.annotate_preterminal(&ctx, &mut label);
            Some(Tree::node(label, annotated))
        } else {
            self.annotate_phrasal(&ctx, &mut label);
            Some(self.restructure_possessive(tree, path, label, annotated))
        }
    }

    /// Drops a `-TMP` function tag that neither `-splitTMP` nor a retain
    /// flag keeps. Without `-splitTMP` the tag is left alone.
    fn handle_tmp(&self, label: &str) -> String {
        let base = basic_category(label);
        if self.config.split_tmp > 0
            && has_function_tag(label, "TMP")
            && !self.config.annotate_keeps_tmp(base)
        {
            remove_function_tag(label, "TMP")
        } else {
            label.to_string()
        }
    }

    fn annotate_preterminal(&self, ctx: &Context<'_, '_>, label: &mut String) {
        let c = self.config;
        let word = ctx.node.word().unwrap_or_default();

        if c.correct_tags {
            if let Some(tag) = self.corrected_tag(ctx, basic_category(label), word) {
                *label = change_base_category(label, tag);
            }
        }
        if matches!(BaseCategory::of_label(label), BaseCategory::Other(_)) {
            return;
        }

        if c.make_pp_to_into_in > 0 && basic_category(label) == "TO" {
            let parent = ctx.parent_category();
            let under_pp = parent == "PP";
            let outside_vp = !parent.is_empty() && parent != "VP";
            if under_pp || (c.make_pp_to_into_in >= 2 && outside_vp) {
                *label = change_base_category(label, "IN");
            }
        }
        if c.collapse_wh.contains(WhCollapse::TAGS) {
            if let Some(to) = c.collapse_wh.collapse(&BaseCategory::of_label(label)) {
                *label = change_base_category(label, to.as_str());
            }
        }
        if c.join_jj && matches!(basic_category(label), "JJR" | "JJS") {
            *label = change_base_category(label, "JJ");
        }
        if c.join_noun_tags && matches!(basic_category(label), "NNS" | "NNP" | "NNPS") {
            *label = change_base_category(label, "NN");
        }

        let tag = BaseCategory::of_label(label);
        let mut marks: Vec<&str> = Vec::new();

        if c.split_in > 0 && tag == BaseCategory::In {
            marks.extend(self.split_in(ctx, word));
        }
        if c.split_cc > 0 && tag == BaseCategory::Cc {
            marks.extend(self.split_cc(word));
        }
        if c.split_aux > 0 && tag.is_verbal() {
            marks.extend(self.split_aux(ctx, word));
        }
        if c.mark_ditrans_v > 0 && tag.is_verbal() && self.is_ditransitive(ctx) {
            marks.push("^2Arg");
        }
        if ctx.siblings().len() == 1 {
            let unary = match tag {
                BaseCategory::Dt => c.unary_dt,
                BaseCategory::Rb => c.unary_rb,
                BaseCategory::In => c.unary_in,
                BaseCategory::Prp => c.unary_prp,
                _ => false,
            };
            if unary {
                marks.push("^U");
            }
        }
        if c.mark_reflexive_prp && tag == BaseCategory::Prp && lexicon::is_reflexive(word) {
            marks.push("-SE");
        }
        if c.split_quotes
            && matches!(tag, BaseCategory::OpenQuote | BaseCategory::CloseQuote)
            && matches!(word, "`" | "'")
        {
            marks.push("-SG");
        }
        if c.split_rb && tag == BaseCategory::Rb {
            match ctx.parent_category() {
                "NP" => marks.push("^M"),
                "ADJP" => marks.push("^J"),
                "VP" => marks.push("^V"),
                _ => {}
            }
        }
        if c.split_more_less
            && matches!(
                tag,
                BaseCategory::Jjr | BaseCategory::Rbr | BaseCategory::Jjs | BaseCategory::Rbs
            )
            && lexicon::is_comparative_quantifier(word)
        {
            marks.push("-ML");
        }
        if c.split_jj_comp
            && tag == BaseCategory::Jj
            && ctx
                .later_siblings()
                .iter()
                .any(|s| matches!(s.category(), Some("PP" | "S" | "SBAR")))
        {
            marks.push("^CMPL");
        }
        if c.split_tr_jj
            && tag == BaseCategory::Jj
            && ctx.parent_category() == "ADJP"
            && ctx.parent().map_or(false, |p| any_child(p, &["S"]))
        {
            marks.push("-TR");
        }
        if c.split_tmp >= 3 && self.heads_temporal_np(ctx) {
            marks.push("-TMP");
        }

        for mark in marks {
            label.push_str(mark);
        }
    }

    fn corrected_tag(&self, ctx: &Context<'_, '_>, tag: &str, word: &str) -> Option<&'static str> {
        let lower = word.to_ascii_lowercase();
        if word == "%" {
            return (tag != "NN").then_some("NN");
        }
        if word == "U.S." && matches!(tag, "JJ" | "NN") {
            return Some("NNP");
        }
        if lower == "ago" && tag != "RB" {
            return Some("RB");
        }
        if ctx.parent_category() == "NP" {
            match (tag, lower.as_str()) {
                ("IN", "a" | "that") => return Some("DT"),
                ("IN", "so" | "about") => return Some("RB"),
                ("JJ", w) if lexicon::is_possessive_pronoun(w) => return Some("PRP"),
                _ => {}
            }
        }
        if matches!(tag, "WP" | "WDT" | "WRB")
            && ctx.parent().is_some()
            && !ctx.has_ancestor(|a| a.is_wh() || *a == BaseCategory::Sbar)
        {
            return Some(match tag {
                "WP" => "PRP",
                "WDT" => "DT",
                _ => "RB",
            });
        }
        if tag == "JJ" && lexicon::is_possessive_determiner(word) {
            return Some("PRP$");
        }
        None
    }

    fn split_in(&self, ctx: &Context<'_, '_>, word: &str) -> Option<&'static str> {
        let level = self.config.split_in;
        let parent = ctx.parent_category();
        let grand = ctx.grandparent_category();

        if level < 3 {
            if parent.starts_with('S') {
                return Some("^S");
            }
            if level >= 2 && grand.starts_with('S') {
                return Some("^S~");
            }
            return None;
        }

        if level >= 5 && parent == "SBAR" {
            if grand.starts_with('S') {
                return Some("-SCC");
            }
            if level >= 6 && lexicon::is_complementizer(word) {
                return Some("-C");
            }
            return Some("-T");
        }
        if grand.starts_with('N') && (parent.starts_with('P') || parent.starts_with('A')) {
            return Some("-N");
        }
        if parent.starts_with('Q') && (grand.starts_with('N') || grand == "ADJP") {
            return Some("-Q");
        }
        if grand == "S" {
            return Some(if parent == "SBAR" { "-SCC" } else { "-SC" });
        }
        if parent == "SBAR" || parent == "WHNP" {
            return Some("-T");
        }
        if level >= 4 && parent == "PP" && grand == "VP" {
            return Some("-V");
        }
        None
    }

    fn split_cc(&self, word: &str) -> Option<&'static str> {
        let level = self.config.split_cc;
        let lower = word.to_ascii_lowercase();
        match lower.as_str() {
            "and" if level >= 3 => Some("-A"),
            "but" if level >= 2 => Some("-B"),
            "&" if level >= 2 => Some("-A"),
            "and" | "or" => Some("-C"),
            _ => None,
        }
    }

    fn split_aux(&self, ctx: &Context<'_, '_>, word: &str) -> Option<&'static str> {
        let level = self.config.split_aux;
        let mark = if lexicon::is_be(word) {
            "-BE"
        } else if level >= 2 && lexicon::is_have(word) {
            "-HV"
        } else if level >= 3 && lexicon::is_do(word) {
            "-DO"
        } else {
            return None;
        };
        if level >= 4 && !ctx.later_siblings().iter().any(|s| s.category() == Some("VP")) {
            return None;
        }
        Some(mark)
    }

    fn is_ditransitive(&self, ctx: &Context<'_, '_>) -> bool {
        if ctx.parent_category() != "VP" {
            return false;
        }
        let count_s = self.config.mark_ditrans_v == 1;
        let objects = ctx
            .siblings()
            .iter()
            .filter(|s| !s.is_leaf())
            .filter(|s| match s.basic_category() {
                "NP" => !has_function_tag(s.label(), "TMP"),
                "S" => count_s,
                _ => false,
            })
            .count();
        objects >= 2
    }

    fn heads_temporal_np(&self, ctx: &Context<'_, '_>) -> bool {
        let Some(parent) = ctx.parent() else {
            return false;
        };
        parent.basic_category() == "NP"
            && has_function_tag(parent.label(), "TMP")
            && self.head_finder.determine_head(parent) == ctx.position()
    }

    fn annotate_phrasal(&self, ctx: &Context<'_, '_>, label: &mut String) {
        let c = self.config;
        let node = ctx.node;

        let base = BaseCategory::of_label(label);
        if matches!(base, BaseCategory::Other(_) | BaseCategory::Root) {
            return;
        }
        if let Some(to) = c.collapse_wh.collapse(&base) {
            *label = change_base_category(label, to.as_str());
        }
        if c.split_poss >= 2 && self.is_possessive_np(label, node) {
            *label = change_base_category(label, "POSSP");
        }

        let base = BaseCategory::of_label(label);
        let kids = node.children();
        let mut marks: Vec<String> = Vec::new();
        let mut mark = |m: &str| marks.push(m.to_string());

        if c.split_poss == 1 && self.is_possessive_np(label, node) {
            mark("-P");
        }
        if c.base_np > 0 && base == BaseCategory::Np && self.is_base_np(ctx) {
            mark("-B");
        }
        if c.split_vp > 0 && base == BaseCategory::Vp {
            if let Some(tag) = self.vp_head_tag(node) {
                mark(&format!("-{}", tag));
            }
        }
        if c.vp_sub_cat && base == BaseCategory::Vp {
            mark(&self.vp_subcategory(node));
        }
        if c.gpa_root_vp
            && base == BaseCategory::Vp
            && ctx.parent_category() == "S"
            && ctx.ancestors.len() == 2
        {
            mark("~ROOT");
        }
        if c.split_sbar > 0 && base == BaseCategory::Sbar {
            let purpose = kids
                .windows(2)
                .any(|w| is_word(&w[0], "in") && is_word(&w[1], "order"));
            let infinitival = kids.first().and_then(Tree::category) == Some("TO")
                || self.head_tag(node) == Some("TO");
            if c.split_sbar != 2 && purpose {
                mark("-PURP");
            }
            if c.split_sbar >= 2 && infinitival {
                mark("-INF");
            }
        }
        if c.split_s_gapped > 0 && base == BaseCategory::S {
            if let Some(gap) = self.s_gap(node) {
                mark(gap);
            }
        }
        if c.split_s_tag > 0 && base == BaseCategory::S {
            if let Some(stag) = self.s_tag(node) {
                mark(stag);
            }
        }
        if c.mark_cc > 0 {
            let non_initial_cc = kids.iter().skip(1).any(|k| k.category() == Some("CC"));
            let coordinated = kids.len() >= 2 && any_child(node, &["CC", "CONJP"]);
            if non_initial_cc || (c.mark_cc >= 2 && coordinated) {
                mark("-CC");
            }
        }
        if c.split_np_nnp > 0 && base == BaseCategory::Np {
            let proper = |k: &Tree| BaseCategory::of_label(k.label()).is_proper_noun();
            let preterminals: Vec<&Tree> = kids.iter().filter(|k| k.is_preterminal()).collect();
            let hit = match c.split_np_nnp {
                1 => kids.iter().any(|k| k.is_preterminal() && proper(k)),
                2 => kids.last().map_or(false, |k| k.is_preterminal() && proper(k)),
                _ => !preterminals.is_empty() && preterminals.iter().all(|k| proper(*k)),
            };
            if hit {
                mark("-NNP");
            }
        }
        if c.split_np_percent > 0 {
            let eligible = match base {
                BaseCategory::Np => true,
                BaseCategory::Qp | BaseCategory::Adjp => c.split_np_percent >= 2,
                _ => false,
            };
            let percent = if c.split_np_percent >= 3 {
                node.dominates(&|t| is_word(t, "%"))
            } else {
                kids.iter().any(|k| is_word(k, "%"))
            };
            if eligible && percent {
                mark("-%");
            }
        }
        if c.split_num_np && base == BaseCategory::Np && any_child(node, &["CD"]) {
            mark("-NUM");
        }
        if c.right_phrasal && kids.last().map_or(false, Tree::is_phrasal) {
            mark("-RX");
        }
        if c.dominates_v
            && base != BaseCategory::Vp
            && node.dominates(&|t| t.is_preterminal() && BaseCategory::of_label(t.label()).is_verbal())
        {
            mark("-v");
        }
        if c.dominates_c && node.dominates(&|t| matches!(t.category(), Some("CC" | "CONJP"))) {
            mark("-c");
        }
        if c.dominates_i
            && node.dominates(&|t| t.is_preterminal() && matches!(t.basic_category(), "IN" | "TO"))
        {
            mark("-i");
        }
        if c.mark_contained_vp
            && base != BaseCategory::Vp
            && node.dominates(&|t| t.category() == Some("VP") && !t.is_preterminal())
        {
            mark("-vp");
        }

        for m in marks {
            label.push_str(&m);
        }
    }

    fn is_possessive_np(&self, label: &str, node: &Tree) -> bool {
        basic_category(label) == "NP"
            && node.children().len() >= 2
            && node.last_child().and_then(Tree::category) == Some("POS")
    }

    /// Wraps the non-possessive children of a `POSSP` in a fresh `NP`,
    /// which is annotated as the first child of the `POSSP`.
    fn restructure_possessive<'t>(
        &self,
        tree: &'t Tree,
        path: &[&'t Tree],
        label: String,
        mut children: Vec<Tree>,
    ) -> Tree {
        let is_possp = basic_category(&label) == "POSSP"
            && children.len() >= 2
            && children.last().and_then(Tree::category) == Some("POS");
        if !is_possp || self.config.split_poss < 2 {
            return Tree::node(label, children);
        }
        let pos = children.split_off(children.len() - 1);

        // Unannotated copy of the new shape, for context lookups.
        let (owned, marker) = tree.children().split_at(tree.children().len() - 1);
        let source = Tree::node(
            "POSSP",
            vec![Tree::node("NP", owned.to_vec()), marker[0].clone()],
        );
        let mut ancestors: Vec<&Tree> = path.iter().copied().collect();
        ancestors.push(&source);
        let ctx = Context {
            node: &source.children()[0],
            ancestors: &ancestors,
        };
        let mut np_label = String::from("NP");
        self.annotate_phrasal(&ctx, &mut np_label);

        let mut wrapped = vec![Tree::node(np_label, children)];
        wrapped.extend(pos);
        Tree::node(label, wrapped)
    }

    fn is_base_np(&self, ctx: &Context<'_, '_>) -> bool {
        let under_np = ctx.parent_category() == "NP"
            && ctx
                .siblings()
                .iter()
                .all(|s| !s.is_leaf() && s.basic_category() == "NP");
        let flat = ctx.node.children().iter().all(Tree::is_preterminal);
        under_np || (self.config.base_np >= 2 && flat)
    }

    fn head_tag<'t>(&self, node: &'t Tree) -> Option<&'t str> {
        self.head_finder
            .head_terminal(node)
            .map(Tree::basic_category)
    }

    fn vp_head_tag(&self, node: &Tree) -> Option<String> {
        let level = self.config.split_vp;
        let head = self.head_finder.head_terminal(node)?;
        let mut tag = head.basic_category();
        if level >= 3 && tag == "AUX" {
            tag = deduce_verb_tag(head.word().unwrap_or_default());
        }
        if level >= 2 && BaseCategory::from(tag).is_finite_verb() {
            tag = "VBF";
        }
        Some(tag.to_string())
    }

    fn vp_subcategory(&self, node: &Tree) -> String {
        let Some(head) = self.head_finder.determine_head(node) else {
            return "^0".to_string();
        };
        let complements: Vec<&str> = node.children()[head + 1..]
            .iter()
            .filter(|k| !k.is_leaf())
            .map(Tree::basic_category)
            .filter(|cat| matches!(*cat, "NP" | "PP" | "S" | "SBAR" | "ADJP"))
            .collect();
        if complements.is_empty() {
            "^0".to_string()
        } else {
            format!("^{}", complements.join("_"))
        }
    }

    fn s_gap(&self, node: &Tree) -> Option<&'static str> {
        let kids = node.children();
        if self.config.split_s_gapped == 1 {
            let first = kids.first()?;
            return (first.category() != Some("NP")).then_some("-G");
        }
        let vp = kids.iter().position(|k| k.category() == Some("VP"))?;
        if kids[..vp].iter().any(|k| k.category() == Some("NP")) {
            return None;
        }
        if self.config.split_s_gapped >= 3 && self.head_tag(node) == Some("TO") {
            Some("-GTO")
        } else {
            Some("-G")
        }
    }

    fn s_tag(&self, node: &Tree) -> Option<&'static str> {
        let head = self.head_tag(node);
        let has_subject = any_child(node, &["NP"]);
        if !has_subject && head == Some("VB") {
            return Some("-IMP");
        }
        if self.config.split_s_tag < 2 {
            return None;
        }
        let finite = head.map_or(false, |t| BaseCategory::from(t).is_finite_verb());
        Some(if finite { "-FIN" } else { "-NF" })
    }
}
