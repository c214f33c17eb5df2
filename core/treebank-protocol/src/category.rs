use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

use bitflags::bitflags;

/// Characters that introduce a function tag or an annotation mark.
pub const ANNOTATION_CHARS: &[char] = &['-', '=', '^', '~', '|', '#', '+'];

/// Characters that introduce a treebank function tag or coindexation.
pub const FUNCTION_TAG_CHARS: &[char] = &['-', '=', '+'];

/// Labels that begin with a delimiter but are atomic.
const BRACKETED_LABELS: &[&str] = &["-NONE-", "-LRB-", "-RRB-", "-LCB-", "-RCB-", "-LSB-", "-RSB-"];

/// Length of the basic-category prefix of `label` given a delimiter set.
///
/// Scanning starts at index 1 so a label is never reduced to nothing, and
/// the bracketed labels (`-LRB-`, `-NONE-`, ...) are kept whole.
pub fn base_len(label: &str, delimiters: &[char]) -> usize {
    let start = BRACKETED_LABELS
        .iter()
        .find(|b| label.starts_with(*b))
        .map(|b| b.len())
        .unwrap_or_else(|| label.chars().next().map_or(0, char::len_utf8));
    label[start..]
        .find(delimiters)
        .map_or(label.len(), |idx| start + idx)
}

/// Basic category of a label: `NP-TMP^U` -> `NP`, `-LRB-` -> `-LRB-`.
pub fn basic_category(label: &str) -> &str {
    &label[..base_len(label, ANNOTATION_CHARS)]
}

/// Replaces the basic category, keeping every suffix: (`WP-1`, `PRP`) -> `PRP-1`.
pub fn change_base_category(label: &str, new_base: &str) -> String {
    let len = base_len(label, ANNOTATION_CHARS);
    let mut out = String::with_capacity(new_base.len() + label.len() - len);
    out.push_str(new_base);
    out.push_str(&label[len..]);
    out
}

/// Splits `NP-SBJ-1=2` into its function-tag segments: `[-SBJ, -1, =2]`.
///
/// Segments stop at the first annotation mark (`^`, `~`, ...), which belongs
/// to the engine rather than the treebank.
pub fn function_tags(label: &str) -> Vec<&str> {
    let start = base_len(label, FUNCTION_TAG_CHARS);
    let rest = &label[start..];
    let end = rest
        .find(|c: char| ANNOTATION_CHARS.contains(&c) && !FUNCTION_TAG_CHARS.contains(&c))
        .unwrap_or(rest.len());
    let rest = &rest[..end];

    let mut segments = Vec::new();
    let mut seg_start = 0;
    for (idx, c) in rest.char_indices().skip(1) {
        if FUNCTION_TAG_CHARS.contains(&c) {
            segments.push(&rest[seg_start..idx]);
            seg_start = idx;
        }
    }
    if !rest.is_empty() {
        segments.push(&rest[seg_start..]);
    }
    segments
}

/// True if `label` carries the function tag `tag` (given without its dash).
pub fn has_function_tag(label: &str, tag: &str) -> bool {
    function_tags(label)
        .iter()
        .any(|seg| seg.starts_with('-') && &seg[1..] == tag)
}

/// Removes every occurrence of the function tag `tag` from `label`.
pub fn remove_function_tag(label: &str, tag: &str) -> String {
    let start = base_len(label, FUNCTION_TAG_CHARS);
    let tags = function_tags(label);
    let tags_len: usize = tags.iter().map(|s| s.len()).sum();
    let mut out = String::from(&label[..start]);
    for seg in tags {
        if !(seg.starts_with('-') && &seg[1..] == tag) {
            out.push_str(seg);
        }
    }
    out.push_str(&label[start + tags_len..]);
    out
}

/// Closed set of Penn Treebank categories and tags.
///
/// Behaviour that differs per category dispatches on this enum; everything
/// unknown lands in `Other` and passes through the engine unannotated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
pub enum BaseCategory {
    // Phrasal categories
    Root,
    S,
    Sbar,
    Sbarq,
    Sinv,
    Sq,
    Np,
    Vp,
    Pp,
    Adjp,
    Advp,
    Qp,
    Whnp,
    Whpp,
    Whadvp,
    Whadjp,
    Prt,
    Conjp,
    Ucp,
    Nx,
    Nac,
    Frag,
    Intj,
    Lst,
    Prn,
    Rrc,
    X,
    Possp,
    // Part-of-speech tags
    Cc,
    Cd,
    Dt,
    Ex,
    Fw,
    In,
    Jj,
    Jjr,
    Jjs,
    Ls,
    Md,
    Nn,
    Nns,
    Nnp,
    Nnps,
    Pdt,
    Pos,
    Prp,
    PrpS,
    Rb,
    Rbr,
    Rbs,
    Rp,
    Sym,
    To,
    Uh,
    Vb,
    Vbd,
    Vbg,
    Vbn,
    Vbp,
    Vbz,
    Aux,
    Wdt,
    Wp,
    WpS,
    Wrb,
    // Punctuation and empty elements
    Comma,
    Period,
    Colon,
    OpenQuote,
    CloseQuote,
    LeftBracket,
    RightBracket,
    Dollar,
    Hash,
    NoneElement,
    Other(String),
}

const TABLE: &[(&str, BaseCategory)] = &[
    ("ROOT", BaseCategory::Root),
    ("S", BaseCategory::S),
    ("SBAR", BaseCategory::Sbar),
    ("SBARQ", BaseCategory::Sbarq),
    ("SINV", BaseCategory::Sinv),
    ("SQ", BaseCategory::Sq),
    ("NP", BaseCategory::Np),
    ("VP", BaseCategory::Vp),
    ("PP", BaseCategory::Pp),
    ("ADJP", BaseCategory::Adjp),
    ("ADVP", BaseCategory::Advp),
    ("QP", BaseCategory::Qp),
    ("WHNP", BaseCategory::Whnp),
    ("WHPP", BaseCategory::Whpp),
    ("WHADVP", BaseCategory::Whadvp),
    ("WHADJP", BaseCategory::Whadjp),
    ("PRT", BaseCategory::Prt),
    ("CONJP", BaseCategory::Conjp),
    ("UCP", BaseCategory::Ucp),
    ("NX", BaseCategory::Nx),
    ("NAC", BaseCategory::Nac),
    ("FRAG", BaseCategory::Frag),
    ("INTJ", BaseCategory::Intj),
    ("LST", BaseCategory::Lst),
    ("PRN", BaseCategory::Prn),
    ("RRC", BaseCategory::Rrc),
    ("X", BaseCategory::X),
    ("POSSP", BaseCategory::Possp),
    ("CC", BaseCategory::Cc),
    ("CD", BaseCategory::Cd),
    ("DT", BaseCategory::Dt),
    ("EX", BaseCategory::Ex),
    ("FW", BaseCategory::Fw),
    ("IN", BaseCategory::In),
    ("JJ", BaseCategory::Jj),
    ("JJR", BaseCategory::Jjr),
    ("JJS", BaseCategory::Jjs),
    ("LS", BaseCategory::Ls),
    ("MD", BaseCategory::Md),
    ("NN", BaseCategory::Nn),
    ("NNS", BaseCategory::Nns),
    ("NNP", BaseCategory::Nnp),
    ("NNPS", BaseCategory::Nnps),
    ("PDT", BaseCategory::Pdt),
    ("POS", BaseCategory::Pos),
    ("PRP", BaseCategory::Prp),
    ("PRP$", BaseCategory::PrpS),
    ("RB", BaseCategory::Rb),
    ("RBR", BaseCategory::Rbr),
    ("RBS", BaseCategory::Rbs),
    ("RP", BaseCategory::Rp),
    ("SYM", BaseCategory::Sym),
    ("TO", BaseCategory::To),
    ("UH", BaseCategory::Uh),
    ("VB", BaseCategory::Vb),
    ("VBD", BaseCategory::Vbd),
    ("VBG", BaseCategory::Vbg),
    ("VBN", BaseCategory::Vbn),
    ("VBP", BaseCategory::Vbp),
    ("VBZ", BaseCategory::Vbz),
    ("AUX", BaseCategory::Aux),
    ("WDT", BaseCategory::Wdt),
    ("WP", BaseCategory::Wp),
    ("WP$", BaseCategory::WpS),
    ("WRB", BaseCategory::Wrb),
    (",", BaseCategory::Comma),
    (".", BaseCategory::Period),
    (":", BaseCategory::Colon),
    ("``", BaseCategory::OpenQuote),
    ("''", BaseCategory::CloseQuote),
    ("-LRB-", BaseCategory::LeftBracket),
    ("-RRB-", BaseCategory::RightBracket),
    ("$", BaseCategory::Dollar),
    ("#", BaseCategory::Hash),
    ("-NONE-", BaseCategory::NoneElement),
];

impl BaseCategory {
    /// Classifies the basic category of a full label.
    pub fn of_label(label: &str) -> Self {
        Self::from(basic_category(label))
    }

    pub fn as_str(&self) -> &str {
        match self {
            BaseCategory::Other(s) => s,
            known => TABLE
                .iter()
                .find(|(_, cat)| cat == known)
                .map_or("", |(name, _)| name),
        }
    }

    pub fn is_verbal(&self) -> bool {
        matches!(
            self,
            BaseCategory::Vb
                | BaseCategory::Vbd
                | BaseCategory::Vbg
                | BaseCategory::Vbn
                | BaseCategory::Vbp
                | BaseCategory::Vbz
                | BaseCategory::Md
                | BaseCategory::Aux
        )
    }

    /// Finite verbal tags, which `-splitVP 2` collapses to `VBF`.
    pub fn is_finite_verb(&self) -> bool {
        matches!(
            self,
            BaseCategory::Vbz | BaseCategory::Vbd | BaseCategory::Vbp | BaseCategory::Md
        )
    }

    pub fn is_proper_noun(&self) -> bool {
        matches!(self, BaseCategory::Nnp | BaseCategory::Nnps)
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(
            self,
            BaseCategory::Comma
                | BaseCategory::Period
                | BaseCategory::Colon
                | BaseCategory::OpenQuote
                | BaseCategory::CloseQuote
                | BaseCategory::LeftBracket
                | BaseCategory::RightBracket
                | BaseCategory::Hash
                | BaseCategory::Dollar
        )
    }

    pub fn is_wh(&self) -> bool {
        matches!(
            self,
            BaseCategory::Whnp
                | BaseCategory::Whpp
                | BaseCategory::Whadvp
                | BaseCategory::Whadjp
                | BaseCategory::Wdt
                | BaseCategory::Wp
                | BaseCategory::WpS
                | BaseCategory::Wrb
        )
    }

    /// Clause-level categories (`S`, `SBAR`, `SINV`, ...).
    pub fn is_clausal(&self) -> bool {
        matches!(
            self,
            BaseCategory::S
                | BaseCategory::Sbar
                | BaseCategory::Sbarq
                | BaseCategory::Sinv
                | BaseCategory::Sq
        )
    }
}

impl From<&str> for BaseCategory {
    fn from(s: &str) -> Self {
        TABLE
            .iter()
            .find(|(name, _)| *name == s)
            .map(|(_, cat)| cat.clone())
            .unwrap_or_else(|| BaseCategory::Other(s.to_string()))
    }
}

impl fmt::Display for BaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Which WH categories `-collapseWhCategories` folds into their plain
    /// counterparts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct WhCollapse: u32 {
        const WHNP = 1;
        const WHPP = 2;
        const WHADVP = 4;
        const WHADJP = 8;
        // WP -> PRP, WP$ -> PRP$, WDT -> DT, WRB -> RB
        const TAGS = 16;
    }
}

impl WhCollapse {
    /// The non-WH replacement for `base`, if this mask collapses it.
    pub fn collapse(&self, base: &BaseCategory) -> Option<BaseCategory> {
        let (bit, to) = match base {
            BaseCategory::Whnp => (WhCollapse::WHNP, BaseCategory::Np),
            BaseCategory::Whpp => (WhCollapse::WHPP, BaseCategory::Pp),
            BaseCategory::Whadvp => (WhCollapse::WHADVP, BaseCategory::Advp),
            BaseCategory::Whadjp => (WhCollapse::WHADJP, BaseCategory::Adjp),
            BaseCategory::Wp => (WhCollapse::TAGS, BaseCategory::Prp),
            BaseCategory::WpS => (WhCollapse::TAGS, BaseCategory::PrpS),
            BaseCategory::Wdt => (WhCollapse::TAGS, BaseCategory::Dt),
            BaseCategory::Wrb => (WhCollapse::TAGS, BaseCategory::Rb),
            _ => return None,
        };
        if self.contains(bit) {
            Some(to)
        } else {
            None
        }
    }
}
