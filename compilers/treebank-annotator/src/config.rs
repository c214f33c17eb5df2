//! Annotation strategy configuration.
//!
//! Flags arrive as an ordered token list (`-splitIN 3 -correctTags ...`) and
//! are folded one at a time by `ConfigurationBuilder::apply_flag`. The result
//! is an immutable `Configuration` that every pass borrows.

use tracing::{debug, warn};
use treebank_heads::{lookup, HeadFinderKind};
use treebank_protocol::WhCollapse;

use crate::error::ParseError;

/// Every annotation strategy setting. Zero levels and `false` switches
/// disable the corresponding strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub base_np: i32,
    pub split_in: i32,
    pub split_vp: i32,
    pub split_poss: i32,
    pub split_cc: i32,
    pub split_aux: i32,
    pub collapse_wh: WhCollapse,
    pub correct_tags: bool,
    pub mark_cc: i32,
    pub mark_ditrans_v: i32,
    pub split_sbar: i32,
    pub split_s_gapped: i32,
    pub split_s_tag: i32,
    pub split_tmp: i32,
    pub retain_tmp_subcategories: bool,
    pub retain_np_tmp_subcategories: bool,
    pub retain_adv_subcategories: bool,
    pub unary_dt: bool,
    pub unary_rb: bool,
    pub unary_in: bool,
    pub unary_prp: bool,
    pub mark_reflexive_prp: bool,
    pub split_quotes: bool,
    pub split_rb: bool,
    pub split_more_less: bool,
    pub right_phrasal: bool,
    pub join_jj: bool,
    pub join_noun_tags: bool,
    pub vp_sub_cat: bool,
    pub split_jj_comp: bool,
    pub split_tr_jj: bool,
    pub split_np_nnp: i32,
    pub split_np_percent: i32,
    pub split_num_np: bool,
    pub dominates_v: bool,
    pub dominates_c: bool,
    pub dominates_i: bool,
    pub gpa_root_vp: bool,
    pub mark_contained_vp: bool,
    pub make_pp_to_into_in: i32,
    /// Head finder consulted by the head-sensitive strategies.
    pub head_finder: HeadFinderKind,
    pub make_copula_head: bool,
    pub original_dependencies: bool,
    pub leave_it_all: i32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            base_np: 0,
            split_in: 0,
            split_vp: 0,
            split_poss: 0,
            split_cc: 0,
            split_aux: 0,
            collapse_wh: WhCollapse::empty(),
            correct_tags: false,
            mark_cc: 0,
            mark_ditrans_v: 0,
            split_sbar: 0,
            split_s_gapped: 0,
            split_s_tag: 0,
            split_tmp: 0,
            retain_tmp_subcategories: false,
            retain_np_tmp_subcategories: false,
            retain_adv_subcategories: false,
            unary_dt: false,
            unary_rb: false,
            unary_in: false,
            unary_prp: false,
            mark_reflexive_prp: false,
            split_quotes: false,
            split_rb: false,
            split_more_less: false,
            right_phrasal: false,
            join_jj: false,
            join_noun_tags: false,
            vp_sub_cat: false,
            split_jj_comp: false,
            split_tr_jj: false,
            split_np_nnp: 0,
            split_np_percent: 0,
            split_num_np: false,
            dominates_v: false,
            dominates_c: false,
            dominates_i: false,
            gpa_root_vp: false,
            mark_contained_vp: false,
            make_pp_to_into_in: 0,
            head_finder: HeadFinderKind::default(),
            make_copula_head: false,
            original_dependencies: false,
            leave_it_all: 0,
        }
    }
}

/// Declares the integer-valued flags: `level_mut` resolves a flag name
/// (case-insensitively) to its field, `levels` lists them for display.
macro_rules! level_flags {
    ($($flag:literal => $field:ident),* $(,)?) => {
        impl Configuration {
            fn level_mut(&mut self, flag: &str) -> Option<&mut i32> {
                $(if flag.eq_ignore_ascii_case($flag) {
                    return Some(&mut self.$field);
                })*
                None
            }

            fn levels(&self) -> Vec<(&'static str, i32)> {
                vec![$(($flag, self.$field)),*]
            }
        }
    };
}

/// Same as `level_flags!` for the valueless switches.
macro_rules! switch_flags {
    ($($flag:literal => $field:ident),* $(,)?) => {
        impl Configuration {
            fn switch_mut(&mut self, flag: &str) -> Option<&mut bool> {
                $(if flag.eq_ignore_ascii_case($flag) {
                    return Some(&mut self.$field);
                })*
                None
            }

            fn switches(&self) -> Vec<(&'static str, bool)> {
                vec![$(($flag, self.$field)),*]
            }
        }
    };
}

level_flags! {
    "-baseNP" => base_np,
    "-splitIN" => split_in,
    "-splitVP" => split_vp,
    "-splitPoss" => split_poss,
    "-splitCC" => split_cc,
    "-splitAux" => split_aux,
    "-markCC" => mark_cc,
    "-markDitransV" => mark_ditrans_v,
    "-splitSbar" => split_sbar,
    "-splitSGapped" => split_s_gapped,
    "-splitSTag" => split_s_tag,
    "-splitTMP" => split_tmp,
    "-splitNPNNP" => split_np_nnp,
    "-splitNPpercent" => split_np_percent,
    "-makePPTOintoIN" => make_pp_to_into_in,
    "-leaveItAll" => leave_it_all,
}

switch_flags! {
    "-correctTags" => correct_tags,
    "-retainTMPSubcategories" => retain_tmp_subcategories,
    "-retainNPTMPSubcategories" => retain_np_tmp_subcategories,
    "-retainADVSubcategories" => retain_adv_subcategories,
    "-unaryDT" => unary_dt,
    "-unaryRB" => unary_rb,
    "-unaryIN" => unary_in,
    "-unaryPRP" => unary_prp,
    "-markReflexivePRP" => mark_reflexive_prp,
    "-splitQuotes" => split_quotes,
    "-splitRB" => split_rb,
    "-splitMoreLess" => split_more_less,
    "-rightPhrasal" => right_phrasal,
    "-joinJJ" => join_jj,
    "-joinNounTags" => join_noun_tags,
    "-vpSubCat" => vp_sub_cat,
    "-splitJJCOMP" => split_jj_comp,
    "-splitTRJJ" => split_tr_jj,
    "-splitNumNP" => split_num_np,
    "-dominatesV" => dominates_v,
    "-dominatesC" => dominates_c,
    "-dominatesI" => dominates_i,
    "-gpaRootVP" => gpa_root_vp,
    "-markContainedVP" => mark_contained_vp,
    "-makeCopulaHead" => make_copula_head,
    "-originalDependencies" => original_dependencies,
}

const COLLAPSE_WH_FLAG: &str = "-collapseWhCategories";
const HEAD_FINDER_FLAG: &str = "-headFinder";

const ACL03PCFG: &[&str] = &[
    "-splitIN", "3", "-splitNPpercent", "1", "-splitPoss", "1", "-splitCC", "2", "-unaryDT",
    "-unaryRB", "-splitAux", "2", "-splitVP", "3", "-splitSGapped", "3", "-dominatesV",
    "-splitTMP", "1", "-baseNP", "1",
];

const JENNY_EXTRA: &[&str] = &["-splitSbar", "3", "-markDitransV", "2", "-correctTags"];

const LINGUISTIC_PCFG: &[&str] = &[
    "-splitIN", "3", "-splitPoss", "1", "-splitCC", "2", "-unaryDT", "-unaryRB", "-splitAux",
    "2", "-splitVP", "3", "-splitSGapped", "3", "-splitTMP", "1", "-splitSbar", "3",
    "-markDitransV", "2", "-splitNPpercent", "1", "-splitJJCOMP", "-splitRB",
];

const GOOD_PCFG: &[&str] = &[
    "-splitIN", "4", "-splitPoss", "1", "-splitCC", "2", "-unaryDT", "-unaryRB", "-splitAux",
    "2", "-splitVP", "3", "-splitSGapped", "3", "-splitTMP", "1", "-baseNP", "1",
    "-markDitransV", "2", "-correctTags", "-rightPhrasal", "-splitSbar", "2",
    "-splitNPpercent", "1", "-dominatesV",
];

const IJCAI03: &[&str] = &[
    "-splitIN", "3", "-splitPoss", "1", "-splitCC", "2", "-unaryDT", "-unaryRB", "-splitAux",
    "2", "-splitVP", "2", "-splitSGapped", "3", "-dominatesV", "-baseNP", "1",
];

const GOOD_FACTORED: &[&str] = &[
    "-splitIN", "4", "-splitPoss", "1", "-splitCC", "2", "-splitAux", "2", "-splitVP", "3",
    "-splitSGapped", "3", "-splitTMP", "1", "-markDitransV", "2", "-splitSbar", "2",
    "-correctTags",
];

/// Preset name -> the flag bundles it expands to, applied in order.
const PRESETS: &[(&str, &[&[&str]])] = &[
    ("-acl03pcfg", &[ACL03PCFG]),
    ("-jenny", &[ACL03PCFG, JENNY_EXTRA]),
    ("-linguisticPCFG", &[LINGUISTIC_PCFG]),
    ("-goodPCFG", &[GOOD_PCFG]),
    ("-ijcai03", &[IJCAI03]),
    ("-goodFactored", &[GOOD_FACTORED]),
];

fn value_token<'t, S: AsRef<str>>(
    tokens: &'t [S],
    index: usize,
    flag: &str,
) -> Result<&'t str, ParseError> {
    tokens
        .get(index + 1)
        .map(AsRef::as_ref)
        .ok_or_else(|| ParseError::MissingValue {
            flag: flag.to_string(),
        })
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

/// Folds flag tokens into a `Configuration`.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration instead of the defaults.
    pub fn from_configuration(config: Configuration) -> Self {
        Self { config }
    }

    /// Applies the flag at `tokens[index]`.
    ///
    /// Returns the index after the last consumed token: `index + 1` for a
    /// switch or preset, `index + 2` for a valued flag, and `index` itself
    /// when the token is not a flag this builder knows (or `index` is past
    /// the end). A value is parsed before anything is changed, so a failed
    /// flag leaves the configuration untouched.
    pub fn apply_flag<S: AsRef<str>>(
        &mut self,
        tokens: &[S],
        index: usize,
    ) -> Result<usize, ParseError> {
        let Some(flag) = tokens.get(index).map(AsRef::as_ref) else {
            return Ok(index);
        };

        if let Some((name, bundles)) = PRESETS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(flag))
        {
            debug!(preset = name, "expanding preset");
            for bundle in bundles.iter() {
                self.apply_all(bundle)?;
            }
            return Ok(index + 1);
        }

        if let Some(slot) = self.config.switch_mut(flag) {
            *slot = true;
            debug!(flag, "applied switch");
            return Ok(index + 1);
        }

        if let Some(slot) = self.config.level_mut(flag) {
            *slot = parse_value(flag, value_token(tokens, index, flag)?)?;
            debug!(flag, level = *slot, "applied level");
            return Ok(index + 2);
        }

        if flag.eq_ignore_ascii_case(COLLAPSE_WH_FLAG) {
            let bits: u32 = parse_value(flag, value_token(tokens, index, flag)?)?;
            self.config.collapse_wh = WhCollapse::from_bits_truncate(bits);
            debug!(flag, bits, "applied bitmask");
            return Ok(index + 2);
        }

        if flag.eq_ignore_ascii_case(HEAD_FINDER_FLAG) {
            let name = value_token(tokens, index, flag)?;
            self.config.head_finder = match lookup(name) {
                Some(kind) => kind,
                None => {
                    let fallback = HeadFinderKind::default();
                    warn!(
                        requested = name,
                        fallback = fallback.name(),
                        "unknown head finder, using default"
                    );
                    fallback
                }
            };
            return Ok(index + 2);
        }

        Ok(index)
    }

    /// Applies a token list that consists of known flags only.
    fn apply_all(&mut self, tokens: &[&str]) -> Result<(), ParseError> {
        let mut index = 0;
        while index < tokens.len() {
            let next = self.apply_flag(tokens, index)?;
            index = if next == index { index + 1 } else { next };
        }
        Ok(())
    }

    /// Applies every flag in `tokens`, skipping (and returning) the tokens
    /// that are not recognised.
    pub fn apply_flags<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<Vec<String>, ParseError> {
        let mut unrecognized = Vec::new();
        let mut index = 0;
        while index < tokens.len() {
            let next = self.apply_flag(tokens, index)?;
            if next == index {
                unrecognized.push(tokens[index].as_ref().to_string());
                index += 1;
            } else {
                index = next;
            }
        }
        Ok(unrecognized)
    }

    pub fn build(self) -> Configuration {
        self.config
    }
}

impl Configuration {
    /// Builds a configuration from a whole token list, returning it together
    /// with the tokens no flag claimed.
    pub fn from_flags<S: AsRef<str>>(tokens: &[S]) -> Result<(Self, Vec<String>), ParseError> {
        let mut builder = ConfigurationBuilder::new();
        let unrecognized = builder.apply_flags(tokens)?;
        Ok((builder.build(), unrecognized))
    }

    /// Renders every non-default setting as flag tokens.
    pub fn to_flags(&self) -> Vec<String> {
        let mut tokens = Vec::new();
        for (flag, level) in self.levels() {
            if level != 0 {
                tokens.push(flag.to_string());
                tokens.push(level.to_string());
            }
        }
        for (flag, on) in self.switches() {
            if on {
                tokens.push(flag.to_string());
            }
        }
        if !self.collapse_wh.is_empty() {
            tokens.push(COLLAPSE_WH_FLAG.to_string());
            tokens.push(self.collapse_wh.bits().to_string());
        }
        if self.head_finder != HeadFinderKind::default() {
            tokens.push(HEAD_FINDER_FLAG.to_string());
            tokens.push(self.head_finder.name().to_string());
        }
        tokens
    }

    /// Whether the stripper keeps a `-TMP` function tag on `base`.
    pub fn strip_keeps_tmp(&self, base: &str) -> bool {
        self.retain_tmp_subcategories
            || (self.retain_np_tmp_subcategories && base == "NP")
            || self.split_tmp > 0
    }

    /// Whether the annotator keeps a `-TMP` function tag on `base`.
    pub fn annotate_keeps_tmp(&self, base: &str) -> bool {
        self.retain_tmp_subcategories
            || (self.retain_np_tmp_subcategories && base == "NP")
            || base == "NP"
            || (self.split_tmp >= 2 && matches!(base, "PP" | "ADVP"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(tokens: &[&str]) -> Configuration {
        let (config, rest) = Configuration::from_flags(tokens).unwrap();
        assert!(rest.is_empty(), "unrecognized: {:?}", rest);
        config
    }

    #[test]
    fn test_index_arithmetic() {
        let tokens = ["-splitIN", "3", "-correctTags", "-bogus", "x"];
        let mut builder = ConfigurationBuilder::new();
        assert_eq!(builder.apply_flag(&tokens, 0), Ok(2));
        assert_eq!(builder.apply_flag(&tokens, 2), Ok(3));
        assert_eq!(builder.apply_flag(&tokens, 3), Ok(3));
        assert_eq!(builder.apply_flag(&tokens, 9), Ok(9));
        let config = builder.build();
        assert_eq!(config.split_in, 3);
        assert!(config.correct_tags);
    }

    #[test]
    fn test_case_insensitive_names() {
        let config = parse(&["-SPLITcc", "3", "-unarydt"]);
        assert_eq!(config.split_cc, 3);
        assert!(config.unary_dt);
    }

    #[test]
    fn test_invalid_value_leaves_config_untouched() {
        let mut builder = ConfigurationBuilder::new();
        let err = builder.apply_flag(&["-baseNP", "two"], 0).unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidValue {
                flag: "-baseNP".to_string(),
                value: "two".to_string()
            }
        );
        assert_eq!(builder.build(), Configuration::default());
    }

    #[test]
    fn test_missing_value() {
        let mut builder = ConfigurationBuilder::new();
        assert_eq!(
            builder.apply_flag(&["-splitVP"], 0),
            Err(ParseError::MissingValue {
                flag: "-splitVP".to_string()
            })
        );
    }

    #[test]
    fn test_head_finder_resolution_and_fallback() {
        let config = parse(&["-headFinder", "edu.example.LeftHeadFinder"]);
        assert_eq!(config.head_finder, HeadFinderKind::Left);

        let mut builder = ConfigurationBuilder::from_configuration(config);
        assert_eq!(builder.apply_flag(&["-headFinder", "NoSuchFinder"], 0), Ok(2));
        assert_eq!(builder.build().head_finder, HeadFinderKind::ModCollins);
    }

    #[test]
    fn test_collapse_wh_bitmask() {
        let config = parse(&["-collapseWhCategories", "17"]);
        assert_eq!(config.collapse_wh, WhCollapse::WHNP | WhCollapse::TAGS);
        assert!(Configuration::from_flags(&["-collapseWhCategories", "-1"]).is_err());
    }

    #[test]
    fn test_presets_are_sugar() {
        let preset = parse(&["-acl03pcfg"]);
        let spelled = parse(ACL03PCFG);
        assert_eq!(preset, spelled);
        assert_eq!(preset.split_in, 3);
        assert_eq!(preset.split_vp, 3);
        assert!(preset.dominates_v);

        let jenny = parse(&["-jenny"]);
        assert_eq!(jenny.split_sbar, 3);
        assert_eq!(jenny.mark_ditrans_v, 2);
        assert!(jenny.correct_tags);
        assert_eq!(jenny.base_np, 1);

        assert_eq!(parse(&["-goodPCFG"]).split_in, 4);
        assert_eq!(parse(&["-ijcai03"]).split_vp, 2);
        assert!(parse(&["-linguisticPCFG"]).split_rb);
        assert_eq!(parse(&["-goodFactored"]).split_sbar, 2);
    }

    #[test]
    fn test_later_flags_override_presets() {
        let config = parse(&["-goodPCFG", "-splitIN", "1"]);
        assert_eq!(config.split_in, 1);
        assert_eq!(config.split_vp, 3);
    }

    #[test]
    fn test_to_flags_round_trip() {
        let config = parse(&[
            "-jenny",
            "-collapseWhCategories",
            "3",
            "-headFinder",
            "SemanticHeadFinder",
            "-leaveItAll",
            "1",
        ]);
        let tokens = config.to_flags();
        assert_eq!(parse(&tokens.iter().map(String::as_str).collect::<Vec<_>>()), config);
        assert!(Configuration::default().to_flags().is_empty());
    }

    #[test]
    fn test_unrecognized_tokens_are_reported() {
        let (config, rest) =
            Configuration::from_flags(&["-train", "wsj", "-splitTMP", "2"]).unwrap();
        assert_eq!(rest, vec!["-train".to_string(), "wsj".to_string()]);
        assert_eq!(config.split_tmp, 2);
    }

    proptest! {
        #[test]
        fn test_unknown_tokens_never_consume(token in "[a-z]{1,10}", index in 0usize..3) {
            let tokens = vec![token.clone(); 3];
            let mut builder = ConfigurationBuilder::new();
            prop_assert_eq!(builder.apply_flag(&tokens, index), Ok(index));
        }

        #[test]
        fn test_level_flags_consume_two(level in -5i32..10) {
            let tokens = vec!["-markCC".to_string(), level.to_string()];
            let mut builder = ConfigurationBuilder::new();
            prop_assert_eq!(builder.apply_flag(&tokens, 0), Ok(2));
            prop_assert_eq!(builder.build().mark_cc, level);
        }
    }
}
