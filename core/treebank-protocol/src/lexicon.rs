//! Closed word classes consulted by head finding and annotation.
//!
//! All lookups are case-insensitive on ASCII.

pub const BE_FORMS: &[&str] = &["be", "being", "been", "am", "are", "is", "was", "were", "'s", "'re", "'m"];

pub const HAVE_FORMS: &[&str] = &["have", "has", "had", "having", "'ve", "'d"];

pub const DO_FORMS: &[&str] = &["do", "does", "did", "doing", "done"];

pub const MODALS: &[&str] = &[
    "can", "could", "may", "might", "must", "shall", "should", "will", "would", "'ll", "ca", "wo",
];

pub const GET_FORMS: &[&str] = &["get", "gets", "got", "gotten", "getting"];

pub const REFLEXIVE_SUFFIXES: &[&str] = &["self", "selves"];

pub const POSSESSIVE_DETERMINERS: &[&str] = &["his", "her", "its", "their", "my", "our", "your"];

pub const POSSESSIVE_PRONOUNS: &[&str] = &["ours", "mine", "yours", "hers", "theirs"];

pub const COMPARATIVE_QUANTIFIERS: &[&str] = &["more", "less", "most", "least"];

pub const COMPLEMENTIZERS: &[&str] = &["that", "whether", "if"];

fn contains(list: &[&str], word: &str) -> bool {
    list.iter().any(|w| w.eq_ignore_ascii_case(word))
}

pub fn is_be(word: &str) -> bool {
    contains(BE_FORMS, word)
}

pub fn is_have(word: &str) -> bool {
    contains(HAVE_FORMS, word)
}

pub fn is_do(word: &str) -> bool {
    contains(DO_FORMS, word)
}

pub fn is_modal(word: &str) -> bool {
    contains(MODALS, word)
}

pub fn is_get(word: &str) -> bool {
    contains(GET_FORMS, word)
}

pub fn is_reflexive(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    REFLEXIVE_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

pub fn is_possessive_determiner(word: &str) -> bool {
    contains(POSSESSIVE_DETERMINERS, word)
}

pub fn is_possessive_pronoun(word: &str) -> bool {
    contains(POSSESSIVE_PRONOUNS, word)
}

pub fn is_comparative_quantifier(word: &str) -> bool {
    contains(COMPARATIVE_QUANTIFIERS, word)
}

pub fn is_complementizer(word: &str) -> bool {
    contains(COMPLEMENTIZERS, word)
}

/// Any auxiliary: be, have, do, a modal, or infinitival `to`.
pub fn is_auxiliary(word: &str) -> bool {
    is_be(word) || is_have(word) || is_do(word) || is_modal(word) || word.eq_ignore_ascii_case("to")
}
