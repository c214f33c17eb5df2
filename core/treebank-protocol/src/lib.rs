#![no_std] // The engine core stays usable from wasm

extern crate alloc;

// Enable std if the feature is active (for tests/tools)
#[cfg(any(feature = "std", test))]
extern crate std;

pub mod category;
pub mod lexicon;
pub mod tree;

// Re-export core types for convenience
pub use category::*;
pub use tree::Tree;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_preterminal_shape() {
        let pt = Tree::preterminal("DT", "The");
        assert!(pt.is_preterminal());
        assert!(!pt.is_phrasal());
        assert_eq!(pt.word(), Some("The"));
        assert_eq!(pt.to_string(), "(DT The)");
    }

    #[test]
    fn test_empty_node_is_not_a_leaf() {
        let np = Tree::node("NP", vec![]);
        assert!(!np.is_leaf());
        assert!(!np.is_preterminal());
        assert!(np.children().is_empty());
    }

    #[test]
    fn test_category_round_trip_through_enum() {
        let base = BaseCategory::from("WHNP");
        assert_eq!(base, BaseCategory::Whnp);
        assert_eq!(base.as_str(), "WHNP");
        assert_eq!(BaseCategory::from("FOO").as_str(), "FOO");
    }
}
