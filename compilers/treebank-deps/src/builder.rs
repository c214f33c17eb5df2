use petgraph::graph::NodeIndex;
use tracing::debug;
use treebank_heads::HeadFinder;
use treebank_protocol::{BaseCategory, Tree};

use crate::structure::{GrammaticalStructure, Token};
use crate::StructureError;

/// Turns an annotated tree into dependencies using a supplied head finder.
pub trait GrammaticalStructureBuilder {
    fn build(
        &self,
        tree: &Tree,
        head_finder: &dyn HeadFinder,
    ) -> Result<GrammaticalStructure, StructureError>;
}

/// Decides which dependencies make it into the structure.
pub trait DependencyFilter: Send + Sync {
    fn keep(&self, governor: &Token, dependent: &Token, relation: &str) -> bool;
}

/// Keeps every dependency.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl DependencyFilter for KeepAll {
    fn keep(&self, _: &Token, _: &Token, _: &str) -> bool {
        true
    }
}

/// Drops dependencies whose dependent is punctuation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationFilter;

impl DependencyFilter for PunctuationFilter {
    fn keep(&self, _: &Token, dependent: &Token, _: &str) -> bool {
        !BaseCategory::of_label(&dependent.tag).is_punctuation()
    }
}

/// Basic head dependencies: within every phrase, the head word of each
/// non-head child depends on the head word of the head child.
#[derive(Debug, Clone, Default)]
pub struct HeadDependencyBuilder<F = PunctuationFilter> {
    filter: F,
}

impl HeadDependencyBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<F: DependencyFilter> HeadDependencyBuilder<F> {
    pub fn with_filter(filter: F) -> Self {
        Self { filter }
    }

    /// Returns the graph node of the head word of `tree`.
    fn walk(
        &self,
        tree: &Tree,
        head_finder: &dyn HeadFinder,
        out: &mut GrammaticalStructure,
    ) -> Result<NodeIndex, StructureError> {
        if let Some(word) = tree.word() {
            return Ok(out.add_token(word, tree.label()));
        }

        let mut heads = Vec::with_capacity(tree.children().len());
        for child in tree.children() {
            heads.push(match child {
                Tree::Leaf(_) => None,
                node => Some(self.walk(node, head_finder, out)?),
            });
        }

        let no_head = || StructureError::NoHead {
            label: tree.label().to_string(),
        };
        let head_idx = head_finder.determine_head(tree).ok_or_else(no_head)?;
        let head = heads.get(head_idx).copied().flatten().ok_or_else(no_head)?;

        let relation = tree.basic_category();
        for (idx, dependent) in heads.into_iter().enumerate() {
            let Some(dependent) = dependent else { continue };
            if idx == head_idx {
                continue;
            }
            if self
                .filter
                .keep(out.token_at(head), out.token_at(dependent), relation)
            {
                out.add_dependency(head, dependent, relation);
            } else {
                debug!(relation, "dependency filtered");
            }
        }
        Ok(head)
    }
}

impl<F: DependencyFilter> GrammaticalStructureBuilder for HeadDependencyBuilder<F> {
    fn build(
        &self,
        tree: &Tree,
        head_finder: &dyn HeadFinder,
    ) -> Result<GrammaticalStructure, StructureError> {
        if tree.preterminals().is_empty() {
            return Err(StructureError::Empty);
        }
        let mut structure = GrammaticalStructure::new();
        let root = self.walk(tree, head_finder, &mut structure)?;
        structure.set_root(root);
        Ok(structure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treebank_annotator::{read_tree, typed_dependency_head_finder, Configuration, Pipeline};
    use treebank_heads::{HeadFinderKind, RuleBasedHeadFinder};

    fn arcs(structure: &GrammaticalStructure) -> Vec<(String, String, String)> {
        structure
            .dependencies()
            .into_iter()
            .map(|(gov, dep, rel)| (gov.word.clone(), dep.word.clone(), rel.to_string()))
            .collect()
    }

    fn arc(gov: &str, dep: &str, rel: &str) -> (String, String, String) {
        (gov.to_string(), dep.to_string(), rel.to_string())
    }

    #[test]
    fn test_basic_dependencies() {
        let tree = read_tree("(S (NP (DT The) (NN dog)) (VP (VBD barked)) (. .))").unwrap();
        let structure = HeadDependencyBuilder::new()
            .build(&tree, &RuleBasedHeadFinder::default())
            .unwrap();
        assert_eq!(structure.root().map(|t| t.word.as_str()), Some("barked"));
        assert_eq!(
            arcs(&structure),
            vec![arc("dog", "The", "NP"), arc("barked", "dog", "S")]
        );
        assert_eq!(structure.tokens().len(), 4);
        assert_eq!(structure.governor(2).map(|t| t.word.as_str()), Some("barked"));
        assert!(structure.governor(4).is_none());
        assert!(structure.governor(0).is_none());
    }

    #[test]
    fn test_keep_all_retains_punctuation() {
        let tree = read_tree("(S (NP (PRP It)) (VP (VBD rained)) (. .))").unwrap();
        let structure = HeadDependencyBuilder::with_filter(KeepAll)
            .build(&tree, &RuleBasedHeadFinder::default())
            .unwrap();
        assert!(arcs(&structure).contains(&arc("rained", ".", "S")));
    }

    #[test]
    fn test_semantic_head_on_annotated_tree() {
        let (config, _) = Configuration::from_flags(&["-splitAux", "1", "-splitVP", "2"]).unwrap();
        let tree = read_tree("(S (NP (PRP She)) (VP (VBZ is) (VP (VBG running))))").unwrap();
        let annotated = Pipeline::new(&config).process(&tree).unwrap();
        assert_eq!(
            annotated.to_string(),
            "(S (NP (PRP She)) (VP-VBF (VBZ-BE is) (VP-VBG (VBG running))))"
        );

        let hf = typed_dependency_head_finder(&config);
        let structure = HeadDependencyBuilder::new().build(&annotated, &hf).unwrap();
        assert_eq!(structure.root().map(|t| t.word.as_str()), Some("running"));
        assert!(arcs(&structure).contains(&arc("running", "is", "VP")));

        let collins = HeadFinderKind::Collins.build(false);
        let structure = HeadDependencyBuilder::new().build(&annotated, &collins).unwrap();
        assert_eq!(structure.root().map(|t| t.word.as_str()), Some("is"));
    }

    #[test]
    fn test_errors() {
        let builder = HeadDependencyBuilder::new();
        let hf = RuleBasedHeadFinder::default();
        assert_eq!(builder.build(&Tree::leaf("x"), &hf).unwrap_err(), StructureError::Empty);
        let words_only = read_tree("(NP a (DT the) book)").unwrap();
        assert!(matches!(
            builder.build(&words_only, &HeadFinderKind::Left.build(false)),
            Err(StructureError::NoHead { .. })
        ));
    }
}
