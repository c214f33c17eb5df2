use rayon::prelude::*;
use tracing::{info, warn};
use treebank_heads::{HeadFinderKind, RuleBasedHeadFinder};
use treebank_protocol::Tree;

use crate::annotator::TreeAnnotator;
use crate::config::Configuration;
use crate::stripper::SubcategoryStripper;

/// Head finder for typed-dependency extraction: the universal variant
/// unless `-originalDependencies` is set. `-makeCopulaHead` is passed
/// through to whichever variant is chosen.
pub fn typed_dependency_head_finder(config: &Configuration) -> RuleBasedHeadFinder {
    let kind = if config.original_dependencies {
        HeadFinderKind::Semantic
    } else {
        HeadFinderKind::UniversalSemantic
    };
    kind.build(config.make_copula_head)
}

/// Strip, then annotate, sharing one immutable configuration.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'c> {
    stripper: SubcategoryStripper<'c>,
    annotator: TreeAnnotator<'c>,
}

impl<'c> Pipeline<'c> {
    pub fn new(config: &'c Configuration) -> Self {
        Self {
            stripper: SubcategoryStripper::new(config),
            annotator: TreeAnnotator::new(config),
        }
    }

    pub fn stripper(&self) -> &SubcategoryStripper<'c> {
        &self.stripper
    }

    pub fn annotator(&self) -> &TreeAnnotator<'c> {
        &self.annotator
    }

    /// Both passes over one tree. `None` when the tree is pruned away.
    pub fn process(&self, tree: &Tree) -> Option<Tree> {
        let stripped = self.stripper.strip(tree)?;
        self.annotator.transform(&stripped, Some(&stripped))
    }

    /// Processes a corpus in parallel; the output is index-aligned with
    /// `trees`.
    pub fn process_corpus(&self, trees: &[Tree]) -> Vec<Option<Tree>> {
        let out: Vec<Option<Tree>> = trees.par_iter().map(|t| self.process(t)).collect();
        let mut pruned = 0;
        for (idx, result) in out.iter().enumerate() {
            if result.is_none() {
                warn!(tree = idx, "tree pruned to nothing");
                pruned += 1;
            }
        }
        info!(trees = trees.len(), pruned, "annotated corpus");
        out
    }
}
