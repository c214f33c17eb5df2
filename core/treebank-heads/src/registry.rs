use crate::RuleBasedHeadFinder;

/// The head finders that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeadFinderKind {
    Collins,
    #[default]
    ModCollins,
    Left,
    Right,
    /// Original-dependencies semantic head finder.
    Semantic,
    /// Universal-dependencies semantic head finder.
    UniversalSemantic,
}

/// Name -> head finder. Lookup ignores any dotted qualifier before the name.
pub const REGISTRY: &[(&str, HeadFinderKind)] = &[
    ("CollinsHeadFinder", HeadFinderKind::Collins),
    ("ModCollinsHeadFinder", HeadFinderKind::ModCollins),
    ("LeftHeadFinder", HeadFinderKind::Left),
    ("RightHeadFinder", HeadFinderKind::Right),
    ("SemanticHeadFinder", HeadFinderKind::Semantic),
    ("UniversalSemanticHeadFinder", HeadFinderKind::UniversalSemantic),
];

impl HeadFinderKind {
    pub fn name(&self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, kind)| kind == self)
            .map_or("ModCollinsHeadFinder", |(name, _)| name)
    }

    pub fn build(self, copula_head: bool) -> RuleBasedHeadFinder {
        RuleBasedHeadFinder::new(self, copula_head)
    }
}

/// Resolves a head finder by name: `SemanticHeadFinder` and
/// `some.package.SemanticHeadFinder` both resolve.
pub fn lookup(name: &str) -> Option<HeadFinderKind> {
    let short = name.rsplit('.').next().unwrap_or(name);
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == short)
        .map(|(_, kind)| *kind)
}
