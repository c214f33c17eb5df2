use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// One word of the sentence. `index` is 1-based, in surface order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub index: usize,
    pub word: String,
    pub tag: String,
}

/// A head -> dependent arc, labelled with the category of the phrase
/// where the two heads meet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub relation: String,
}

/// Word-to-word dependencies over the tokens of one tree.
#[derive(Debug, Clone)]
pub struct GrammaticalStructure {
    graph: DiGraph<Token, Dependency>,
    root: Option<NodeIndex>,
}

impl GrammaticalStructure {
    pub(crate) fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            root: None,
        }
    }

    pub(crate) fn add_token(&mut self, word: &str, tag: &str) -> NodeIndex {
        let index = self.graph.node_count() + 1;
        self.graph.add_node(Token {
            index,
            word: word.to_string(),
            tag: tag.to_string(),
        })
    }

    pub(crate) fn token_at(&self, node: NodeIndex) -> &Token {
        &self.graph[node]
    }

    pub(crate) fn add_dependency(&mut self, governor: NodeIndex, dependent: NodeIndex, relation: &str) {
        self.graph.add_edge(
            governor,
            dependent,
            Dependency {
                relation: relation.to_string(),
            },
        );
    }

    pub(crate) fn set_root(&mut self, root: NodeIndex) {
        self.root = Some(root);
    }

    pub fn graph(&self) -> &DiGraph<Token, Dependency> {
        &self.graph
    }

    pub fn tokens(&self) -> Vec<&Token> {
        self.graph.node_weights().collect()
    }

    /// The head word of the whole tree.
    pub fn root(&self) -> Option<&Token> {
        self.root.map(|idx| &self.graph[idx])
    }

    /// `(governor, dependent, relation)` triples, ordered by dependent.
    pub fn dependencies(&self) -> Vec<(&Token, &Token, &str)> {
        let mut deps: Vec<(&Token, &Token, &str)> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    &self.graph[e.source()],
                    &self.graph[e.target()],
                    e.weight().relation.as_str(),
                )
            })
            .collect();
        deps.sort_by_key(|(_, dep, _)| dep.index);
        deps
    }

    /// Governor of the token at `index` (1-based), if it has one.
    pub fn governor(&self, index: usize) -> Option<&Token> {
        let node = NodeIndex::new(index.checked_sub(1)?);
        if node.index() >= self.graph.node_count() {
            return None;
        }
        self.graph
            .neighbors_directed(node, Direction::Incoming)
            .next()
            .map(|gov| &self.graph[gov])
    }
}
