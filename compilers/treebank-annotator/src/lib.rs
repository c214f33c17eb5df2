//! Treebank annotation engine.
//!
//! Raw tree -> `SubcategoryStripper` -> `TreeAnnotator` -> annotated tree,
//! both passes driven by one immutable `Configuration` built from flag
//! tokens.

pub mod annotator;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reader;
pub mod stripper;

pub use annotator::TreeAnnotator;
pub use config::{Configuration, ConfigurationBuilder};
pub use error::{ParseError, ReadError};
pub use pipeline::{typed_dependency_head_finder, Pipeline};
pub use reader::{read_tree, read_trees};
pub use stripper::SubcategoryStripper;
