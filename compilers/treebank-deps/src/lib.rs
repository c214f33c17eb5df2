pub mod builder;
pub mod structure;

pub use builder::{
    DependencyFilter, GrammaticalStructureBuilder, HeadDependencyBuilder, KeepAll,
    PunctuationFilter,
};
pub use structure::{Dependency, GrammaticalStructure, Token};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("tree has no words")]
    Empty,

    #[error("no head found for {label}")]
    NoHead { label: String },
}
