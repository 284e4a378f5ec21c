//! lkml2cube engine - translation logic
//!
//! This crate implements the translation from the intermediate model to cubes:
//! - View → cube translation
//! - Explore join resolution (join tree, relationship inversion)
//! - Model assembly
//! - Cube document serialization

pub mod views;
pub mod join_tree;
pub mod explores;
pub mod assembler;
pub mod pipeline;
pub mod emit;

pub use views::{translate_view, dimension_type, measure_type};
pub use join_tree::{JoinTree, JoinNode};
pub use explores::{resolve_joins, target_relationship, JoinEdge, ResolvedExplore, TraversalRole};
pub use assembler::assemble;
pub use pipeline::{translate, TranslateOptions, TranslationOutput};
pub use emit::{render, write_files, EmitError};
