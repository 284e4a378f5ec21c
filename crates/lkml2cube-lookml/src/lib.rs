//! LookML document loading
//!
//! This crate handles:
//! - Parsing the nested mapping a LookML parser produces (JSON or YAML)
//! - Building the intermediate model (views, fields, explores, join rules)
//! - Scanning a project tree for explores that reference a view

pub mod document;
pub mod loader;
pub mod scan;

pub use document::{LookmlDocument, ViewDef, FieldDef, DerivedTableDef, ExploreDef, JoinDef, LoadError};
pub use loader::{ModelLoader, referenced_views};
pub use scan::{find_explores_including_view, document_files};
