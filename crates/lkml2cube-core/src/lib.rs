//! lkml2cube Core
//!
//! Intermediate model, output cube types and stable error codes.
//! Never rename error codes - they are part of the public API.

pub mod diagnostic;
pub mod error;
pub mod model;
pub mod cube;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, ErrorCode, Severity};
pub use error::TranslateError;
pub use model::{Field, FieldKind, FieldType, View, ViewSource, Explore, JoinRule, Relationship, IntermediateModel};
pub use cube::{Cube, CubeDimension, CubeMeasure, CubeJoin, CubeDocument, DimensionType, MeasureType};
pub use report::{Report, ReportSummary, ReportVersion};
pub use config::{Config, ConfigError, OutputConfig, OutputFormat, OutputLayout, TranslateConfig, AllowlistRules};
