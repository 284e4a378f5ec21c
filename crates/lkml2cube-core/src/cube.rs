//! Output cube types
//!
//! A `Cube` is what the serializer renders. Field names follow the target
//! DSL's keys so the structs serialize without a separate mapping layer.

use serde::{Deserialize, Serialize};
use crate::model::Relationship;

/// Target dimension type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionType {
    String,
    Number,
    Boolean,
    Time,
    Geo,
}

/// Target measure type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureType {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
    Number,
    String,
    Time,
    Boolean,
    RunningTotal,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A cube dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeDimension {
    pub name: String,

    pub sql: String,

    #[serde(rename = "type")]
    pub dimension_type: DimensionType,

    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A cube measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeMeasure {
    pub name: String,

    /// Absent for plain row counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(rename = "type")]
    pub measure_type: MeasureType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A join declared on a cube, directed from the owning cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeJoin {
    /// Target cube
    pub name: String,

    /// Join predicate, copied verbatim from the source
    pub sql: String,

    /// Cardinality stated from the owning cube's side
    pub relationship: Relationship,
}

/// One translated cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cube {
    pub name: String,

    /// Base table, for cubes backed by a physical table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_table: Option<String>,

    /// Base query, for derived cubes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<CubeJoin>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<CubeDimension>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub measures: Vec<CubeMeasure>,
}

impl Cube {
    /// Create an empty cube
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_table: None,
            sql: None,
            joins: Vec::new(),
            dimensions: Vec::new(),
            measures: Vec::new(),
        }
    }

    /// Whether the cube has a table or a SQL expression to read from
    pub fn has_source(&self) -> bool {
        self.sql_table.is_some() || self.sql.is_some()
    }

    /// Names of all join targets, in declaration order
    pub fn join_targets(&self) -> Vec<&str> {
        self.joins.iter().map(|j| j.name.as_str()).collect()
    }
}

/// Top-level output document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeDocument {
    pub cubes: Vec<Cube>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_keys_follow_target_dsl() {
        let mut cube = Cube::new("orders");
        cube.sql_table = Some("public.orders".to_string());
        cube.dimensions.push(CubeDimension {
            name: "id".to_string(),
            sql: "{CUBE}.id".to_string(),
            dimension_type: DimensionType::Number,
            primary_key: true,
            title: None,
            description: None,
        });
        cube.measures.push(CubeMeasure {
            name: "count".to_string(),
            sql: None,
            measure_type: MeasureType::CountDistinct,
            title: None,
            description: None,
        });

        let json = serde_json::to_value(&cube).unwrap();
        assert_eq!(json["sql_table"], "public.orders");
        assert_eq!(json["dimensions"][0]["type"], "number");
        assert_eq!(json["dimensions"][0]["primary_key"], true);
        assert_eq!(json["measures"][0]["type"], "count_distinct");
        assert!(json.get("sql").is_none());
        assert!(json.get("joins").is_none());
        assert!(json["measures"][0].get("sql").is_none());
    }

    #[test]
    fn derived_cube_without_sql_has_no_source() {
        let mut cube = Cube::new("rollup");
        assert!(!cube.has_source());

        cube.sql = Some("SELECT 1 AS id".to_string());
        assert!(cube.has_source());
    }
}
