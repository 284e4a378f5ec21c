//! LookML document parsing
//!
//! Deserializes the nested mapping a LookML parser produces (views and
//! explores as lists of keyed objects) from JSON or YAML.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use lkml2cube_core::TranslateError;

/// A parsed LookML document (subset of keys we translate)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookmlDocument {
    /// View definitions in source order
    #[serde(default)]
    pub views: Vec<ViewDef>,

    /// Explore definitions in source order
    #[serde(default)]
    pub explores: Vec<ExploreDef>,
}

impl LookmlDocument {
    /// Load a document from file, picking the format from the extension
    ///
    /// `.json` and `.lookml` files are read as JSON, `.yaml` and `.yml` as
    /// YAML. Anything else is tried as JSON first, then YAML.
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LoadError::IoError(path.display().to_string(), e.to_string()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());

        match extension.as_deref() {
            Some("json") | Some("lookml") => Self::from_json_str(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents).or_else(|_| Self::from_yaml_str(&contents)),
        }
    }

    /// Parse a document from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json)
            .map_err(|e| LoadError::ParseError(e.to_string()))
    }

    /// Parse a document from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LoadError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| LoadError::ParseError(e.to_string()))
    }

    /// Get an explore by name
    pub fn get_explore(&self, name: &str) -> Option<&ExploreDef> {
        self.explores.iter().find(|e| e.name == name)
    }

    /// Append explores whose name is not already present
    ///
    /// Returns the number of explores added.
    pub fn merge_explores(&mut self, explores: Vec<ExploreDef>) -> usize {
        let mut added = 0;

        for explore in explores {
            if self.get_explore(&explore.name).is_none() {
                self.explores.push(explore);
                added += 1;
            }
        }

        added
    }
}

/// A view definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewDef {
    /// View name
    pub name: String,

    /// Physical table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_table_name: Option<String>,

    /// Inline derived table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_table: Option<DerivedTableDef>,

    #[serde(default)]
    pub dimensions: Vec<FieldDef>,

    #[serde(default)]
    pub dimension_groups: Vec<FieldDef>,

    #[serde(default)]
    pub measures: Vec<FieldDef>,
}

/// Derived table definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedTableDef {
    /// SQL-based derived table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

/// A dimension, dimension group or measure definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,

    /// Type tag; the loader applies the LookML default when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    /// SQL fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `yes`/`no` (or a boolean)
    #[serde(default, deserialize_with = "yes_no")]
    pub primary_key: bool,
}

/// An explore definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploreDef {
    /// Explore name
    pub name: String,

    /// Root view, when it differs from the explore name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_name: Option<String>,

    /// Root view alias form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Joined views in traversal order
    #[serde(default)]
    pub joins: Vec<JoinDef>,
}

impl ExploreDef {
    /// The view this explore is rooted at
    pub fn root_view(&self) -> &str {
        self.view_name
            .as_deref()
            .or(self.from.as_deref())
            .unwrap_or(&self.name)
    }
}

/// A join definition within an explore
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinDef {
    /// Joined view
    pub name: String,

    /// View the join starts from, when stated explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_from: Option<String>,

    /// Relationship tag; `many_to_one` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,

    /// Join predicate
    #[serde(default)]
    pub sql_on: String,
}

fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YesNo {
        Bool(bool),
        Text(String),
    }

    match YesNo::deserialize(deserializer)? {
        YesNo::Bool(value) => Ok(value),
        YesNo::Text(text) => match text.trim().to_lowercase().as_str() {
            "yes" | "true" => Ok(true),
            "no" | "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected yes or no, found '{}'",
                other
            ))),
        },
    }
}

/// Document loading errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read LookML file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse LookML document: {0}")]
    ParseError(String),

    #[error("Invalid relationship '{value}' for join '{view}' in explore '{explore}'")]
    InvalidRelationship {
        explore: String,
        view: String,
        value: String,
    },

    #[error(transparent)]
    Model(#[from] TranslateError),
}
