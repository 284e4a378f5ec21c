//! Intermediate model: views, fields, explores and join rules
//!
//! This is the read-only representation both DSLs are mapped through.
//! It is built once per run and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use crate::error::TranslateError;

/// Whether a field is a dimension or a measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Dimension,
    Measure,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dimension => write!(f, "dimension"),
            Self::Measure => write!(f, "measure"),
        }
    }
}

/// Source field type vocabulary
///
/// Closed set of the type tags the source DSL accepts for dimensions and
/// measures. Not every tag has a cube counterpart for every field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Yesno,
    Time,
    Date,
    DateTime,
    Tier,
    Zipcode,
    Location,
    Distance,
    Duration,
    Bin,
    Unquoted,
    Count,
    CountDistinct,
    Sum,
    SumDistinct,
    Average,
    AverageDistinct,
    Min,
    Max,
    Median,
    Percentile,
    List,
    RunningTotal,
    PercentOfTotal,
    PercentOfPrevious,
}

impl FieldType {
    /// Parse a source type tag (case-insensitive)
    pub fn parse(tag: &str) -> Option<Self> {
        let field_type = match tag.trim().to_lowercase().as_str() {
            "string" => Self::String,
            "number" => Self::Number,
            "yesno" => Self::Yesno,
            "time" => Self::Time,
            "date" => Self::Date,
            "date_time" => Self::DateTime,
            "tier" => Self::Tier,
            "zipcode" => Self::Zipcode,
            "location" => Self::Location,
            "distance" => Self::Distance,
            "duration" => Self::Duration,
            "bin" => Self::Bin,
            "unquoted" => Self::Unquoted,
            "count" => Self::Count,
            "count_distinct" => Self::CountDistinct,
            "sum" => Self::Sum,
            "sum_distinct" => Self::SumDistinct,
            "average" => Self::Average,
            "average_distinct" => Self::AverageDistinct,
            "min" => Self::Min,
            "max" => Self::Max,
            "median" => Self::Median,
            "percentile" => Self::Percentile,
            "list" => Self::List,
            "running_total" => Self::RunningTotal,
            "percent_of_total" => Self::PercentOfTotal,
            "percent_of_previous" => Self::PercentOfPrevious,
            _ => return None,
        };

        Some(field_type)
    }

    /// The source type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Yesno => "yesno",
            Self::Time => "time",
            Self::Date => "date",
            Self::DateTime => "date_time",
            Self::Tier => "tier",
            Self::Zipcode => "zipcode",
            Self::Location => "location",
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::Bin => "bin",
            Self::Unquoted => "unquoted",
            Self::Count => "count",
            Self::CountDistinct => "count_distinct",
            Self::Sum => "sum",
            Self::SumDistinct => "sum_distinct",
            Self::Average => "average",
            Self::AverageDistinct => "average_distinct",
            Self::Min => "min",
            Self::Max => "max",
            Self::Median => "median",
            Self::Percentile => "percentile",
            Self::List => "list",
            Self::RunningTotal => "running_total",
            Self::PercentOfTotal => "percent_of_total",
            Self::PercentOfPrevious => "percent_of_previous",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dimension or measure owned by exactly one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its view
    pub name: String,

    /// Dimension or measure
    pub kind: FieldKind,

    /// Source type tag
    pub data_type: FieldType,

    /// Raw SQL fragment; absent means the default derived from `name`
    pub expression: Option<String>,

    /// Display label
    pub label: Option<String>,

    /// Free-form description
    pub description: Option<String>,

    /// Whether this dimension is the view's primary key
    pub primary_key: bool,
}

impl Field {
    /// Create a dimension with no expression
    pub fn dimension(name: impl Into<String>, data_type: FieldType) -> Self {
        Self::new(name, FieldKind::Dimension, data_type)
    }

    /// Create a measure with no expression
    pub fn measure(name: impl Into<String>, data_type: FieldType) -> Self {
        Self::new(name, FieldKind::Measure, data_type)
    }

    fn new(name: impl Into<String>, kind: FieldKind, data_type: FieldType) -> Self {
        Self {
            name: name.into(),
            kind,
            data_type,
            expression: None,
            label: None,
            description: None,
            primary_key: false,
        }
    }

    /// Set the SQL expression
    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.expression = Some(sql.into());
        self
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as primary key
    pub fn with_primary_key(mut self, primary_key: bool) -> Self {
        self.primary_key = primary_key;
        self
    }
}

/// Where a view reads its rows from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewSource {
    /// A physical table
    Table { name: String },

    /// A derived (inline) table; the SQL may be missing
    Derived { sql: Option<String> },
}

/// A named source entity that becomes a cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    /// View name, unique within a document
    pub name: String,

    /// Base table or derived SQL
    pub source: ViewSource,

    /// Fields in source order
    pub fields: Vec<Field>,
}

impl View {
    /// Create a view backed by a physical table
    pub fn table(name: impl Into<String>, sql_table_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ViewSource::Table { name: sql_table_name.into() },
            fields: Vec::new(),
        }
    }

    /// Create a derived view
    pub fn derived(name: impl Into<String>, sql: Option<String>) -> Self {
        Self {
            name: name.into(),
            source: ViewSource::Derived { sql },
            fields: Vec::new(),
        }
    }

    /// Append fields
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields.extend(fields);
        self
    }
}

/// Join cardinality
///
/// Shared by both vocabularies; what differs between them is the side the
/// relationship is stated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl Relationship {
    /// Parse a relationship tag (case-insensitive)
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "one_to_one" => Some(Self::OneToOne),
            "one_to_many" => Some(Self::OneToMany),
            "many_to_one" => Some(Self::ManyToOne),
            "many_to_many" => Some(Self::ManyToMany),
            _ => None,
        }
    }

    /// The relationship tag
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "one_to_one",
            Self::OneToMany => "one_to_many",
            Self::ManyToOne => "many_to_one",
            Self::ManyToMany => "many_to_many",
        }
    }

    /// State the relationship from the other side
    pub fn reverse(self) -> Self {
        match self {
            Self::OneToMany => Self::ManyToOne,
            Self::ManyToOne => Self::OneToMany,
            Self::OneToOne => Self::OneToOne,
            Self::ManyToMany => Self::ManyToMany,
        }
    }
}

impl Default for Relationship {
    fn default() -> Self {
        Self::ManyToOne
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single joined view within an explore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRule {
    /// View being joined
    pub joined_view: String,

    /// View this rule joins from (root or an earlier joined view)
    pub join_from: String,

    /// Cardinality stated from the joined view's side
    pub relationship: Relationship,

    /// Opaque join predicate
    pub sql_on: String,
}

impl JoinRule {
    pub fn new(
        joined_view: impl Into<String>,
        join_from: impl Into<String>,
        relationship: Relationship,
        sql_on: impl Into<String>,
    ) -> Self {
        Self {
            joined_view: joined_view.into(),
            join_from: join_from.into(),
            relationship,
            sql_on: sql_on.into(),
        }
    }
}

/// A named query surface rooted at one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explore {
    /// Explore name
    pub name: String,

    /// Primary view
    pub root_view: String,

    /// Join rules in traversal order
    pub joins: Vec<JoinRule>,
}

impl Explore {
    pub fn new(name: impl Into<String>, root_view: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_view: root_view.into(),
            joins: Vec::new(),
        }
    }

    /// Append a join rule
    pub fn with_join(mut self, rule: JoinRule) -> Self {
        self.joins.push(rule);
        self
    }

    /// Whether the explore's root or any join touches the view
    pub fn references_view(&self, view: &str) -> bool {
        self.root_view == view
            || self
                .joins
                .iter()
                .any(|j| j.joined_view == view || j.join_from == view)
    }
}

/// Validated, immutable collection of views and explores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateModel {
    views: Vec<View>,
    explores: Vec<Explore>,
    index: HashMap<String, usize>,
}

impl IntermediateModel {
    /// Build a model, checking that view names and field names are unique
    pub fn new(views: Vec<View>, explores: Vec<Explore>) -> Result<Self, TranslateError> {
        let mut index = HashMap::with_capacity(views.len());

        for (position, view) in views.iter().enumerate() {
            if index.insert(view.name.clone(), position).is_some() {
                return Err(TranslateError::DuplicateView { view: view.name.clone() });
            }

            let mut seen_fields = HashSet::new();
            for field in &view.fields {
                if !seen_fields.insert(field.name.as_str()) {
                    return Err(TranslateError::DuplicateField {
                        view: view.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        Ok(Self { views, explores, index })
    }

    /// Look up a view by name
    pub fn get_view(&self, name: &str) -> Option<&View> {
        self.index.get(name).map(|&i| &self.views[i])
    }

    /// Look up a view by name, failing with `UnknownView`
    pub fn view(&self, name: &str, referenced_by: &str) -> Result<&View, TranslateError> {
        self.get_view(name).ok_or_else(|| TranslateError::UnknownView {
            view: name.to_string(),
            referenced_by: referenced_by.to_string(),
        })
    }

    /// Views in source order
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    /// Explores in source order
    pub fn explores(&self) -> impl Iterator<Item = &Explore> {
        self.explores.iter()
    }

    /// Number of views
    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// Number of explores
    pub fn explore_count(&self) -> usize {
        self.explores.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> View {
        View::table("orders", "public.orders").with_fields(vec![
            Field::dimension("id", FieldType::Number),
            Field::measure("total", FieldType::Sum).with_sql("${TABLE}.amount"),
        ])
    }

    #[test]
    fn field_type_parsing() {
        assert_eq!(FieldType::parse("date_time"), Some(FieldType::DateTime));
        assert_eq!(FieldType::parse("YESNO"), Some(FieldType::Yesno));
        assert_eq!(FieldType::parse("hyperloglog"), None);
        assert_eq!(FieldType::CountDistinct.to_string(), "count_distinct");
    }

    #[test]
    fn relationship_reverse_is_an_involution() {
        for rel in [
            Relationship::OneToOne,
            Relationship::OneToMany,
            Relationship::ManyToOne,
            Relationship::ManyToMany,
        ] {
            assert_eq!(rel.reverse().reverse(), rel);
        }
        assert_eq!(Relationship::OneToMany.reverse(), Relationship::ManyToOne);
    }

    #[test]
    fn lookup_by_name() {
        let model = IntermediateModel::new(vec![orders()], vec![]).unwrap();

        assert!(model.get_view("orders").is_some());
        assert_eq!(
            model.view("customers", "explore 'orders'"),
            Err(TranslateError::UnknownView {
                view: "customers".to_string(),
                referenced_by: "explore 'orders'".to_string(),
            })
        );
    }

    #[test]
    fn duplicate_view_rejected() {
        let result = IntermediateModel::new(vec![orders(), orders()], vec![]);
        assert_eq!(
            result,
            Err(TranslateError::DuplicateView { view: "orders".to_string() })
        );
    }

    #[test]
    fn duplicate_field_rejected() {
        let view = View::table("users", "users").with_fields(vec![
            Field::dimension("id", FieldType::Number),
            Field::measure("id", FieldType::Count),
        ]);

        let result = IntermediateModel::new(vec![view], vec![]);
        assert!(matches!(result, Err(TranslateError::DuplicateField { .. })));
    }

    #[test]
    fn views_keep_source_order() {
        let model = IntermediateModel::new(
            vec![View::table("b", "b"), View::table("a", "a"), View::table("c", "c")],
            vec![],
        )
        .unwrap();

        let names: Vec<&str> = model.views().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn explore_references() {
        let explore = Explore::new("orders", "orders").with_join(JoinRule::new(
            "customers",
            "orders",
            Relationship::ManyToOne,
            "${orders.customer_id} = ${customers.id}",
        ));

        assert!(explore.references_view("customers"));
        assert!(!explore.references_view("products"));
    }
}
