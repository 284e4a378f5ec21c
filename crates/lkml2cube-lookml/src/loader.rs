//! Intermediate model construction from LookML documents
//!
//! Converts the loosely-typed document into validated views and explores.
//! Type tags are checked here; join graph validation is left to the resolver.

use lkml2cube_core::{
    Explore, Field, FieldKind, FieldType, IntermediateModel, JoinRule, Relationship,
    TranslateError, View,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use crate::document::{ExploreDef, FieldDef, JoinDef, LoadError, LookmlDocument, ViewDef};

/// Build an intermediate model from a document
pub struct ModelLoader;

impl ModelLoader {
    /// Convert every view and explore in the document
    pub fn load(document: &LookmlDocument) -> Result<IntermediateModel, LoadError> {
        let views = document
            .views
            .iter()
            .map(Self::load_view)
            .collect::<Result<Vec<_>, _>>()?;

        let known_views: HashSet<&str> = document.views.iter().map(|v| v.name.as_str()).collect();

        let explores = document
            .explores
            .iter()
            .map(|explore| Self::load_explore(explore, &known_views))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            views = views.len(),
            explores = explores.len(),
            "Loaded LookML document"
        );

        Ok(IntermediateModel::new(views, explores)?)
    }

    /// Convert a single view
    ///
    /// Field order is dimensions, then dimension groups, then measures.
    pub fn load_view(def: &ViewDef) -> Result<View, TranslateError> {
        let mut view = match &def.sql_table_name {
            Some(table) => View::table(&def.name, table.trim()),
            None => View::derived(
                &def.name,
                def.derived_table.as_ref().and_then(|d| d.sql.clone()),
            ),
        };

        for field in &def.dimensions {
            view.fields.push(Self::load_field(&def.name, field, FieldKind::Dimension, "string")?);
        }

        for field in &def.dimension_groups {
            view.fields.push(Self::load_field(&def.name, field, FieldKind::Dimension, "time")?);
        }

        for field in &def.measures {
            view.fields.push(Self::load_field(&def.name, field, FieldKind::Measure, "count")?);
        }

        Ok(view)
    }

    fn load_field(
        view: &str,
        def: &FieldDef,
        kind: FieldKind,
        default_type: &str,
    ) -> Result<Field, TranslateError> {
        let tag = def.field_type.as_deref().unwrap_or(default_type);

        let data_type = FieldType::parse(tag).ok_or_else(|| TranslateError::UnsupportedFieldType {
            view: view.to_string(),
            field: def.name.clone(),
            kind: kind.to_string(),
            field_type: tag.to_string(),
        })?;

        let mut field = match kind {
            FieldKind::Dimension => Field::dimension(&def.name, data_type),
            FieldKind::Measure => Field::measure(&def.name, data_type),
        }
        .with_primary_key(def.primary_key);

        if let Some(sql) = &def.sql {
            field = field.with_sql(sql.trim());
        }
        if let Some(label) = &def.label {
            field = field.with_label(label);
        }
        if let Some(description) = &def.description {
            field = field.with_description(description);
        }

        Ok(field)
    }

    /// Convert a single explore
    pub fn load_explore(def: &ExploreDef, known_views: &HashSet<&str>) -> Result<Explore, LoadError> {
        let root = def.root_view();
        let mut explore = Explore::new(&def.name, root);
        let mut seen: Vec<&str> = vec![root];

        for join in &def.joins {
            let relationship = match &join.relationship {
                Some(tag) => Relationship::parse(tag).ok_or_else(|| LoadError::InvalidRelationship {
                    explore: def.name.clone(),
                    view: join.name.clone(),
                    value: tag.clone(),
                })?,
                None => Relationship::default(),
            };

            let join_from = Self::join_from(join, root, &seen, known_views);

            explore.joins.push(JoinRule::new(
                &join.name,
                join_from,
                relationship,
                join.sql_on.trim(),
            ));
            seen.push(join.name.as_str());
        }

        Ok(explore)
    }

    /// Work out which view a join starts from
    ///
    /// An explicit `join_from` wins. Otherwise the first view referenced in
    /// `sql_on` that was already introduced in the explore is used. A
    /// reference to a known view that has not been introduced yet is kept
    /// as-is so the resolver reports the ordering problem. With no usable
    /// reference the join starts from the root.
    fn join_from(join: &JoinDef, root: &str, seen: &[&str], known_views: &HashSet<&str>) -> String {
        if let Some(explicit) = &join.join_from {
            return explicit.clone();
        }

        let referenced: Vec<&str> = referenced_views(&join.sql_on)
            .into_iter()
            .filter(|name| *name != join.name)
            .collect();

        if let Some(name) = referenced.iter().find(|name| seen.contains(*name)) {
            return name.to_string();
        }

        if let Some(name) = referenced.iter().find(|name| known_views.contains(*name)) {
            return name.to_string();
        }

        root.to_string()
    }
}

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\.[A-Za-z_][A-Za-z0-9_]*")
            .expect("reference pattern is valid")
    })
}

/// View names referenced as `${view.field}` or `view.field`, in textual order
pub fn referenced_views(sql: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();

    for captures in reference_pattern().captures_iter(sql) {
        if let Some(name) = captures.get(1) {
            if !names.contains(&name.as_str()) {
                names.push(name.as_str());
            }
        }
    }

    names
}
