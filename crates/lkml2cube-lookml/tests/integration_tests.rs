//! Integration tests for document loading

use lkml2cube_core::{FieldKind, FieldType, Relationship, ViewSource};
use lkml2cube_lookml::{document_files, LookmlDocument, ModelLoader};
use pretty_assertions::assert_eq;
use std::path::Path;

#[test]
fn load_fixture_model() {
    let document = LookmlDocument::from_file(Path::new("../../fixtures/ecommerce/model.yaml")).unwrap();
    let model = ModelLoader::load(&document).unwrap();

    assert_eq!(model.view_count(), 4);
    assert_eq!(model.explore_count(), 1);

    let orders = model.get_view("orders").unwrap();
    let fields: Vec<(&str, FieldKind, FieldType)> = orders
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.kind, f.data_type))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("id", FieldKind::Dimension, FieldType::Number),
            ("customer_id", FieldKind::Dimension, FieldType::Number),
            ("status", FieldKind::Dimension, FieldType::String),
            ("created", FieldKind::Dimension, FieldType::Time),
            ("count", FieldKind::Measure, FieldType::Count),
            ("total_amount", FieldKind::Measure, FieldType::Sum),
        ]
    );
    assert!(orders.fields[0].primary_key);
    assert_eq!(orders.fields[1].expression.as_deref(), Some("${TABLE}.customer_id"));
    assert_eq!(orders.fields[5].label.as_deref(), Some("Total Amount"));

    let regions = model.get_view("regions").unwrap();
    assert_eq!(
        regions.source,
        ViewSource::Derived { sql: Some("SELECT id, name FROM public.regions".to_string()) }
    );

    let explore = model.explores().next().unwrap();
    assert_eq!(explore.root_view, "orders");
    let joins: Vec<(&str, &str, Relationship)> = explore
        .joins
        .iter()
        .map(|j| (j.joined_view.as_str(), j.join_from.as_str(), j.relationship))
        .collect();
    assert_eq!(
        joins,
        vec![
            ("customers", "orders", Relationship::ManyToOne),
            ("regions", "customers", Relationship::ManyToOne),
        ]
    );
}

#[test]
fn fixture_project_files_are_listed() {
    let files = document_files(Path::new("../../fixtures/ecommerce"));
    let names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();

    assert_eq!(
        names,
        vec!["order_items.explore.json", "unrelated.yaml", "model.json", "model.yaml"]
    );
}
