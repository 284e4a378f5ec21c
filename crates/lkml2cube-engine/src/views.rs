//! View → cube translation
//!
//! A view becomes a cube of the same name. Fields are translated one by one
//! through a fixed type table, preserving their order.

use lkml2cube_core::{
    Cube, CubeDimension, CubeMeasure, DimensionType, Field, FieldKind, FieldType, MeasureType,
    TranslateError, View, ViewSource,
};

/// Target type for a dimension of the given source type
pub fn dimension_type(source: FieldType) -> Option<DimensionType> {
    match source {
        FieldType::String | FieldType::Zipcode | FieldType::Unquoted => Some(DimensionType::String),
        FieldType::Number | FieldType::Tier | FieldType::Bin | FieldType::Distance => {
            Some(DimensionType::Number)
        }
        FieldType::Yesno => Some(DimensionType::Boolean),
        FieldType::Time | FieldType::Date | FieldType::DateTime => Some(DimensionType::Time),
        FieldType::Location => Some(DimensionType::Geo),
        _ => None,
    }
}

/// Target type for a measure of the given source type
pub fn measure_type(source: FieldType) -> Option<MeasureType> {
    match source {
        FieldType::Count => Some(MeasureType::Count),
        FieldType::CountDistinct => Some(MeasureType::CountDistinct),
        FieldType::Sum => Some(MeasureType::Sum),
        FieldType::Average => Some(MeasureType::Avg),
        FieldType::Min => Some(MeasureType::Min),
        FieldType::Max => Some(MeasureType::Max),
        FieldType::Number => Some(MeasureType::Number),
        FieldType::String => Some(MeasureType::String),
        FieldType::Yesno => Some(MeasureType::Boolean),
        FieldType::Date | FieldType::Time => Some(MeasureType::Time),
        FieldType::RunningTotal => Some(MeasureType::RunningTotal),
        _ => None,
    }
}

/// SQL used when a field has no expression of its own
fn default_sql(field: &str) -> String {
    format!("{{CUBE}}.{}", field)
}

/// Translate one view into a cube
///
/// Derived views without SQL produce a cube with neither `sql_table` nor
/// `sql`; the assembler rejects such cubes if nothing fills them in.
pub fn translate_view(view: &View) -> Result<Cube, TranslateError> {
    let mut cube = Cube::new(&view.name);

    match &view.source {
        ViewSource::Table { name } => cube.sql_table = Some(name.clone()),
        ViewSource::Derived { sql } => cube.sql = sql.clone(),
    }

    for field in &view.fields {
        match field.kind {
            FieldKind::Dimension => cube.dimensions.push(translate_dimension(&view.name, field)?),
            FieldKind::Measure => cube.measures.push(translate_measure(&view.name, field)?),
        }
    }

    tracing::debug!(
        cube = %cube.name,
        dimensions = cube.dimensions.len(),
        measures = cube.measures.len(),
        "Translated view"
    );

    Ok(cube)
}

fn unsupported(view: &str, field: &Field) -> TranslateError {
    TranslateError::UnsupportedFieldType {
        view: view.to_string(),
        field: field.name.clone(),
        kind: field.kind.to_string(),
        field_type: field.data_type.to_string(),
    }
}

fn translate_dimension(view: &str, field: &Field) -> Result<CubeDimension, TranslateError> {
    let dimension_type = dimension_type(field.data_type).ok_or_else(|| unsupported(view, field))?;

    Ok(CubeDimension {
        name: field.name.clone(),
        sql: field.expression.clone().unwrap_or_else(|| default_sql(&field.name)),
        dimension_type,
        primary_key: field.primary_key,
        title: field.label.clone(),
        description: field.description.clone(),
    })
}

fn translate_measure(view: &str, field: &Field) -> Result<CubeMeasure, TranslateError> {
    let measure_type = measure_type(field.data_type).ok_or_else(|| unsupported(view, field))?;

    // A plain count needs no column
    let sql = match (&field.expression, measure_type) {
        (Some(sql), _) => Some(sql.clone()),
        (None, MeasureType::Count) => None,
        (None, _) => Some(default_sql(&field.name)),
    };

    Ok(CubeMeasure {
        name: field.name.clone(),
        sql,
        measure_type,
        title: field.label.clone(),
        description: field.description.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn orders() -> View {
        View::table("orders", "public.orders").with_fields(vec![
            Field::dimension("id", FieldType::Number).with_primary_key(true),
            Field::dimension("status", FieldType::String)
                .with_sql("${TABLE}.status")
                .with_label("Order Status"),
            Field::measure("count", FieldType::Count),
            Field::measure("total", FieldType::Sum)
                .with_sql("${TABLE}.amount")
                .with_description("Order value"),
            Field::dimension("created", FieldType::Time),
        ])
    }

    #[test]
    fn name_and_table_carry_over() {
        let cube = translate_view(&orders()).unwrap();
        assert_eq!(cube.name, "orders");
        assert_eq!(cube.sql_table.as_deref(), Some("public.orders"));
        assert_eq!(cube.sql, None);
        assert!(cube.joins.is_empty());
    }

    #[test]
    fn fields_keep_order_within_kind() {
        let cube = translate_view(&orders()).unwrap();

        let dims: Vec<&str> = cube.dimensions.iter().map(|d| d.name.as_str()).collect();
        let measures: Vec<&str> = cube.measures.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(dims, vec!["id", "status", "created"]);
        assert_eq!(measures, vec!["count", "total"]);
    }

    #[test]
    fn field_attributes() {
        let cube = translate_view(&orders()).unwrap();

        let id = &cube.dimensions[0];
        assert_eq!(id.sql, "{CUBE}.id");
        assert_eq!(id.dimension_type, DimensionType::Number);
        assert!(id.primary_key);

        let status = &cube.dimensions[1];
        assert_eq!(status.sql, "${TABLE}.status");
        assert_eq!(status.title.as_deref(), Some("Order Status"));

        let count = &cube.measures[0];
        assert_eq!(count.sql, None);
        assert_eq!(count.measure_type, MeasureType::Count);

        let total = &cube.measures[1];
        assert_eq!(total.sql.as_deref(), Some("${TABLE}.amount"));
        assert_eq!(total.description.as_deref(), Some("Order value"));

        assert_eq!(cube.dimensions[2].dimension_type, DimensionType::Time);
    }

    #[test]
    fn derived_view_uses_sql() {
        let view = View::derived("rollup", Some("SELECT 1 AS id".to_string()))
            .with_fields(vec![Field::measure("max_id", FieldType::Max)]);

        let cube = translate_view(&view).unwrap();
        assert_eq!(cube.sql.as_deref(), Some("SELECT 1 AS id"));
        assert_eq!(cube.sql_table, None);
        assert_eq!(cube.measures[0].sql.as_deref(), Some("{CUBE}.max_id"));
    }

    #[test]
    fn unmapped_pair_is_unsupported() {
        let view = View::table("orders", "orders")
            .with_fields(vec![Field::measure("p90", FieldType::Percentile)]);

        assert_eq!(
            translate_view(&view),
            Err(TranslateError::UnsupportedFieldType {
                view: "orders".to_string(),
                field: "p90".to_string(),
                kind: "measure".to_string(),
                field_type: "percentile".to_string(),
            })
        );
    }

    #[test]
    fn measure_type_used_as_dimension_is_unsupported() {
        let view = View::table("orders", "orders")
            .with_fields(vec![Field::dimension("total", FieldType::Sum)]);

        assert!(matches!(
            translate_view(&view),
            Err(TranslateError::UnsupportedFieldType { .. })
        ));
    }

    #[test]
    fn type_table() {
        assert_eq!(dimension_type(FieldType::Yesno), Some(DimensionType::Boolean));
        assert_eq!(dimension_type(FieldType::Location), Some(DimensionType::Geo));
        assert_eq!(dimension_type(FieldType::Zipcode), Some(DimensionType::String));
        assert_eq!(dimension_type(FieldType::Duration), None);
        assert_eq!(measure_type(FieldType::Average), Some(MeasureType::Avg));
        assert_eq!(measure_type(FieldType::SumDistinct), None);
        assert_eq!(measure_type(FieldType::Tier), None);
    }
}
