//! Plan-level properties of the column rewrite, checked without an engine.

use recast_ir::{parse_directives, ColumnDescriptor, DataType, RewriteError, RewritePlan};

fn catalog_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new(0, "ProductID", DataType::String),
        ColumnDescriptor::new(1, "Name", DataType::String),
        ColumnDescriptor::new(2, "ListPrice", DataType::String),
        ColumnDescriptor::new(3, "StandardCost", DataType::Float64),
        ColumnDescriptor::new(4, "ModifiedDate", DataType::String),
        ColumnDescriptor::new(5, "Weight", DataType::String),
    ]
}

#[test]
fn test_order_and_count_preserved() {
    let directives = parse_directives(
        r#"[
            {"field_name": "Weight", "data_type": "float", "new_field_name": "Weight_Kg"},
            {"field_name": "ListPrice", "data_type": "float", "new_field_name": "List_Price_USD"},
            {"field_name": "ModifiedDate", "data_type": "timestamp"}
        ]"#,
    )
    .unwrap();

    let plan = RewritePlan::build(&catalog_columns(), &directives).unwrap();
    let names: Vec<&str> = plan.columns.iter().map(|c| c.output_name.as_str()).collect();

    assert_eq!(
        names,
        vec!["ProductID", "Name", "List_Price_USD", "StandardCost", "ModifiedDate", "Weight_Kg"]
    );
    for (i, column) in plan.columns.iter().enumerate() {
        assert_eq!(column.position, i);
    }
}

#[test]
fn test_untouched_columns_unchanged() {
    let directives =
        parse_directives(r#"[{"field_name": "ListPrice", "new_field_name": "Price"}]"#).unwrap();
    let plan = RewritePlan::build(&catalog_columns(), &directives).unwrap();

    for (input, output) in catalog_columns().iter().zip(&plan.columns) {
        if input.name == "ListPrice" {
            continue;
        }
        assert_eq!(output.output_name, input.name);
        assert_eq!(output.output_type, input.data_type);
        assert!(!output.is_renamed() && !output.is_retyped());
    }
}

#[test]
fn test_rename_only_keeps_type() {
    let directives = parse_directives(
        r#"[{"field_name": "StandardCost", "new_field_name": "Standard_Cost_USD"}]"#,
    )
    .unwrap();
    let plan = RewritePlan::build(&catalog_columns(), &directives).unwrap();

    let column = &plan.columns[3];
    assert_eq!(column.output_name, "Standard_Cost_USD");
    assert_eq!(column.output_type, DataType::Float64);
}

#[test]
fn test_retype_only_keeps_name() {
    let directives =
        parse_directives(r#"[{"field_name": "ModifiedDate", "data_type": "timestamp"}]"#).unwrap();
    let plan = RewritePlan::build(&catalog_columns(), &directives).unwrap();

    let column = &plan.columns[4];
    assert_eq!(column.output_name, "ModifiedDate");
    assert_eq!(column.output_type, DataType::Timestamp);
}

#[test]
fn test_missing_field_aborts() {
    let directives =
        parse_directives(r#"[{"field_name": "Colour", "new_field_name": "Color"}]"#).unwrap();
    let err = RewritePlan::build(&catalog_columns(), &directives).unwrap_err();

    assert!(matches!(err, RewriteError::FieldNotFound(ref f) if f == "Colour"));
    assert!(err.to_string().contains("Colour"));
}

#[test]
fn test_schemas_reflect_plan() {
    let directives = parse_directives(
        r#"[{"field_name": "ListPrice", "data_type": "float",
            "new_field_name": "List_Price_USD"}]"#,
    )
    .unwrap();
    let plan = RewritePlan::build(&catalog_columns(), &directives).unwrap();

    let source = plan.source_schema();
    let output = plan.output_schema();
    assert_eq!(source.find_field("ListPrice").unwrap().data_type, DataType::String);
    assert!(output.find_field("ListPrice").is_none());
    assert_eq!(output.find_field("List_Price_USD").unwrap().data_type, DataType::Float32);
    assert!(output.render_tree().contains(" |-- List_Price_USD: float (nullable = true)"));
}
