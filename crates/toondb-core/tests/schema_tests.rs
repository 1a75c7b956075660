use serde_json::json;
use toondb_core::{
    detect_schema, merge_schema, validate_item, validate_items, FieldType, Schema,
};

fn sample_schema() -> Schema {
    detect_schema(&[
        json!({"id": 1, "name": "Keyboard", "price": 89.0}),
        json!({"id": 2, "name": "Mouse", "price": 25.0}),
    ])
}

// ============================================================================
// Inference
// ============================================================================

#[test]
fn detect_infers_field_types() {
    let schema = detect_schema(&[
        json!({"id": 1, "name": "a", "active": true, "tags": [], "meta": {}})
    ]);
    let types: Vec<(&str, FieldType)> = schema
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.field_type))
        .collect();
    assert_eq!(
        types,
        [
            ("id", FieldType::Number),
            ("name", FieldType::String),
            ("active", FieldType::Boolean),
            ("tags", FieldType::Array),
            ("meta", FieldType::Object),
        ]
    );
}

#[test]
fn detect_marks_fields_required_only_when_always_present() {
    let schema = detect_schema(&[
        json!({"id": 1, "name": "a"}),
        json!({"id": 2}),
    ]);
    let id = schema.fields.iter().find(|f| f.name == "id").unwrap();
    let name = schema.fields.iter().find(|f| f.name == "name").unwrap();
    assert!(id.required);
    assert!(!name.required);
}

#[test]
fn detect_degrades_disagreeing_types_to_unknown() {
    let schema = detect_schema(&[json!({"v": 1}), json!({"v": "one"})]);
    assert_eq!(schema.fields[0].field_type, FieldType::Unknown);
}

#[test]
fn detect_ignores_nulls_when_inferring_type() {
    let schema = detect_schema(&[json!({"v": null}), json!({"v": 5})]);
    let v = &schema.fields[0];
    assert_eq!(v.field_type, FieldType::Number);
    assert!(v.nullable);
}

#[test]
fn detect_on_empty_sample_is_empty() {
    assert!(detect_schema(&[]).fields.is_empty());
}

#[test]
fn non_object_samples_make_fields_non_required() {
    let schema = detect_schema(&[json!({"id": 1}), json!(42)]);
    assert!(!schema.fields[0].required);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn valid_item_passes() {
    let report = validate_item(
        &json!({"id": 3, "name": "Monitor", "price": 250.0}),
        &sample_schema(),
        false,
    );
    assert!(report.valid);
    assert!(report.errors.is_empty());
    assert!(report.warnings.is_empty());
}

#[test]
fn missing_required_field_is_an_error() {
    let report = validate_item(&json!({"id": 3, "price": 1.0}), &sample_schema(), false);
    assert!(!report.valid);
    assert_eq!(report.errors, ["Required field 'name' is missing"]);
}

#[test]
fn type_mismatch_is_an_error() {
    let report = validate_item(
        &json!({"id": "three", "name": "x", "price": 1.0}),
        &sample_schema(),
        false,
    );
    assert!(!report.valid);
    assert!(report.errors[0].contains("expected number, got string"));
}

#[test]
fn null_in_non_nullable_field_is_an_error() {
    let report = validate_item(
        &json!({"id": null, "name": "x", "price": 1.0}),
        &sample_schema(),
        false,
    );
    assert!(!report.valid);
    assert_eq!(report.errors, ["Field 'id' cannot be null"]);
}

#[test]
fn null_in_nullable_field_is_fine() {
    let schema = detect_schema(&[json!({"note": null}), json!({"note": "hi"})]);
    let report = validate_item(&json!({"note": null}), &schema, false);
    assert!(report.valid);
}

#[test]
fn unknown_typed_field_accepts_anything() {
    let schema = detect_schema(&[json!({"v": 1}), json!({"v": "one"})]);
    assert!(validate_item(&json!({"v": true}), &schema, false).valid);
}

#[test]
fn non_object_item_is_an_error() {
    let report = validate_item(&json!([1, 2]), &sample_schema(), false);
    assert!(!report.valid);
    assert_eq!(report.errors, ["Item must be an object"]);
}

#[test]
fn unknown_field_warns_with_suggestion() {
    let report = validate_item(
        &json!({"id": 3, "name": "x", "price": 1.0, "prcie": 2.0}),
        &sample_schema(),
        false,
    );
    assert!(report.valid);
    assert_eq!(report.warnings, ["New field 'prcie' - did you mean 'price'?"]);
}

#[test]
fn unknown_field_without_a_near_name_warns_plainly() {
    let report = validate_item(
        &json!({"id": 3, "name": "x", "price": 1.0, "weight": 2.0}),
        &sample_schema(),
        false,
    );
    assert_eq!(report.warnings, ["New field 'weight' will be added to schema"]);
}

#[test]
fn strict_mode_reports_extra_fields() {
    let report = validate_item(
        &json!({"id": 3, "name": "x", "price": 1.0, "prcie": 2.0}),
        &sample_schema(),
        true,
    );
    assert_eq!(report.warnings, ["Extra field 'prcie' not in schema"]);
}

// ============================================================================
// Batch Validation
// ============================================================================

#[test]
fn validate_items_prefixes_findings_with_the_index() {
    let items = [
        json!({"id": 1, "name": "a", "price": 1.0}),
        json!({"id": "two", "name": "b", "price": 2.0}),
        json!({"name": "c", "price": 3.0}),
    ];
    let report = validate_items(&items, &sample_schema(), false);
    assert!(!report.valid);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].starts_with("Item 1:"));
    assert!(report.errors[1].starts_with("Item 2:"));
}

// ============================================================================
// Merge
// ============================================================================

#[test]
fn merge_appends_new_fields_as_optional() {
    let schema = merge_schema(&sample_schema(), &json!({"id": 3, "stock": 7}));
    let stock = schema.fields.iter().find(|f| f.name == "stock").unwrap();
    assert_eq!(stock.field_type, FieldType::Number);
    assert!(!stock.required);
}

#[test]
fn merge_degrades_conflicting_types() {
    let schema = merge_schema(&sample_schema(), &json!({"id": "three"}));
    let id = schema.fields.iter().find(|f| f.name == "id").unwrap();
    assert_eq!(id.field_type, FieldType::Unknown);
}

#[test]
fn merge_records_observed_nulls() {
    let schema = merge_schema(&sample_schema(), &json!({"name": null}));
    let name = schema.fields.iter().find(|f| f.name == "name").unwrap();
    assert!(name.nullable);
    assert_eq!(name.field_type, FieldType::String);
}

// ============================================================================
// Display
// ============================================================================

#[test]
fn schema_display_lists_fields() {
    let rendered = sample_schema().to_string();
    assert!(rendered.contains("id: number (required)"));
    assert!(rendered.contains("name: string (required)"));
}

#[test]
fn empty_schema_display() {
    assert_eq!(Schema::default().to_string(), "No fields defined");
}
