//! Schema inference and validation for inserted items.
//!
//! [`detect_schema`] derives a per-field type profile from a sample array:
//! a field whose observed types disagree (null aside) degrades to
//! `unknown`, a field present in every sampled object is `required`, and
//! any observed null marks it `nullable`. [`validate_item`] then checks a
//! candidate item against that profile — missing required fields and type
//! mismatches are errors; fields the schema has never seen are warnings,
//! with a "did you mean" suggestion when a known field name is within two
//! edits.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Inferred type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    Unknown,
}

impl FieldType {
    /// The type of a concrete value.
    pub fn of(value: &Value) -> FieldType {
        match value {
            Value::Null => FieldType::Null,
            Value::Bool(_) => FieldType::Boolean,
            Value::Number(_) => FieldType::Number,
            Value::String(_) => FieldType::String,
            Value::Array(_) => FieldType::Array,
            Value::Object(_) => FieldType::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Null => "null",
            FieldType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inferred field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    pub nullable: bool,
}

/// A field-type profile inferred from sampled items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<SchemaField>,
}

impl Schema {
    fn field_mut(&mut self, name: &str) -> Option<&mut SchemaField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("No fields defined");
        }
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            let required = if field.required { "required" } else { "optional" };
            let nullable = if field.nullable { " (nullable)" } else { "" };
            write!(f, "  {}: {} ({required}){nullable}", field.name, field.field_type)?;
        }
        Ok(())
    }
}

/// Outcome of validating one item (or a batch) against a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Infer a schema from sampled items. Non-object samples contribute no
/// fields but do make every field non-required.
pub fn detect_schema(items: &[Value]) -> Schema {
    let mut schema = Schema::default();
    if items.is_empty() {
        return schema;
    }

    for item in items {
        let Value::Object(map) = item else { continue };
        for (key, value) in map {
            observe_field(&mut schema, key, value);
        }
    }

    for field in &mut schema.fields {
        field.required = items.iter().all(|item| {
            item.as_object()
                .is_some_and(|map| map.contains_key(&field.name))
        });
    }

    schema
}

/// Fold one observation of `key: value` into the schema. Types that
/// disagree (ignoring null observations) degrade the field to `unknown`.
fn observe_field(schema: &mut Schema, key: &str, value: &Value) {
    let observed = FieldType::of(value);
    match schema.field_mut(key) {
        None => schema.fields.push(SchemaField {
            name: key.to_string(),
            field_type: observed,
            required: false,
            nullable: value.is_null(),
        }),
        Some(field) => {
            if observed != FieldType::Null {
                if field.field_type == FieldType::Null {
                    // All observations so far were null; adopt the first
                    // concrete type instead of degrading.
                    field.field_type = observed;
                } else if field.field_type != observed {
                    field.field_type = FieldType::Unknown;
                }
            }
            if value.is_null() {
                field.nullable = true;
            }
        }
    }
}

/// Validate one item against a schema.
///
/// Errors: non-object item, missing required field, null in a
/// non-nullable field, type mismatch against a non-`unknown` field type.
/// Warnings: fields absent from the schema — reported as extra in strict
/// mode, or as new fields (with a near-name suggestion) otherwise.
pub fn validate_item(item: &Value, schema: &Schema, strict: bool) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Value::Object(map) = item else {
        return ValidationReport {
            valid: false,
            errors: vec!["Item must be an object".to_string()],
            warnings,
        };
    };

    for field in &schema.fields {
        match map.get(&field.name) {
            None => {
                if field.required {
                    errors.push(format!("Required field '{}' is missing", field.name));
                }
            }
            Some(value) => {
                let actual = FieldType::of(value);
                if value.is_null() && !field.nullable {
                    errors.push(format!("Field '{}' cannot be null", field.name));
                } else if !value.is_null()
                    && field.field_type != FieldType::Unknown
                    && actual != field.field_type
                {
                    errors.push(format!(
                        "Field '{}' has wrong type: expected {}, got {}",
                        field.name, field.field_type, actual
                    ));
                }
            }
        }
    }

    let known = schema.field_names();
    for key in map.keys() {
        if known.iter().any(|name| name == key) {
            continue;
        }
        if strict {
            warnings.push(format!("Extra field '{key}' not in schema"));
        } else {
            match find_similar_field_name(key, &known) {
                Some(suggestion) => {
                    warnings.push(format!("New field '{key}' - did you mean '{suggestion}'?"));
                }
                None => {
                    warnings.push(format!("New field '{key}' will be added to schema"));
                }
            }
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Validate a batch of items, prefixing each finding with its index.
pub fn validate_items(items: &[Value], schema: &Schema, strict: bool) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (index, item) in items.iter().enumerate() {
        let report = validate_item(item, schema, strict);
        errors.extend(report.errors.into_iter().map(|e| format!("Item {index}: {e}")));
        warnings.extend(report.warnings.into_iter().map(|w| format!("Item {index}: {w}")));
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Fold one new item's shape into an existing schema. New fields are
/// appended as optional; known fields follow the same type-degradation
/// rules as [`detect_schema`].
pub fn merge_schema(existing: &Schema, new_item: &Value) -> Schema {
    let mut schema = existing.clone();
    if let Value::Object(map) = new_item {
        for (key, value) in map {
            observe_field(&mut schema, key, value);
        }
    }
    schema
}

/// Suggest a known field name close to `input`: a case-insensitive exact
/// match wins, otherwise the nearest name within Levenshtein distance 2.
fn find_similar_field_name(input: &str, candidates: &[String]) -> Option<String> {
    let lower = input.to_lowercase();

    if let Some(exact) = candidates.iter().find(|c| c.to_lowercase() == lower) {
        return Some(exact.clone());
    }

    let mut best: Option<String> = None;
    let mut best_distance = usize::MAX;
    for candidate in candidates {
        let distance = levenshtein(&lower, &candidate.to_lowercase());
        if distance < best_distance && distance <= 2 {
            best_distance = distance;
            best = Some(candidate.clone());
        }
    }
    best
}

/// Classic dynamic-programming edit distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut matrix = vec![vec![0usize; a.len() + 1]; b.len() + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=a.len() {
        matrix[0][j] = j;
    }

    for i in 1..=b.len() {
        for j in 1..=a.len() {
            if b[i - 1] == a[j - 1] {
                matrix[i][j] = matrix[i - 1][j - 1];
            } else {
                matrix[i][j] = (matrix[i - 1][j - 1] + 1)
                    .min(matrix[i][j - 1] + 1)
                    .min(matrix[i - 1][j] + 1);
            }
        }
    }

    matrix[b.len()][a.len()]
}
