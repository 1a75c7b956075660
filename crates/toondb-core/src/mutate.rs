//! Mutation engine: update, insert, delete and bulk operations.
//!
//! Every operation clones the caller's tree before touching it, navigates
//! the plain-path prefix strictly, applies the change, and re-encodes the
//! result so callers always receive both the new tree (`new_data`) and its
//! canonical TOON text (`new_toon`).
//!
//! Outcomes are reported as discriminated result structs rather than
//! errors: parsing or resolution failures come back as `success: false`
//! with a message, which maps directly onto collaborator responses. On
//! failure `new_data` is the unmodified input tree and `new_toon` is
//! empty.
//!
//! Equality is deliberately asymmetric: update selectors match with loose
//! equality (`id==2` matches a numeric 2 and a numeric string "2"), while
//! delete selectors match strictly, type included. Bulk operations are
//! non-atomic by contract — each operation runs regardless of earlier
//! failures, and the final tree keeps whatever applied.

use crate::encoder::encode;
use crate::path::{parse_path, Selector};
use crate::query::{compare_field, resolve_path, resolve_path_mut, strict_eq};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outcome of [`update_value`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateResult {
    pub success: bool,
    pub message: String,
    pub modified_count: usize,
    pub new_data: Value,
    pub new_toon: String,
}

/// Outcome of [`insert_item`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertResult {
    pub success: bool,
    pub message: String,
    pub inserted_count: usize,
    pub new_data: Value,
    pub new_toon: String,
}

/// Outcome of [`delete_item`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteResult {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
    pub new_data: Value,
    pub new_toon: String,
}

/// One declared step of a bulk request. `value`, `item` and `selector` are
/// per-kind requirements checked at execution time, so a malformed step
/// fails on its own without rejecting the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub op: OpKind,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Update,
    Insert,
    Delete,
}

/// Per-operation outcome inside a [`BulkResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    Update(UpdateResult),
    Insert(InsertResult),
    Delete(DeleteResult),
}

impl OperationResult {
    pub fn success(&self) -> bool {
        match self {
            OperationResult::Update(r) => r.success,
            OperationResult::Insert(r) => r.success,
            OperationResult::Delete(r) => r.success,
        }
    }
}

/// Outcome of [`bulk_operation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkResult {
    pub success: bool,
    pub message: String,
    pub results: Vec<OperationResult>,
    pub final_data: Value,
    pub final_toon: String,
}

/// Set a field on the element(s) addressed by a mutation path.
///
/// With a selector, the path must resolve to an array; every matching
/// element gets `target_field` set and the match count is reported — zero
/// matches is a failure. When the selector resolves to a non-array value,
/// or there is no selector but the parse produced a target field, the
/// field is set directly on the resolved object. A path with neither
/// selector nor target field cannot address anything and fails.
pub fn update_value(data: &Value, path: &str, new_value: Value) -> UpdateResult {
    let fail = |message: String| UpdateResult {
        success: false,
        message,
        modified_count: 0,
        new_data: data.clone(),
        new_toon: String::new(),
    };

    let ast = match parse_path(path) {
        Ok(ast) => ast,
        Err(e) => return fail(e.to_string()),
    };
    let mut copy = data.clone();
    let current = match resolve_path_mut(&mut copy, &ast.path) {
        Ok(v) => v,
        Err(e) => return fail(e.to_string()),
    };

    let mut modified = 0;
    match (&ast.selector, current) {
        (Some(selector), Value::Array(items)) => {
            let mut matched = 0;
            for item in items.iter_mut() {
                if !selector_matches(item, selector) {
                    continue;
                }
                matched += 1;
                if let Some(field) = &ast.target_field {
                    if let Value::Object(map) = item {
                        map.insert(field.clone(), new_value.clone());
                        modified += 1;
                    }
                }
            }
            if matched == 0 {
                return fail("No items found matching selector".to_string());
            }
        }
        (_, current) => {
            let Some(field) = &ast.target_field else {
                return fail("Invalid path: no target field specified".to_string());
            };
            if let Value::Object(map) = current {
                map.insert(field.clone(), new_value);
                modified = 1;
            }
        }
    }

    let new_toon = encode(&copy);
    UpdateResult {
        success: true,
        message: format!("Updated {modified} item(s)"),
        modified_count: modified,
        new_data: copy,
        new_toon,
    }
}

/// Append an item to the array addressed by a mutation path.
pub fn insert_item(data: &Value, path: &str, new_item: Value) -> InsertResult {
    let fail = |message: String| InsertResult {
        success: false,
        message,
        inserted_count: 0,
        new_data: data.clone(),
        new_toon: String::new(),
    };

    let ast = match parse_path(path) {
        Ok(ast) => ast,
        Err(e) => return fail(e.to_string()),
    };
    let mut copy = data.clone();
    let current = match resolve_path_mut(&mut copy, &ast.path) {
        Ok(v) => v,
        Err(e) => return fail(e.to_string()),
    };

    let Value::Array(items) = current else {
        return fail("Target is not an array".to_string());
    };
    items.push(new_item);

    let new_toon = encode(&copy);
    InsertResult {
        success: true,
        message: "Item inserted successfully".to_string(),
        inserted_count: 1,
        new_data: copy,
        new_toon,
    }
}

/// Remove every element of the addressed array whose fields all strictly
/// match the selector's key/value pairs. Non-object elements are kept; an
/// element missing a selector key is kept. Deleting zero elements is
/// still a success.
pub fn delete_item(data: &Value, path: &str, selector: &Map<String, Value>) -> DeleteResult {
    let fail = |message: String| DeleteResult {
        success: false,
        message,
        deleted_count: 0,
        new_data: data.clone(),
        new_toon: String::new(),
    };

    let ast = match parse_path(path) {
        Ok(ast) => ast,
        Err(e) => return fail(e.to_string()),
    };
    let mut copy = data.clone();
    let current = match resolve_path_mut(&mut copy, &ast.path) {
        Ok(v) => v,
        Err(e) => return fail(e.to_string()),
    };

    let Value::Array(items) = current else {
        return fail("Target is not an array".to_string());
    };
    let before = items.len();
    items.retain(|item| {
        let Value::Object(map) = item else {
            return true;
        };
        // Keep unless every selector pair matches strictly.
        !selector
            .iter()
            .all(|(key, value)| map.get(key).is_some_and(|v| strict_value_eq(v, value)))
    });
    let deleted = before - items.len();

    let new_toon = encode(&copy);
    DeleteResult {
        success: true,
        message: format!("Deleted {deleted} item(s)"),
        deleted_count: deleted,
        new_data: copy,
        new_toon,
    }
}

/// Read-only selector search over the array at a mutation path. Resolution
/// failures and non-array targets yield an empty result, never an error.
pub fn find_items(data: &Value, path: &str, selector: &Selector) -> Vec<Value> {
    let Ok(ast) = parse_path(path) else {
        return Vec::new();
    };
    let Ok(resolved) = resolve_path(data, &ast.path) else {
        return Vec::new();
    };
    let Value::Array(items) = resolved else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| selector_matches(item, selector))
        .cloned()
        .collect()
}

/// Run a sequence of operations against a running tree. Operations are
/// independent and non-aborting: a failure neither rolls back earlier
/// effects nor blocks later operations. Overall `success` is the AND of
/// the per-operation results, and `final_data`/`final_toon` reflect
/// whatever applied.
pub fn bulk_operation(data: &Value, operations: &[Operation]) -> BulkResult {
    let mut current = data.clone();
    let mut results = Vec::with_capacity(operations.len());

    for op in operations {
        let result = match op.op {
            OpKind::Update => match &op.value {
                None => OperationResult::Update(UpdateResult {
                    success: false,
                    message: "Update operation requires value".to_string(),
                    modified_count: 0,
                    new_data: current.clone(),
                    new_toon: String::new(),
                }),
                Some(value) => {
                    let r = update_value(&current, &op.path, value.clone());
                    if r.success {
                        current = r.new_data.clone();
                    }
                    OperationResult::Update(r)
                }
            },
            OpKind::Insert => match &op.item {
                None => OperationResult::Insert(InsertResult {
                    success: false,
                    message: "Insert operation requires item".to_string(),
                    inserted_count: 0,
                    new_data: current.clone(),
                    new_toon: String::new(),
                }),
                Some(item) => {
                    let r = insert_item(&current, &op.path, item.clone());
                    if r.success {
                        current = r.new_data.clone();
                    }
                    OperationResult::Insert(r)
                }
            },
            OpKind::Delete => match &op.selector {
                None => OperationResult::Delete(DeleteResult {
                    success: false,
                    message: "Delete operation requires selector".to_string(),
                    deleted_count: 0,
                    new_data: current.clone(),
                    new_toon: String::new(),
                }),
                Some(selector) => {
                    let r = delete_item(&current, &op.path, selector);
                    if r.success {
                        current = r.new_data.clone();
                    }
                    OperationResult::Delete(r)
                }
            },
        };
        results.push(result);
    }

    let success = results.iter().all(|r| r.success());
    let message = if success {
        format!("All {} operations completed successfully", operations.len())
    } else {
        "Some operations failed".to_string()
    };
    let final_toon = encode(&current);

    BulkResult {
        success,
        message,
        results,
        final_data: current,
        final_toon,
    }
}

/// Does an element match an update/find selector? Field selectors compare
/// strictly; filter selectors use the query engine's loose comparison.
/// Only objects can match.
fn selector_matches(item: &Value, selector: &Selector) -> bool {
    if !item.is_object() && !item.is_array() {
        return false;
    }
    let field_value = |field: &str| item.as_object().and_then(|map| map.get(field));
    match selector {
        Selector::Field { field, value } => strict_eq(field_value(field), value),
        Selector::Filter { field, op, value } => compare_field(field_value(field), *op, value),
    }
}

/// Type-sensitive equality for delete selectors; numbers still compare
/// numerically across integer/float representations.
fn strict_value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
