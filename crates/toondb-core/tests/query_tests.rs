use serde_json::{json, Value};
use toondb_core::{query_toonpath, QueryError};

fn store() -> Value {
    json!({
        "products": [
            {"id": 1, "name": "Keyboard", "price": 10, "stock": 5, "category": "accessories"},
            {"id": 2, "name": "monitor", "price": 200, "stock": 0, "category": "displays"},
            {"id": 3, "name": "Mouse", "price": 50, "stock": 12, "category": "accessories"}
        ]
    })
}

// ============================================================================
// Path Resolution
// ============================================================================

#[test]
fn resolve_whole_collection() {
    let results = query_toonpath(&store(), "products").unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn resolve_nested_path() {
    let data = json!({"store": {"meta": {"owner": "Ada"}}});
    let results = query_toonpath(&data, "store.meta.owner").unwrap();
    assert_eq!(results, vec![json!("Ada")]);
}

#[test]
fn scalar_result_is_wrapped_in_an_array() {
    let data = json!({"count": 42});
    assert_eq!(query_toonpath(&data, "count").unwrap(), vec![json!(42)]);
}

#[test]
fn error_on_missing_property() {
    assert!(matches!(
        query_toonpath(&store(), "warehouse"),
        Err(QueryError::MissingProperty { segment }) if segment == "warehouse"
    ));
}

#[test]
fn error_on_null_intermediate() {
    let data = json!({"a": null});
    assert!(matches!(
        query_toonpath(&data, "a.b"),
        Err(QueryError::NullAccess { segment }) if segment == "b"
    ));
}

#[test]
fn error_on_primitive_intermediate() {
    let data = json!({"a": 5});
    assert!(matches!(
        query_toonpath(&data, "a.b"),
        Err(QueryError::PrimitiveAccess { .. })
    ));
}

#[test]
fn error_on_syntax_failure() {
    assert!(matches!(
        query_toonpath(&store(), "products.price>"),
        Err(QueryError::Syntax(_))
    ));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn filter_by_comparison() {
    let results = query_toonpath(&store(), "products.price>20").unwrap();
    let ids: Vec<i64> = results.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, [2, 3]);
}

#[test]
fn filter_by_string_equality() {
    let results = query_toonpath(&store(), "products.name=='Mouse'").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!(3));
}

#[test]
fn loose_equality_matches_numeric_strings() {
    let data = json!({"items": [{"id": "2"}, {"id": 2}, {"id": 3}]});
    let results = query_toonpath(&data, "items.id==2").unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn filter_with_and() {
    let results = query_toonpath(&store(), "products.price>20 and stock>0").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], json!(3));
}

#[test]
fn filter_with_or() {
    let results = query_toonpath(&store(), "products.price>100 or stock>10").unwrap();
    let ids: Vec<i64> = results.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, [2, 3]);
}

#[test]
fn logical_chain_folds_left() {
    // (price>100 or stock>10) and id==3 — equal precedence, left to right.
    let results = query_toonpath(&store(), "products.price>100 or stock>10 and id==3").unwrap();
    let ids: Vec<i64> = results.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, [3]);
}

#[test]
fn filter_with_in_membership() {
    let results = query_toonpath(&store(), "products.id in [1,3]").unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn unorderable_operand_makes_comparison_false() {
    let results = query_toonpath(&store(), "products.name>10").unwrap();
    assert!(results.is_empty());
}

#[test]
fn missing_field_never_matches() {
    let results = query_toonpath(&store(), "products.rating==5").unwrap();
    assert!(results.is_empty());
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn project_named_fields() {
    let results = query_toonpath(&store(), "products.name,price").unwrap();
    assert_eq!(results[0], json!({"name": "Keyboard", "price": 10}));
    assert_eq!(results.len(), 3);
}

#[test]
fn projection_drops_missing_fields_silently() {
    let data = json!({"items": [{"a": 1, "b": 2}, {"a": 3}]});
    let results = query_toonpath(&data, "items.a,b").unwrap();
    assert_eq!(results[1], json!({"a": 3}));
}

#[test]
fn filter_then_projection() {
    let results = query_toonpath(&store(), "products.price>20.name,price").unwrap();
    assert_eq!(
        results,
        vec![
            json!({"name": "monitor", "price": 200}),
            json!({"name": "Mouse", "price": 50})
        ]
    );
}

// ============================================================================
// Sort and Limit
// ============================================================================

#[test]
fn sort_numeric_ascending() {
    let results = query_toonpath(&store(), "products sort:price").unwrap();
    let prices: Vec<i64> = results.iter().map(|p| p["price"].as_i64().unwrap()).collect();
    assert_eq!(prices, [10, 50, 200]);
}

#[test]
fn sort_numeric_descending() {
    let results = query_toonpath(&store(), "products sort:price:desc").unwrap();
    let prices: Vec<i64> = results.iter().map(|p| p["price"].as_i64().unwrap()).collect();
    assert_eq!(prices, [200, 50, 10]);
}

#[test]
fn sort_strings_case_insensitively() {
    // "monitor" sorts between "Keyboard" and "Mouse" despite its case.
    let results = query_toonpath(&store(), "products sort:name").unwrap();
    let names: Vec<&str> = results.iter().map(|p| p["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Keyboard", "monitor", "Mouse"]);
}

#[test]
fn nulls_sort_last_ascending_first_descending() {
    let data = json!({"xs": [{"v": 2}, {"v": null}, {"v": 1}, {}]});

    let asc = query_toonpath(&data, "xs sort:v").unwrap();
    assert_eq!(asc[0], json!({"v": 1}));
    assert_eq!(asc[1], json!({"v": 2}));

    let desc = query_toonpath(&data, "xs sort:v:desc").unwrap();
    assert_eq!(desc[2], json!({"v": 2}));
    assert_eq!(desc[3], json!({"v": 1}));
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let data = json!({"xs": [
        {"k": 1, "tag": "a"},
        {"k": 1, "tag": "b"},
        {"k": 0, "tag": "c"},
        {"k": 1, "tag": "d"}
    ]});
    let results = query_toonpath(&data, "xs sort:k").unwrap();
    let tags: Vec<&str> = results.iter().map(|x| x["tag"].as_str().unwrap()).collect();
    assert_eq!(tags, ["c", "a", "b", "d"]);
}

#[test]
fn limit_takes_a_prefix() {
    let results = query_toonpath(&store(), "products limit:2").unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], json!(1));
}

#[test]
fn limit_larger_than_result_is_harmless() {
    let results = query_toonpath(&store(), "products limit:99").unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn filter_sort_limit_together() {
    let data = json!({"products": [
        {"id": 1, "price": 10},
        {"id": 2, "price": 200},
        {"id": 3, "price": 50}
    ]});
    let results = query_toonpath(&data, "products.price>20 sort:price:desc limit:1").unwrap();
    assert_eq!(results, vec![json!({"id": 2, "price": 200})]);
}
