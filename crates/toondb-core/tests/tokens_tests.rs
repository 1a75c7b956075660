use serde_json::json;
use toondb_core::{compare_tokens, encode, estimate_tokens};

#[test]
fn estimate_scales_with_text_length() {
    let short = estimate_tokens("name: Alice");
    let long = estimate_tokens("name: Alice\nage: 30\ncity: Portland\nrole: admin");
    assert!(short > 0);
    assert!(long > short);
}

#[test]
fn estimate_collapses_whitespace() {
    assert_eq!(
        estimate_tokens("a   b\n\n  c"),
        estimate_tokens("a b c")
    );
}

#[test]
fn structural_punctuation_costs_extra() {
    assert!(estimate_tokens(r#"{"a":1,"b":2}"#) > estimate_tokens("a 1 b 2xxx"));
}

#[test]
fn empty_text_estimates_zero() {
    assert_eq!(estimate_tokens(""), 0);
}

#[test]
fn toon_saves_tokens_on_tabular_data() {
    let data = json!({"products": [
        {"id": 1, "name": "Keyboard", "price": 89, "stock": 5},
        {"id": 2, "name": "Mouse", "price": 25, "stock": 12},
        {"id": 3, "name": "Monitor", "price": 250, "stock": 2}
    ]});
    let toon = encode(&data);
    let json_text = serde_json::to_string_pretty(&data).unwrap();

    let savings = compare_tokens(&toon, &json_text);
    assert_eq!(savings.toon, estimate_tokens(&toon));
    assert_eq!(savings.json, estimate_tokens(&json_text));
    assert!(savings.savings > 0);
    assert!(savings.savings_percentage > 0.0);
}

#[test]
fn savings_can_go_negative() {
    let savings = compare_tokens("a much longer toon rendering of the value", "{}");
    assert!(savings.savings < 0);
}

#[test]
fn savings_percentage_is_zero_for_empty_json() {
    let savings = compare_tokens("something", "");
    assert_eq!(savings.json, 0);
    assert_eq!(savings.savings_percentage, 0.0);
}
