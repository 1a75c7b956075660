use serde_json::json;
use toondb_core::{encode, encode_with, Delimiter, EncodeOptions};

fn opts(delimiter: Delimiter) -> EncodeOptions {
    EncodeOptions {
        delimiter,
        ..EncodeOptions::default()
    }
}

// ============================================================================
// Root-Level Values
// ============================================================================

#[test]
fn encode_root_null_is_empty() {
    assert_eq!(encode(&json!(null)), "");
}

#[test]
fn encode_root_empty_object_is_empty() {
    assert_eq!(encode(&json!({})), "");
}

#[test]
fn encode_root_scalar_string() {
    assert_eq!(encode(&json!("hello")), "hello");
}

#[test]
fn encode_root_scalar_number() {
    assert_eq!(encode(&json!(42)), "42");
}

#[test]
fn encode_root_scalar_bool() {
    assert_eq!(encode(&json!(true)), "true");
}

#[test]
fn encode_root_empty_array() {
    assert_eq!(encode(&json!([])), "[0]:");
}

#[test]
fn encode_root_inline_array_omits_delimiter_mark() {
    assert_eq!(encode(&json!([1, 2, 3])), "[3]: 1,2,3");
}

#[test]
fn encode_root_tabular_array_embeds_delimiter_mark() {
    // The delimiter character sits inside the brackets even for the
    // default comma.
    let value = json!([{"id":1,"name":"Alice"},{"id":2,"name":"Bob"}]);
    assert_eq!(encode(&value), "[2,]{id,name}:\n  1,Alice\n  2,Bob");
}

#[test]
fn encode_root_mixed_array_is_list() {
    assert_eq!(encode(&json!([1, "a"])), "[2,]:\n  - 1\n  - a");
}

// ============================================================================
// Flat Objects
// ============================================================================

#[test]
fn encode_flat_object() {
    let value = json!({"name":"Alice","age":30,"active":true});
    assert_eq!(encode(&value), "name: Alice\nage: 30\nactive: true");
}

#[test]
fn encode_object_null_field() {
    assert_eq!(encode(&json!({"email":null})), "email: null");
}

#[test]
fn encode_object_preserves_key_order() {
    let value = json!({"z":1,"a":2,"m":3});
    assert_eq!(encode(&value), "z: 1\na: 2\nm: 3");
}

#[test]
fn encode_empty_object_field() {
    assert_eq!(encode(&json!({"meta":{}})), "meta:");
}

// ============================================================================
// Nested Objects
// ============================================================================

#[test]
fn encode_nested_object() {
    let value = json!({"user":{"name":"Alice","address":{"city":"Springfield"}}});
    assert_eq!(
        encode(&value),
        "user:\n  name: Alice\n  address:\n    city: Springfield"
    );
}

#[test]
fn encode_nested_object_custom_indent() {
    let value = json!({"user":{"name":"Alice"}});
    let options = EncodeOptions {
        indent: 4,
        ..EncodeOptions::default()
    };
    assert_eq!(encode_with(&value, &options), "user:\n    name: Alice");
}

// ============================================================================
// Inline Arrays (uniform primitives)
// ============================================================================

#[test]
fn encode_inline_string_array() {
    assert_eq!(encode(&json!({"tags":["rust","wasm"]})), "tags[2,]: rust,wasm");
}

#[test]
fn encode_inline_number_array() {
    assert_eq!(encode(&json!({"scores":[95,87,92]})), "scores[3,]: 95,87,92");
}

#[test]
fn encode_inline_bool_array() {
    assert_eq!(encode(&json!({"flags":[true,false]})), "flags[2,]: true,false");
}

#[test]
fn encode_empty_array_field() {
    assert_eq!(encode(&json!({"items":[]})), "items[0]:");
}

#[test]
fn encode_mixed_primitive_types_fall_back_to_list() {
    // Same-type elements are required for the inline form.
    assert_eq!(encode(&json!({"xs":[1,"a"]})), "xs[2,]:\n  - 1\n  - a");
}

#[test]
fn encode_array_with_null_falls_back_to_list() {
    assert_eq!(encode(&json!({"xs":[1,null]})), "xs[2,]:\n  - 1\n  - null");
}

// ============================================================================
// Tabular Arrays
// ============================================================================

#[test]
fn encode_tabular_basic() {
    let value = json!({"products":[
        {"id":1,"name":"Keyboard","price":89},
        {"id":2,"name":"Mouse","price":25}
    ]});
    assert_eq!(
        encode(&value),
        "products[2,]{id,name,price}:\n  1,Keyboard,89\n  2,Mouse,25"
    );
}

#[test]
fn encode_tabular_field_order_follows_first_element() {
    let value = json!({"rows":[{"a":1,"b":2},{"b":4,"a":3}]});
    assert_eq!(encode(&value), "rows[2,]{a,b}:\n  1,2\n  3,4");
}

#[test]
fn encode_tabular_with_null_cell() {
    let value = json!({"rows":[{"a":1,"b":null},{"a":2,"b":3}]});
    assert_eq!(encode(&value), "rows[2,]{a,b}:\n  1,null\n  2,3");
}

#[test]
fn encode_tabular_nested_depth_indents_rows() {
    let value = json!({"store":{"rows":[{"a":1},{"a":2}]}});
    assert_eq!(encode(&value), "store:\n  rows[2,]{a}:\n    1\n    2");
}

#[test]
fn encode_below_min_tabular_rows_is_list() {
    let value = json!({"items":[{"id":1}]});
    assert_eq!(encode(&value), "items[1,]:\n  - id: 1");
}

#[test]
fn encode_min_tabular_rows_one_forces_table() {
    let value = json!({"items":[{"id":1}]});
    let options = EncodeOptions {
        min_tabular_rows: 1,
        ..EncodeOptions::default()
    };
    assert_eq!(encode_with(&value, &options), "items[1,]{id}:\n  1");
}

#[test]
fn encode_differing_key_sets_fall_back_to_list() {
    let value = json!({"items":[{"id":1,"name":"x"},{"id":2}]});
    assert_eq!(
        encode(&value),
        "items[2,]:\n  - id: 1\n  name: x\n  - id: 2"
    );
}

#[test]
fn encode_composite_field_values_fall_back_to_list() {
    let value = json!({"items":[{"id":1,"meta":{"a":1}},{"id":2,"meta":{"a":2}}]});
    assert_eq!(
        encode(&value),
        "items[2,]:\n  - id: 1\n  meta:\n    a: 1\n  - id: 2\n  meta:\n    a: 2"
    );
}

// ============================================================================
// List Arrays
// ============================================================================

#[test]
fn encode_list_of_scalars() {
    assert_eq!(encode(&json!({"xs":[1,"a",true]})), "xs[3,]:\n  - 1\n  - a\n  - true");
}

#[test]
fn encode_list_object_item_first_field_on_hyphen_line() {
    let value = json!({"items":[{"id":1,"name":"Widget"},"x"]});
    assert_eq!(
        encode(&value),
        "items[2,]:\n  - id: 1\n  name: Widget\n  - x"
    );
}

#[test]
fn encode_list_item_with_nested_object() {
    let value = json!({"items":[{"addr":{"city":"Berlin"}},5]});
    assert_eq!(
        encode(&value),
        "items[2,]:\n  - addr:\n    city: Berlin\n  - 5"
    );
}

#[test]
fn encode_list_item_nested_inline_array() {
    let value = json!({"grid":[[1,2],[3,4],"x"]});
    assert_eq!(
        encode(&value),
        "grid[3,]:\n  - [2,]: 1,2\n  - [2,]: 3,4\n  - x"
    );
}

#[test]
fn encode_list_item_nested_list_array() {
    let value = json!({"grid":[[1,"a"],5]});
    assert_eq!(
        encode(&value),
        "grid[2,]:\n  - [2,]:\n    - 1\n    - a\n  - 5"
    );
}

#[test]
fn encode_list_item_empty_object_is_bare_hyphen() {
    assert_eq!(encode(&json!({"xs":[{},1]})), "xs[2,]:\n  -\n  - 1");
}

// ============================================================================
// Delimiters
// ============================================================================

#[test]
fn encode_pipe_delimiter() {
    let value = json!({"tags":["a","b"]});
    assert_eq!(encode_with(&value, &opts(Delimiter::Pipe)), "tags[2|]: a|b");
}

#[test]
fn encode_tab_delimiter() {
    let value = json!({"tags":["a","b"]});
    assert_eq!(encode_with(&value, &opts(Delimiter::Tab)), "tags[2\t]: a\tb");
}

#[test]
fn encode_tabular_pipe_delimiter() {
    let value = json!({"rows":[{"a":1,"b":2},{"a":3,"b":4}]});
    assert_eq!(
        encode_with(&value, &opts(Delimiter::Pipe)),
        "rows[2|]{a|b}:\n  1|2\n  3|4"
    );
}

#[test]
fn encode_quotes_active_delimiter_only() {
    // A comma is harmless under the pipe delimiter, and vice versa.
    let value = json!({"tags":["a,b","c"]});
    assert_eq!(
        encode_with(&value, &opts(Delimiter::Pipe)),
        "tags[2|]: a,b|c"
    );
    assert_eq!(encode(&value), "tags[2,]: \"a,b\",c");
}

// ============================================================================
// String Quoting
// ============================================================================

#[test]
fn quote_empty_string() {
    assert_eq!(encode(&json!({"s":""})), "s: \"\"");
}

#[test]
fn quote_keyword_lookalikes() {
    assert_eq!(encode(&json!({"a":"null","b":"true","c":"false"})),
        "a: \"null\"\nb: \"true\"\nc: \"false\"");
}

#[test]
fn quote_numeric_lookalikes() {
    assert_eq!(encode(&json!({"a":"42","b":"3.14","c":"-7","d":"1e3"})),
        "a: \"42\"\nb: \"3.14\"\nc: \"-7\"\nd: \"1e3\"");
}

#[test]
fn leading_zero_strings_are_quoted() {
    assert_eq!(encode(&json!({"zip":"05401"})), "zip: \"05401\"");
}

#[test]
fn quote_leading_trailing_spaces() {
    assert_eq!(encode(&json!({"s":" x "})), "s: \" x \"");
}

#[test]
fn quote_structural_lead_characters() {
    assert_eq!(encode(&json!({"a":"[x]","b":"{y}"})), "a: \"[x]\"\nb: \"{y}\"");
}

#[test]
fn quote_and_escape_control_characters() {
    assert_eq!(encode(&json!({"s":"line1\nline2"})), "s: \"line1\\nline2\"");
    assert_eq!(encode(&json!({"s":"a\"b"})), "s: \"a\\\"b\"");
    assert_eq!(encode(&json!({"s":"a\\b"})), "s: \"a\\\\b\"");
}

#[test]
fn colon_in_value_is_not_quoted() {
    // The key/value split happens at the first unquoted colon, so values
    // keep bare colons.
    assert_eq!(encode(&json!({"time":"12:30"})), "time: 12:30");
}

#[test]
fn plain_strings_stay_bare() {
    assert_eq!(encode(&json!({"s":"hello world"})), "s: hello world");
}

// ============================================================================
// Key Quoting
// ============================================================================

#[test]
fn identifier_keys_stay_bare() {
    assert_eq!(encode(&json!({"snake_case_1":1})), "snake_case_1: 1");
}

#[test]
fn non_identifier_keys_are_quoted() {
    assert_eq!(encode(&json!({"my key":1})), "\"my key\": 1");
    assert_eq!(encode(&json!({"0":1})), "\"0\": 1");
    assert_eq!(encode(&json!({"a.b":1})), "\"a.b\": 1");
}

// ============================================================================
// Number Formatting
// ============================================================================

#[test]
fn integers_format_plainly() {
    assert_eq!(encode(&json!({"n":-17})), "n: -17");
}

#[test]
fn whole_floats_collapse_to_integers() {
    assert_eq!(encode(&json!({"n":10.0})), "n: 10");
}

#[test]
fn negative_zero_normalizes() {
    assert_eq!(encode(&json!({"n":-0.0})), "n: 0");
}

#[test]
fn fractional_floats_keep_their_digits() {
    assert_eq!(encode(&json!({"n":3.14})), "n: 3.14");
}
