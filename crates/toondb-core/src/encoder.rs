//! TOON encoder — converts a JSON value tree into TOON text.
//!
//! TOON is a compact, human-readable format designed to minimize token usage
//! when feeding structured data to LLMs. Three encodings are chosen per array:
//!
//! - **Inline**: uniform primitive arrays as `key[N,]: v1,v2,v3`
//! - **Tabular**: uniform object arrays as `key[N,]{f1,f2}:` followed by one
//!   delimited row per element
//! - **List**: everything else as `key[N,]:` followed by one `- ` item per
//!   element, nested recursively
//!
//! The active delimiter is embedded inside the array header brackets, even
//! for the default comma. Strings are quoted only when the bare token would
//! be ambiguous (empty, keyword-like, numeric-looking, delimiter-bearing,
//! etc.), which is where most of the token savings come from.
//!
//! # Example
//! ```
//! use serde_json::json;
//! use toondb_core::encode;
//!
//! let value = json!({"name":"Alice","age":30,"tags":["rust","wasm"]});
//! assert_eq!(encode(&value), "name: Alice\nage: 30\ntags[2,]: rust,wasm");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field separator used within a single encoded document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    /// The literal separator character.
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// Map a separator character back to its delimiter, if it is one.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            ',' => Some(Delimiter::Comma),
            '\t' => Some(Delimiter::Tab),
            '|' => Some(Delimiter::Pipe),
            _ => None,
        }
    }
}

/// Options controlling TOON encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Spaces per nesting depth.
    pub indent: usize,
    /// Field separator for inline values, tabular headers and rows.
    pub delimiter: Delimiter,
    /// Uniform object arrays shorter than this encode as lists, not tables.
    pub min_tabular_rows: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            delimiter: Delimiter::Comma,
            min_tabular_rows: 2,
        }
    }
}

/// Encode a value tree into TOON text with default options.
///
/// Total over any tree: a root `null` encodes to empty text, everything else
/// to its TOON form. Never fails.
pub fn encode(value: &Value) -> String {
    encode_with(value, &EncodeOptions::default())
}

/// Encode a value tree into TOON text.
pub fn encode_with(value: &Value, opts: &EncodeOptions) -> String {
    let mut out = String::new();
    match value {
        Value::Null => {}
        Value::Object(map) => encode_object_fields(map, 0, opts, &mut out),
        Value::Array(arr) => encode_root_array(arr, opts, &mut out),
        other => encode_scalar(other, opts, &mut out),
    }
    out
}

/// Encode a root-level array. Inline and empty root arrays omit the
/// delimiter mark in the header; tabular and list roots embed it like any
/// nested array.
fn encode_root_array(arr: &[Value], opts: &EncodeOptions, out: &mut String) {
    if arr.is_empty() {
        out.push_str("[0]:");
        return;
    }
    if is_uniform_primitive(arr) {
        out.push_str(&format!("[{}]: ", arr.len()));
        encode_inline_values(arr, opts, out);
        return;
    }
    if let Some(fields) = tabular_fields(arr) {
        if arr.len() >= opts.min_tabular_rows {
            encode_tabular(arr, &fields, 0, opts, out);
            return;
        }
    }
    encode_list(arr, 0, opts, out);
}

/// Emit all key-value pairs of an object at the given depth, one per line.
fn encode_object_fields(map: &Map<String, Value>, depth: usize, opts: &EncodeOptions, out: &mut String) {
    let indent = make_indent(depth, opts);
    let mut first = true;
    for (key, value) in map {
        if !first {
            out.push('\n');
        }
        first = false;
        out.push_str(&indent);
        out.push_str(&encode_key(key));
        match value {
            Value::Object(child) if child.is_empty() => {
                out.push(':');
            }
            Value::Object(child) => {
                out.push_str(":\n");
                encode_object_fields(child, depth + 1, opts, out);
            }
            Value::Array(arr) => {
                encode_array_field(arr, depth, opts, out);
            }
            other => {
                out.push_str(": ");
                encode_scalar(other, opts, out);
            }
        }
    }
}

/// Encode an array field value, appended directly after its key:
///
/// 1. Empty: `[0]:`
/// 2. Inline: `[N,]: v1,v2` when every element is a primitive of one type
/// 3. Tabular: `[N,]{f1,f2}:` + rows when elements are same-shaped objects
///    with primitive values and the array clears `min_tabular_rows`
/// 4. List: `[N,]:` + `- ` items otherwise
fn encode_array_field(arr: &[Value], depth: usize, opts: &EncodeOptions, out: &mut String) {
    if arr.is_empty() {
        out.push_str("[0]:");
        return;
    }
    let d = opts.delimiter.as_char();
    if is_uniform_primitive(arr) {
        out.push_str(&format!("[{}{}]: ", arr.len(), d));
        encode_inline_values(arr, opts, out);
        return;
    }
    if let Some(fields) = tabular_fields(arr) {
        if arr.len() >= opts.min_tabular_rows {
            encode_tabular(arr, &fields, depth, opts, out);
            return;
        }
    }
    encode_list(arr, depth, opts, out);
}

/// Emit a tabular block: header with the field list, then one delimited row
/// per element at one extra indent level. Field order follows the first
/// element's keys.
fn encode_tabular(arr: &[Value], fields: &[String], depth: usize, opts: &EncodeOptions, out: &mut String) {
    let d = opts.delimiter.as_char();
    let joined = fields.join(&d.to_string());
    out.push_str(&format!("[{}{}]{{{}}}:", arr.len(), d, joined));

    let row_indent = make_indent(depth + 1, opts);
    for element in arr {
        out.push('\n');
        out.push_str(&row_indent);
        if let Value::Object(map) = element {
            for (i, field) in fields.iter().enumerate() {
                if i > 0 {
                    out.push(d);
                }
                match map.get(field) {
                    Some(v) => encode_scalar(v, opts, out),
                    None => out.push_str("null"),
                }
            }
        }
    }
}

/// Emit a list block: header, then one `- ` item per element at one extra
/// indent level. Object items put their first field on the hyphen line with
/// the remaining fields at the hyphen's indent; array items are inline or a
/// nested list; a bare `-` marks an empty object.
fn encode_list(arr: &[Value], depth: usize, opts: &EncodeOptions, out: &mut String) {
    let d = opts.delimiter.as_char();
    out.push_str(&format!("[{}{}]:", arr.len(), d));
    let item_indent = make_indent(depth + 1, opts);

    for item in arr {
        out.push('\n');
        out.push_str(&item_indent);
        match item {
            Value::Object(map) if map.is_empty() => {
                out.push('-');
            }
            Value::Object(map) => {
                out.push_str("- ");
                let mut rendered = String::new();
                encode_object_fields(map, depth + 1, opts, &mut rendered);
                let mut lines = rendered.lines();
                if let Some(first) = lines.next() {
                    out.push_str(first.trim_start());
                }
                for line in lines {
                    out.push('\n');
                    out.push_str(line);
                }
            }
            Value::Array(inner) => {
                out.push_str("- ");
                if inner.is_empty() {
                    out.push_str("[0]:");
                } else if is_uniform_primitive(inner) {
                    out.push_str(&format!("[{}{}]: ", inner.len(), d));
                    encode_inline_values(inner, opts, out);
                } else {
                    encode_list(inner, depth + 1, opts, out);
                }
            }
            other => {
                out.push_str("- ");
                encode_scalar(other, opts, out);
            }
        }
    }
}

/// Emit delimiter-separated scalar values on one line.
fn encode_inline_values(arr: &[Value], opts: &EncodeOptions, out: &mut String) {
    let d = opts.delimiter.as_char();
    for (i, val) in arr.iter().enumerate() {
        if i > 0 {
            out.push(d);
        }
        encode_scalar(val, opts, out);
    }
}

/// Emit a scalar value (null, bool, number, string) in TOON form.
fn encode_scalar(value: &Value, opts: &EncodeOptions, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(n)),
        Value::String(s) => {
            if needs_quoting(s, opts.delimiter) {
                push_quoted(s, out);
            } else {
                out.push_str(s);
            }
        }
        // Composite values never reach scalar position: array classing
        // routes them to tabular/list forms first.
        _ => out.push_str("null"),
    }
}

/// Format a number: integers as-is, whole floats collapsed to integers,
/// negative zero normalized to 0.
pub(crate) fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    if let Some(f) = n.as_f64() {
        if f == 0.0 {
            return "0".to_string();
        }
        if f.fract() == 0.0 && f.abs() < (i64::MAX as f64) {
            return (f as i64).to_string();
        }
        return format!("{}", f);
    }
    "null".to_string()
}

/// Decide whether a string value must be quoted to survive a round trip.
///
/// Quoting is required when the bare token would decode as something else
/// (empty, `null`/`true`/`false`, numeric-looking), would confuse the line
/// or row tokenizers (active delimiter, quote, backslash, CR/LF,
/// leading/trailing space), or would be mistaken for structure (leading
/// `[` or `{`).
fn needs_quoting(s: &str, delimiter: Delimiter) -> bool {
    if s.is_empty() {
        return true;
    }
    if s == "null" || s == "true" || s == "false" {
        return true;
    }
    if looks_numeric(s) {
        return true;
    }
    if s.contains(delimiter.as_char()) {
        return true;
    }
    if s.contains('\n') || s.contains('\r') {
        return true;
    }
    if s.contains('"') || s.contains('\\') {
        return true;
    }
    if s.starts_with(' ') || s.ends_with(' ') {
        return true;
    }
    if s.starts_with('[') || s.starts_with('{') {
        return true;
    }
    false
}

/// Match the decoder's number shapes: `-?digits(.digits)?([eE][+-]?digits)?`.
fn looks_numeric(s: &str) -> bool {
    let rest = s.strip_prefix('-').unwrap_or(s);
    let bytes = rest.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_digit() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

/// Push a quoted, escaped string.
fn push_quoted(s: &str, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// Encode an object key: bare when it matches `[a-zA-Z_][a-zA-Z0-9_]*`,
/// quoted otherwise.
fn encode_key(key: &str) -> String {
    if is_bare_key(key) {
        return key.to_string();
    }
    let mut out = String::with_capacity(key.len() + 2);
    push_quoted(key, &mut out);
    out
}

fn is_bare_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True when every element is a primitive of the same type. Nulls and
/// composites disqualify the array from inline form.
fn is_uniform_primitive(arr: &[Value]) -> bool {
    fn kind(v: &Value) -> Option<u8> {
        match v {
            Value::String(_) => Some(0),
            Value::Number(_) => Some(1),
            Value::Bool(_) => Some(2),
            _ => None,
        }
    }
    let Some(first) = arr.first().and_then(kind) else {
        return false;
    };
    arr.iter().all(|v| kind(v) == Some(first))
}

/// Tabular eligibility: every element is an object, key sets are identical
/// (irrespective of order), and every field value is primitive. Returns the
/// header field list in the first element's key order.
fn tabular_fields(arr: &[Value]) -> Option<Vec<String>> {
    let first = arr.first()?.as_object()?;
    if first.is_empty() {
        return None;
    }
    let fields: Vec<String> = first.keys().cloned().collect();
    let mut sorted: Vec<&String> = first.keys().collect();
    sorted.sort();

    for element in arr {
        let obj = element.as_object()?;
        if obj.len() != fields.len() {
            return None;
        }
        let mut keys: Vec<&String> = obj.keys().collect();
        keys.sort();
        if keys != sorted {
            return None;
        }
        if obj.values().any(|v| v.is_object() || v.is_array()) {
            return None;
        }
    }
    Some(fields)
}

fn make_indent(depth: usize, opts: &EncodeOptions) -> String {
    " ".repeat(depth * opts.indent)
}
