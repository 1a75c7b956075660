//! TOON decoder — converts TOON text back into a JSON value tree.
//!
//! Decoding is two-phase:
//!
//! 1. A **line scanner** turns the input into a sequence of non-blank lines,
//!    each carrying its 1-based line number, leading-space indent, and
//!    trimmed content.
//! 2. A **recursive-descent parser** walks that sequence, dispatching on the
//!    document root (`[` means array, anything else means object) and on
//!    each line's shape: `key:` (nested object), `key: value` (scalar), or
//!    `key[N<delim>]...` (array in inline, tabular, or list sub-form).
//!
//! Strict mode (the default) fails on malformed array headers, declared
//! element counts that the body does not honor, wrong indentation at a
//! structural boundary, and unterminated quoted strings. Lenient mode
//! tolerates these by best-effort truncation.
//!
//! Quote state and backslash escapes are respected both when splitting
//! delimited rows and when locating the key/value colon, so delimiters and
//! colons inside quoted strings never split a line.

use crate::error::{Result, ToonError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved dotted-key expansion mode. `Off` is the only implemented
/// behavior; the variant space exists for interface parity with the
/// encoder's option set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpandPaths {
    #[default]
    Off,
    Safe,
}

/// Options controlling TOON decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Spaces per nesting depth.
    pub indent: usize,
    /// Fail on structural errors instead of truncating.
    pub strict: bool,
    /// Dotted-key expansion mode (reserved).
    pub expand_paths: ExpandPaths,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            strict: true,
            expand_paths: ExpandPaths::Off,
        }
    }
}

/// Decode TOON text into a value tree with default (strict) options.
///
/// # Example
/// ```
/// use serde_json::json;
/// use toondb_core::decode;
///
/// let value = decode("name: Alice\nage: 30").unwrap();
/// assert_eq!(value, json!({"name":"Alice","age":30}));
/// ```
pub fn decode(input: &str) -> Result<Value> {
    decode_with(input, &DecodeOptions::default())
}

/// Decode TOON text into a value tree.
pub fn decode_with(input: &str, opts: &DecodeOptions) -> Result<Value> {
    let lines = scan_lines(input);
    let mut parser = Parser {
        lines,
        pos: 0,
        opts,
    };
    parser.parse_document()
}

/// One non-blank source line.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    indent: usize,
    content: &'a str,
}

/// Phase one: strip blank lines, record indent and position of the rest.
fn scan_lines(input: &str) -> Vec<Line<'_>> {
    input
        .lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let content = raw.trim();
            if content.is_empty() {
                return None;
            }
            let indent = raw.bytes().take_while(|b| *b == b' ').count();
            Some(Line {
                number: i + 1,
                indent,
                content,
            })
        })
        .collect()
}

/// Parsed array marker from a key or header: `name[len<delim>]{fields}`.
struct ArrayKey {
    name: String,
    len: usize,
    delimiter: char,
    fields: Option<Vec<String>>,
}

/// Phase two: recursive-descent structural parser.
struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    opts: &'a DecodeOptions,
}

impl<'a> Parser<'a> {
    fn parse_document(&mut self) -> Result<Value> {
        if self.lines.is_empty() {
            return Ok(Value::Null);
        }
        if self.lines[0].content.starts_with('[') {
            self.parse_root_array()
        } else {
            self.parse_object(0)
        }
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn err<T>(&self, line: usize, message: impl Into<String>) -> Result<T> {
        Err(ToonError::Parse {
            line,
            message: message.into(),
        })
    }

    /// Root array: the header line may carry a tabular field spec or inline
    /// values; otherwise the body follows as indented rows or list items.
    /// A malformed root header is an error in both modes.
    fn parse_root_array(&mut self) -> Result<Value> {
        let line = self.lines[0];
        let Some((header, inline)) = parse_array_header(line.content) else {
            return self.err(line.number, "invalid root array header");
        };
        self.pos = 1;

        if header.len == 0 {
            return Ok(Value::Array(Vec::new()));
        }
        if !inline.is_empty() {
            let values = self.parse_inline_values(inline, header.delimiter, line.number)?;
            return Ok(Value::Array(values));
        }
        if let Some(fields) = &header.fields {
            return self.parse_tabular_rows(header.len, header.delimiter, fields, self.opts.indent, line.number);
        }
        self.parse_list_items(header.len, self.opts.indent, line.number)
    }

    /// Parse sibling key-value lines at exactly `expected_indent` into an
    /// object. A shallower line ends the object; a deeper line here means
    /// some value parser did not claim it, which is an indentation error
    /// under strict mode.
    fn parse_object(&mut self, expected_indent: usize) -> Result<Value> {
        let mut map = Map::new();
        while let Some(line) = self.peek() {
            if line.indent < expected_indent {
                break;
            }
            if line.indent > expected_indent {
                if self.opts.strict {
                    return self.err(line.number, "unexpected indentation");
                }
                self.pos += 1;
                continue;
            }
            self.parse_entry(line.content, line.number, expected_indent, &mut map)?;
        }
        Ok(Value::Object(map))
    }

    /// Parse one `key...` construct whose text is `content` and whose line
    /// is the current one, inserting the resulting entry into `map`. Consumes
    /// the current line and any body lines the value claims (tabular rows,
    /// list items, nested object fields).
    ///
    /// `content` is normally the whole trimmed line, but for the first field
    /// of a list-item object it is the text after the `- ` marker.
    fn parse_entry(
        &mut self,
        content: &str,
        line_number: usize,
        base_indent: usize,
        map: &mut Map<String, Value>,
    ) -> Result<()> {
        let Some(colon) = find_unquoted_colon(content) else {
            if self.opts.strict {
                return self.err(line_number, format!("missing colon: {content}"));
            }
            self.pos += 1;
            return Ok(());
        };
        let key_part = content[..colon].trim();
        let value_part = content[colon + 1..].trim();

        // Array field: key[N<delim>]{fields}? with the body dispatched on
        // what follows the colon.
        if key_part.contains('[') {
            if let Some(ak) = parse_array_key(key_part) {
                self.pos += 1;
                let value = if ak.len == 0 {
                    Value::Array(Vec::new())
                } else if !value_part.is_empty() {
                    Value::Array(self.parse_inline_values(value_part, ak.delimiter, line_number)?)
                } else if let Some(fields) = &ak.fields {
                    self.parse_tabular_rows(ak.len, ak.delimiter, fields, base_indent + self.opts.indent, line_number)?
                } else {
                    self.parse_list_items(ak.len, base_indent + self.opts.indent, line_number)?
                };
                map.insert(ak.name, value);
                return Ok(());
            }
        }

        let key = parse_key(key_part);
        if value_part.is_empty() {
            // Nested object on the following deeper lines; empty object if
            // nothing deeper follows.
            self.pos += 1;
            let child = self.parse_object(base_indent + self.opts.indent)?;
            map.insert(key, child);
        } else {
            map.insert(key, self.parse_scalar(value_part, line_number)?);
            self.pos += 1;
        }
        Ok(())
    }

    /// Parse `len` tabular rows at exactly `expected_indent`, mapping each
    /// delimited cell to its header field. Strict mode enforces the declared
    /// row count, the row indent, and the per-row cell count.
    fn parse_tabular_rows(
        &mut self,
        len: usize,
        delimiter: char,
        fields: &[String],
        expected_indent: usize,
        header_line: usize,
    ) -> Result<Value> {
        let mut rows = Vec::new();
        for i in 0..len {
            let Some(line) = self.peek() else {
                if self.opts.strict {
                    return self.err(header_line, format!("array length mismatch: expected {len} rows, got {i}"));
                }
                break;
            };
            if line.indent != expected_indent {
                if self.opts.strict {
                    return self.err(line.number, "incorrect indentation");
                }
                break;
            }
            let cells = self.split_delimited(line.content, delimiter, line.number)?;
            if cells.len() != fields.len() && self.opts.strict {
                return self.err(
                    line.number,
                    format!("field count mismatch: expected {}, got {}", fields.len(), cells.len()),
                );
            }
            let mut obj = Map::new();
            for (field, cell) in fields.iter().zip(cells.iter()) {
                obj.insert(field.clone(), self.parse_scalar(cell, line.number)?);
            }
            rows.push(Value::Object(obj));
            self.pos += 1;
        }
        Ok(Value::Array(rows))
    }

    /// Parse up to `len` `- ` items at exactly `item_indent`. An item is a
    /// nested inline array, a nested list, an object (first field on the
    /// hyphen line, further fields on following lines at the hyphen's
    /// indent), a bare scalar, or a lone `-` (empty object). A shallower
    /// line ends the list early.
    fn parse_list_items(&mut self, len: usize, item_indent: usize, header_line: usize) -> Result<Value> {
        let mut items = Vec::new();
        while items.len() < len {
            let Some(line) = self.peek() else {
                if self.opts.strict {
                    return self.err(
                        header_line,
                        format!("array length mismatch: expected {len} items, got {}", items.len()),
                    );
                }
                break;
            };
            if line.indent < item_indent {
                break;
            }
            if line.indent > item_indent {
                if self.opts.strict {
                    return self.err(line.number, "incorrect indentation");
                }
                self.pos += 1;
                continue;
            }

            if line.content == "-" {
                items.push(Value::Object(Map::new()));
                self.pos += 1;
                continue;
            }
            if !line.content.starts_with("- ") {
                if self.opts.strict {
                    return self.err(line.number, format!("expected list item, found: {}", line.content));
                }
                break;
            }
            let body = &line.content[2..];

            // Nested array item: `- [N<delim>]: v1,v2` or `- [N<delim>]:`
            if body.starts_with('[') {
                if let Some((header, inline)) = parse_array_header(body) {
                    self.pos += 1;
                    let value = if header.len == 0 {
                        Value::Array(Vec::new())
                    } else if !inline.is_empty() {
                        Value::Array(self.parse_inline_values(inline, header.delimiter, line.number)?)
                    } else if let Some(fields) = &header.fields {
                        self.parse_tabular_rows(header.len, header.delimiter, fields, item_indent + self.opts.indent, line.number)?
                    } else {
                        self.parse_list_items(header.len, item_indent + self.opts.indent, line.number)?
                    };
                    items.push(value);
                    continue;
                }
            }

            // Object item: the hyphen line carries the first field.
            if find_unquoted_colon(body).is_some() {
                items.push(self.parse_list_item_object(body, line.number, item_indent)?);
                continue;
            }

            // Scalar item.
            items.push(self.parse_scalar(body, line.number)?);
            self.pos += 1;
        }
        Ok(Value::Array(items))
    }

    /// Parse an object that begins on a `- ` line. Sibling fields follow at
    /// the hyphen's own indent; the next `- ` (or a dedent) ends the item.
    fn parse_list_item_object(&mut self, first_field: &str, line_number: usize, item_indent: usize) -> Result<Value> {
        let mut map = Map::new();
        self.parse_entry(first_field, line_number, item_indent, &mut map)?;

        while let Some(line) = self.peek() {
            if line.indent != item_indent || line.content.starts_with("- ") || line.content == "-" {
                break;
            }
            if find_unquoted_colon(line.content).is_none() && !line.content.contains('[') {
                break;
            }
            self.parse_entry(line.content, line.number, item_indent, &mut map)?;
        }
        Ok(Value::Object(map))
    }

    /// Parse a line of delimiter-separated scalars.
    fn parse_inline_values(&self, s: &str, delimiter: char, line_number: usize) -> Result<Vec<Value>> {
        let parts = self.split_delimited(s, delimiter, line_number)?;
        parts
            .iter()
            .map(|part| self.parse_scalar(part, line_number))
            .collect()
    }

    /// Split on the delimiter, respecting quote state and backslash escapes.
    /// Escape sequences are preserved intact for [`Parser::parse_scalar`] to
    /// unescape exactly once. An empty trailing piece is dropped.
    fn split_delimited(&self, s: &str, delimiter: char, line_number: usize) -> Result<Vec<String>> {
        let mut parts = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut escaped = false;

        for ch in s.chars() {
            if escaped {
                current.push(ch);
                escaped = false;
                continue;
            }
            match ch {
                '\\' => {
                    current.push(ch);
                    escaped = true;
                }
                '"' => {
                    in_quotes = !in_quotes;
                    current.push(ch);
                }
                _ if ch == delimiter && !in_quotes => {
                    parts.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(ch),
            }
        }
        if in_quotes && self.opts.strict {
            return self.err(line_number, "unterminated quoted string");
        }
        if !current.trim().is_empty() {
            parts.push(current.trim().to_string());
        }
        Ok(parts)
    }

    /// Parse a scalar token. Inference order: `null` → bool → quoted string
    /// → integer → float → bare string, mirroring the encoder's quoting
    /// rules (anything ambiguous was quoted on the way out).
    fn parse_scalar(&self, s: &str, line_number: usize) -> Result<Value> {
        let s = s.trim();
        match s {
            "null" => return Ok(Value::Null),
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            _ => {}
        }
        if s.starts_with('"') {
            if s.len() >= 2 && s.ends_with('"') {
                return Ok(Value::String(unescape(&s[1..s.len() - 1])));
            }
            if self.opts.strict {
                return self.err(line_number, "unterminated quoted string");
            }
            return Ok(Value::String(s.to_string()));
        }
        if is_integer_literal(s) {
            if let Ok(n) = s.parse::<i64>() {
                return Ok(Value::Number(n.into()));
            }
        }
        if is_integer_literal(s) || is_float_literal(s) {
            if let Ok(f) = s.parse::<f64>() {
                if let Some(n) = serde_json::Number::from_f64(f) {
                    return Ok(Value::Number(n));
                }
            }
        }
        Ok(Value::String(s.to_string()))
    }
}

/// Parse a full array header line or list-item body:
/// `[len<delim>]{fields}?:` optionally followed by inline content.
/// Returns the header and the (possibly empty) inline remainder.
fn parse_array_header(content: &str) -> Option<(ArrayKey, &str)> {
    let colon = find_unquoted_colon(content)?;
    let key_part = content[..colon].trim_end();
    let ak = parse_array_key(key_part)?;
    if !ak.name.is_empty() {
        return None;
    }
    Some((ak, content[colon + 1..].trim()))
}

/// Parse `name[len<delim>]{fields}?` from the text before a colon. The name
/// may be empty (root and list-item headers) or quoted. Returns `None` when
/// the bracket region does not parse, in which case the caller treats the
/// whole text as an ordinary key.
fn parse_array_key(key_part: &str) -> Option<ArrayKey> {
    let open = key_part.find('[')?;
    let name = parse_key(key_part[..open].trim_end());

    let rest = &key_part[open + 1..];
    let close = rest.find(']')?;
    let inside = &rest[..close];
    let after = &rest[close + 1..];

    // Inside the brackets: digits, optionally followed by the delimiter mark.
    let digits_end = inside
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(inside.len());
    if digits_end == 0 {
        return None;
    }
    let len: usize = inside[..digits_end].parse().ok()?;
    let mark = &inside[digits_end..];
    let delimiter = match mark {
        "" => ',',
        _ => {
            let mut chars = mark.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            crate::encoder::Delimiter::from_char(ch)?.as_char()
        }
    };

    // Optional tabular field spec, which must run to the end of the key.
    let fields = if after.is_empty() {
        None
    } else if after.starts_with('{') && after.ends_with('}') {
        Some(split_fields(&after[1..after.len() - 1]))
    } else {
        return None;
    };

    Some(ArrayKey {
        name,
        len,
        delimiter,
        fields,
    })
}

/// Split a tabular `{...}` field list. The separator is sniffed from the
/// content: tab wins over pipe wins over comma.
fn split_fields(content: &str) -> Vec<String> {
    let sep = if content.contains('\t') {
        '\t'
    } else if content.contains('|') {
        '|'
    } else {
        ','
    };
    content.split(sep).map(|f| f.trim().to_string()).collect()
}

/// Strip and unescape a quoted key; return an unquoted key as-is.
fn parse_key(key: &str) -> String {
    if key.len() >= 2 && key.starts_with('"') && key.ends_with('"') {
        unescape(&key[1..key.len() - 1])
    } else {
        key.to_string()
    }
}

/// Byte offset of the first colon outside quotes, escape-aware.
fn find_unquoted_colon(s: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

/// Resolve `\\ \" \n \r \t` escape sequences; unknown escapes keep the
/// backslash.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// `-?digits`
fn is_integer_literal(s: &str) -> bool {
    let rest = s.strip_prefix('-').unwrap_or(s);
    !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit())
}

/// `-?digits.digits` or `-?digits(.digits)?[eE][+-]?digits`
fn is_float_literal(s: &str) -> bool {
    let rest = s.strip_prefix('-').unwrap_or(s);
    let bytes = rest.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i == 0 {
        return false;
    }
    let mut has_frac = false;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return false;
        }
        has_frac = true;
    }
    if i == bytes.len() {
        return has_frac;
    }
    if bytes[i] != b'e' && bytes[i] != b'E' {
        return false;
    }
    i += 1;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    i == bytes.len() && i > start
}
