//! Mutation-path parser.
//!
//! Parses the compact selector-path grammar used by update, insert and
//! delete operations:
//!
//! ```text
//! products[id==8].price        update the price of the product with id 8
//! store.products['Widget']     select products whose name is "Widget"
//! users[active==true].role     update the role of every active user
//! ```
//!
//! A path is dot-separated identifiers; one segment may carry a trailing
//! `[...]` selector. Inside the brackets, a bare quoted literal matches the
//! `name` field; otherwise `field op value` forms a comparison selector.
//!
//! Disambiguation: the final bare identifier after a selector becomes the
//! mutation's `target_field`. Without a selector every identifier is a path
//! segment — so a selector-free path has no target field and cannot address
//! a scalar property for update. That asymmetry is part of the grammar's
//! contract and is relied on by [`crate::mutate`].

use crate::error::PathError;
use serde::Serialize;
use serde_json::Value;

/// Parsed mutation path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathAst {
    /// Plain property segments, traversed in order.
    pub path: Vec<String>,
    /// Element predicate for the array reached by `path`, if any.
    pub selector: Option<Selector>,
    /// Field to mutate on the selected element(s), if any.
    pub target_field: Option<String>,
}

/// Element predicate inside `[...]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Selector {
    /// `['Widget']` — bare literal, matched against the `name` field.
    Field { field: String, value: Literal },
    /// `[price>=100]` — explicit field, operator and literal.
    Filter {
        field: String,
        #[serde(rename = "operator")]
        op: CompareOp,
        value: Literal,
    },
}

/// Comparison operators shared by selectors and query filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
        }
    }
}

/// Literal operand of a selector or filter: quoted string, `true`/`false`,
/// or a signed decimal number.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Literal {
    /// The literal as a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Str(s) => Value::String(s.clone()),
            Literal::Num(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Literal::Bool(b) => Value::Bool(*b),
        }
    }
}

/// Parse a mutation path string into a [`PathAst`].
///
/// # Errors
///
/// Returns a positional [`PathError`] on malformed selectors, unterminated
/// strings, or unknown operators.
pub fn parse_path(path: &str) -> Result<PathAst, PathError> {
    Cursor::new(path).parse()
}

/// Non-throwing validity probe for a mutation path.
pub fn validate_path(path: &str) -> Result<(), PathError> {
    parse_path(path).map(|_| ())
}

/// Character cursor over the trimmed input. Positions in errors are char
/// offsets into the trimmed string.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Self {
            chars: input.trim().chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<PathAst, PathError> {
        let mut ast = PathAst {
            path: Vec::new(),
            selector: None,
            target_field: None,
        };

        loop {
            self.skip_whitespace();
            let Some(ch) = self.current() else { break };

            if ch == '.' {
                self.pos += 1;
                continue;
            }
            if ch == '[' {
                ast.selector = Some(self.parse_selector()?);
                continue;
            }
            if is_ident_start(ch) {
                let ident = self.parse_identifier();
                self.skip_whitespace();
                if self.current().is_none() && ast.selector.is_some() {
                    // Trailing identifier after a selector: the mutation target.
                    ast.target_field = Some(ident);
                } else {
                    ast.path.push(ident);
                }
                continue;
            }
            return Err(PathError::UnexpectedChar {
                found: ch,
                position: self.pos,
            });
        }

        Ok(ast)
    }

    fn parse_selector(&mut self) -> Result<Selector, PathError> {
        self.pos += 1; // consume '['
        self.skip_whitespace();

        // Bare string literal: implicit match against the `name` field.
        if matches!(self.current(), Some('\'') | Some('"')) {
            let value = self.parse_string()?;
            self.skip_whitespace();
            self.expect(']')?;
            return Ok(Selector::Field {
                field: "name".to_string(),
                value: Literal::Str(value),
            });
        }

        let field = self.parse_identifier();
        if field.is_empty() {
            return Err(PathError::Expected {
                what: "field name".to_string(),
                position: self.pos,
            });
        }
        self.skip_whitespace();
        let op = self.parse_operator()?;
        self.skip_whitespace();
        let value = self.parse_literal()?;
        self.skip_whitespace();
        self.expect(']')?;

        Ok(Selector::Filter { field, op, value })
    }

    fn parse_literal(&mut self) -> Result<Literal, PathError> {
        match self.current() {
            Some('\'') | Some('"') => Ok(Literal::Str(self.parse_string()?)),
            Some('t') | Some('f') => self.parse_bool(),
            Some(c) if c.is_ascii_digit() || c == '-' => self.parse_number(),
            _ => Err(PathError::Expected {
                what: "value".to_string(),
                position: self.pos,
            }),
        }
    }

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.current(), Some(c) if is_ident_char(c)) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Single- or double-quoted string; a backslash makes the next
    /// character literal.
    fn parse_string(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        let quote = self.chars[self.pos];
        self.pos += 1;

        let mut value = String::new();
        loop {
            match self.current() {
                None => {
                    return Err(PathError::UnterminatedString { position: start });
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some('\\') if self.pos + 1 < self.chars.len() => {
                    self.pos += 1;
                    value.push(self.chars[self.pos]);
                    self.pos += 1;
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Literal, PathError> {
        let start = self.pos;
        if self.current() == Some('-') {
            self.pos += 1;
        }
        while matches!(self.current(), Some(c) if c.is_ascii_digit() || c == '.') {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Literal::Num)
            .map_err(|_| PathError::Expected {
                what: "number".to_string(),
                position: start,
            })
    }

    fn parse_bool(&mut self) -> Result<Literal, PathError> {
        if self.lookahead_is("true") {
            self.pos += 4;
            return Ok(Literal::Bool(true));
        }
        if self.lookahead_is("false") {
            self.pos += 5;
            return Ok(Literal::Bool(false));
        }
        Err(PathError::Expected {
            what: "boolean".to_string(),
            position: self.pos,
        })
    }

    fn parse_operator(&mut self) -> Result<CompareOp, PathError> {
        let position = self.pos;
        let first = self.current();
        let second = self.chars.get(self.pos + 1).copied();
        match (first, second) {
            (Some('='), Some('=')) => {
                self.pos += 2;
                Ok(CompareOp::Eq)
            }
            (Some('!'), Some('=')) => {
                self.pos += 2;
                Ok(CompareOp::Ne)
            }
            (Some('<'), Some('=')) => {
                self.pos += 2;
                Ok(CompareOp::Le)
            }
            (Some('>'), Some('=')) => {
                self.pos += 2;
                Ok(CompareOp::Ge)
            }
            (Some('<'), _) => {
                self.pos += 1;
                Ok(CompareOp::Lt)
            }
            (Some('>'), _) => {
                self.pos += 1;
                Ok(CompareOp::Gt)
            }
            _ => Err(PathError::InvalidOperator { position }),
        }
    }

    fn expect(&mut self, ch: char) -> Result<(), PathError> {
        if self.current() == Some(ch) {
            self.pos += 1;
            Ok(())
        } else {
            Err(PathError::Expected {
                what: format!("'{ch}'"),
                position: self.pos,
            })
        }
    }

    fn lookahead_is(&self, word: &str) -> bool {
        let end = self.pos + word.chars().count();
        if end > self.chars.len() {
            return false;
        }
        self.chars[self.pos..end].iter().collect::<String>() == word
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
