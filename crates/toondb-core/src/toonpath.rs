//! TOONPath query parser — tokenizer and AST builder.
//!
//! TOONPath is the read-side query language:
//!
//! ```text
//! products                                  whole collection
//! products.price>20 and stock>0             filter
//! products.name,price                       field projection
//! products.status=='active'.name,price      filter then projection
//! products.category in ['a','b']            membership filter
//! products.price>20 sort:price:desc limit:5 sort + limit
//! ```
//!
//! Parsing runs in two stages: a tokenizer over the raw string, then a
//! recursive-descent pass over the token list. The path/filter/projection
//! boundary is decided with one token of lookahead and a one-token
//! backtrack: after a `.`, an identifier followed by an operator (or `in`)
//! is a filter, and an identifier followed by a comma, keyword or
//! end-of-input is a field list — in both cases the dot is handed back.
//!
//! `and`/`or` have equal precedence and fold left to right; comparisons
//! bind tighter.

use crate::error::PathError;
use crate::path::{CompareOp, Literal};
use serde::Serialize;

/// Parsed TOONPath query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAst {
    pub path: Vec<String>,
    pub filters: Option<FilterExpr>,
    pub fields: Option<Vec<String>>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
}

/// Filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterExpr {
    /// `price > 20`
    Comparison {
        field: String,
        #[serde(rename = "operator")]
        op: CompareOp,
        value: Literal,
    },
    /// `<left> and <right>` / `<left> or <right>`
    Logical {
        #[serde(rename = "operator")]
        op: LogicalOp,
        left: Box<FilterExpr>,
        right: Box<FilterExpr>,
    },
    /// `category in ['a','b']`
    In { field: String, values: Vec<Literal> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOp {
    And,
    Or,
}

/// `sort:<field>[:asc|desc]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Shape summary of a query, as reported by [`analyze_toonpath`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryInfo {
    pub path: Vec<String>,
    pub has_filters: bool,
    pub has_fields: bool,
    pub has_sort: bool,
    pub has_limit: bool,
}

/// Parse a TOONPath query string into a [`QueryAst`].
///
/// # Errors
///
/// Returns a positional [`PathError`] on malformed input.
pub fn parse_toonpath(query: &str) -> Result<QueryAst, PathError> {
    let tokens = tokenize(query.trim())?;
    TokenStream { tokens, idx: 0 }.parse_query()
}

/// Non-throwing validity probe for a TOONPath query.
pub fn validate_toonpath(query: &str) -> Result<(), PathError> {
    parse_toonpath(query).map(|_| ())
}

/// Parse a query and report which clauses it uses.
pub fn analyze_toonpath(query: &str) -> Result<QueryInfo, PathError> {
    let ast = parse_toonpath(query)?;
    Ok(QueryInfo {
        has_filters: ast.filters.is_some(),
        has_fields: ast.fields.is_some(),
        has_sort: ast.sort.is_some(),
        has_limit: ast.limit.is_some(),
        path: ast.path,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tokenizer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Identifier,
    Keyword,
    Str,
    Number,
    Bool,
    Operator,
    Dot,
    Comma,
    LBracket,
    RBracket,
    Colon,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    text: String,
    pos: usize,
}

const KEYWORDS: [&str; 5] = ["and", "or", "in", "sort", "limit"];

fn tokenize(input: &str) -> Result<Vec<Token>, PathError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];

        if ch.is_whitespace() {
            pos += 1;
            continue;
        }

        if ch == '\'' || ch == '"' {
            let start = pos;
            pos += 1;
            let mut value = String::new();
            loop {
                match chars.get(pos) {
                    None => return Err(PathError::UnterminatedString { position: start }),
                    Some(&c) if c == ch => {
                        pos += 1;
                        break;
                    }
                    Some('\\') if pos + 1 < chars.len() => {
                        value.push(chars[pos + 1]);
                        pos += 2;
                    }
                    Some(&c) => {
                        value.push(c);
                        pos += 1;
                    }
                }
            }
            tokens.push(Token {
                kind: TokenKind::Str,
                text: value,
                pos: start,
            });
            continue;
        }

        let next_digit = matches!(chars.get(pos + 1), Some(c) if c.is_ascii_digit());
        if ch.is_ascii_digit() || (ch == '-' && next_digit) {
            let start = pos;
            let mut text = String::new();
            if ch == '-' {
                text.push('-');
                pos += 1;
            }
            while matches!(chars.get(pos), Some(c) if c.is_ascii_digit() || *c == '.') {
                text.push(chars[pos]);
                pos += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                text,
                pos: start,
            });
            continue;
        }

        if matches!(ch, '=' | '!' | '<' | '>') {
            let start = pos;
            if chars.get(pos + 1) == Some(&'=') {
                tokens.push(Token {
                    kind: TokenKind::Operator,
                    text: format!("{ch}="),
                    pos: start,
                });
                pos += 2;
            } else if ch == '<' || ch == '>' {
                tokens.push(Token {
                    kind: TokenKind::Operator,
                    text: ch.to_string(),
                    pos: start,
                });
                pos += 1;
            } else {
                return Err(PathError::InvalidOperator { position: start });
            }
            continue;
        }

        if let Some(kind) = match ch {
            '.' => Some(TokenKind::Dot),
            ',' => Some(TokenKind::Comma),
            '[' => Some(TokenKind::LBracket),
            ']' => Some(TokenKind::RBracket),
            ':' => Some(TokenKind::Colon),
            _ => None,
        } {
            tokens.push(Token {
                kind,
                text: ch.to_string(),
                pos,
            });
            pos += 1;
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let start = pos;
            let mut text = String::new();
            while matches!(chars.get(pos), Some(c) if c.is_ascii_alphanumeric() || *c == '_') {
                text.push(chars[pos]);
                pos += 1;
            }
            let kind = if text == "true" || text == "false" {
                TokenKind::Bool
            } else if KEYWORDS.contains(&text.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token {
                kind,
                text,
                pos: start,
            });
            continue;
        }

        return Err(PathError::UnexpectedChar {
            found: ch,
            position: pos,
        });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        pos,
    });
    Ok(tokens)
}

// ────────────────────────────────────────────────────────────────────────────
// Parser
// ────────────────────────────────────────────────────────────────────────────

struct TokenStream {
    tokens: Vec<Token>,
    idx: usize,
}

impl TokenStream {
    fn parse_query(mut self) -> Result<QueryAst, PathError> {
        let mut ast = QueryAst {
            path: self.parse_path()?,
            filters: None,
            fields: None,
            sort: None,
            limit: None,
        };

        // Filter clause: `.ident <op> ...` or `.ident in [...]` after the path.
        if self.current().kind == TokenKind::Dot {
            if self.peek(1).kind == TokenKind::Identifier {
                let after = self.peek(2);
                if after.kind == TokenKind::Operator || after.text == "in" {
                    self.advance();
                    ast.filters = Some(self.parse_filter_expr()?);
                }
            }
        } else if self.current().kind == TokenKind::Operator {
            ast.filters = Some(self.parse_filter_expr()?);
        }

        // Projection clause: `.field,field,...`
        if self.current().kind == TokenKind::Dot {
            self.advance();
            ast.fields = Some(self.parse_fields()?);
        }

        if self.current_is_keyword("sort") {
            ast.sort = Some(self.parse_sort()?);
        }
        if self.current_is_keyword("limit") {
            ast.limit = Some(self.parse_limit()?);
        }

        Ok(ast)
    }

    /// Consume the dotted path, stopping (and handing the dot back) as soon
    /// as the identifier after a dot looks like a filter field or the start
    /// of a projection list.
    fn parse_path(&mut self) -> Result<Vec<String>, PathError> {
        let mut path = Vec::new();

        if self.current().kind != TokenKind::Identifier {
            return Err(PathError::Expected {
                what: "path identifier".to_string(),
                position: self.current().pos,
            });
        }
        path.push(self.current().text.clone());
        self.advance();

        while self.current().kind == TokenKind::Dot {
            self.advance();
            if self.current().kind != TokenKind::Identifier {
                break;
            }
            let next = self.peek(1);
            if next.kind == TokenKind::Operator
                || next.kind == TokenKind::Comma
                || next.kind == TokenKind::Keyword
                || next.kind == TokenKind::Eof
            {
                // Filter or projection: back up onto the dot.
                self.idx -= 1;
                break;
            }
            path.push(self.current().text.clone());
            self.advance();
        }

        Ok(path)
    }

    /// `comparison (and|or comparison)*`, folded left with equal precedence.
    fn parse_filter_expr(&mut self) -> Result<FilterExpr, PathError> {
        let mut left = self.parse_comparison()?;

        while self.current().kind == TokenKind::Keyword
            && (self.current().text == "and" || self.current().text == "or")
        {
            let op = if self.current().text == "and" {
                LogicalOp::And
            } else {
                LogicalOp::Or
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = FilterExpr::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<FilterExpr, PathError> {
        if self.current().kind != TokenKind::Identifier {
            return Err(PathError::Expected {
                what: "field name".to_string(),
                position: self.current().pos,
            });
        }
        let field = self.current().text.clone();
        self.advance();

        if self.current_is_keyword("in") {
            self.advance();
            return self.parse_in_filter(field);
        }

        if self.current().kind != TokenKind::Operator {
            return Err(PathError::Expected {
                what: "operator".to_string(),
                position: self.current().pos,
            });
        }
        let op = parse_compare_op(self.current())?;
        self.advance();

        let value = self.parse_value()?;
        Ok(FilterExpr::Comparison { field, op, value })
    }

    fn parse_in_filter(&mut self, field: String) -> Result<FilterExpr, PathError> {
        if self.current().kind != TokenKind::LBracket {
            return Err(PathError::Expected {
                what: "'[' after 'in'".to_string(),
                position: self.current().pos,
            });
        }
        self.advance();

        let mut values = Vec::new();
        while self.current().kind != TokenKind::RBracket {
            values.push(self.parse_value()?);
            if self.current().kind == TokenKind::Comma {
                self.advance();
            } else if self.current().kind != TokenKind::RBracket {
                return Err(PathError::Expected {
                    what: "',' or ']'".to_string(),
                    position: self.current().pos,
                });
            }
        }
        self.advance();

        Ok(FilterExpr::In { field, values })
    }

    fn parse_value(&mut self) -> Result<Literal, PathError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Str => {
                self.advance();
                Ok(Literal::Str(token.text))
            }
            TokenKind::Number => {
                self.advance();
                token
                    .text
                    .parse::<f64>()
                    .map(Literal::Num)
                    .map_err(|_| PathError::Expected {
                        what: "number".to_string(),
                        position: token.pos,
                    })
            }
            TokenKind::Bool => {
                self.advance();
                Ok(Literal::Bool(token.text == "true"))
            }
            _ => Err(PathError::Expected {
                what: "value".to_string(),
                position: token.pos,
            }),
        }
    }

    fn parse_fields(&mut self) -> Result<Vec<String>, PathError> {
        let mut fields = Vec::new();

        if self.current().kind != TokenKind::Identifier {
            return Err(PathError::Expected {
                what: "field name".to_string(),
                position: self.current().pos,
            });
        }
        fields.push(self.current().text.clone());
        self.advance();

        while self.current().kind == TokenKind::Comma {
            self.advance();
            if self.current().kind != TokenKind::Identifier {
                return Err(PathError::Expected {
                    what: "field name".to_string(),
                    position: self.current().pos,
                });
            }
            fields.push(self.current().text.clone());
            self.advance();
        }

        Ok(fields)
    }

    fn parse_sort(&mut self) -> Result<SortSpec, PathError> {
        self.advance(); // 'sort'
        self.expect_colon("':' after 'sort'")?;

        if self.current().kind != TokenKind::Identifier {
            return Err(PathError::Expected {
                what: "field name".to_string(),
                position: self.current().pos,
            });
        }
        let field = self.current().text.clone();
        self.advance();

        let mut order = SortOrder::Asc;
        if self.current().kind == TokenKind::Colon {
            self.advance();
            let token = self.current().clone();
            if token.kind != TokenKind::Identifier {
                return Err(PathError::Expected {
                    what: "'asc' or 'desc'".to_string(),
                    position: token.pos,
                });
            }
            order = match token.text.as_str() {
                "asc" => SortOrder::Asc,
                "desc" => SortOrder::Desc,
                _ => {
                    return Err(PathError::InvalidSortOrder {
                        order: token.text,
                        position: token.pos,
                    });
                }
            };
            self.advance();
        }

        Ok(SortSpec { field, order })
    }

    fn parse_limit(&mut self) -> Result<usize, PathError> {
        self.advance(); // 'limit'
        self.expect_colon("':' after 'limit'")?;

        let token = self.current().clone();
        if token.kind != TokenKind::Number {
            return Err(PathError::Expected {
                what: "number".to_string(),
                position: token.pos,
            });
        }
        let limit = token.text.parse::<usize>().map_err(|_| PathError::Expected {
            what: "non-negative integer".to_string(),
            position: token.pos,
        })?;
        self.advance();
        Ok(limit)
    }

    fn expect_colon(&mut self, what: &str) -> Result<(), PathError> {
        if self.current().kind != TokenKind::Colon {
            return Err(PathError::Expected {
                what: what.to_string(),
                position: self.current().pos,
            });
        }
        self.advance();
        Ok(())
    }

    fn current(&self) -> &Token {
        &self.tokens[self.idx.min(self.tokens.len() - 1)]
    }

    fn current_is_keyword(&self, word: &str) -> bool {
        self.current().kind == TokenKind::Keyword && self.current().text == word
    }

    fn peek(&self, offset: usize) -> &Token {
        let i = (self.idx + offset).min(self.tokens.len() - 1);
        &self.tokens[i]
    }

    fn advance(&mut self) {
        if self.idx < self.tokens.len() - 1 {
            self.idx += 1;
        }
    }
}

fn parse_compare_op(token: &Token) -> Result<CompareOp, PathError> {
    match token.text.as_str() {
        "==" => Ok(CompareOp::Eq),
        "!=" => Ok(CompareOp::Ne),
        "<" => Ok(CompareOp::Lt),
        ">" => Ok(CompareOp::Gt),
        "<=" => Ok(CompareOp::Le),
        ">=" => Ok(CompareOp::Ge),
        _ => Err(PathError::InvalidOperator {
            position: token.pos,
        }),
    }
}
