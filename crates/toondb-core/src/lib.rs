//! # toondb-core
//!
//! TOON codec plus the TOONPath query and mutation engine.
//!
//! TOON (Token-Oriented Object Notation) is a compact, human-readable
//! serialization format designed to cut LLM token consumption for
//! structured data: indentation instead of braces, tabular compression for
//! uniform arrays, and context-dependent quoting. TOONPath is the query
//! and mutation language that operates on the decoded value tree.
//!
//! The value model is `serde_json::Value` with insertion-ordered objects
//! (the `preserve_order` feature), so object key order survives a round
//! trip and determines tabular header order on re-encode.
//!
//! ## Quick start
//!
//! ```rust
//! use serde_json::json;
//! use toondb_core::{decode, encode, query_toonpath, update_value};
//!
//! let data = json!({"products":[
//!     {"id":1,"name":"Keyboard","price":89},
//!     {"id":2,"name":"Mouse","price":25}
//! ]});
//!
//! // Value tree → TOON
//! let toon = encode(&data);
//! assert_eq!(toon, "products[2,]{id,name,price}:\n  1,Keyboard,89\n  2,Mouse,25");
//!
//! // TOON → value tree (roundtrip)
//! assert_eq!(decode(&toon).unwrap(), data);
//!
//! // Read query: filter + projection
//! let cheap = query_toonpath(&data, "products.price<50").unwrap();
//! assert_eq!(cheap, vec![json!({"id":2,"name":"Mouse","price":25})]);
//!
//! // Mutation: selector-addressed field update
//! let result = update_value(&data, "products[id==2].price", json!(29));
//! assert!(result.success);
//! assert_eq!(result.modified_count, 1);
//! ```
//!
//! ## Modules
//!
//! - [`encoder`] — value tree → TOON text
//! - [`decoder`] — TOON text → value tree
//! - [`path`] — mutation-path grammar (`products[id==8].price`)
//! - [`toonpath`] — TOONPath query grammar (filters, projection, sort, limit)
//! - [`query`] — read-path evaluation engine
//! - [`mutate`] — update / insert / delete / bulk mutations
//! - [`schema`] — schema inference and item validation
//! - [`tokens`] — heuristic token estimation
//! - [`error`] — error types

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod mutate;
pub mod path;
pub mod query;
pub mod schema;
pub mod tokens;
pub mod toonpath;

pub use decoder::{decode, decode_with, DecodeOptions, ExpandPaths};
pub use encoder::{encode, encode_with, Delimiter, EncodeOptions};
pub use error::{PathError, QueryError, ToonError};
pub use mutate::{
    bulk_operation, delete_item, find_items, insert_item, update_value, BulkResult, DeleteResult,
    InsertResult, OpKind, Operation, OperationResult, UpdateResult,
};
pub use path::{parse_path, validate_path, CompareOp, Literal, PathAst, Selector};
pub use query::query_toonpath;
pub use schema::{
    detect_schema, merge_schema, validate_item, validate_items, FieldType, Schema, SchemaField,
    ValidationReport,
};
pub use tokens::{compare_tokens, estimate_tokens, TokenSavings};
pub use toonpath::{
    analyze_toonpath, parse_toonpath, validate_toonpath, FilterExpr, LogicalOp, QueryAst,
    QueryInfo, SortOrder, SortSpec,
};
