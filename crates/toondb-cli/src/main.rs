//! `toondb` CLI — encode, decode, query and mutate TOON documents.
//!
//! ## Usage
//!
//! ```sh
//! # Encode JSON to TOON (stdin → stdout)
//! echo '{"name":"Alice","age":30}' | toondb encode
//!
//! # Encode with a pipe delimiter and a custom tabular threshold
//! toondb encode -i data.json --delimiter pipe --min-tabular-rows 3
//!
//! # Decode TOON back to pretty-printed JSON
//! toondb decode -i data.toon
//!
//! # Run a TOONPath query against a TOON document
//! toondb query -i store.toon "products.price>20 sort:price:desc limit:5"
//!
//! # Update, insert, delete through mutation paths
//! toondb update -i store.toon "products[id==2].price" --value 250
//! toondb insert -i store.toon "products" --item '{"id":9,"name":"Cable","price":5}'
//! toondb delete -i store.toon "products" --selector '{"id":9}'
//!
//! # Show estimated token savings of TOON vs JSON
//! toondb stats -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::io::{self, Read};
use toondb_core::{DecodeOptions, Delimiter, EncodeOptions};

#[derive(Parser)]
#[command(name = "toondb", version, about = "TOON codec + TOONPath query/mutation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum DelimiterArg {
    Comma,
    Tab,
    Pipe,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Comma => Delimiter::Comma,
            DelimiterArg::Tab => Delimiter::Tab,
            DelimiterArg::Pipe => Delimiter::Pipe,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode JSON to TOON format
    Encode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Field separator within the document
        #[arg(long, value_enum, default_value = "comma")]
        delimiter: DelimiterArg,
        /// Spaces per nesting depth
        #[arg(long, default_value_t = 2)]
        indent: usize,
        /// Uniform object arrays below this length encode as lists
        #[arg(long, default_value_t = 2)]
        min_tabular_rows: usize,
    },
    /// Decode TOON back to pretty-printed JSON
    Decode {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Tolerate count/indentation mismatches instead of failing
        #[arg(long)]
        lenient: bool,
        /// Spaces per nesting depth
        #[arg(long, default_value_t = 2)]
        indent: usize,
    },
    /// Run a TOONPath query against a TOON document
    Query {
        /// TOONPath query string
        query: String,
        /// Input TOON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Set a field addressed by a mutation path
    Update {
        /// Mutation path, e.g. "products[id==2].price"
        path: String,
        /// New value (JSON; bare words are treated as strings)
        #[arg(long)]
        value: String,
        /// Input TOON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file for the new TOON (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Append an item to the array addressed by a mutation path
    Insert {
        /// Mutation path, e.g. "products"
        path: String,
        /// Item to append (JSON)
        #[arg(long)]
        item: String,
        /// Input TOON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file for the new TOON (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Delete array elements matching a selector object
    Delete {
        /// Mutation path, e.g. "products"
        path: String,
        /// Selector object (JSON), e.g. '{"id":9}'
        #[arg(long)]
        selector: String,
        /// Input TOON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file for the new TOON (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show estimated token savings of TOON vs JSON
    Stats {
        /// Input JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            delimiter,
            indent,
            min_tabular_rows,
        } => {
            let json = read_input(input.as_deref())?;
            let value: Value = serde_json::from_str(&json).context("Input is not valid JSON")?;
            let opts = EncodeOptions {
                indent,
                delimiter: delimiter.into(),
                min_tabular_rows,
            };
            let toon = toondb_core::encode_with(&value, &opts);
            write_output(output.as_deref(), &toon)?;
        }
        Commands::Decode {
            input,
            output,
            lenient,
            indent,
        } => {
            let toon = read_input(input.as_deref())?;
            let opts = DecodeOptions {
                indent,
                strict: !lenient,
                ..DecodeOptions::default()
            };
            let value =
                toondb_core::decode_with(&toon, &opts).context("Failed to decode TOON input")?;
            let pretty = serde_json::to_string_pretty(&value)?;
            write_output(output.as_deref(), &pretty)?;
        }
        Commands::Query { query, input } => {
            let toon = read_input(input.as_deref())?;
            let data = toondb_core::decode(&toon).context("Failed to decode TOON input")?;
            let results = toondb_core::query_toonpath(&data, &query)
                .with_context(|| format!("Query failed: {query}"))?;
            let pretty = serde_json::to_string_pretty(&Value::Array(results))?;
            write_output(None, &pretty)?;
        }
        Commands::Update {
            path,
            value,
            input,
            output,
        } => {
            let toon = read_input(input.as_deref())?;
            let data = toondb_core::decode(&toon).context("Failed to decode TOON input")?;
            let result = toondb_core::update_value(&data, &path, parse_value_arg(&value));
            if !result.success {
                anyhow::bail!("Update failed: {}", result.message);
            }
            eprintln!("{}", result.message);
            write_output(output.as_deref(), &result.new_toon)?;
        }
        Commands::Insert {
            path,
            item,
            input,
            output,
        } => {
            let toon = read_input(input.as_deref())?;
            let data = toondb_core::decode(&toon).context("Failed to decode TOON input")?;
            let item: Value =
                serde_json::from_str(&item).context("--item must be a valid JSON value")?;
            let result = toondb_core::insert_item(&data, &path, item);
            if !result.success {
                anyhow::bail!("Insert failed: {}", result.message);
            }
            eprintln!("{}", result.message);
            write_output(output.as_deref(), &result.new_toon)?;
        }
        Commands::Delete {
            path,
            selector,
            input,
            output,
        } => {
            let toon = read_input(input.as_deref())?;
            let data = toondb_core::decode(&toon).context("Failed to decode TOON input")?;
            let selector: Value = serde_json::from_str(&selector)
                .context("--selector must be a valid JSON object")?;
            let Value::Object(selector) = selector else {
                anyhow::bail!("--selector must be a JSON object, e.g. '{{\"id\":9}}'");
            };
            let result = toondb_core::delete_item(&data, &path, &selector);
            if !result.success {
                anyhow::bail!("Delete failed: {}", result.message);
            }
            eprintln!("{}", result.message);
            write_output(output.as_deref(), &result.new_toon)?;
        }
        Commands::Stats { input } => {
            let json = read_input(input.as_deref())?;
            let value: Value = serde_json::from_str(&json).context("Input is not valid JSON")?;
            let toon = toondb_core::encode(&value);
            let savings = toondb_core::compare_tokens(&toon, &json);
            println!("JSON tokens (est.):  {}", savings.json);
            println!("TOON tokens (est.):  {}", savings.toon);
            println!("Savings:             {} ({:.2}%)", savings.savings, savings.savings_percentage);
        }
    }

    Ok(())
}

/// Mutation values arrive as CLI text: JSON when it parses, a plain string
/// otherwise (`--value 250` is a number, `--value draft` a string).
fn parse_value_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {path}"))?;
        }
        None => {
            println!("{content}");
        }
    }
    Ok(())
}
