pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// A nested object split into dotted scalar fields and the arrays of objects
/// that deserve their own table (slabs, line items, sweep rows).
#[derive(Default)]
pub struct Flattened<'a> {
    pub fields: Vec<(String, String)>,
    pub tables: Vec<(String, &'a [Value])>,
}

pub fn flatten(value: &Value) -> Flattened<'_> {
    let mut out = Flattened::default();
    collect("", value, &mut out);
    out
}

fn collect<'a>(prefix: &str, value: &'a Value, out: &mut Flattened<'a>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                match val {
                    Value::Object(_) => collect(&path, val, out),
                    Value::Array(arr) if arr.iter().any(Value::is_object) => {
                        out.tables.push((path, arr.as_slice()))
                    }
                    _ => out.fields.push((path, format_value(val))),
                }
            }
        }
        _ => out.fields.push((prefix.to_string(), format_value(value))),
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Column headers for an array of objects, in first-seen order across rows.
pub fn array_headers(arr: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for item in arr {
        if let Value::Object(map) = item {
            for key in map.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }
    }
    headers
}

pub fn array_row(item: &Value, headers: &[String]) -> Vec<String> {
    headers
        .iter()
        .map(|h| item.get(h.as_str()).map(format_value).unwrap_or_default())
        .collect()
}
