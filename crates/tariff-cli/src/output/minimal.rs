use serde_json::Value;

use super::format_value;

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, then falls back
/// to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let priority_pointers = [
        "/result/charges/total",
        "/result/total",
        "/date",
    ];

    for pointer in priority_pointers {
        if let Some(val) = value.pointer(pointer) {
            if !val.is_null() {
                println!("{}", format_value(val));
                return;
            }
        }
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}
