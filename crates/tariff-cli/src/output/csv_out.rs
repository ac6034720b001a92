use serde_json::Value;
use std::io;

use super::{array_headers, array_row, flatten};

/// Write output as CSV to stdout.
///
/// Bills print their line items, sweeps print one row per step, anything else
/// prints as two-column `field,value`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value.get("result").unwrap_or(value);

    if let Some(Value::Array(items)) = body.get("line_items") {
        write_array_csv(&mut wtr, items);
    } else if let Some(Value::Array(rows)) = body.get("results") {
        write_array_csv(&mut wtr, rows);
    } else if let Value::Array(arr) = body {
        write_array_csv(&mut wtr, arr);
    } else {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in flatten(body).fields {
            let _ = wtr.write_record([key.as_str(), val.as_str()]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    let headers = array_headers(arr);
    if headers.is_empty() {
        for item in arr {
            let _ = wtr.write_record([super::format_value(item)]);
        }
        return;
    }

    let _ = wtr.write_record(&headers);
    for item in arr {
        let _ = wtr.write_record(array_row(item, &headers));
    }
}
