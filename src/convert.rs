//! Defines the CSV to JSON conversion. Each data row of a
//! comma-delimited file with a header row becomes one JSON object
//! keyed by the header names, and the whole file becomes a JSON array
//! of those objects in row order.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Serializer, Value};

/// Converts comma-delimited tabular text into a 4-space-indented JSON
/// array of objects. The first row defines the field names for every
/// later row, zipped positionally: rows shorter than the header get
/// `null` for the missing trailing fields, and cells beyond the
/// header's width are dropped. Cell values are never coerced; they
/// stay strings in the output. A header-only input yields `[]`.
pub fn convert(csv_text: &str) -> Result<String> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(csv_text.as_bytes());
    let headers = reader
        .headers()
        .context("Failed to read the CSV header row")?
        .clone();
    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Failed to parse CSV data row {}", index + 1))?;
        let mut record = Map::with_capacity(headers.len());
        for (position, header) in headers.iter().enumerate() {
            let cell = row
                .get(position)
                .map(|value| Value::String(String::from(value)))
                .unwrap_or(Value::Null);
            // A duplicate header name overwrites the earlier column's
            // value while keeping the key's first position.
            record.insert(String::from(header), cell);
        }
        records.push(Value::Object(record));
    }
    let mut out = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    Value::Array(records)
        .serialize(&mut serializer)
        .context("Failed to serialize the converted records")?;
    String::from_utf8(out).context("Serialized JSON was not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parsed(json_text: &str) -> Value {
        serde_json::from_str(json_text).expect("output should be valid JSON")
    }

    #[test]
    fn converts_rows_to_objects_in_header_order() {
        let out = convert("name,age\nAlice,30\nBob,25\n").unwrap();
        assert_eq!(
            parsed(&out),
            json!([
                {"name": "Alice", "age": "30"},
                {"name": "Bob", "age": "25"}
            ])
        );
        let reparsed = parsed(&out);
        let keys: Vec<&String> = match &reparsed {
            Value::Array(rows) => match &rows[0] {
                Value::Object(fields) => fields.keys().collect(),
                _ => panic!("expected an object"),
            },
            _ => panic!("expected an array"),
        };
        assert_eq!(keys, ["name", "age"]);
    }

    #[test]
    fn output_is_indented_with_four_spaces() {
        let out = convert("name\nAlice\n").unwrap();
        assert!(out.contains("\n    {"));
        assert!(out.contains("\n        \"name\": \"Alice\""));
    }

    #[test]
    fn header_only_input_yields_empty_array() {
        assert_eq!(convert("name,age\n").unwrap(), "[]");
        assert_eq!(convert("name,age").unwrap(), "[]");
    }

    #[test]
    fn empty_input_yields_empty_array() {
        assert_eq!(convert("").unwrap(), "[]");
    }

    #[test]
    fn values_stay_strings_without_coercion() {
        let out = convert("n,flag\n42,true\n").unwrap();
        assert_eq!(parsed(&out), json!([{"n": "42", "flag": "true"}]));
    }

    #[test]
    fn short_rows_pad_missing_fields_with_null() {
        let out = convert("a,b,c\n1,2\n").unwrap();
        assert_eq!(parsed(&out), json!([{"a": "1", "b": "2", "c": null}]));
    }

    #[test]
    fn long_rows_drop_extra_cells() {
        let out = convert("a,b\n1,2,3,4\n").unwrap();
        assert_eq!(parsed(&out), json!([{"a": "1", "b": "2"}]));
    }

    #[test]
    fn duplicate_headers_let_the_later_column_win() {
        let out = convert("a,a,b\n1,2,3\n").unwrap();
        assert_eq!(parsed(&out), json!([{"a": "2", "b": "3"}]));
    }

    #[test]
    fn quoted_fields_keep_commas_and_newlines() {
        let out = convert("name,note\nAlice,\"hi, there\nbye\"\n").unwrap();
        assert_eq!(
            parsed(&out),
            json!([{"name": "Alice", "note": "hi, there\nbye"}])
        );
    }

    #[test]
    fn unterminated_quote_reads_to_end_of_input() {
        // The parser is liberal with quoting: a quote left open
        // swallows the rest of the input as one field instead of
        // failing the conversion.
        let out = convert("name\n\"unterminated\n").unwrap();
        assert_eq!(parsed(&out), json!([{"name": "unterminated\n"}]));
    }

    #[test]
    fn conversion_is_deterministic() {
        let text = "name,age\nAlice,30\nBob,25\n";
        assert_eq!(convert(text).unwrap(), convert(text).unwrap());
    }
}
