use std::io::IsTerminal;

use anyhow::Result;
use comfy_table::Table;
use serde::Serialize;
use serde_json::Value;

use crate::cli;

/// Concrete rendering once `auto` has been decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

impl OutputFormat {
    /// `auto` renders tables on a terminal and JSON when piped
    pub fn resolve(format: cli::OutputFormat) -> Self {
        match format {
            cli::OutputFormat::Json => Self::Json,
            cli::OutputFormat::Table => Self::Table,
            cli::OutputFormat::Auto => {
                if std::io::stdout().is_terminal() {
                    Self::Table
                } else {
                    Self::Json
                }
            }
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let json_value = serde_json::to_value(data)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_value)?);
        }
        OutputFormat::Table => {
            println!("{}", render_table(&json_value));
        }
    }

    Ok(())
}

fn render_table(value: &Value) -> String {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            // Get headers from first object
            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            table.to_string()
        }
        Value::Array(_) => "(none)".to_string(),
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            table.to_string()
        }
        _ => format_value(value),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_list_renders_one_row_per_item() {
        let rendered = render_table(&json!([
            { "id": "lb-1", "name": "edge", "state": "AVAILABLE" },
            { "id": "lb-2", "name": null, "state": "BUSY" }
        ]));
        assert!(rendered.contains("id"));
        assert!(rendered.contains("lb-1"));
        assert!(rendered.contains("edge"));
        assert!(rendered.contains("BUSY"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(render_table(&json!([])), "(none)");
    }

    #[test]
    fn test_object_renders_key_value_rows() {
        let rendered = render_table(&json!({ "request_id": "req-1", "state": "DONE" }));
        assert!(rendered.contains("Key"));
        assert!(rendered.contains("req-1"));
        assert!(rendered.contains("DONE"));
    }

    #[test]
    fn test_explicit_formats_resolve_as_given() {
        assert_eq!(
            OutputFormat::resolve(cli::OutputFormat::Json),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::resolve(cli::OutputFormat::Table),
            OutputFormat::Table
        );
    }
}
