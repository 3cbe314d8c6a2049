use crate::domain::model::AggregateReport;
use crate::domain::phone::CanonicalNumber;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde_json::Value;
use std::fmt::Write;

/// `+27821234567` -> `za_phone_27821234567.json`
pub fn report_filename(number: &CanonicalNumber) -> String {
    format!("za_phone_{}.json", number.digits())
}

pub fn to_pretty_json(report: &AggregateReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes the report through `storage` and returns where it landed.
pub async fn save_report<S: Storage>(
    storage: &S,
    number: &CanonicalNumber,
    report: &AggregateReport,
) -> Result<String> {
    let filename = report_filename(number);
    let json = to_pretty_json(report)?;
    tracing::debug!("Saving report ({} bytes) as {}", json.len(), filename);
    storage.write_file(&filename, json.as_bytes()).await
}

/// Operator-facing listing of every source and its fields.
pub fn render_text(report: &AggregateReport) -> String {
    let mut out = String::new();

    for (source, result) in report.iter() {
        let _ = writeln!(out, "\n{} RESULTS:", source.to_uppercase());
        for (field, value) in &result.fields {
            match value {
                Value::Array(items) => {
                    let _ = writeln!(out, "  {}:", field);
                    for item in items {
                        let _ = writeln!(out, "    - {}", display_value(item));
                    }
                }
                other => {
                    let _ = writeln!(out, "  {}: {}", field, display_value(other));
                }
            }
        }
    }

    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match (map.get("title"), map.get("url")) {
            (Some(Value::String(title)), Some(Value::String(url))) => format!("{} ({})", title, url),
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SourceResult;
    use crate::domain::phone::canonicalize;
    use serde_json::json;

    fn sample_report() -> AggregateReport {
        AggregateReport::from_results(vec![
            (
                "google".to_string(),
                SourceResult::new().with_field(
                    "search_results",
                    json!([{"title": "Plumber in Durban", "url": "https://example.co.za"}]),
                ),
            ),
            (
                "truecaller".to_string(),
                SourceResult::new()
                    .with_field("name", "Thandiwe Dlamini")
                    .with_field("additional_info", json!(["Pretoria"])),
            ),
        ])
    }

    #[test]
    fn test_report_filename_drops_plus() {
        let number = canonicalize("0821234567").unwrap();
        assert_eq!(report_filename(&number), "za_phone_27821234567.json");
    }

    #[test]
    fn test_pretty_json_uses_two_space_indent_and_keeps_unicode() {
        let report = AggregateReport::from_results(vec![(
            "truecaller".to_string(),
            SourceResult::new().with_field("name", "Zoë"),
        )]);

        let json = to_pretty_json(&report).unwrap();

        assert!(json.contains("\n  \"truecaller\": {\n    \"name\": \"Zoë\""));
    }

    #[test]
    fn test_empty_report_is_empty_object() {
        assert_eq!(to_pretty_json(&AggregateReport::default()).unwrap(), "{}");
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sample_report());

        assert!(text.contains("GOOGLE RESULTS:"));
        assert!(text.contains("    - Plumber in Durban (https://example.co.za)"));
        assert!(text.contains("TRUECALLER RESULTS:"));
        assert!(text.contains("  name: Thandiwe Dlamini"));
        assert!(text.contains("  additional_info:\n    - Pretoria"));
    }
}
