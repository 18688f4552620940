//! Interpretation of agent response payloads.
//!
//! The agent backend answers either with plain text or with a JSON document
//! describing the work it did: an execution `plan` of `tasks` (each run by an
//! `agent` and carrying a `status` and a `result`), per-step `results` with
//! `sections` of `insights`, a `summary` and `recommendations`. The shape is
//! not versioned, so every extractor here degrades to an empty value when
//! the part it looks for is missing or has an unexpected type.

use serde_json::Value;

pub const HTML_DOCUMENT_MARKER: &str = "<!DOCTYPE html>";
pub const DEFAULT_PROCESSED_DATA_FILENAME: &str = "processed_data.csv";

/// A decoded agent response.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    raw: Value,
    parsed: Value,
}

impl AgentResponse {
    /// Interprets message content. Strings holding JSON are decoded; any
    /// other string is plain text.
    pub fn parse(content: &str) -> Self {
        Self::from_value(Value::String(content.to_string()))
    }

    /// Interprets an already structured value. A JSON string value is
    /// decoded like [`AgentResponse::parse`].
    pub fn from_value(raw: Value) -> Self {
        let parsed = match &raw {
            Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| raw.clone()),
            other => other.clone(),
        };
        Self { raw, parsed }
    }

    pub fn parsed(&self) -> &Value {
        &self.parsed
    }

    /// Whether the payload is a structured agent response rather than text.
    pub fn is_structured(&self) -> bool {
        match self.parsed.as_object() {
            Some(object) => ["plan", "results", "summary", "recommendations"]
                .iter()
                .any(|key| object.get(*key).is_some_and(is_truthy)),
            None => false,
        }
    }

    /// The summary, or the raw content when there is none.
    pub fn summary(&self) -> String {
        if let Some(summary) = self.parsed.get("summary").and_then(Value::as_str)
            && !summary.is_empty()
        {
            return summary.to_string();
        }
        match &self.raw {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }

    /// Every `results[].sections[].insights` entry, in order.
    pub fn insights(&self) -> Vec<String> {
        self.results()
            .flat_map(|result| array_items(result.get("sections")))
            .flat_map(|section| string_items(section.get("insights")))
            .collect()
    }

    /// Every `results[].recommendations` entry, in order.
    pub fn recommendations(&self) -> Vec<String> {
        self.results()
            .flat_map(|result| string_items(result.get("recommendations")))
            .collect()
    }

    /// The HTML document produced by a completed report export, or `""`.
    pub fn html_content(&self) -> String {
        self.tasks()
            .find(|task| {
                field_is(task, "agent", "report")
                    && field_is(task, "action", "export_pdf")
                    && field_is(task, "status", "completed")
                    && task
                        .get("result")
                        .and_then(Value::as_str)
                        .is_some_and(|result| result.contains(HTML_DOCUMENT_MARKER))
            })
            .and_then(|task| task.get("result").and_then(Value::as_str))
            .unwrap_or_default()
            .to_string()
    }

    pub fn has_html_content(&self) -> bool {
        !self.html_content().is_empty()
    }

    /// Output of the completed data task, `processedData` preferred over
    /// `content`, or `""`.
    pub fn processed_data_content(&self) -> String {
        self.data_task()
            .and_then(|result| {
                non_empty_str(result.get("processedData"))
                    .or_else(|| non_empty_str(result.get("content")))
            })
            .unwrap_or_default()
            .to_string()
    }

    pub fn has_processed_data_content(&self) -> bool {
        !self.processed_data_content().is_empty()
    }

    /// Filename of the data task's output; `"processed_data.csv"` when the
    /// task names none, `""` when there is no data task.
    pub fn processed_data_filename(&self) -> String {
        match self.data_task() {
            Some(result) => non_empty_str(result.get("filename"))
                .unwrap_or(DEFAULT_PROCESSED_DATA_FILENAME)
                .to_string(),
            None => String::new(),
        }
    }

    fn results(&self) -> impl Iterator<Item = &Value> {
        array_items(self.parsed.get("results"))
    }

    fn tasks(&self) -> impl Iterator<Item = &Value> {
        array_items(self.parsed.get("plan").and_then(|plan| plan.get("tasks")))
    }

    /// Result object of the first completed data task that produced output.
    fn data_task(&self) -> Option<&Value> {
        self.tasks()
            .filter(|task| field_is(task, "agent", "data") && field_is(task, "status", "completed"))
            .filter_map(|task| task.get("result"))
            .find(|result| {
                non_empty_str(result.get("processedData")).is_some()
                    || non_empty_str(result.get("content")).is_some()
            })
    }
}

fn array_items(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flat_map(|items| items.iter())
}

fn string_items(value: Option<&Value>) -> impl Iterator<Item = String> + '_ {
    array_items(value).filter_map(|item| item.as_str().map(str::to_string))
}

fn field_is(object: &Value, field: &str, expected: &str) -> bool {
    object.get(field).and_then(Value::as_str) == Some(expected)
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HTML: &str = "<!DOCTYPE html><html><body>Q3 report</body></html>";

    fn full_response() -> Value {
        json!({
            "plan": {
                "tasks": [
                    {"agent": "data", "action": "clean", "status": "failed",
                     "result": {"processedData": "ignored"}},
                    {"agent": "data", "action": "clean", "status": "completed",
                     "result": {"content": "raw,rows", "processedData": "id,total\n1,10",
                                "filename": "clean.csv"}},
                    {"agent": "report", "action": "export_pdf", "status": "completed",
                     "result": HTML}
                ]
            },
            "results": [
                {"sections": [{"insights": ["Revenue up", "Costs flat"]},
                              {"insights": ["Revenue up"]}],
                 "recommendations": ["Hire"]},
                {"sections": [{"title": "no insights here"}],
                 "recommendations": ["Expand", 42]}
            ],
            "summary": "Quarter looks good"
        })
    }

    #[test]
    fn test_plain_text_is_not_structured() {
        let response = AgentResponse::parse("Hello there");
        assert!(!response.is_structured());
        assert_eq!(response.summary(), "Hello there");
        assert!(response.insights().is_empty());
        assert_eq!(response.html_content(), "");
        assert_eq!(response.processed_data_filename(), "");
    }

    #[test]
    fn test_json_string_is_decoded() {
        let response = AgentResponse::parse(&full_response().to_string());
        assert!(response.is_structured());
        assert_eq!(response.summary(), "Quarter looks good");
    }

    #[test]
    fn test_html_content_exact_match() {
        let response = AgentResponse::from_value(full_response());
        assert_eq!(response.html_content(), HTML);
        assert!(response.has_html_content());
    }

    #[test]
    fn test_html_content_requires_completed_export() {
        let response = AgentResponse::from_value(json!({
            "plan": {"tasks": [
                {"agent": "report", "action": "export_pdf", "status": "running", "result": HTML},
                {"agent": "report", "action": "render", "status": "completed", "result": HTML},
                {"agent": "report", "action": "export_pdf", "status": "completed",
                 "result": "<html>no doctype</html>"}
            ]}
        }));
        assert_eq!(response.html_content(), "");
    }

    #[test]
    fn test_insights_and_recommendations_flatten_in_order() {
        let response = AgentResponse::from_value(full_response());
        assert_eq!(
            response.insights(),
            vec!["Revenue up", "Costs flat", "Revenue up"]
        );
        assert_eq!(response.recommendations(), vec!["Hire", "Expand"]);
    }

    #[test]
    fn test_processed_data_prefers_processed_data() {
        let response = AgentResponse::from_value(full_response());
        assert_eq!(response.processed_data_content(), "id,total\n1,10");
        assert_eq!(response.processed_data_filename(), "clean.csv");
    }

    #[test]
    fn test_processed_data_falls_back_to_content_and_default_filename() {
        let response = AgentResponse::from_value(json!({
            "plan": {"tasks": [
                {"agent": "data", "status": "completed", "result": {"content": "a,b"}}
            ]}
        }));
        assert_eq!(response.processed_data_content(), "a,b");
        assert_eq!(
            response.processed_data_filename(),
            DEFAULT_PROCESSED_DATA_FILENAME
        );
    }

    #[test]
    fn test_summary_falls_back_to_stringified_value() {
        let value = json!({"results": []});
        let response = AgentResponse::from_value(value.clone());
        assert!(response.is_structured());
        assert_eq!(response.summary(), value.to_string());
    }

    #[test]
    fn test_malformed_shapes_do_not_panic() {
        let response = AgentResponse::from_value(json!({
            "plan": {"tasks": "not a list"},
            "results": {"sections": []},
            "summary": 12
        }));
        assert!(response.is_structured());
        assert_eq!(response.html_content(), "");
        assert!(response.insights().is_empty());
        assert!(response.recommendations().is_empty());
        assert_eq!(response.processed_data_content(), "");
    }

    #[test]
    fn test_empty_structured_keys_do_not_count() {
        let response = AgentResponse::parse(r#"{"summary": "", "other": true}"#);
        assert!(!response.is_structured());
    }
}
