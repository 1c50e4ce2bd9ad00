//! Request types for the analytics backend (`POST /ask-ai`).

use crate::error::BuildError;
use crate::model::FilterSnapshot;
use serde::{Deserialize, Serialize};

/// Processing intent of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "Analyze Report")]
    AnalyzeReport,
    #[serde(rename = "AI Assistant")]
    AiAssistant,
}

impl Mode {
    /// Label the backend expects in both `mode_type` fields.
    pub fn label(&self) -> &'static str {
        match self {
            Mode::AnalyzeReport => "Analyze Report",
            Mode::AiAssistant => "AI Assistant",
        }
    }

    pub fn requires_question(&self) -> bool {
        matches!(self, Mode::AiAssistant)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub mode_type: Mode,
    pub question: String,
}

/// Date bounds. Always null on the way out; the backend derives the range
/// from the data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Outbound request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub request_meta: RequestMeta,
    pub period: Period,
    pub filters: FilterSnapshot,
    pub mode_type: Mode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_question: Option<String>,
}

impl RequestPayload {
    pub fn mode(&self) -> Mode {
        self.mode_type
    }
}

/// The question to send for `mode`: the text as typed for the assistant,
/// nothing for report analysis. Whitespace-only text is rejected.
pub fn validate_question(mode: Mode, question: &str) -> Result<Option<&str>, BuildError> {
    if !mode.requires_question() {
        return Ok(None);
    }
    if question.trim().is_empty() {
        Err(BuildError::EmptyQuestion)
    } else {
        Ok(Some(question))
    }
}

/// Assemble the request for one cycle.
pub fn build(
    mode: Mode,
    question: &str,
    filters: FilterSnapshot,
) -> Result<RequestPayload, BuildError> {
    let question = validate_question(mode, question)?.map(str::to_owned);

    Ok(RequestPayload {
        request_meta: RequestMeta {
            mode_type: mode,
            question: question.clone().unwrap_or_default(),
        },
        period: Period::default(),
        filters,
        mode_type: mode,
        user_question: question,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FilterValue;
    use serde_json::json;

    #[test]
    fn test_mode_labels() {
        assert_eq!(Mode::AnalyzeReport.label(), "Analyze Report");
        assert_eq!(Mode::AiAssistant.label(), "AI Assistant");
        assert_eq!(
            serde_json::to_value(Mode::AiAssistant).unwrap(),
            json!("AI Assistant")
        );
    }

    #[test]
    fn test_validate_question() {
        assert_eq!(validate_question(Mode::AnalyzeReport, "ignored"), Ok(None));
        assert_eq!(validate_question(Mode::AiAssistant, "  why?  "), Ok(Some("  why?  ")));
        assert_eq!(
            validate_question(Mode::AiAssistant, " \n\t "),
            Err(BuildError::EmptyQuestion)
        );
    }

    #[test]
    fn test_report_wire_shape() {
        let mut filters = FilterSnapshot::new();
        filters.insert("Region", FilterValue::AllSelected);

        let payload = build(Mode::AnalyzeReport, "", filters).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value,
            json!({
                "request_meta": {"mode_type": "Analyze Report", "question": ""},
                "period": {"start_date": null, "end_date": null},
                "filters": {"Region": ["(All)"]},
                "mode_type": "Analyze Report"
            })
        );
    }
}
