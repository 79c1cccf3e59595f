//! Extraction and validation of decisions from free-form oracle output.
//!
//! The oracle is asked to answer with a single JSON object but routinely wraps
//! it in prose or code fences. Candidates are located with a brace-depth
//! scanner that skips braces inside JSON strings, so nested objects and
//! trailing text containing braces do not corrupt the match.

use serde_json::{Map, Value};

use crate::domain::errors::OracleParseError;
use crate::domain::models::{Action, Decision};

const ACTION_KEYS: [&str; 3] = ["action", "accion", "acción"];
const REASON_KEYS: [&str; 3] = ["reason", "razon", "razón"];
const CONFIDENCE_KEYS: [&str; 2] = ["confidence", "confianza"];

/// Return every balanced, top-level `{...}` substring of `text`, in order.
///
/// An opening brace that is never closed does not hide the objects after it:
/// scanning resumes right past the unmatched brace.
pub fn extract_json_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut offset = 0;

    while let Some(unclosed) = scan_objects(text, offset, &mut objects) {
        // `{` is one byte, so this stays on a char boundary.
        offset = unclosed + 1;
    }

    objects
}

/// Push the balanced objects of `text[offset..]` onto `objects`.
///
/// Returns the byte index of the opening brace when the scan ends inside an
/// unterminated object.
fn scan_objects<'a>(text: &'a str, offset: usize, objects: &mut Vec<&'a str>) -> Option<usize> {
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text[offset..].char_indices() {
        let idx = offset + idx;
        if depth == 0 {
            if ch == '{' {
                start = idx;
                depth = 1;
                in_string = false;
                escaped = false;
            }
            continue;
        }

        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    objects.push(&text[start..=idx]);
                }
            }
            _ => {}
        }
    }

    (depth > 0).then_some(start)
}

/// Parse the first candidate object in `content` that is a valid decision.
///
/// When no candidate validates, the error of the first candidate is returned.
pub fn parse_decision(content: &str) -> Result<Decision, OracleParseError> {
    let mut first_error = None;

    for candidate in extract_json_objects(content) {
        match parse_candidate(candidate) {
            Ok(decision) => return Ok(decision),
            Err(err) => {
                first_error.get_or_insert(err);
            }
        }
    }

    Err(first_error.unwrap_or(OracleParseError::NoJsonObject))
}

fn parse_candidate(candidate: &str) -> Result<Decision, OracleParseError> {
    let value: Value = serde_json::from_str(candidate)
        .map_err(|err| OracleParseError::InvalidJson(err.to_string()))?;
    let object = value.as_object().ok_or(OracleParseError::NotAnObject)?;
    validate(object)
}

/// Validate a decoded object against the decision schema.
pub fn validate(object: &Map<String, Value>) -> Result<Decision, OracleParseError> {
    let action = field(object, &ACTION_KEYS)
        .ok_or(OracleParseError::MissingField("action"))?
        .as_str()
        .ok_or_else(|| OracleParseError::UnknownAction("non-string action".to_string()))?
        .parse::<Action>()
        .map_err(OracleParseError::UnknownAction)?;

    let reason = field(object, &REASON_KEYS)
        .ok_or(OracleParseError::MissingField("reason"))?
        .as_str()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .ok_or(OracleParseError::EmptyReason)?;

    let confidence = confidence_value(
        field(object, &CONFIDENCE_KEYS).ok_or(OracleParseError::MissingField("confidence"))?,
    )?;

    Ok(Decision {
        action,
        reason: reason.to_string(),
        confidence,
    })
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn confidence_value(value: &Value) -> Result<f64, OracleParseError> {
    let confidence = match value {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| OracleParseError::InvalidConfidence(number.to_string()))?,
        // Some models quote numbers.
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| OracleParseError::InvalidConfidence(text.clone()))?,
        other => return Err(OracleParseError::InvalidConfidence(other.to_string())),
    };

    if !confidence.is_finite() {
        return Err(OracleParseError::InvalidConfidence(confidence.to_string()));
    }
    if !(0.0..=1.0).contains(&confidence) {
        return Err(OracleParseError::ConfidenceOutOfRange(confidence));
    }
    Ok(confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    const NESTED: &str = r#"{"meta":{"x":1},"accion":"BUY","razon":"edge","confianza":0.9}"#;

    #[test]
    fn test_nested_object_is_extracted_whole() {
        let objects = extract_json_objects(NESTED);
        assert_eq!(objects, vec![NESTED]);

        let decision = parse_decision(NESTED).unwrap();
        assert_eq!(decision.action, Action::Buy);
        assert_eq!(decision.reason, "edge");
        assert!((decision.confidence - 0.9).abs() < f64::EPSILON);
    }

    /// Regression: the greedy `\{.*\}` match used to run to the last brace in
    /// the response, and the lazy variant stopped inside the nested object.
    #[test]
    fn test_regex_extraction_regression() {
        let content = format!("Decision: {NESTED} (format per {{schema}})");

        let greedy = Regex::new(r"\{.*\}").unwrap();
        let greedy_match = greedy.find(&content).unwrap().as_str();
        assert_ne!(greedy_match, NESTED);
        assert!(serde_json::from_str::<Value>(greedy_match).is_err());

        let lazy = Regex::new(r"\{.*?\}").unwrap();
        let lazy_match = lazy.find(&content).unwrap().as_str();
        assert_eq!(lazy_match, r#"{"meta":{"x":1}"#);
        assert!(serde_json::from_str::<Value>(lazy_match).is_err());

        let decision = parse_decision(&content).unwrap();
        assert_eq!(decision.action, Action::Buy);
        assert_eq!(decision.reason, "edge");
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let content = r#"{"action":"SELL","reason":"pattern } { broke \"out\"","confidence":0.7}"#;
        let decision = parse_decision(content).unwrap();
        assert_eq!(decision.action, Action::Sell);
        assert_eq!(decision.reason, r#"pattern } { broke "out""#);
    }

    #[test]
    fn test_prose_and_code_fences() {
        let content = "Sure!\n```json\n{\n  \"action\": \"heal\",\n  \"reason\": \"low coherence\",\n  \"confidence\": \"0.65\"\n}\n```";
        let decision = parse_decision(content).unwrap();
        assert_eq!(decision.action, Action::Heal);
        assert!((decision.confidence - 0.65).abs() < f64::EPSILON);
    }

    #[test]
    fn test_skips_invalid_candidates() {
        let content = r#"Context was {"services": 3}. Answer: {"action":"OPTIMIZE","reason":"tune","confidence":0.5}"#;
        let decision = parse_decision(content).unwrap();
        assert_eq!(decision.action, Action::Optimize);
    }

    #[test]
    fn test_unclosed_brace_in_prose_does_not_hide_answer() {
        let content = r#"Thinking {about the trend... Answer: {"action":"BUY","reason":"edge","confidence":0.9}"#;

        let objects = extract_json_objects(content);
        assert_eq!(
            objects,
            vec![r#"{"action":"BUY","reason":"edge","confidence":0.9}"#]
        );

        let decision = parse_decision(content).unwrap();
        assert_eq!(decision.action, Action::Buy);
        assert_eq!(decision.reason, "edge");
    }

    #[test]
    fn test_several_unclosed_braces_before_answer() {
        let content = r#"{ {"a": {"b": 1} and { then {"action":"HEAL","reason":"risk down","confidence":0.7} {"#;
        let decision = parse_decision(content).unwrap();
        assert_eq!(decision.action, Action::Heal);
        assert_eq!(decision.reason, "risk down");
    }

    #[test]
    fn test_no_object() {
        assert_eq!(
            parse_decision("I would hold for now."),
            Err(OracleParseError::NoJsonObject)
        );
        assert_eq!(
            parse_decision(r#"{"action":"BUY""#),
            Err(OracleParseError::NoJsonObject)
        );
    }

    #[test]
    fn test_schema_violations() {
        assert_eq!(
            parse_decision(r#"{"action":"YOLO","reason":"x","confidence":0.5}"#),
            Err(OracleParseError::UnknownAction("YOLO".to_string()))
        );
        assert_eq!(
            parse_decision(r#"{"action":"BUY","reason":"  ","confidence":0.5}"#),
            Err(OracleParseError::EmptyReason)
        );
        assert_eq!(
            parse_decision(r#"{"action":"BUY","reason":"x","confidence":1.5}"#),
            Err(OracleParseError::ConfidenceOutOfRange(1.5))
        );
        assert_eq!(
            parse_decision(r#"{"action":"BUY","reason":"x"}"#),
            Err(OracleParseError::MissingField("confidence"))
        );
        assert!(matches!(
            parse_decision(r#"{"action":"BUY","reason":"x","confidence":null}"#),
            Err(OracleParseError::InvalidConfidence(_))
        ));
        assert!(matches!(
            parse_decision(r#"{action: BUY}"#),
            Err(OracleParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_multibyte_text_around_object() {
        let content = "Decisión 🧠: {\"acción\":\"HOLD\",\"razón\":\"mercado lateral\",\"confianza\":0.4} ✅";
        let decision = parse_decision(content).unwrap();
        assert_eq!(decision.action, Action::Hold);
        assert_eq!(decision.reason, "mercado lateral");
    }
}
