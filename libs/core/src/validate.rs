use crate::Submission;
use serde_json::Value;

/// Form fields in the order errors are reported.
pub const REQUIRED_FIELDS: [&str; 3] = ["name", "phone", "address"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("Invalid JSON payload")]
    InvalidJson,
    #[error("invalid submission: {}", .0.join(", "))]
    Invalid(Vec<String>),
}

/// Parses a raw request body into a [`Submission`].
///
/// Anything that is not a JSON object is [`SubmissionError::InvalidJson`]; an object with
/// missing, empty, or non-string fields is [`SubmissionError::Invalid`] with one message per field.
///
/// ```
/// use lead_core::{parse_submission, SubmissionError};
///
/// let lead = parse_submission(br#"{"name":"Ivan","phone":"+7","address":"Moscow"}"#).unwrap();
/// assert_eq!(lead.address, "Moscow");
///
/// assert_eq!(parse_submission(b"[1,2]"), Err(SubmissionError::InvalidJson));
/// ```
pub fn parse_submission(body: &[u8]) -> Result<Submission, SubmissionError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| SubmissionError::InvalidJson)?;
    if !value.is_object() {
        return Err(SubmissionError::InvalidJson);
    }
    validate_submission(&value).map_err(SubmissionError::Invalid)
}

/// Checks a decoded JSON object for the three required string fields.
pub fn validate_submission(value: &Value) -> Result<Submission, Vec<String>> {
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let (name, phone, address) = (field("name"), field("phone"), field("address"));
    match (name, phone, address) {
        (Some(name), Some(phone), Some(address)) => Ok(Submission {
            name,
            phone,
            address,
        }),
        (name, phone, address) => {
            let present = [name.is_some(), phone.is_some(), address.is_some()];
            Err(REQUIRED_FIELDS
                .iter()
                .zip(present)
                .filter(|(_, ok)| !ok)
                .map(|(key, _)| required_message(key))
                .collect())
        }
    }
}

/// Names of the fields of `submission` that are empty once trimmed.
pub fn missing_fields(submission: &Submission) -> Vec<&'static str> {
    let values = [
        submission.name.as_str(),
        submission.phone.as_str(),
        submission.address.as_str(),
    ];
    REQUIRED_FIELDS
        .iter()
        .zip(values)
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect()
}

fn required_message(field: &str) -> String {
    format!("{field} is required")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_complete_submission() {
        let lead = validate_submission(&json!({
            "name": "Ivan",
            "phone": "+7 999 123-45-67",
            "address": "Moscow",
        }))
        .unwrap();
        assert_eq!(lead, Submission::new("Ivan", "+7 999 123-45-67", "Moscow"));
    }

    #[test]
    fn reports_each_missing_field_in_order() {
        let errors = validate_submission(&json!({ "phone": "" })).unwrap_err();
        assert_eq!(
            errors,
            vec!["name is required", "phone is required", "address is required"]
        );
    }

    #[test]
    fn non_string_and_empty_values_count_as_missing() {
        let errors = validate_submission(&json!({
            "name": 42,
            "phone": "",
            "address": "Moscow",
        }))
        .unwrap_err();
        assert_eq!(errors, vec!["name is required", "phone is required"]);
    }

    #[test]
    fn whitespace_values_are_not_empty() {
        let lead = validate_submission(&json!({
            "name": " ",
            "phone": "+7",
            "address": "\t",
        }))
        .unwrap();
        assert_eq!(lead, Submission::new(" ", "+7", "\t"));
    }

    #[test]
    fn malformed_and_non_object_bodies_are_invalid_json() {
        assert_eq!(parse_submission(b"{"), Err(SubmissionError::InvalidJson));
        assert_eq!(parse_submission(b"\"text\""), Err(SubmissionError::InvalidJson));
        assert_eq!(parse_submission(b""), Err(SubmissionError::InvalidJson));
    }

    #[test]
    fn parse_reports_validation_errors() {
        let err = parse_submission(br#"{"name":"Ivan"}"#).unwrap_err();
        assert_eq!(
            err,
            SubmissionError::Invalid(vec![
                "phone is required".into(),
                "address is required".into()
            ])
        );
    }

    #[test]
    fn missing_fields_checks_trimmed_values() {
        let lead = Submission::new("Ivan", " ", "");
        assert_eq!(missing_fields(&lead), vec!["phone", "address"]);
    }
}
