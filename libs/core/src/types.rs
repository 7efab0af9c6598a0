use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Lead captured by the landing-page form.
///
/// ```
/// use lead_core::Submission;
///
/// let lead = Submission::new("Ivan", "+7 999 123-45-67", "Moscow");
/// assert_eq!(lead.name, "Ivan");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl Submission {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }

    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self::new(self.name.trim(), self.phone.trim(), self.address.trim())
    }
}

/// Submission that failed to relay and waits in the client queue.
///
/// `createdAt` is stored as milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub payload: Submission,
    pub created_at: i64,
}

impl QueueEntry {
    pub fn new(payload: Submission, created_at: OffsetDateTime) -> Self {
        Self {
            payload,
            created_at: unix_millis(created_at),
        }
    }

    pub fn created_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.created_at) * 1_000_000).ok()
    }
}

fn unix_millis(at: OffsetDateTime) -> i64 {
    (at.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Uniform response body returned by the relay endpoint.
///
/// ```
/// use lead_core::RelayEnvelope;
///
/// let body = serde_json::to_value(RelayEnvelope::success()).unwrap();
/// assert_eq!(body, serde_json::json!({ "ok": true }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl RelayEnvelope {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
            errors: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            errors: None,
        }
    }

    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            ok: false,
            error: None,
            errors: Some(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn queue_entry_uses_browser_layout() {
        let entry = QueueEntry::new(
            Submission::new("Ivan", "+7 999", "Moscow"),
            datetime!(2024-03-01 12:00:00 UTC),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            json!({
                "payload": { "name": "Ivan", "phone": "+7 999", "address": "Moscow" },
                "createdAt": 1_709_294_400_000i64,
            })
        );
        assert_eq!(entry.created_at(), Some(datetime!(2024-03-01 12:00:00 UTC)));
    }

    #[test]
    fn envelope_omits_absent_fields() {
        let failure = serde_json::to_value(RelayEnvelope::failure("boom")).unwrap();
        assert_eq!(failure, json!({ "ok": false, "error": "boom" }));

        let invalid =
            serde_json::to_value(RelayEnvelope::invalid(vec!["name is required".into()])).unwrap();
        assert_eq!(invalid, json!({ "ok": false, "errors": ["name is required"] }));
    }

    #[test]
    fn trimmed_strips_each_field() {
        let lead = Submission::new("  Ivan ", "\t+7 999\n", " Moscow");
        assert_eq!(lead.trimmed(), Submission::new("Ivan", "+7 999", "Moscow"));
    }
}
