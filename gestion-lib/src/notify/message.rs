//! Inbound notification frames.

use serde_json::Map;
use serde_json::Value;

use crate::error::NotifyError;

/// Type of an inbound notification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// An invoice needs a payment reminder.
    RelanceRequise,
    /// Any type this client does not know about.
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::RelanceRequise => "RELANCE_REQUISE",
            NotificationKind::Other(s) => s,
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(s: &str) -> Self {
        match s {
            "RELANCE_REQUISE" => NotificationKind::RelanceRequise,
            other => NotificationKind::Other(other.to_string()),
        }
    }
}

/// A JSON object with a `type` discriminator.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// The whole object, `type` included.
    pub payload: Map<String, Value>,
}

impl Notification {
    /// Parses one text frame.
    pub fn parse(text: &str) -> Result<Self, NotifyError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| NotifyError::Malformed(e.to_string()))?;
        let Value::Object(payload) = value else {
            return Err(NotifyError::Malformed("not a JSON object".into()));
        };
        let kind = match payload.get("type") {
            Some(Value::String(t)) => NotificationKind::from(t.as_str()),
            _ => return Err(NotifyError::Malformed("missing string field 'type'".into())),
        };
        Ok(Self { kind, payload })
    }

    /// Field of the payload.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.payload.get(field)
    }

    /// Human-readable one-line summary.
    pub fn summary(&self) -> String {
        let message = self
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        match (&self.kind, message) {
            (_, Some(m)) => format!("[{}] {}", self.kind.as_str(), m),
            (NotificationKind::RelanceRequise, None) => {
                let facture = self
                    .get("factureId")
                    .or_else(|| self.get("facture_id"))
                    .map(Value::to_string)
                    .unwrap_or_else(|| "?".into());
                format!("[RELANCE_REQUISE] facture {}", facture)
            }
            (kind, None) => format!("[{}]", kind.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_unknown_types() {
        let n = Notification::parse(r#"{"type":"RELANCE_REQUISE","factureId":42}"#).unwrap();
        assert_eq!(n.kind, NotificationKind::RelanceRequise);
        assert_eq!(n.summary(), "[RELANCE_REQUISE] facture 42");

        let n = Notification::parse(r#"{"type":"NOUVEAU_CLIENT","message":"Durand"}"#).unwrap();
        assert_eq!(n.kind, NotificationKind::Other("NOUVEAU_CLIENT".into()));
        assert_eq!(n.summary(), "[NOUVEAU_CLIENT] Durand");
    }

    #[test]
    fn test_malformed_frames() {
        for text in ["not json", "[1, 2]", r#"{"kind":"x"}"#, r#"{"type":3}"#] {
            assert!(matches!(Notification::parse(text), Err(NotifyError::Malformed(_))));
        }
    }
}
