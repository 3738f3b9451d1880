//! Persisted session record and its decoding rules

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier of the server-side analysis session.
///
/// The backend issues integer ids; older records and embedders may carry
/// strings, and anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionId {
    Number(i64),
    Text(String),
    Other(Value),
}

impl SessionId {
    /// Parse a command-line argument, preferring the integer form
    ///
    /// # Examples
    ///
    /// ```
    /// use voxdash::session::SessionId;
    ///
    /// assert_eq!(SessionId::from_arg("17"), SessionId::Number(17));
    /// assert_eq!(SessionId::from_arg("s-1"), SessionId::Text("s-1".to_string()));
    /// ```
    pub fn from_arg(arg: &str) -> Self {
        arg.parse::<i64>()
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(arg.to_string()))
    }
}

impl From<i64> for SessionId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{}", id),
            Self::Text(id) => f.write_str(id),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

/// Lifecycle flags and timestamps of one diagnostic session.
///
/// Stored as camelCase JSON under
/// [`SESSION_STATE_KEY`](crate::store::SESSION_STATE_KEY). Decoding is as
/// forgiving as the dashboard that writes it: flags follow JavaScript
/// truthiness, timestamps may be floats, and absent or `null` values read
/// as unset. Only text that is not JSON, or is a JSON scalar, fails to
/// decode.
///
/// # Examples
///
/// ```
/// use voxdash::session::SessionRecord;
///
/// let record: SessionRecord =
///     serde_json::from_str(r#"{"isActive":true,"startTime":1700000000000.0,"sessionId":17}"#)
///         .unwrap();
/// assert!(record.is_active);
/// assert!(!record.is_completed);
/// assert_eq!(record.start_time, Some(1_700_000_000_000));
/// assert_eq!(record.session_id().map(ToString::to_string).as_deref(), Some("17"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// A live session was started and not yet finished
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub is_active: bool,

    /// The conversation was explicitly completed
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub is_completed: bool,

    /// Activation time, ms since epoch
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::millis"
    )]
    pub start_time: Option<i64>,

    /// Completion time, ms since epoch
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::millis"
    )]
    pub completed_time: Option<i64>,

    /// Server-side analysis session.
    ///
    /// `Some(None)` is an explicit `null` (activation without an id);
    /// `None` leaves the key out, as in the minimal completed record.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::present"
    )]
    pub session_id: Option<Option<SessionId>>,

    /// Activated right after a voice upload
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_truthy"
    )]
    pub from_upload: Option<bool>,
}

impl SessionRecord {
    /// Record written when a live session starts
    pub fn activated(now_millis: i64, session_id: Option<SessionId>, from_upload: bool) -> Self {
        Self {
            is_active: true,
            is_completed: false,
            start_time: Some(now_millis),
            completed_time: None,
            session_id: Some(session_id),
            from_upload: Some(from_upload),
        }
    }

    /// Minimal completed record used when no prior record could be read
    pub fn completed_at(now_millis: i64) -> Self {
        Self {
            is_active: false,
            is_completed: true,
            completed_time: Some(now_millis),
            ..Self::default()
        }
    }

    /// Active and not completed
    pub fn is_live(&self) -> bool {
        self.is_active && !self.is_completed
    }

    /// The session id, if one was recorded
    pub fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref().and_then(Option::as_ref)
    }
}

mod lenient {
    use super::*;

    fn is_truthy(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    pub(super) fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(is_truthy(&Value::deserialize(d)?))
    }

    pub(super) fn optional_truthy<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            value => Some(is_truthy(&value)),
        })
    }

    /// Integer or float milliseconds, or a numeric string; anything else is
    /// treated as unset
    pub(super) fn millis<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let number = match Value::deserialize(d)? {
            Value::Number(n) => match n.as_i64() {
                Some(ms) => return Ok(Some(ms)),
                None => n.as_f64(),
            },
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(number.filter(|f| f.is_finite()).map(|f| f as i64))
    }

    /// Marks the key as present, keeping `null` distinct from absent
    pub(super) fn present<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<SessionId>>, D::Error> {
        Ok(Some(Option::<SessionId>::deserialize(d)?))
    }
}

/// Outcome of reading a JSON slot from the store.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Slot<T> {
    Absent,
    Malformed(String),
    Present(T),
}

impl<T: serde::de::DeserializeOwned> Slot<T> {
    pub(crate) fn decode(raw: Option<String>) -> Self {
        match raw {
            None => Slot::Absent,
            Some(text) => match serde_json::from_str::<T>(&text) {
                Ok(value) => Slot::Present(value),
                Err(e) => Slot::Malformed(e.to_string()),
            },
        }
    }
}
