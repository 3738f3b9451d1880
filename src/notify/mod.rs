//! Push notifications from the analysis backend
//!
//! The backend pushes JSON text frames over a per-user WebSocket. Only one
//! message type is acted on:
//!
//! ```json
//! {"type": "llm_analysis_complete", "data": { ... analysis payload ... }}
//! ```
//!
//! Every other `type` is logged and ignored. The [`listener`] module owns the
//! connection and its reconnect loop.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

pub mod listener;
pub use listener::{ListenerHandle, NotificationListener};

/// Message type announcing a finished LLM analysis
pub const LLM_ANALYSIS_COMPLETE: &str = "llm_analysis_complete";

/// A decoded push message
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Analysis finished; carries the analysis payload
    LlmAnalysisComplete(Value),
    /// Any other message type (or none at all)
    Unknown(Option<String>),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Decode one text frame.
///
/// # Errors
///
/// Returns `VoxdashError::Serialization` when the frame is not a JSON object
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use voxdash::notify::{parse_notification, Notification};
///
/// let n = parse_notification(r#"{"type":"llm_analysis_complete","data":{"score":0.8}}"#).unwrap();
/// assert_eq!(n, Notification::LlmAnalysisComplete(json!({"score": 0.8})));
///
/// let n = parse_notification(r#"{"type":"heartbeat"}"#).unwrap();
/// assert_eq!(n, Notification::Unknown(Some("heartbeat".to_string())));
/// ```
pub fn parse_notification(text: &str) -> Result<Notification> {
    let envelope: Envelope =
        serde_json::from_str(text).map_err(crate::error::VoxdashError::Serialization)?;

    Ok(match envelope.kind.as_deref() {
        Some(LLM_ANALYSIS_COMPLETE) => Notification::LlmAnalysisComplete(envelope.data),
        _ => Notification::Unknown(envelope.kind),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_analysis_complete_without_data_is_null_payload() {
        let n = parse_notification(r#"{"type":"llm_analysis_complete"}"#).unwrap();
        assert_eq!(n, Notification::LlmAnalysisComplete(Value::Null));
    }

    #[test]
    fn test_missing_type_is_unknown() {
        let n = parse_notification(r#"{"data":{"a":1}}"#).unwrap();
        assert_eq!(n, Notification::Unknown(None));
    }

    #[test]
    fn test_type_match_is_exact() {
        let n = parse_notification(r#"{"type":"LLM_ANALYSIS_COMPLETE","data":1}"#).unwrap();
        assert_eq!(
            n,
            Notification::Unknown(Some("LLM_ANALYSIS_COMPLETE".to_string()))
        );
    }

    #[test]
    fn test_nested_payload_is_preserved() {
        let n = parse_notification(
            r#"{"type":"llm_analysis_complete","data":{"kpi":{"jitter":0.01},"suggestion":"rest"}}"#,
        )
        .unwrap();
        assert_eq!(
            n,
            Notification::LlmAnalysisComplete(
                json!({"kpi": {"jitter": 0.01}, "suggestion": "rest"})
            )
        );
    }

    #[test]
    fn test_non_json_frame_is_error() {
        assert!(parse_notification("ping").is_err());
        assert!(parse_notification("[1,2]").is_err());
    }
}
