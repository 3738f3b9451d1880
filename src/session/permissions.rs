//! Mode-dependent dashboard capabilities

use serde::{Deserialize, Serialize};

use crate::session::Mode;

/// Named boolean capabilities the dashboard checks before showing a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    pub can_chat: bool,
    pub can_send_message: bool,
    pub can_complete_conversation: bool,
    pub can_view_acoustic_features: bool,
    #[serde(rename = "canViewRealtimeKPI")]
    pub can_view_realtime_kpi: bool,
    pub can_view_historical_data: bool,
    pub can_view_latest_suggestion: bool,
    pub can_refresh_suggestion: bool,
}

/// Project a mode onto its capability set.
///
/// Historical data and the latest suggestion are visible in both modes;
/// only the read-only view offers a manual suggestion refresh, since the
/// interactive view receives suggestions live.
///
/// # Examples
///
/// ```
/// use voxdash::session::{permissions_for, Mode};
///
/// let p = permissions_for(Mode::ReadOnly);
/// assert!(!p.can_chat);
/// assert!(p.can_refresh_suggestion);
/// ```
pub fn permissions_for(mode: Mode) -> PermissionSet {
    let interactive = mode.is_interactive();
    PermissionSet {
        can_chat: interactive,
        can_send_message: interactive,
        can_complete_conversation: interactive,
        can_view_acoustic_features: interactive,
        can_view_realtime_kpi: interactive,
        can_view_historical_data: true,
        can_view_latest_suggestion: true,
        can_refresh_suggestion: !interactive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interactive_permissions() {
        let p = permissions_for(Mode::Interactive);
        assert!(p.can_chat);
        assert!(p.can_send_message);
        assert!(p.can_complete_conversation);
        assert!(p.can_view_acoustic_features);
        assert!(p.can_view_realtime_kpi);
        assert!(p.can_view_historical_data);
        assert!(p.can_view_latest_suggestion);
        assert!(!p.can_refresh_suggestion);
    }

    #[test]
    fn test_read_only_permissions() {
        let p = permissions_for(Mode::ReadOnly);
        assert!(!p.can_chat);
        assert!(!p.can_send_message);
        assert!(!p.can_complete_conversation);
        assert!(!p.can_view_acoustic_features);
        assert!(!p.can_view_realtime_kpi);
        assert!(p.can_view_historical_data);
        assert!(p.can_view_latest_suggestion);
        assert!(p.can_refresh_suggestion);
    }

    #[test]
    fn test_serialized_names_match_dashboard_keys() {
        let json = serde_json::to_value(permissions_for(Mode::Interactive)).unwrap();
        assert_eq!(json["canChat"], true);
        assert_eq!(json["canViewRealtimeKPI"], true);
        assert_eq!(json["canRefreshSuggestion"], false);
        assert_eq!(json.as_object().unwrap().len(), 8);
    }
}
