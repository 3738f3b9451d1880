//! Dashboard mode and route context

use std::fmt;

use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Dashboard presentation mode
///
/// Derived from persisted state on every read; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Live analysis: acoustic features, realtime KPI and chat are available
    Interactive,

    /// History view: latest suggestion and historical data only
    ReadOnly,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interactive => write!(f, "interactive"),
            Self::ReadOnly => write!(f, "read_only"),
        }
    }
}

/// Visual tone of the mode banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Info,
}

/// Header text shown for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeDescription {
    pub title: &'static str,
    pub description: &'static str,
    pub tone: Tone,
}

impl Mode {
    /// Parse a mode from its text form
    ///
    /// # Examples
    ///
    /// ```
    /// use voxdash::session::Mode;
    ///
    /// assert_eq!(Mode::parse_str("read_only").unwrap(), Mode::ReadOnly);
    /// assert!(Mode::parse_str("chat").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "interactive" => Ok(Self::Interactive),
            "read_only" | "readonly" => Ok(Self::ReadOnly),
            other => Err(format!("Unknown dashboard mode: {}", other)),
        }
    }

    pub fn is_interactive(self) -> bool {
        self == Self::Interactive
    }

    pub fn is_read_only(self) -> bool {
        self == Self::ReadOnly
    }

    /// Banner title, description and tone for this mode
    pub fn description(self) -> ModeDescription {
        match self {
            Self::Interactive => ModeDescription {
                title: "Live analysis",
                description: "Review acoustic feature analysis and chat with the AI assistant",
                tone: Tone::Success,
            },
            Self::ReadOnly => ModeDescription {
                title: "History view",
                description:
                    "Showing the most recent diagnostic suggestion; start a new analysis to record voice",
                tone: Tone::Info,
            },
        }
    }

    /// Colored tag for terminal output
    pub fn colored_tag(self) -> String {
        match self {
            Self::Interactive => format!("[{}]", "INTERACTIVE".green()),
            Self::ReadOnly => format!("[{}]", "READ ONLY".blue()),
        }
    }
}

/// Route context relevant to mode derivation
///
/// Only the `fromUpload` navigation hint matters: when present it forces
/// interactive mode regardless of persisted state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteQuery {
    pub from_upload: bool,
}

impl RouteQuery {
    /// Route reached straight from a voice upload
    pub fn from_upload() -> Self {
        Self { from_upload: true }
    }

    /// Build from a raw query string such as `fromUpload=1&tab=kpi`
    ///
    /// The hint is set when `fromUpload` is present with a non-empty value,
    /// so `fromUpload=0` still counts.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxdash::session::RouteQuery;
    ///
    /// assert!(RouteQuery::from_query_string("?fromUpload=1").from_upload);
    /// assert!(!RouteQuery::from_query_string("fromUpload=").from_upload);
    /// assert!(!RouteQuery::from_query_string("tab=kpi").from_upload);
    /// ```
    pub fn from_query_string(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let from_upload = url::form_urlencoded::parse(query.as_bytes())
            .any(|(key, value)| key == "fromUpload" && !value.is_empty());
        Self { from_upload }
    }
}
