//! Voxdash - Voice diagnostic dashboard client library
//!
//! This library provides the client-side core of a voice diagnostic
//! dashboard: the session-mode state machine that decides whether the
//! dashboard is in live analysis or history view, the permission table
//! derived from that mode, the dashboard HTTP API client, the route guard,
//! and the push notification listener.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: Mode derivation, expiry cleanup, and session transitions
//! - `store`: Key-value persistence shared by session state and tokens
//! - `api`: Dashboard HTTP API client with token refresh
//! - `routes`: Route table and authentication guard
//! - `notify`: Reconnecting WebSocket listener for analysis notifications
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `logging`: Tracing subscriber setup
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```
//! use voxdash::{ActivateOptions, DashboardSession, MemoryStore, Mode, RouteQuery};
//!
//! # fn main() -> voxdash::Result<()> {
//! let session = DashboardSession::new(MemoryStore::new());
//! assert_eq!(session.derive_mode(&RouteQuery::default()), Mode::ReadOnly);
//! assert_eq!(session.derive_mode(&RouteQuery::from_upload()), Mode::Interactive);
//!
//! session.activate_interactive_mode(ActivateOptions::default())?;
//! assert!(session.permissions(&RouteQuery::default()).can_chat);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;
pub mod routes;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use api::{ApiClient, User};
pub use config::Config;
pub use error::{Result, VoxdashError};
pub use notify::{ListenerHandle, NotificationListener};
pub use routes::{guard, Navigation, Route};
pub use session::{
    permissions_for, ActivateOptions, DashboardSession, Mode, PermissionSet, RouteQuery,
    SessionId,
};
pub use store::{KeyValueStore, MemoryStore, SledStore};
