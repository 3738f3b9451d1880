//! Command-line interface definition for Voxdash
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for session mode control, authentication,
//! route checks, and the notification listener.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Voxdash - Voice diagnostic dashboard client
///
/// Inspect and drive the dashboard session mode, sign in against the
/// dashboard API, and listen for analysis notifications.
#[derive(Parser, Debug, Clone)]
#[command(name = "voxdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "VOXDASH_CONFIG")]
    pub config: Option<String>,

    /// Override the local store directory
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Voxdash
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the derived session mode
    Mode {
        /// Treat the dashboard as opened from an upload (`fromUpload` query)
        #[arg(long)]
        from_upload: bool,
    },

    /// Show the feature permissions for the derived mode
    Permissions {
        /// Treat the dashboard as opened from an upload (`fromUpload` query)
        #[arg(long)]
        from_upload: bool,

        /// Print the permission set as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the stored session record, history size, and login state
    Status,

    /// Start an interactive analysis session
    Activate {
        /// Identifier of the analysis session
        #[arg(long)]
        session_id: Option<String>,

        /// Mark the session as started from an upload
        #[arg(long)]
        from_upload: bool,
    },

    /// Mark the current conversation as completed
    Complete,

    /// Drop all session state and return to read-only mode
    Reset,

    /// Remove expired session state
    Cleanup,

    /// Append a message to the live conversation history
    RecordMessage {
        /// Message text
        text: String,
    },

    /// Log in to the dashboard API
    Login {
        /// Account name
        username: String,

        /// Password (read from VOXDASH_PASSWORD when omitted)
        #[arg(long, env = "VOXDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a dashboard account
    Register {
        /// Account name
        username: String,

        /// Contact email
        email: String,

        /// Password (read from VOXDASH_PASSWORD when omitted)
        #[arg(long, env = "VOXDASH_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget stored tokens
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Check where a navigation to a path would land
    Navigate {
        /// Route path, e.g. /dashboard?fromUpload=1
        path: String,
    },

    /// Listen for analysis notifications until interrupted
    Listen {
        /// Listen for this user instead of the logged-in one
        #[arg(long)]
        user_id: Option<i64>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_status() {
        let cli = Cli::try_parse_from(["voxdash", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Status));
        assert!(cli.store.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "voxdash",
            "--config",
            "custom.yaml",
            "--store",
            "/tmp/voxdash",
            "-v",
            "cleanup",
        ])
        .unwrap();
        assert_eq!(cli.config, Some("custom.yaml".to_string()));
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/voxdash")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Cleanup));
    }

    #[test]
    fn test_cli_parse_mode_from_upload() {
        let cli = Cli::try_parse_from(["voxdash", "mode", "--from-upload"]).unwrap();
        assert!(matches!(cli.command, Commands::Mode { from_upload: true }));
    }

    #[test]
    fn test_cli_parse_permissions_json() {
        let cli = Cli::try_parse_from(["voxdash", "permissions", "--json"]).unwrap();
        if let Commands::Permissions { from_upload, json } = cli.command {
            assert!(!from_upload);
            assert!(json);
        } else {
            panic!("Expected Permissions command");
        }
    }

    #[test]
    fn test_cli_parse_activate() {
        let cli = Cli::try_parse_from([
            "voxdash",
            "activate",
            "--session-id",
            "abc-123",
            "--from-upload",
        ])
        .unwrap();
        if let Commands::Activate {
            session_id,
            from_upload,
        } = cli.command
        {
            assert_eq!(session_id, Some("abc-123".to_string()));
            assert!(from_upload);
        } else {
            panic!("Expected Activate command");
        }
    }

    #[test]
    fn test_cli_parse_record_message() {
        let cli = Cli::try_parse_from(["voxdash", "record-message", "hello there"]).unwrap();
        if let Commands::RecordMessage { text } = cli.command {
            assert_eq!(text, "hello there");
        } else {
            panic!("Expected RecordMessage command");
        }
    }

    #[test]
    fn test_cli_parse_login_with_password() {
        let cli =
            Cli::try_parse_from(["voxdash", "login", "ada", "--password", "secret"]).unwrap();
        if let Commands::Login { username, password } = cli.command {
            assert_eq!(username, "ada");
            assert_eq!(password, "secret");
        } else {
            panic!("Expected Login command");
        }
    }

    #[test]
    fn test_cli_parse_register() {
        let cli = Cli::try_parse_from([
            "voxdash",
            "register",
            "ada",
            "ada@example.com",
            "--password",
            "secret",
        ])
        .unwrap();
        if let Commands::Register {
            username,
            email,
            password,
        } = cli.command
        {
            assert_eq!(username, "ada");
            assert_eq!(email, "ada@example.com");
            assert_eq!(password, "secret");
        } else {
            panic!("Expected Register command");
        }
    }

    #[test]
    fn test_cli_parse_navigate() {
        let cli = Cli::try_parse_from(["voxdash", "navigate", "/dashboard"]).unwrap();
        if let Commands::Navigate { path } = cli.command {
            assert_eq!(path, "/dashboard");
        } else {
            panic!("Expected Navigate command");
        }
    }

    #[test]
    fn test_cli_parse_listen_with_user() {
        let cli = Cli::try_parse_from(["voxdash", "listen", "--user-id", "42"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Listen { user_id: Some(42) }
        ));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["voxdash"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["voxdash", "chat"]).is_err());
    }
}
