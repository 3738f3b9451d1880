/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `session` - Mode derivation, permissions, and session state changes
- `auth`    - Login, registration, and route guard checks
- `listen`  - Analysis notification listener

All handlers share one store so tokens and session state written by one
command are visible to the next.
*/

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cli::Commands;
use crate::config::Config;
use crate::error::Result;
use crate::session::DashboardSession;
use crate::store::SledStore;

pub mod auth;
pub mod listen;
pub mod session;

/// Store handle shared between the session state machine and the API client
pub type SharedStore = Arc<SledStore>;

/// Open the configured store, or the platform default location
///
/// # Errors
///
/// Returns `VoxdashError::Storage` if the database cannot be opened
pub fn open_store(config: &Config) -> Result<SharedStore> {
    let path = match &config.storage.path {
        Some(path) => path.clone(),
        None => SledStore::default_path()?,
    };
    tracing::debug!("Opening store at {}", path.display());
    Ok(Arc::new(SledStore::open(path)?))
}

/// Execute one CLI command
///
/// # Errors
///
/// Returns the handler's error
pub async fn execute(config: Config, command: Commands) -> Result<()> {
    let store = open_store(&config)?;
    let dashboard = DashboardSession::new(Arc::clone(&store));
    let client = ApiClient::new(&config.api, Arc::clone(&store))?;

    match command {
        Commands::Mode { from_upload } => {
            session::show_mode(&dashboard, from_upload);
        }
        Commands::Permissions { from_upload, json } => {
            session::show_permissions(&dashboard, from_upload, json)?;
        }
        Commands::Status => session::show_status(&dashboard)?,
        Commands::Activate {
            session_id,
            from_upload,
        } => session::activate(&dashboard, session_id, from_upload)?,
        Commands::Complete => session::complete(&dashboard)?,
        Commands::Reset => session::reset(&dashboard)?,
        Commands::Cleanup => {
            session::cleanup(&dashboard);
        }
        Commands::RecordMessage { text } => {
            session::record_message(&dashboard, &text)?;
        }
        Commands::Login { username, password } => {
            auth::login(&client, &username, &password).await?;
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            auth::register(&client, &username, &email, &password).await?;
        }
        Commands::Logout => auth::logout(&client)?,
        Commands::Whoami => {
            auth::whoami(&client).await?;
        }
        Commands::Navigate { path } => {
            auth::navigate(&client, &path)?;
        }
        Commands::Listen { user_id } => {
            listen::run_listen(&config.notifications, &client, user_id).await?
        }
    }

    Ok(())
}
