//! Notification listener command handler

use colored::Colorize;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::config::NotificationConfig;
use crate::error::Result;
use crate::notify::NotificationListener;
use crate::store::KeyValueStore;

/// Print analysis notifications until Ctrl-C.
///
/// Without an explicit `user_id` the logged-in user's id is loaded from the
/// API.
///
/// # Errors
///
/// Returns error if no user id can be determined
pub async fn run_listen<S: KeyValueStore>(
    config: &NotificationConfig,
    client: &ApiClient<S>,
    user_id: Option<i64>,
) -> Result<()> {
    let user_id = match user_id {
        Some(id) => Some(id),
        None if client.is_logged_in() => Some(client.current_user().await?.id),
        None => None,
    };

    let listener = NotificationListener::new(config, user_id)?;
    println!(
        "Listening on {} (Ctrl-C to stop)",
        listener.url().cyan()
    );

    let cancel = CancellationToken::new();
    let mut handle = listener.spawn(cancel.clone());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping listener");
                break;
            }
            event = handle.recv() => match event {
                Some(analysis) => {
                    println!("{} Analysis complete", "●".green());
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                }
                None => break,
            },
        }
    }

    handle.shutdown().await;
    Ok(())
}
