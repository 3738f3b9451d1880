//! Session mode command handlers

use chrono::Utc;
use colored::Colorize;
use serde_json::json;

use crate::error::Result;
use crate::session::{
    ActivateOptions, DashboardSession, Mode, PermissionSet, RouteQuery, SessionId,
};
use crate::store::{KeyValueStore, TOKEN_KEY};

fn route(from_upload: bool) -> RouteQuery {
    RouteQuery { from_upload }
}

/// Print the derived mode with its banner text
pub fn show_mode<S: KeyValueStore>(session: &DashboardSession<S>, from_upload: bool) -> Mode {
    let mode = session.derive_mode(&route(from_upload));
    let banner = mode.description();
    println!("{} {}", mode.colored_tag(), banner.title.bold());
    println!("{}", banner.description);
    mode
}

/// Print the permission set for the derived mode
///
/// # Errors
///
/// Returns error if the permission set cannot be encoded as JSON
pub fn show_permissions<S: KeyValueStore>(
    session: &DashboardSession<S>,
    from_upload: bool,
    as_json: bool,
) -> Result<PermissionSet> {
    let mode = session.derive_mode(&route(from_upload));
    let permissions = crate::session::permissions_for(mode);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&permissions)?);
        return Ok(permissions);
    }

    println!("\nPermissions ({})\n", mode.colored_tag());
    for (name, allowed) in permission_rows(&permissions) {
        let mark = if allowed { "yes".green() } else { "no".red() };
        println!("  {:<24} {}", name, mark);
    }
    println!();
    Ok(permissions)
}

fn permission_rows(p: &PermissionSet) -> [(&'static str, bool); 8] {
    [
        ("Chat", p.can_chat),
        ("Send message", p.can_send_message),
        ("Complete conversation", p.can_complete_conversation),
        ("Acoustic features", p.can_view_acoustic_features),
        ("Realtime KPI", p.can_view_realtime_kpi),
        ("Historical data", p.can_view_historical_data),
        ("Latest suggestion", p.can_view_latest_suggestion),
        ("Refresh suggestion", p.can_refresh_suggestion),
    ]
}

/// Print the stored record, history length, mode, and login state
///
/// Reading the mode runs expiry cleanup, so the record is printed first.
///
/// # Errors
///
/// Returns error if the record cannot be encoded as JSON
pub fn show_status<S: KeyValueStore>(session: &DashboardSession<S>) -> Result<()> {
    println!("\nDashboard Session Status\n");
    match session.session_record() {
        Some(record) => println!("Record:        {}", serde_json::to_string(&record)?),
        None => println!("Record:        {}", "none".dimmed()),
    }
    println!("History:       {} message(s)", session.conversation_len());

    let mode = session.derive_mode(&RouteQuery::default());
    println!("Mode:          {}", mode.colored_tag());

    let logged_in = session
        .store()
        .get(TOKEN_KEY)?
        .is_some_and(|token| !token.is_empty());
    println!(
        "Logged in:     {}",
        if logged_in { "yes".green() } else { "no".yellow() }
    );
    println!();
    Ok(())
}

/// Start a live session
///
/// A numeric `session_id` is stored as a number, matching backend ids.
///
/// # Errors
///
/// Returns error if the record cannot be written
pub fn activate<S: KeyValueStore>(
    session: &DashboardSession<S>,
    session_id: Option<String>,
    from_upload: bool,
) -> Result<()> {
    session.activate_interactive_mode(ActivateOptions {
        session_id: session_id.as_deref().map(SessionId::from_arg),
        from_upload,
    })?;
    println!("{} Interactive mode activated", "✓".green());
    Ok(())
}

/// Complete the conversation
///
/// # Errors
///
/// Returns error if the store rejects a write
pub fn complete<S: KeyValueStore>(session: &DashboardSession<S>) -> Result<()> {
    session.complete_conversation()?;
    println!("{} Conversation completed", "✓".green());
    Ok(())
}

/// Reset to read-only mode
///
/// # Errors
///
/// Returns error if the store rejects a removal
pub fn reset<S: KeyValueStore>(session: &DashboardSession<S>) -> Result<()> {
    session.reset_to_read_only_mode()?;
    println!("{} Session state cleared", "✓".green());
    Ok(())
}

/// Run expiry cleanup once
pub fn cleanup<S: KeyValueStore>(session: &DashboardSession<S>) -> bool {
    let purged = session.cleanup_expired_sessions();
    if purged {
        println!("{} Expired session state removed", "✓".green());
    } else {
        println!("{}", "Nothing to clean up.".yellow());
    }
    purged
}

/// Append a user message to the conversation history
///
/// # Errors
///
/// Returns error if the history cannot be written
pub fn record_message<S: KeyValueStore>(
    session: &DashboardSession<S>,
    text: &str,
) -> Result<usize> {
    let len = session.append_conversation_message(json!({
        "role": "user",
        "content": text,
        "timestamp": Utc::now().timestamp_millis(),
    }))?;
    println!("{} Conversation now holds {} message(s)", "✓".green(), len);
    Ok(len)
}
