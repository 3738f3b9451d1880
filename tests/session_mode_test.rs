//! Session mode integration tests
//!
//! Drives `DashboardSession` through its public API against the on-disk
//! `SledStore`, with a manual clock for the expiry window.

mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use common::create_temp_store;
use voxdash::session::cleanup::EXPIRY_WINDOW_MS;
use voxdash::session::{ManualClock, SessionId};
use voxdash::store::{KeyValueStore, SledStore, CONVERSATION_STORAGE_KEY, SESSION_STATE_KEY};
use voxdash::{permissions_for, ActivateOptions, DashboardSession, Mode, RouteQuery};

const NOW: i64 = 1_750_000_000_000;

fn session_at(now: i64) -> (DashboardSession<Arc<SledStore>>, Arc<ManualClock>, tempfile::TempDir) {
    let (store, tmp) = create_temp_store();
    let clock = Arc::new(ManualClock::new(now));
    let session = DashboardSession::with_clock(store, clock.clone());
    (session, clock, tmp)
}

fn no_route() -> RouteQuery {
    RouteQuery::default()
}

#[test]
fn test_empty_store_is_read_only() {
    let (session, _clock, _tmp) = session_at(NOW);
    assert_eq!(session.derive_mode(&no_route()), Mode::ReadOnly);
}

#[test]
fn test_malformed_record_is_purged_to_read_only() {
    let (session, _clock, _tmp) = session_at(NOW);
    let store = session.store();
    store.set(SESSION_STATE_KEY, "{not json").unwrap();
    store
        .set(CONVERSATION_STORAGE_KEY, r#"[{"role":"user"}]"#)
        .unwrap();

    assert_eq!(session.derive_mode(&no_route()), Mode::ReadOnly);
    assert!(store.get(SESSION_STATE_KEY).unwrap().is_none());
    assert!(store.get(CONVERSATION_STORAGE_KEY).unwrap().is_none());
}

#[test]
fn test_completed_record_expires_after_window() {
    let (session, _clock, _tmp) = session_at(NOW);
    let completed_time = NOW - EXPIRY_WINDOW_MS - 1;
    session
        .store()
        .set(
            SESSION_STATE_KEY,
            &json!({"isActive": false, "isCompleted": true, "completedTime": completed_time})
                .to_string(),
        )
        .unwrap();

    assert!(session.cleanup_expired_sessions());
    assert!(session.store().get(SESSION_STATE_KEY).unwrap().is_none());
}

#[test]
fn test_completed_record_within_window_is_retained() {
    let (session, _clock, _tmp) = session_at(NOW);
    let completed_time = NOW - EXPIRY_WINDOW_MS + 1;
    session
        .store()
        .set(
            SESSION_STATE_KEY,
            &json!({"isActive": false, "isCompleted": true, "completedTime": completed_time})
                .to_string(),
        )
        .unwrap();

    assert!(!session.cleanup_expired_sessions());
    assert!(session.store().get(SESSION_STATE_KEY).unwrap().is_some());
}

#[test]
fn test_activation_makes_session_interactive() {
    let (session, _clock, _tmp) = session_at(NOW);
    session
        .activate_interactive_mode(ActivateOptions::with_session_id("s1"))
        .unwrap();

    assert_eq!(session.derive_mode(&no_route()), Mode::Interactive);
    let record = session.session_record().expect("record should be stored");
    assert_eq!(record.session_id(), Some(&SessionId::from("s1")));
    assert_eq!(record.start_time, Some(NOW));
    assert!(record.is_live());
}

#[test]
fn test_complete_after_activation_is_read_only_and_clears_keys() {
    let (session, _clock, _tmp) = session_at(NOW);
    session
        .activate_interactive_mode(ActivateOptions::with_session_id("s1"))
        .unwrap();
    session
        .append_conversation_message(json!({"role": "user", "content": "hi"}))
        .unwrap();

    session.complete_conversation().unwrap();
    assert_eq!(session.derive_mode(&no_route()), Mode::ReadOnly);

    let store = session.store();
    assert!(store.get(SESSION_STATE_KEY).unwrap().is_none());
    assert!(store.get(CONVERSATION_STORAGE_KEY).unwrap().is_none());
}

#[test]
fn test_from_upload_wins_regardless_of_state() {
    let (session, _clock, _tmp) = session_at(NOW);
    let upload = RouteQuery::from_upload();

    assert_eq!(session.derive_mode(&upload), Mode::Interactive);

    session.complete_conversation().unwrap();
    assert_eq!(session.derive_mode(&upload), Mode::Interactive);

    session.store().set(SESSION_STATE_KEY, "garbage").unwrap();
    assert_eq!(session.derive_mode(&upload), Mode::Interactive);
    // Cleanup still ran before the route hint was honoured.
    assert!(session.store().get(SESSION_STATE_KEY).unwrap().is_none());
}

#[test]
fn test_reset_returns_to_read_only() {
    let (session, _clock, _tmp) = session_at(NOW);
    session
        .activate_interactive_mode(ActivateOptions::default())
        .unwrap();
    session.reset_to_read_only_mode().unwrap();
    assert_eq!(session.derive_mode(&no_route()), Mode::ReadOnly);
}

#[test]
fn test_conversation_history_alone_is_interactive() {
    let (session, _clock, _tmp) = session_at(NOW);
    session
        .append_conversation_message(json!({"role": "assistant", "content": "hello"}))
        .unwrap();
    assert_eq!(session.derive_mode(&no_route()), Mode::Interactive);
}

#[test]
fn test_abandoned_session_expires_as_clock_advances() {
    let (session, clock, _tmp) = session_at(NOW);
    session
        .activate_interactive_mode(ActivateOptions::default())
        .unwrap();

    clock.advance(Duration::from_millis(EXPIRY_WINDOW_MS as u64));
    assert_eq!(session.derive_mode(&no_route()), Mode::Interactive);

    clock.advance(Duration::from_millis(1));
    assert_eq!(session.derive_mode(&no_route()), Mode::ReadOnly);
    assert!(session.session_record().is_none());
}

#[test]
fn test_state_survives_reopening_the_store() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("state.db");

    {
        let session = DashboardSession::new(SledStore::open(&path).unwrap());
        session
            .activate_interactive_mode(ActivateOptions::with_session_id("persisted"))
            .unwrap();
    }

    let session = DashboardSession::new(SledStore::open(&path).unwrap());
    assert_eq!(session.derive_mode(&no_route()), Mode::Interactive);
    assert_eq!(
        session.session_record().unwrap().session_id(),
        Some(&SessionId::from("persisted"))
    );
}

#[test]
fn test_permissions_follow_derived_mode() {
    let (session, _clock, _tmp) = session_at(NOW);
    assert_eq!(session.permissions(&no_route()), permissions_for(Mode::ReadOnly));

    session
        .activate_interactive_mode(ActivateOptions::default())
        .unwrap();
    let interactive = session.permissions(&no_route());
    assert!(interactive.can_chat);
    assert!(!interactive.can_refresh_suggestion);
    assert!(interactive.can_view_historical_data);

    let read_only = permissions_for(Mode::ReadOnly);
    assert!(!read_only.can_chat);
    assert!(read_only.can_view_historical_data);
}

#[test]
fn test_permissions_serialize_with_dashboard_names() {
    let value = serde_json::to_value(permissions_for(Mode::Interactive)).unwrap();
    assert_eq!(value["canChat"], true);
    assert_eq!(value["canViewRealtimeKPI"], true);
    assert_eq!(value["canRefreshSuggestion"], false);
}
