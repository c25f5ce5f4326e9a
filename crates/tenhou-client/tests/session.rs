//! Integration tests for the session state machine: lobby, reservation,
//! play, and the ways a run ends.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{final_ryuukyoku, go, helo, line, test_config, Incoming, ScriptedConnection};
use serde_json::json;
use tenhou_client::prelude::*;

fn client(conn: &ScriptedConnection, config: ClientConfig) -> TenhouClient<ScriptedConnection> {
    TenhouClient::with_connection(
        conn.clone(),
        config,
        ActionRouter::standard(Arc::new(Tsumogiri)),
    )
}

// =========================================================================
// Lobby
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_login_fails_after_three_silent_receives() {
    let conn = ScriptedConnection::new(vec![Incoming::Timeout; 3]);
    let client = client(&conn, test_config());

    let err = client.run_forever().await.unwrap_err();

    assert!(matches!(err, ClientError::LoginFailed { attempts: 3 }));
    assert_eq!(conn.sent_tags(), vec!["HELO"]);
    assert!(conn.is_closed());
    assert_eq!(client.stage(), Stage::Terminated);
    assert!(!client.flags().is_running());
}

#[tokio::test(start_paused = true)]
async fn test_helo_carries_user_and_attribute() {
    let conn = ScriptedConnection::new([]);
    let config = ClientConfig {
        user_id: "ID0123-abcd".into(),
        user_sx: "F".into(),
        ..test_config()
    };
    let client = client(&conn, config);

    let _ = client.run_forever().await;

    let helo = &conn.sent_actions()[0];
    assert_eq!(helo.get_str("name").unwrap(), "ID0123-abcd");
    assert_eq!(helo.get_str("sx").unwrap(), "F");
}

#[tokio::test(start_paused = true)]
async fn test_helo_without_uname_is_fatal() {
    let conn = ScriptedConnection::new([line(json!({"tag": "HELO"}))]);
    let client = client(&conn, test_config());

    let err = client.run_forever().await.unwrap_err();

    assert!(matches!(err, ClientError::Protocol(_)));
    assert!(conn.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_lines_are_dropped() {
    let conn = ScriptedConnection::new([
        Incoming::Line("not json".into()),
        Incoming::Line(String::new()),
        helo(),
        Incoming::Closed,
    ]);
    let client = client(&conn, test_config());

    let err = client.run_forever().await.unwrap_err();

    // HELO was the third receive, within the budget of three.
    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(conn.sent_tags(), vec!["HELO", "JOIN"]);
}

// =========================================================================
// Reservation
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_matching_fails_after_thirty_silent_receives() {
    let conn = ScriptedConnection::new([helo()]);
    let client = client(&conn, test_config());

    let err = client.run_forever().await.unwrap_err();

    assert!(matches!(err, ClientError::MatchingFailed { attempts: 30 }));
    assert_eq!(conn.sent_tags(), vec!["HELO", "JOIN"]);
    assert!(conn.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_join_sets_rated_bit_outside_test_play() {
    let conn = ScriptedConnection::new([helo(), Incoming::Closed]);
    let config = ClientConfig {
        lobby: 0,
        game_type: 64,
        test_play: false,
        ..test_config()
    };
    let client = client(&conn, config);

    let _ = client.run_forever().await;

    let join = &conn.sent_actions()[1];
    assert_eq!(join.tag(), "JOIN");
    assert_eq!(join.get_str("t").unwrap(), "0,65");
}

#[tokio::test(start_paused = true)]
async fn test_join_in_test_play_keeps_game_type() {
    let conn = ScriptedConnection::new([helo(), Incoming::Closed]);
    let client = client(&conn, test_config());

    let _ = client.run_forever().await;

    assert_eq!(conn.sent_actions()[1].get_str("t").unwrap(), "0,64");
}

#[tokio::test(start_paused = true)]
async fn test_server_close_is_fatal() {
    let conn = ScriptedConnection::new([helo(), Incoming::Timeout, Incoming::Closed]);
    let client = client(&conn, test_config());

    let err = client.run_forever().await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::Transport(TransportError::ConnectionClosed(_))
    ));
    assert_eq!(client.stage(), Stage::Terminated);
}

// =========================================================================
// Play
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_full_match_then_next_login() {
    let conn = ScriptedConnection::new([
        helo(),
        go(),
        line(json!({"tag": "TAIKYOKU", "oya": "0"})),
        line(json!({"tag": "INIT", "seed": "0,0,0,1,2,3", "ten": "250,250,250,250"})),
        line(json!({"tag": "T52"})),
        line(json!({"tag": "U"})),
        line(json!({"tag": "E34", "t": "1"})),
        line(json!({"tag": "F"})),
        line(json!({"tag": "AGARI", "ba": "0,0", "who": "2", "fromWho": "1"})),
        line(json!({"tag": "T10"})),
        final_ryuukyoku(),
    ]);
    let client = client(&conn, test_config());

    let err = client.run_forever().await.unwrap_err();

    // The match ended cleanly; the run only stopped because nobody
    // answered the second HELO.
    assert!(matches!(err, ClientError::LoginFailed { .. }));
    assert_eq!(
        conn.sent_tags(),
        vec!["HELO", "JOIN", "GOK", "NEXTREADY", "D", "N", "NEXTREADY", "D", "HELO"]
    );
    let sent = conn.sent_actions();
    assert_eq!(sent[4], Action::discard(52));
    assert_eq!(sent[7], Action::discard(10));
    assert!(!client.flags().in_game());
}

#[tokio::test(start_paused = true)]
async fn test_replies_are_paced() {
    let conn = ScriptedConnection::new([
        helo(),
        go(),
        line(json!({"tag": "T7"})),
        final_ryuukyoku(),
    ]);
    let client = client(&conn, test_config());
    let start = tokio::time::Instant::now();

    let _ = client.run_forever().await;

    // Two 1 s send delays per login plus at least 1 s before each of
    // NEXTREADY and the discard.
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(conn.sent_tags()[..5], ["HELO", "JOIN", "GOK", "NEXTREADY", "D"]);
}

#[tokio::test(start_paused = true)]
async fn test_custom_handler_overrides_standard_router() {
    let conn = ScriptedConnection::new([
        helo(),
        go(),
        line(json!({"tag": "TAIKYOKU", "oya": "0"})),
        final_ryuukyoku(),
    ]);
    let router = ActionRouter::standard(Arc::new(Tsumogiri)).on(
        "taikyoku",
        |_: &Action, _: &SessionFlags| {
            Ok(vec![Outgoing::immediate(Action::new("CHAT").with("text", "gl"))])
        },
    );
    let client = TenhouClient::with_connection(conn.clone(), test_config(), router);

    let _ = client.run_forever().await;

    assert_eq!(
        conn.sent_tags(),
        vec!["HELO", "JOIN", "GOK", "NEXTREADY", "CHAT", "HELO"]
    );
}

// =========================================================================
// Shutdown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_handle_stops_run_cleanly() {
    // Nothing after HELO, so the client sits in the 30-receive JOIN wait.
    let conn = ScriptedConnection::new([helo()]);
    let client = client(&conn, test_config());
    let shutdown = client.shutdown_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown.shutdown();
    });
    let start = tokio::time::Instant::now();

    client.run_forever().await.expect("interrupt is not an error");

    assert!(start.elapsed() < Duration::from_secs(7));
    assert!(conn.is_closed());
    assert_eq!(client.stage(), Stage::Terminated);
    assert_eq!(conn.sent_tags(), vec!["HELO", "JOIN"]);
}

#[tokio::test(start_paused = true)]
async fn test_keep_alive_pings_during_long_reservation() {
    let conn = ScriptedConnection::new([helo()]);
    let client = client(&conn, test_config());

    let _ = client.run_forever().await;

    // The JOIN wait alone lasts 15 s with the client in lobby.
    assert!(conn.pings() >= 2, "pings: {}", conn.pings());
}
