use fleetrec::recorder::session::{RecordingSession, SessionState, StatusToken};

#[test]
fn status_tokens_match_the_wire_protocol() {
    assert_eq!(StatusToken::Running.as_str(), "RUNNING");
    assert_eq!(StatusToken::Idle.as_str(), "IDLE");
    assert_eq!(StatusToken::Stopped.as_str(), "STOPPED");
    assert_eq!(StatusToken::Unknown.as_str(), "UNKNOWN");
    assert_eq!(StatusToken::Running.to_string(), "RUNNING");
}

#[test]
fn new_session_is_idle_with_no_pair() {
    let session = RecordingSession::new();
    assert_eq!(session.state, SessionState::Idle);
    assert!(session.pair.is_none());
    assert!(session.started_at.is_none());
    assert_eq!(session.status_token(), StatusToken::Idle);
}

#[test]
fn only_running_state_reports_running() {
    let mut session = RecordingSession::new();

    session.state = SessionState::Starting;
    assert_eq!(session.status_token(), StatusToken::Idle);

    session.state = SessionState::Running;
    assert_eq!(session.status_token(), StatusToken::Running);

    session.state = SessionState::Stopping;
    assert_eq!(session.status_token(), StatusToken::Idle);
}

#[test]
fn reset_clears_start_time_and_state() {
    let mut session = RecordingSession::new();
    session.state = SessionState::Running;
    session.started_at = Some(chrono::Utc::now());

    session.reset_to_idle();
    assert_eq!(session.state, SessionState::Idle);
    assert!(session.started_at.is_none());
    assert!(session.pair.is_none());
}

#[test]
fn session_states_have_lowercase_names() {
    assert_eq!(SessionState::Idle.to_string(), "idle");
    assert_eq!(SessionState::Starting.to_string(), "starting");
    assert_eq!(SessionState::Running.to_string(), "running");
    assert_eq!(SessionState::Stopping.to_string(), "stopping");
}
