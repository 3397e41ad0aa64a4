//! Session client behaviour against a scripted transport.

mod common;

use akinator::{AkinatorError, Answer, AnswerInput, RejectionKind, TransportErrorKind};
use common::{Reply, ScriptedTransport, TEST_HOST, query};

#[tokio::test]
async fn test_bootstrap_populates_session() {
    let transport = ScriptedTransport::new();
    let aki = common::started(&transport).await;

    let session = aki.session().expect("Session should be active");
    assert_eq!(session.server().as_str(), TEST_HOST);
    assert_eq!(session.session_id(), "42");
    assert_eq!(session.signature(), "99");
    assert_eq!(session.question(), "Is it a human?");
    assert_eq!(session.progression(), 0.0);
    assert_eq!(session.step(), 0);
    assert!(session.last_guess().is_none());

    let requests = transport.requests();
    assert_eq!(requests.len(), 2, "Identity fetch plus session creation");
    assert_eq!(requests[0].as_str(), "https://en.akinator.com/game");

    let create = &requests[1];
    assert_eq!(create.host_str(), Some("aki.test"));
    assert_eq!(create.port(), Some(9000));
    assert_eq!(create.path(), "/ws/new_session");
    assert_eq!(query(create, "uid_ext_session").as_deref(), Some("U1"));
    assert_eq!(query(create, "frontaddr").as_deref(), Some("F1"));
    assert_eq!(query(create, "partner").as_deref(), Some("1"));
    assert_eq!(query(create, "player").as_deref(), Some("website-desktop"));
}

#[tokio::test]
async fn test_answer_yes_end_to_end() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;

    transport.push_document(common::step_ok("Is it male?", "10.5", 1));
    let question = aki.answer(Answer::Yes).await.expect("Answer should succeed");
    assert_eq!(question, "Is it male?");

    let sent = transport.last_request();
    assert_eq!(sent.path(), "/ws/answer");
    assert_eq!(query(&sent, "answer").as_deref(), Some("0"));
    assert_eq!(query(&sent, "step").as_deref(), Some("0"));
    assert_eq!(query(&sent, "session").as_deref(), Some("42"));
    assert_eq!(query(&sent, "signature").as_deref(), Some("99"));

    assert_eq!(aki.question(), Some("Is it male?"));
    assert_eq!(aki.progression(), Some(10.5));
    assert_eq!(aki.step(), Some(1));
}

#[tokio::test]
async fn test_textual_and_numeric_answers_send_same_id() {
    let cases: [(&str, &str); 8] = [
        ("yes", "0"),
        ("N", "1"),
        ("I Don't Know", "2"),
        ("idk", "2"),
        ("p", "3"),
        ("PROBABLY NOT", "4"),
        ("pn", "4"),
        ("3", "3"),
    ];

    for (text, expected_id) in cases {
        let transport = ScriptedTransport::new();
        let mut aki = common::started(&transport).await;
        transport.push_document(common::step_ok("Next?", "5.0", 1));

        let input = AnswerInput::parse(text).expect("Token should parse");
        aki.answer(input).await.expect("Answer should succeed");
        assert_eq!(
            query(&transport.last_request(), "answer").as_deref(),
            Some(expected_id),
            "token {text:?}"
        );
    }
}

#[tokio::test]
async fn test_out_of_range_answer_makes_no_request() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;
    let before = aki.session().cloned();
    let count = transport.request_count();

    for n in [-1_i64, 5, 100, i64::MIN] {
        let result = aki.answer(n).await;
        assert!(matches!(result, Err(AkinatorError::InvalidAnswer { .. })), "{n}");
    }

    assert_eq!(transport.request_count(), count, "No request should be sent");
    assert_eq!(aki.session().cloned(), before);
}

#[tokio::test]
async fn test_operations_before_bootstrap_rejected() {
    let transport = ScriptedTransport::new();
    let mut aki = common::client(&transport);

    assert!(matches!(aki.answer(Answer::No).await, Err(AkinatorError::NotBootstrapped)));
    assert!(matches!(aki.back().await, Err(AkinatorError::NotBootstrapped)));
    assert!(matches!(aki.guess().await, Err(AkinatorError::NotBootstrapped)));
    assert!(!aki.is_active());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_back_on_first_question_is_local() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;
    let count = transport.request_count();

    let result = aki.back().await;
    assert!(matches!(result, Err(AkinatorError::CantGoBackAnyFurther)));
    assert_eq!(transport.request_count(), count);
    assert_eq!(aki.step(), Some(0));
}

#[tokio::test]
async fn test_back_takes_server_position() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;

    transport.push_document(common::step_ok("Is it male?", "10.5", 1));
    aki.answer(Answer::Yes).await.expect("Answer should succeed");

    // The server's idea of the previous question wins over anything cached.
    transport.push_document(common::step_ok("Is it a real person?", "2.25", 0));
    let question = aki.back().await.expect("Back should succeed");
    assert_eq!(question, "Is it a real person?");

    let sent = transport.last_request();
    assert_eq!(sent.path(), "/ws/answer");
    assert_eq!(query(&sent, "step").as_deref(), Some("1"));
    assert_eq!(query(&sent, "answer").as_deref(), Some("-1"));

    assert_eq!(aki.step(), Some(0));
    assert_eq!(aki.progression(), Some(2.25));
}

#[tokio::test]
async fn test_step_only_changes_position() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;
    let before = aki.session().cloned().expect("active");

    transport.push_document(common::step_ok("Is it male?", "10.5", 1));
    aki.answer(Answer::Probably).await.expect("Answer should succeed");
    transport.push_document(common::step_ok("Is it a human?", "0.0", 0));
    aki.back().await.expect("Back should succeed");

    let after = aki.session().expect("active");
    assert_eq!(after.server(), before.server());
    assert_eq!(after.credentials(), before.credentials());
    assert_eq!(after.identity(), before.identity());
}

#[tokio::test]
async fn test_rejection_leaves_state_unchanged() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;
    transport.push_document(common::step_ok("Is it male?", "10.5", 1));
    aki.answer(Answer::Yes).await.expect("Answer should succeed");
    let before = aki.session().cloned();

    transport.push_document(common::rejected("KO - TIMEOUT"));
    let err = aki.answer(Answer::No).await.expect_err("Answer should be rejected");
    assert!(matches!(err, AkinatorError::ServerRejected { ref code } if code == "KO - TIMEOUT"));
    assert_eq!(err.rejection_kind(), Some(RejectionKind::TimedOut));
    assert_eq!(aki.session().cloned(), before);

    transport.push_document(common::rejected("KO - TECHNICAL ERROR"));
    let err = aki.back().await.expect_err("Back should be rejected");
    assert_eq!(err.rejection_code(), Some("KO - TECHNICAL ERROR"));
    assert_eq!(aki.session().cloned(), before);

    transport.push_document(common::rejected("KO - SOMETHING ODD"));
    let err = aki.guess().await.expect_err("Guess should be rejected");
    assert_eq!(err.rejection_code(), Some("KO - SOMETHING ODD"));
    assert_eq!(aki.session().cloned(), before);
}

#[tokio::test]
async fn test_non_string_completion_is_rejection() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;
    let before = aki.session().cloned();

    transport.push_document(serde_json::json!({"completion": 500}));
    let err = aki.answer(0).await.expect_err("Answer should be rejected");
    assert!(matches!(err, AkinatorError::ServerRejected { ref code } if code == "500"));
    assert_eq!(err.rejection_kind(), Some(RejectionKind::Other));
    assert_eq!(aki.session().cloned(), before);
}

#[tokio::test]
async fn test_transport_failure_leaves_state_unchanged() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;
    let before = aki.session().cloned();

    transport.push(Reply::Fail(TransportErrorKind::Timeout));
    let err = aki.answer(Answer::Yes).await.expect_err("Timeout should surface");
    assert!(matches!(
        err,
        AkinatorError::TransportFailure { ref source } if source.kind() == TransportErrorKind::Timeout
    ));
    assert_eq!(aki.session().cloned(), before);

    // Same operation may be retried.
    transport.push_document(common::step_ok("Is it male?", "10.5", 1));
    aki.answer(Answer::Yes).await.expect("Retry should succeed");
    assert_eq!(aki.step(), Some(1));
}

#[tokio::test]
async fn test_malformed_step_is_transport_failure() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;
    let before = aki.session().cloned();

    transport.push_document(serde_json::json!({
        "completion": "OK",
        "parameters": {"question": "Half a reply", "step": "1"}
    }));
    let err = aki.answer(Answer::Yes).await.expect_err("Missing progression");
    assert!(matches!(err, AkinatorError::TransportFailure { .. }));
    assert_eq!(aki.session().cloned(), before, "No partial update");
}

#[tokio::test]
async fn test_progression_kept_as_sent() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;

    transport.push_document(common::step_ok("Q", "97.3", 1));
    aki.answer(Answer::Yes).await.expect("Answer should succeed");
    transport.push_document(common::step_ok("Q", "64.1", 2));
    aki.answer(Answer::Yes).await.expect("Answer should succeed");

    // Decreasing progression is passed through untouched.
    assert_eq!(aki.progression(), Some(64.1));
}

#[tokio::test]
async fn test_guess_stores_top_candidate() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;

    transport.push_document(common::list_ok());
    let candidate = aki.guess().await.expect("Guess should succeed");

    assert_eq!(candidate.name(), Some("Alan Turing"));
    assert_eq!(
        candidate.get("proba").and_then(|v| v.as_str()),
        Some("0.93"),
        "Extra fields pass through"
    );
    assert_eq!(candidate.record().len(), 6);

    let stored = aki.last_guess().expect("Guess should be stored");
    assert_eq!(stored.name().as_deref(), Some("Alan Turing"));
    assert_eq!(stored.description().as_deref(), Some("Mathematician"));
    assert_eq!(
        stored.absolute_picture_path().as_deref(),
        Some("http://photos.test/turing.jpg")
    );

    let sent = transport.last_request();
    assert_eq!(sent.path(), "/ws/list");
    assert_eq!(query(&sent, "step").as_deref(), Some("0"));
    assert_eq!(aki.step(), Some(0), "Guess does not advance the step");
}

#[tokio::test]
async fn test_guess_repeatable() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;

    transport.push_document(common::list_ok());
    transport.push_document(common::list_ok());
    let first = aki.guess().await.expect("First guess");
    let second = aki.guess().await.expect("Second guess");
    assert_eq!(first, second);
    assert_eq!(aki.question(), Some("Is it a human?"));
}

#[tokio::test]
async fn test_candidates_do_not_store_guess() {
    let transport = ScriptedTransport::new();
    let aki = common::started(&transport).await;

    transport.push_document(common::list_ok());
    let candidates = aki.candidates().await.expect("List should succeed");
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[1].name(), Some("Ada Lovelace"));
    assert!(aki.last_guess().is_none());
}

#[tokio::test]
async fn test_guess_ignores_malformed_entries_below_top() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;

    transport.push_document(serde_json::json!({
        "completion": "OK",
        "parameters": {"elements": [
            {"element": {
                "name": "Alan Turing",
                "description": "Mathematician",
                "absolute_picture_path": "http://photos.test/turing.jpg"
            }},
            {"unexpected": 1}
        ]}
    }));
    let candidate = aki.guess().await.expect("Guess should succeed");
    assert_eq!(candidate.name(), Some("Alan Turing"));
    assert_eq!(
        aki.last_guess().and_then(|g| g.name().clone()).as_deref(),
        Some("Alan Turing")
    );
}

#[tokio::test]
async fn test_guess_keeps_null_description() {
    let transport = ScriptedTransport::new();
    let mut aki = common::started(&transport).await;

    transport.push_document(serde_json::json!({
        "completion": "OK",
        "parameters": {"elements": [
            {"element": {
                "name": "Alan Turing",
                "description": null,
                "absolute_picture_path": "http://photos.test/turing.jpg"
            }}
        ]}
    }));
    let candidate = aki.guess().await.expect("Guess should succeed");
    assert_eq!(candidate.get("description"), Some(&serde_json::Value::Null));

    let stored = aki.last_guess().expect("Guess should be stored");
    assert_eq!(stored.name().as_deref(), Some("Alan Turing"));
    assert!(stored.description().is_none());
}
