// end-to-end turn handling: session + gemini client + post-filter

mod common;

use common::{MockGemini, error_reply, text_reply};
use serde_json::json;
use sopbot::{Error, Role, Session, Turn};
use std::time::Duration;

const REMINDER: &str =
    "\n\n⚠️ REMINDER: This is EXPLANATION ONLY. Consult your supervisor for approval.";

#[tokio::test]
async fn test_clean_answer_stored_as_is() {
    let answer = "Lockout-tagout (LOTO) keeps machines from starting during maintenance.\n\
                  - Shut the machine down\n\
                  - Isolate and lock every energy source\n\
                  For specific approvals, consult your supervisor.";
    let mock = MockGemini::start(vec![text_reply(answer)]).await;
    let chat = mock.chat();
    let mut session = Session::new();

    let reply = chat
        .send(&mut session, "Explain lockout-tagout in simple terms")
        .await
        .unwrap();

    assert_eq!(reply.text, answer);
    assert!(reply.trigger.is_none());
    assert_eq!(
        session.all(),
        &[
            Turn::user("Explain lockout-tagout in simple terms"),
            Turn::assistant(answer),
        ]
    );
}

#[tokio::test]
async fn test_triggered_answer_gets_reminder() {
    let answer = "No. You can only work on the machine after it is locked out.";
    let mock = MockGemini::start(vec![text_reply(answer)]).await;
    let chat = mock.chat();
    let mut session = Session::new();

    let reply = chat
        .send(&mut session, "Can I bypass the lockout?")
        .await
        .unwrap();

    let expected = format!("{answer}{REMINDER}");
    assert_eq!(reply.text, expected);
    assert_eq!(reply.trigger, Some("you can"));
    assert_eq!(session.len(), 2);
    assert_eq!(session.all()[1].role(), Role::Assistant);
    assert_eq!(session.all()[1].text(), expected);
}

#[tokio::test]
async fn test_third_call_replays_first_two_turns() {
    let mock = MockGemini::start(vec![
        text_reply("answer one"),
        text_reply("answer two, you can ask more"),
        text_reply("answer three"),
    ])
    .await;
    let chat = mock.chat();
    let mut session = Session::new();

    chat.send(&mut session, "question one").await.unwrap();
    chat.send(&mut session, "question two").await.unwrap();
    chat.send(&mut session, "question three").await.unwrap();

    let bodies = mock.bodies();
    assert_eq!(bodies.len(), 3);

    // stored (filtered) text is what gets replayed
    assert_eq!(
        bodies[2]["contents"],
        json!([
            {"role": "user", "parts": [{"text": "question one"}]},
            {"role": "model", "parts": [{"text": "answer one"}]},
            {"role": "user", "parts": [{"text": "question two"}]},
            {"role": "model", "parts": [{"text": format!("answer two, you can ask more{REMINDER}")}]},
            {"role": "user", "parts": [{"text": "question three"}]},
        ])
    );
    assert_eq!(
        bodies[0]["contents"],
        json!([{"role": "user", "parts": [{"text": "question one"}]}])
    );
    assert_eq!(session.len(), 6);
}

#[tokio::test]
async fn test_failed_call_keeps_user_turn_only() {
    let mock = MockGemini::start(vec![error_reply(503, "UNAVAILABLE", "overloaded")]).await;
    let chat = mock.chat();
    let mut session = Session::new();

    let err = chat
        .send(&mut session, "What safety gear is used near heavy machines?")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ServiceUnavailable(_)));
    assert!(err.is_turn_failure());
    assert_eq!(
        session.all(),
        &[Turn::user("What safety gear is used near heavy machines?")]
    );
}

#[tokio::test]
async fn test_resubmit_after_failure() {
    let mock = MockGemini::start(vec![
        error_reply(500, "INTERNAL", "boom"),
        text_reply("Wear a hard hat."),
    ])
    .await;
    let chat = mock.chat();
    let mut session = Session::new();

    assert!(chat.send(&mut session, "PPE?").await.is_err());
    let reply = chat.send(&mut session, "PPE?").await.unwrap();
    assert_eq!(reply.text, "Wear a hard hat.");

    // the failed question stays, then the retry and its answer
    let roles: Vec<Role> = session.all().iter().map(Turn::role).collect();
    assert_eq!(roles, vec![Role::User, Role::User, Role::Assistant]);
}

#[tokio::test]
async fn test_timeout_keeps_user_turn_only() {
    let mock =
        MockGemini::start(vec![text_reply("too late").delayed(Duration::from_secs(3))]).await;
    let config = sopbot::ModelConfig {
        timeout: Duration::from_millis(200),
        ..mock.config()
    };
    let gemini = sopbot::Gemini::new(
        config,
        sopbot::Credential::new(common::TEST_KEY).unwrap(),
    )
    .unwrap();
    let chat = sopbot::Chat::new(gemini);
    let mut session = Session::new();

    let err = chat
        .send(&mut session, "Summarize emergency shutdown procedure")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
    assert_eq!(session.len(), 1);
}

#[tokio::test]
async fn test_blank_prompt_rejected() {
    let mock = MockGemini::start(vec![text_reply("unused")]).await;
    let chat = mock.chat();
    let mut session = Session::new();

    let err = chat.send(&mut session, "   \n").await.unwrap_err();
    assert!(matches!(err, Error::EmptyPrompt));
    assert!(session.is_empty());
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_complete_then_record() {
    let mock = MockGemini::start(vec![text_reply("Permission granted.")]).await;
    let chat = mock.chat();
    let mut session = Session::new();
    session.append(Turn::user("Can I start the lathe?"));

    let raw = chat.complete(&session).await.unwrap();
    assert_eq!(raw, "Permission granted.");
    // nothing stored until record
    assert_eq!(session.len(), 1);

    let reply = chat.record(&mut session, raw, Duration::from_millis(5));
    assert_eq!(reply.trigger, Some("permission granted"));
    assert_eq!(session.last().unwrap().text(), format!("Permission granted.{REMINDER}"));
}

#[tokio::test]
async fn test_complete_on_empty_session() {
    let mock = MockGemini::start(vec![text_reply("unused")]).await;
    let chat = mock.chat();
    let session = Session::new();

    assert!(matches!(
        chat.complete(&session).await,
        Err(Error::EmptyPrompt)
    ));
    assert_eq!(mock.request_count(), 0);
}
