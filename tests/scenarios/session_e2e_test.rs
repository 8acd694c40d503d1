use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use trellis_core::testing::ScriptedOracle;
use trellis_core::{PipelineError, Role, SessionId};
use trellis_dsl::Plan;
use trellis_tests::{plans, turn, TestPipeline};

fn three_turns() -> ScriptedOracle {
    let mut script = Vec::new();
    script.extend(turn(&plans::login_form(), "Login form."));
    script.extend(turn(&plans::dashboard(), "Dashboard."));
    script.extend(turn(&plans::single_button("Back"), "Back button."));
    ScriptedOracle::answering(script)
}

#[tokio::test]
async fn test_rollback_then_generate_appends() {
    let pipeline = TestPipeline::new(three_turns());
    let id = SessionId::from("history");
    let service = &pipeline.service;

    service.generate(&id, "a login form").await.unwrap();
    service.generate(&id, "a dashboard").await.unwrap();

    let rolled = service.rollback(&id, 0).await.unwrap();
    assert_eq!(rolled.version_index, 0);
    assert_eq!(rolled.total_versions, 2);
    assert_eq!(rolled.plan, Plan::from_value(plans::login_form()));

    let reloaded = service.snapshot(&id).await.unwrap();
    assert_eq!(reloaded.current_version_index, 0);
    assert_eq!(reloaded.code, rolled.code);

    let outcome = service.generate(&id, "add a back button").await.unwrap();
    assert_eq!(outcome.version_index, 2);
    assert_eq!(outcome.total_versions, 3);

    // The third planner call modified the rolled-back plan, not the dashboard
    let calls = pipeline.oracle.calls().await;
    let planner_context = &calls[4].context;
    assert!(planner_context.contains("CURRENT UI PLAN"));
    assert!(planner_context.contains("Enter your email"));
    assert!(!planner_context.contains("Revenue"));

    let versions = service.versions(&id).await.unwrap();
    let prompts: Vec<&str> = versions.iter().map(|v| v.prompt.as_str()).collect();
    assert_eq!(prompts, vec!["a login form", "a dashboard", "add a back button"]);
    assert!(versions.iter().enumerate().all(|(i, v)| v.index == i));

    let snapshot = service.snapshot(&id).await.unwrap();
    assert_eq!(snapshot.current_version_index, 2);
    assert_eq!(snapshot.history.len(), 6);
    assert_eq!(snapshot.history[5].role, Role::Assistant);
    assert_eq!(snapshot.history[5].content, "Generated UI based on: \"add a back button\"");
}

#[tokio::test]
async fn test_rollback_bounds_leave_session_untouched() {
    let pipeline = TestPipeline::new(ScriptedOracle::answering(turn(&plans::login_form(), "Login form.")));
    let id = SessionId::default_session();
    let service = &pipeline.service;

    let err = service.rollback(&id, 0).await.unwrap_err();
    assert_eq!(err, PipelineError::InvalidInput("Invalid version index".to_string()));
    assert!(!pipeline.store.contains(&id).await);

    service.generate(&id, "a login form").await.unwrap();
    for index in [-1, 1, 42] {
        assert!(matches!(
            service.rollback(&id, index).await,
            Err(PipelineError::InvalidInput(_))
        ));
    }

    let snapshot = service.snapshot(&id).await.unwrap();
    assert_eq!(snapshot.current_version_index, 0);
    assert_eq!(snapshot.versions.len(), 1);
}

#[tokio::test]
async fn test_reset_starts_over() {
    let mut script = Vec::new();
    script.extend(turn(&plans::login_form(), "Login form."));
    script.extend(turn(&plans::single_button("Fresh"), "A button."));
    let pipeline = TestPipeline::new(ScriptedOracle::answering(script));
    let id = SessionId::from("reset-me");
    let service = &pipeline.service;

    service.generate(&id, "a login form").await.unwrap();
    service.reset(&id).await.unwrap();
    service.reset(&id).await.unwrap();

    let snapshot = service.snapshot(&id).await.unwrap();
    assert!(snapshot.history.is_empty());
    assert!(snapshot.versions.is_empty());
    assert_eq!(snapshot.code, "");
    assert_eq!(snapshot.current_version_index, -1);

    let outcome = service.generate(&id, "a button").await.unwrap();
    assert_eq!(outcome.version_index, 0);

    let calls = pipeline.oracle.calls().await;
    assert!(calls[2].context.starts_with("USER'S UI REQUEST: a button"));
}

#[tokio::test]
async fn test_sessions_do_not_share_history() {
    let mut script = Vec::new();
    script.extend(turn(&plans::login_form(), "Login form."));
    script.extend(turn(&plans::dashboard(), "Dashboard."));
    let pipeline = TestPipeline::new(ScriptedOracle::answering(script));

    pipeline.service.generate(&SessionId::from("a"), "a login form").await.unwrap();
    let outcome = pipeline.service.generate(&SessionId::from("b"), "a dashboard").await.unwrap();
    assert_eq!(outcome.version_index, 0);

    let calls = pipeline.oracle.calls().await;
    assert!(!calls[2].context.contains("CONVERSATION HISTORY"));
    assert_eq!(pipeline.store.session_count().await, 2);
}

#[tokio::test]
async fn test_concurrent_generations_on_one_session_are_serialized() {
    let mut script = Vec::new();
    script.extend(turn(&plans::login_form(), "Login form."));
    script.extend(turn(&plans::single_button("Second"), "A button."));
    let oracle = ScriptedOracle::answering(script).with_delay(Duration::from_millis(20));
    let pipeline = Arc::new(TestPipeline::new(oracle));
    let id = SessionId::from("busy");

    let mut handles = Vec::new();
    for prompt in ["first request", "second request"] {
        let pipeline = pipeline.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            pipeline.service.generate(&id, prompt).await
        }));
    }

    let mut indices = Vec::new();
    for handle in handles {
        indices.push(handle.await.unwrap().unwrap().version_index);
    }
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1]);

    // Whichever ran second saw the first one's plan as its live plan
    let calls = pipeline.oracle.calls().await;
    assert_eq!(calls.len(), 4);
    assert!(!calls[0].context.contains("CURRENT UI PLAN"));
    assert!(calls[2].context.contains("CURRENT UI PLAN"));

    let snapshot = pipeline.service.snapshot(&id).await.unwrap();
    assert_eq!(snapshot.versions.len(), 2);
    assert_eq!(snapshot.history.len(), 4);
}
