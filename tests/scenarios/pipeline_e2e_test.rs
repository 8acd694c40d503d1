use pretty_assertions::assert_eq;
use serde_json::json;
use trellis_core::testing::ScriptedOracle;
use trellis_core::{GenerationConfig, PipelineError, SessionId};
use trellis_dsl::{compile, CompiledArtifact, Plan};
use trellis_stdlib::{render, Rendered};
use trellis_tests::{plans, turn, TestPipeline};

#[tokio::test]
async fn test_login_form_from_prompt_to_preview() {
    let pipeline = TestPipeline::new(ScriptedOracle::answering(turn(
        &plans::login_form(),
        "A centered login card with email and password fields.",
    )));
    let id = SessionId::default_session();

    let outcome = pipeline.service.generate(&id, "a login form").await.unwrap();
    assert_eq!(outcome.version_index, 0);
    assert_eq!(outcome.total_versions, 1);

    let tree = match render(&outcome.code).unwrap() {
        Rendered::Tree(tree) => tree,
        Rendered::Empty => panic!("login form rendered nothing:\n{}", outcome.code),
    };
    let inputs = tree.find_all("input");
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].get_attribute("type"), Some("email"));
    assert_eq!(inputs[1].get_attribute("type"), Some("password"));
    assert_eq!(tree.find_all("button")[0].text_content(), "Sign In");
    assert!(tree.text_content().contains("Login"));
}

#[tokio::test]
async fn test_stored_code_matches_fresh_compilation() {
    let pipeline = TestPipeline::new(ScriptedOracle::answering(turn(&plans::dashboard(), "A dashboard.")));
    let id = SessionId::from("dash");

    let outcome = pipeline.service.generate(&id, "a sales dashboard").await.unwrap();
    let recompiled = compile(Some(&Plan::from_value(plans::dashboard())));
    assert_eq!(outcome.code, recompiled.code);

    let snapshot = pipeline.service.snapshot(&id).await.unwrap();
    assert_eq!(snapshot.code, recompiled.code);
    assert_eq!(
        recompiled.used_components,
        vec!["Container", "Navbar", "Typography", "Grid", "Card", "Chart", "Table"]
    );

    let first = render(&outcome.code).unwrap();
    let second = render(&outcome.code).unwrap();
    assert_eq!(first, second);
    assert!(first.tree().unwrap().find_all("table").len() == 1);
}

#[tokio::test]
async fn test_unknown_component_is_corrected_on_retry() {
    let oracle = ScriptedOracle::answering([
        plans::carousel().to_string(),
        plans::single_button("Next").to_string(),
        "A single button.".to_string(),
    ]);
    let pipeline = TestPipeline::new(oracle);
    let id = SessionId::default_session();

    let outcome = pipeline.service.generate(&id, "an image carousel").await.unwrap();
    assert_eq!(outcome.plan, Plan::from_value(plans::single_button("Next")));

    let calls = pipeline.oracle.calls().await;
    assert_eq!(calls.len(), 3);
    assert!(calls[1].context.contains("Your previous output had these errors"));
    assert!(calls[1].context.contains("\"Carousel\""));
    assert!(calls[1].context.starts_with(&calls[0].context));
}

#[tokio::test]
async fn test_unknown_component_twice_commits_nothing() {
    let oracle = ScriptedOracle::answering([plans::carousel().to_string(), plans::carousel().to_string()]);
    let pipeline = TestPipeline::new(oracle);
    let id = SessionId::default_session();

    let err = pipeline.service.generate(&id, "an image carousel").await.unwrap_err();
    match err {
        PipelineError::InvalidPlan { details } => {
            assert!(details.iter().any(|d| d.contains("\"Carousel\"")));
        }
        other => panic!("expected invalid plan, got {:?}", other),
    }

    assert!(pipeline.service.versions(&id).await.unwrap().is_empty());
    assert_eq!(pipeline.service.snapshot(&id).await.unwrap().current_version_index, -1);
}

#[tokio::test]
async fn test_strict_props_reach_the_oracle_as_corrections() {
    let bad_variant = json!({ "layout": { "type": "Button", "props": { "children": "Go", "variant": "loud" } } });
    let oracle = ScriptedOracle::answering([
        bad_variant.to_string(),
        plans::single_button("Go").to_string(),
        "A button.".to_string(),
    ]);
    let pipeline = TestPipeline::with_config(
        oracle,
        GenerationConfig {
            strict_props: true,
            ..GenerationConfig::default()
        },
    );

    pipeline
        .service
        .generate(&SessionId::default_session(), "a loud button")
        .await
        .unwrap();
    let calls = pipeline.oracle.calls().await;
    assert!(calls[1].context.contains("variant"));
}

#[test]
fn test_empty_artifact_previews_placeholder() {
    let fallback = compile(None);
    assert_eq!(fallback, CompiledArtifact::fallback());
    assert!(fallback.used_components.is_empty());

    let rendered = render(&fallback.code).unwrap();
    assert_eq!(rendered.tree().unwrap().text_content(), "No UI generated yet.");
    assert_eq!(render("   \n").unwrap(), Rendered::Empty);
}

#[tokio::test]
async fn test_hostile_text_survives_as_text() {
    let hostile = "</Card><script>alert(1)</script>{window.x}";
    let plan = json!({
        "layout": {
            "type": "Card",
            "props": { "title": hostile },
            "children": [{ "type": "Typography", "props": { "children": hostile } }]
        }
    });
    let pipeline = TestPipeline::new(ScriptedOracle::answering(turn(&plan, "A card.")));

    let outcome = pipeline
        .service
        .generate(&SessionId::default_session(), "a card that says hello")
        .await
        .unwrap();

    let rendered = render(&outcome.code).unwrap();
    let tree = rendered.tree().unwrap();
    assert!(tree.find_all("script").is_empty());
    assert_eq!(tree.find_all("p")[0].text_content(), hostile);
    assert!(!rendered.to_html().contains("<script>"));
}
