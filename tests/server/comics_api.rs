use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use comicgen::domain::comics::{GeneratedImage, PanelDimensions};
use comicgen::domain::errors::GenerationError;
use comicgen::domain::generator::ImageGenerator;
use reqwest::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{
    TEST_API_KEY, TEXT_TO_IMAGE_PATH, artifact_response, post_comic, spawn_app,
    spawn_app_with_generator, spawn_app_with_options,
};

#[tokio::test]
async fn generate_comic_returns_data_uris() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .respond_with(artifact_response("AAAA"))
        .expect(2)
        .mount(&app.mock_server)
        .await;

    let response = post_comic(
        &app,
        &json!({"prompt": "hero", "style": "Japanese", "grid_type": 0, "num_panels": 2}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body,
        json!({
            "images": ["data:image/png;base64,AAAA", "data:image/png;base64,AAAA"]
        })
    );
}

#[tokio::test]
async fn generate_comic_sends_fixed_generation_parameters() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(artifact_response("AAAA"))
        .mount(&app.mock_server)
        .await;

    let response = post_comic(&app, &json!({"prompt": "a<b>c", "num_panels": 1})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let requests = app.upstream_requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        json!({
            "text_prompts": [{"text": "abc, Japanese comic style"}],
            "cfg_scale": 7,
            "height": 1024,
            "width": 1024,
            "samples": 1,
            "steps": 30
        })
    );
}

#[tokio::test]
async fn generate_comic_resolves_panel_sizes_in_order() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(artifact_response("AAAA"))
        .mount(&app.mock_server)
        .await;

    let response = post_comic(
        &app,
        &json!({
            "prompt": "hero",
            "style": "Noir",
            "num_panels": 3,
            "panel_sizes": [
                {"width": 1344, "height": 768},
                {"width": 999, "height": 999}
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let sizes: Vec<(u64, u64)> = app
        .upstream_requests()
        .await
        .iter()
        .map(|body| {
            (
                body["width"].as_u64().unwrap(),
                body["height"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(sizes, vec![(1344, 768), (1024, 1024), (1024, 1024)]);
}

#[tokio::test]
async fn generate_comic_tolerates_unreadable_panel_sizes() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(artifact_response("AAAA"))
        .expect(5)
        .mount(&app.mock_server)
        .await;

    let response = post_comic(
        &app,
        &json!({
            "prompt": "hero",
            "num_panels": 4,
            "panel_sizes": [
                {"width": -5, "height": 1024},
                {"width": 1152.5, "height": 896},
                {"width": "1344", "height": 768},
                null
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    for body in app.upstream_requests().await {
        assert_eq!((body["width"].as_u64(), body["height"].as_u64()), (Some(1024), Some(1024)));
    }

    let response = post_comic(
        &app,
        &json!({"prompt": "hero", "num_panels": 1, "panel_sizes": {"width": 1344}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn generate_comic_defaults_to_four_panels() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .and(body_partial_json(
            json!({"text_prompts": [{"text": "hero, Japanese comic style"}]}),
        ))
        .respond_with(artifact_response("BBBB"))
        .expect(4)
        .mount(&app.mock_server)
        .await;

    let response = post_comic(&app, &json!({"prompt": "hero"})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["images"].as_array().map(Vec::len), Some(4));
}

#[tokio::test]
async fn upstream_failure_aborts_remaining_panels() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(artifact_response("AAAA"))
        .up_to_n_times(1)
        .mount(&app.mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("engine exploded"))
        .mount(&app.mock_server)
        .await;

    let response = post_comic(&app, &json!({"prompt": "hero", "num_panels": 4})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.expect("Failed to parse response");
    let detail = body["detail"].as_str().expect("detail should be a string");
    assert!(detail.contains("engine exploded"), "unexpected detail: {detail}");
    assert!(body.get("images").is_none());

    assert_eq!(app.upstream_requests().await.len(), 2);
}

#[tokio::test]
async fn upstream_auth_error_is_reported_with_status() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"name": "unauthorized", "message": "bad key"})),
        )
        .mount(&app.mock_server)
        .await;

    let response = post_comic(&app, &json!({"prompt": "hero", "num_panels": 2})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("Failed to parse response");
    let detail = body["detail"].as_str().unwrap_or_default();
    assert!(detail.contains("401"), "unexpected detail: {detail}");
    assert!(detail.contains("bad key"), "unexpected detail: {detail}");

    assert_eq!(app.upstream_requests().await.len(), 1);
}

#[tokio::test]
async fn upstream_without_artifacts_is_an_error() {
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"artifacts": []})))
        .mount(&app.mock_server)
        .await;

    let response = post_comic(&app, &json!({"prompt": "hero", "num_panels": 1})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(
        body["detail"]
            .as_str()
            .is_some_and(|d| d.contains("no artifacts"))
    );
}

#[tokio::test]
async fn upstream_timeout_fails_the_request() {
    let app = spawn_app_with_options(false, Duration::from_millis(200)).await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(artifact_response("AAAA").set_delay(Duration::from_secs(3)))
        .mount(&app.mock_server)
        .await;

    let response = post_comic(&app, &json!({"prompt": "hero", "num_panels": 3})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.upstream_requests().await.len(), 1);
}

#[tokio::test]
async fn parallel_panels_keep_the_response_contract() {
    let app = spawn_app_with_options(true, Duration::from_secs(30)).await;

    Mock::given(method("POST"))
        .and(path(TEXT_TO_IMAGE_PATH))
        .respond_with(artifact_response("CCCC"))
        .expect(3)
        .mount(&app.mock_server)
        .await;

    let response = post_comic(&app, &json!({"prompt": "hero", "num_panels": 3})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["images"],
        json!([
            "data:image/png;base64,CCCC",
            "data:image/png;base64,CCCC",
            "data:image/png;base64,CCCC"
        ])
    );
}

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app().await;

    let response = reqwest::get(app.url("/health"))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
}

struct PanickingGenerator;

#[async_trait]
impl ImageGenerator for PanickingGenerator {
    async fn generate(
        &self,
        _prompt: &str,
        _style: &str,
        _dimensions: PanelDimensions,
    ) -> Result<GeneratedImage, GenerationError> {
        panic!("generator exploded");
    }
}

#[tokio::test]
async fn handler_panic_becomes_generic_server_error() {
    let app = spawn_app_with_generator(Arc::new(PanickingGenerator)).await;

    let response = post_comic(&app, &json!({"prompt": "hero", "num_panels": 1})).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({"detail": "internal server error"}));

    let response = reqwest::get(app.url("/health"))
        .await
        .expect("Server should keep serving after a panic");
    assert_eq!(response.status(), StatusCode::OK);
}
