pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::creative::handlers as creatives;
use crate::motiv::handlers as motiv;
use crate::pipeline::handlers as pipeline;
use crate::state::AppState;
use crate::workflow::handlers as workflow;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Prompt pipeline
        .route("/api/v1/layouts", get(pipeline::handle_list_layouts))
        .route("/api/v1/prompts", post(pipeline::handle_generate_prompts))
        .route(
            "/api/v1/prompts/quality",
            post(workflow::handle_quality_workflow),
        )
        // Image creatives
        .route("/api/v1/creatives", post(creatives::handle_generate_creative))
        .route(
            "/api/v1/creatives/from-input",
            post(creatives::handle_creative_from_input),
        )
        .route(
            "/api/v1/creatives/styled",
            post(creatives::handle_styled_creative),
        )
        .route(
            "/api/v1/creatives/recent",
            get(creatives::handle_recent_creatives),
        )
        // Motiv and copy
        .route("/api/v1/motiv", post(motiv::handle_convert_motiv))
        .route("/api/v1/motiv/scenario", post(motiv::handle_scenario_motiv))
        .route("/api/v1/texts", post(motiv::handle_generate_texts))
        .route("/api/v1/texts/feelings", get(motiv::handle_list_feelings))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::creative::generator::tests::{FakeBackend, FakeOptimizer};
    use crate::creative::generator::CreativeGenerator;
    use crate::creative::styled::StyledImageGenerator;
    use crate::motiv::scenario::ScenarioMotivGenerator;
    use crate::motiv::texts::CreativeTextGenerator;
    use crate::pipeline::catalog::LayoutCatalog;
    use crate::pipeline::MultiPromptPipeline;
    use crate::workflow::QualityWorkflow;

    fn test_state(root: &Path) -> AppState {
        let config = Config {
            openai_api_key: None,
            port: 0,
            rust_log: "info".to_string(),
            output_dir: root.to_path_buf(),
            layouts_path: None,
            target_quality_score: 85,
            max_attempts: 3,
            styled_image_model: "dall-e-3".to_string(),
        };
        let backend = Arc::new(FakeBackend::base64());
        let optimizer = Arc::new(FakeOptimizer { reply: None });
        let pipeline = MultiPromptPipeline::new(Arc::new(LayoutCatalog::default()), root);

        AppState {
            config: Arc::new(config),
            workflow: QualityWorkflow::new(pipeline.clone(), optimizer.clone()),
            texts: CreativeTextGenerator::new(optimizer.clone()),
            scenarios: ScenarioMotivGenerator::new(optimizer.clone()),
            pipeline,
            creatives: CreativeGenerator::new(backend.clone(), optimizer, root),
            styled: StyledImageGenerator::new(backend, "dall-e-3"),
        }
    }

    async fn send(root: &Path, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(test_state(root)).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_and_layouts() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(
            dir.path(),
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "creative-api");

        let (status, body) = send(
            dir.path(),
            Request::builder()
                .uri("/api/v1/layouts")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 14);
        assert_eq!(body["layouts"].as_array().unwrap().len(), 14);
    }

    #[tokio::test]
    async fn test_blank_creative_prompt_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(
            dir.path(),
            post_json("/api/v1/creatives", json!({ "prompt": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            dir.path(),
            post_json("/api/v1/creatives/styled", json!({ "prompt": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_motiv_route_detects_industry() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(
            dir.path(),
            post_json(
                "/api/v1/motiv",
                json!({ "stellentitel": "Softwareentwickler (m/w/d)", "unternehmen": "Nordlicht IT" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["industry"], "technik");
        assert!(!body["motiv"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quality_target_above_100_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(
            dir.path(),
            post_json(
                "/api/v1/prompts/quality",
                json!({ "headline": "Pflege mit Herz", "target_quality_score": 120 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_texts_routes() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(
            dir.path(),
            Request::builder()
                .uri("/api/v1/texts/feelings")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 8);

        let (status, body) = send(
            dir.path(),
            post_json(
                "/api/v1/texts",
                json!({ "unternehmen": "Klinikum Nord", "stellentitel": "Pflegefachkraft", "feeling": "heroisch" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["feeling"], "heroisch");
        assert_eq!(body["headline_source"], "template");

        let (status, body) = send(
            dir.path(),
            post_json("/api/v1/texts", json!({ "company": " ", "job_title": "Pflegefachkraft" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_scenario_route_interprets_job_title() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = send(
            dir.path(),
            post_json(
                "/api/v1/motiv/scenario",
                json!({ "scenario": "team", "company": "Klinikum Nord", "location": "Hamburg", "job_title": "Oberarzt Chirurgie", "refine": true }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["scenario"], "team");
        assert_eq!(body["job_interpretation"], "experienced surgeons in professional medical attire");
        assert_eq!(body["refined"], false);
        assert!(body["prompt"].as_str().unwrap().contains("Stelle: Oberarzt Chirurgie"));
    }
}
