mod config;
mod creative;
mod errors;
mod image_client;
mod llm_client;
mod motiv;
mod pipeline;
mod routes;
mod state;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::creative::generator::CreativeGenerator;
use crate::creative::styled::StyledImageGenerator;
use crate::image_client::OpenAiImageClient;
use crate::llm_client::LlmClient;
use crate::motiv::scenario::ScenarioMotivGenerator;
use crate::motiv::texts::CreativeTextGenerator;
use crate::pipeline::catalog::LayoutCatalog;
use crate::pipeline::MultiPromptPipeline;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::QualityWorkflow;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Creative API v{}", env!("CARGO_PKG_VERSION"));

    let catalog = Arc::new(LayoutCatalog::load(config.layouts_path.as_deref()));

    let llm = LlmClient::new(config.openai_api_key.clone())?;
    if llm.has_api_key() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
    } else {
        warn!("OPENAI_API_KEY not set; prompt optimization and image generation are disabled");
    }
    let llm = Arc::new(llm);
    let images = Arc::new(OpenAiImageClient::new(config.openai_api_key.clone())?);

    tokio::fs::create_dir_all(&config.output_dir).await?;
    info!("Writing outputs to {}", config.output_dir.display());

    let pipeline = MultiPromptPipeline::new(catalog, config.output_dir.clone());
    let state = AppState {
        workflow: QualityWorkflow::new(pipeline.clone(), llm.clone()),
        texts: CreativeTextGenerator::new(llm.clone()),
        scenarios: ScenarioMotivGenerator::new(llm.clone()),
        creatives: CreativeGenerator::new(images.clone(), llm, &config.output_dir),
        styled: StyledImageGenerator::new(images, config.styled_image_model.clone()),
        pipeline,
        config: Arc::new(config.clone()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
