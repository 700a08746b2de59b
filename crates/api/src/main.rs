use std::env;
use std::path::PathBuf;

use anyhow::Result;
use singlish_api::build_app;
use singlish_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("singlish_api");

    let model_path = PathBuf::from(
        env::var("SINGLISH_MODEL_PATH").unwrap_or_else(|_| "models/intent_model.json".to_string()),
    );
    let bind = env::var("SINGLISH_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = build_app(Some(model_path.clone())).await?;

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(bind = %bind, model_path = %model_path.display(), "singlish chat api started");

    axum::serve(listener, app).await?;
    Ok(())
}
