//! Prints the models the configured Gemini key can see.

use anyhow::Context;
use art_flow_lib::{init_tracing, DEFAULT_DESCRIPTION_MODEL, DEFAULT_GEMINI_ENDPOINT};
use llmapi::gemini::list_models;
use llmapi::LLMClient;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let api_key = std::env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
        .context("GEMINI_API_KEY is not set in environment variables.")?;
    let endpoint =
        std::env::var("GEMINI_ENDPOINT").unwrap_or_else(|_| DEFAULT_GEMINI_ENDPOINT.to_string());

    let client = LLMClient::new(api_key.trim(), endpoint, DEFAULT_DESCRIPTION_MODEL);
    let models = list_models(&client).await?;
    info!(count = models.len(), "fetched available models");

    for model in models {
        let name = model.name.strip_prefix("models/").unwrap_or(&model.name);
        println!(
            "- {} ({}): {}",
            name,
            model.display_name.as_deref().unwrap_or("-"),
            model.supported_generation_methods.join(", ")
        );
    }
    Ok(())
}
