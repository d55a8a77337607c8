use std::sync::Arc;

use askbot_answer::{ChatCompletionsClient, ChatCompletionsConfig};

use askbot_core::{
    config::{self, Config},
    registry::UserRegistry,
};

#[tokio::main]
async fn main() -> Result<(), askbot_core::Error> {
    // Apply `.env` before logging so `RUST_LOG` from the file takes effect.
    let dotenv_problem = config::load_dotenv();
    askbot_core::logging::init("askbot")?;
    if let Some(e) = dotenv_problem {
        tracing::warn!(error = %e, "ignoring unreadable .env file");
    }

    let cfg = Arc::new(Config::load()?);

    let answers = Arc::new(ChatCompletionsClient::new(ChatCompletionsConfig::from(
        cfg.as_ref(),
    ))?);
    let registry = Arc::new(UserRegistry::open(cfg.registry_file.clone()));

    askbot_telegram::router::run_polling(cfg, registry, answers)
        .await
        .map_err(|e| askbot_core::Error::Messaging(format!("telegram bot failed: {e}")))?;

    Ok(())
}
