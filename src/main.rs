mod audience;
mod console;
mod guardrail;
mod llm;
mod orchestrator;
mod prompts;
mod roles;
#[cfg(test)]
mod testing;
mod tools;

use crate::audience::Audience;
use crate::console::Console;
use crate::llm::{build_backend, BackendConfig, ChatBackend};
use crate::orchestrator::Orchestrator;
use crate::roles::{Director, Moderator, Victim};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so the conversation stays readable on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scamsim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BackendConfig::from_env();
    let victim_backend = build_backend(&config, config.model_victim.as_deref());
    let moderator_backend = build_backend(&config, config.model_moderator.as_deref());
    tracing::info!(
        victim = victim_backend.backend_id(),
        moderator = moderator_backend.backend_id(),
        "backends ready"
    );

    let mut orchestrator = Orchestrator::new(
        Director,
        Victim::new(victim_backend),
        Audience::new(Moderator::new(moderator_backend)),
    );

    let mut console = Console::stdio();
    console.print_banner();
    orchestrator.run(&mut console).await;
}
