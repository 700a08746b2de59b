use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use singlish_agents::ChatAgent;
use singlish_core::models::{ChatInput, ConversationContext, TrainingSample};
use singlish_core::ResponseComposer;
use singlish_ml::IntentEngine;
use singlish_observability::{init_tracing, AppMetrics};
use singlish_storage::Store;

#[derive(Debug, Parser)]
#[command(name = "singlish")]
#[command(about = "Singlish Chat CLI")]
struct Cli {
    #[arg(long, default_value = "models/intent_model.json")]
    model_path: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat loop
    Chat,
    /// Classify a single message
    Classify { text: String },
    /// Show the normalized form and extracted features of a message
    Normalize { text: String },
    /// Train the intent model from a JSONL dataset of {"text", "intent"} rows
    Train {
        #[arg(long)]
        dataset: PathBuf,
    },
    /// Show which model the intent engine is using
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("singlish_cli");
    let cli = Cli::parse();

    let agent = build_agent(&cli.model_path).await?;

    match cli.command {
        Command::Chat => run_chat(agent).await?,
        Command::Classify { text } => {
            let input = ChatInput {
                message: text,
                user_id: None,
                session_id: None,
                context: None,
            };
            let outcome = agent.handle_chat(input).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Normalize { text } => {
            let normalized = agent.normalize(&text);
            let language = agent.classify_language(&text);
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "canonical": normalized.canonical,
                    "features": normalized.features,
                    "language": language,
                }))?
            );
        }
        Command::Train { dataset } => {
            let samples = load_dataset(&dataset)?;
            let report = agent
                .train(&samples)
                .with_context(|| format!("training from {} failed", dataset.display()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&agent.model_status())?);
        }
    }

    Ok(())
}

async fn run_chat(agent: ChatAgent<Store>) -> Result<()> {
    let mut previous_intent: Option<String> = None;

    println!("Singlish chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let outcome = agent
            .handle_chat(ChatInput {
                message: message.to_string(),
                user_id: None,
                session_id: None,
                context: Some(ConversationContext {
                    previous_intent: previous_intent.clone(),
                    user_id: None,
                }),
            })
            .await?;

        previous_intent = Some(outcome.intent.clone());

        println!("\n{}", outcome.response);
        println!(
            "[{} @ {:.2}, {}]\n",
            outcome.intent,
            outcome.confidence,
            outcome.metadata.language.classification.as_code()
        );
    }

    Ok(())
}

fn load_dataset(path: &PathBuf) -> Result<Vec<TrainingSample>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading dataset {}", path.display()))?;

    let mut samples = Vec::new();
    for (index, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let sample: TrainingSample = serde_json::from_str(line)
            .with_context(|| format!("invalid sample on line {}", index + 1))?;
        samples.push(sample);
    }

    Ok(samples)
}

async fn build_agent(model_path: &PathBuf) -> Result<ChatAgent<Store>> {
    let metrics = AppMetrics::shared();

    let store = if let Ok(database_url) = env::var("SINGLISH_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    let engine = Arc::new(IntentEngine::load_or_bootstrap(Some(model_path.clone())));

    Ok(ChatAgent::new(
        engine,
        ResponseComposer::from_entropy(),
        Arc::new(store),
        metrics,
    ))
}
