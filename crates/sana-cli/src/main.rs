use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use sana_client::{Conversation, HttpApi, Role};
use sana_gateway::{AppState, ChatService, StaticTokens};
use sana_store::Store;
use tracing_subscriber::EnvFilter;

const DEFAULT_BIND: &str = "127.0.0.1:8001";
const DEFAULT_DB: &str = "sana.db";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_URL: &str = "http://127.0.0.1:8001";

#[derive(Parser)]
#[command(name = "sana")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the gateway HTTP server.
    Serve,
    /// Chat against a running gateway from the terminal.
    Chat {
        /// Resume an existing session instead of starting a new one.
        #[arg(long)]
        session: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Serve => serve().await,
        Command::Chat { session } => chat(session).await,
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let bind = env_or("SANA_BIND", DEFAULT_BIND);
    let db_path = env_or("SANA_DB", DEFAULT_DB);
    let model_id = env_or("SANA_MODEL", DEFAULT_MODEL);

    let tokens = StaticTokens::parse(&std::env::var("SANA_TOKENS").unwrap_or_default());
    if tokens.is_empty() {
        return Err("SANA_TOKENS must list at least one token=user pair".into());
    }

    let store = Arc::new(Mutex::new(Store::open(&db_path)?));
    let model = sana_model_gemini::from_env().model(&model_id);

    let state = AppState {
        service: Arc::new(ChatService::new(store, model)),
        verifier: Arc::new(tokens),
    };

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, db = %db_path, model = %model_id, "gateway listening");

    axum::serve(listener, sana_gateway::router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

async fn chat(session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let url = env_or("SANA_URL", DEFAULT_URL);
    let token =
        std::env::var("SANA_TOKEN").map_err(|_| "SANA_TOKEN must hold your access token")?;

    let api = Arc::new(HttpApi::new(url, token));
    let conversation = match session {
        Some(session_id) => Conversation::resume(api, session_id).await?,
        None => Conversation::new(api),
    };

    println!("session {}  (ctrl-d to quit)", conversation.session_id());
    for turn in conversation.turns() {
        print_turn(&turn);
    }

    loop {
        let Some(line) = prompt_line("you> ")? else {
            break;
        };

        let Some(handle) = conversation.send_user_turn(&line) else {
            continue;
        };
        handle.await?;

        if let Some(turn) = conversation.turns().last()
            && turn.role == Role::Assistant
        {
            print_turn(turn);
        }
    }

    Ok(())
}

fn print_turn(turn: &sana_client::DisplayTurn) {
    match turn.role {
        Role::User => println!("you> {}", turn.content),
        Role::Assistant => println!("sana> {}\n", turn.content),
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read one trimmed line from stdin. `None` on EOF.
fn prompt_line(prompt: &str) -> Result<Option<String>, io::Error> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
