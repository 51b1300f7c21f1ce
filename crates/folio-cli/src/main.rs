mod commands;
mod config;
mod render;

use anyhow::anyhow;
use folio::{
    ChatBackend, HttpChatBackend, HttpPersistenceClientBuilder, LoadSource, PersistenceClient,
    SessionEngine, SessionHandle, SessionUpdate,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::{ReplCommand, HELP};
use config::Config;
use render::{format_threads, Output, Renderer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    init_logging(&config);

    let document_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.session.document_id.clone());
    tracing::info!("Opening document {} via {}", document_id, config.api.base_url);

    let backend: Arc<dyn ChatBackend> = Arc::new(HttpChatBackend::new(&config.api.base_url)?);
    let persistence: Arc<dyn PersistenceClient> = Arc::new(
        HttpPersistenceClientBuilder::new()
            .base_url(&config.api.base_url)
            .timeout(config.request_timeout())
            .build()?,
    );

    let engine = SessionEngine::new(backend, persistence, config.session_config());
    let (session, updates) = engine.spawn(document_id.as_str());
    let printer = tokio::spawn(print_updates(updates));

    println!("folio: chatting with document {} (/help for commands)", document_id);
    match session.start_session().await {
        Ok(threads) => println!("{}", format_threads(&threads, None)),
        Err(e) => println!("! could not load threads: {}", e),
    }

    run_repl(&session).await?;

    drop(session);
    printer.abort();
    Ok(())
}

async fn run_repl(session: &SessionHandle) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match commands::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("! {}", e);
                continue;
            }
        };
        if command == ReplCommand::Quit {
            break;
        }
        if let Err(e) = execute(session, command).await {
            println!("! {}", e);
        }
    }

    Ok(())
}

async fn execute(session: &SessionHandle, command: ReplCommand) -> anyhow::Result<()> {
    match command {
        ReplCommand::Send(text) => {
            session.send_message(text).await?;
        }
        ReplCommand::New => {
            session.new_thread().await?;
        }
        ReplCommand::Threads => {
            let threads = session.refresh_threads().await?;
            let snapshot = session.snapshot().await?;
            println!("{}", format_threads(&threads, snapshot.active.as_ref()));
        }
        ReplCommand::Switch(thread) => {
            let outcome = session.switch_thread(thread).await?;
            if outcome.source == LoadSource::AlreadyActive {
                println!("(already on {})", outcome.thread);
            }
        }
        ReplCommand::Delete(thread) => {
            session.delete_thread(thread).await?;
        }
        ReplCommand::Rename { thread_id, title } => {
            let thread = session.rename_thread(thread_id, title).await?;
            println!("(renamed {} to {})", thread.id, thread.display_title());
        }
        ReplCommand::Pin { page, text } => {
            session.add_pin(text, page).await?;
        }
        ReplCommand::Unpin(n) => {
            let pins = session.snapshot().await?.pins;
            let pin = pins
                .get(n - 1)
                .ok_or_else(|| anyhow!("no pin #{} ({} pinned)", n, pins.len()))?;
            session.remove_pin(pin.id).await?;
        }
        ReplCommand::Pins => {
            let pins = session.snapshot().await?.pins;
            if pins.is_empty() {
                println!("(no pinned excerpts)");
            }
            for (i, pin) in pins.iter().enumerate() {
                println!("{}. p.{}  \"{}\"", i + 1, pin.page, pin.text);
            }
        }
        ReplCommand::Page(page) => {
            session.set_page_context(page).await?;
        }
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => {}
    }
    Ok(())
}

async fn print_updates(mut updates: mpsc::UnboundedReceiver<SessionUpdate>) {
    let mut renderer = Renderer::new();
    while let Some(update) = updates.recv().await {
        match renderer.render(&update) {
            Some(Output::Inline(text)) => {
                print!("{}", text);
                std::io::stdout().flush().ok();
            }
            Some(Output::Line(text)) => println!("{}", text),
            None => {}
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so they never interleave with the conversation
    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
