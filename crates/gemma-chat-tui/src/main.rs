use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use gemma_chat_core::{transcript, ChatClient, Config};
use tracing::{info, warn};

mod app;
mod handler;
mod logging;
mod markup;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "gemma-chat")]
#[command(about = "Terminal chat client for a Gemma chat endpoint")]
#[command(version)]
struct Cli {
    /// Chat endpoint URL (overrides GEMMA_CHAT_ENDPOINT and the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Write the conversation as an HTML page to this path on exit
    #[arg(short, long)]
    transcript: Option<PathBuf>,

    /// Log file (defaults to the platform data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Check that the server is reachable and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.clone().or_else(logging::default_log_path) {
        if let Err(e) = logging::init(&path) {
            eprintln!("Warning: logging disabled: {e:#}");
        }
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load config, using defaults");
        Config::new()
    });
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref());
    let client = ChatClient::new(&endpoint);

    if cli.check {
        return Ok(check_server(&client).await);
    }

    info!(%endpoint, "starting gemma-chat");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, client).await;
    tui::restore()?;
    let app = result?;

    if let Some(path) = cli.transcript {
        transcript::write_html(app.session.conversation(), &path)
            .with_context(|| format!("writing transcript to {}", path.display()))?;
        info!(path = %path.display(), messages = app.session.conversation().len(), "transcript written");
        println!("Transcript saved to {}", path.display());
    }

    Ok(ExitCode::SUCCESS)
}

async fn run(terminal: &mut Tui, client: ChatClient) -> Result<App> {
    let mut app = App::new(client);
    app.start_ping();

    let mut events = EventHandler::new();
    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(&mut app, event).await?,
            None => break,
        }
    }

    Ok(app)
}

async fn check_server(client: &ChatClient) -> ExitCode {
    if client.ping().await {
        println!("Server for {} is reachable", client.endpoint());
        ExitCode::SUCCESS
    } else {
        eprintln!("Server for {} is not reachable", client.endpoint());
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "gemma-chat",
            "--endpoint",
            "http://localhost:8080/chat",
            "--transcript",
            "out.html",
            "--check",
        ]);
        assert_eq!(cli.endpoint.as_deref(), Some("http://localhost:8080/chat"));
        assert_eq!(cli.transcript, Some(PathBuf::from("out.html")));
        assert!(cli.check);
        assert!(cli.log_file.is_none());
    }
}
