use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use tablesearch::api::{AppState, create_router};
use tablesearch::config::CONFIG;
use tablesearch::form::{SearchForm, SubmitEvent, form_channel};
use tablesearch::page::ConsolePage;
use tablesearch::{Escaping, HttpBackend, ResultRenderer, SearchBackend, SubmissionHandler, SubmitOutcome};

#[derive(Parser)]
#[command(name = "tablesearch", about = "Search a tabular dataset and render the matches as HTML")]
struct Cli {
    /// Base URL of the search backend (defaults to SEARCH_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Route of the search endpoint (defaults to SEARCH_PATH)
    #[arg(long, global = true)]
    path: Option<String>,

    /// Entity-encode server-supplied text in the rendered markup
    #[arg(long, global = true)]
    escape_html: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one search and print the rendered results
    Query { text: String },
    /// Read queries from stdin, one per line
    Repl,
    /// Host the search page over HTTP
    Serve {
        /// Listen address (defaults to UI_BIND)
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Also picks up `log` records from the library
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let backend = HttpBackend::new(
        cli.endpoint.as_deref().unwrap_or(&CONFIG.search_endpoint),
        cli.path.as_deref().unwrap_or(&CONFIG.search_path),
        CONFIG.timeout,
    )?;
    let renderer = ResultRenderer::new(if cli.escape_html {
        Escaping::Html
    } else {
        CONFIG.escaping
    });
    tracing::info!(url = %backend.url(), escaping = ?renderer.escaping(), "search backend configured");

    match cli.command {
        Command::Query { text } => {
            let handler = SubmissionHandler::new(Arc::new(backend), Arc::new(ConsolePage), renderer);
            let outcome = handler.submit(&text).await;
            Ok(match outcome {
                SubmitOutcome::Rendered { .. } => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            })
        }
        Command::Repl => {
            let handler = Arc::new(SubmissionHandler::new(
                Arc::new(backend),
                Arc::new(ConsolePage),
                renderer,
            ));
            let (tx, rx) = form_channel(16);
            let mut form = SearchForm::attach(rx, handler);

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                tx.send(SubmitEvent::new(line)).await?;
                // one query at a time at the terminal
                form.next_outcome().await;
            }
            form.dispose();
            Ok(ExitCode::SUCCESS)
        }
        Command::Serve { bind } => {
            let bind = match bind {
                Some(bind) => bind,
                None => CONFIG.ui_bind.parse()?,
            };
            let backend: Arc<dyn SearchBackend> = Arc::new(backend);
            let app = create_router(AppState { backend, renderer });

            tracing::info!("search page listening on {}", bind);
            let listener = tokio::net::TcpListener::bind(bind).await?;
            axum::serve(listener, app).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
