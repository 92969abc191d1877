//! Interactive search box driven by stdin
//!
//! Every line replaces the search box contents and goes through the same
//! debounced session a UI would use, so piping several lines in quick
//! succession produces a single suggestion lookup.

use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use log::{debug, warn};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::client::models::SearchResults;
use crate::error::{ApiError, Result};
use crate::models::ProductDisplay;
use crate::output::{Formattable, json, pretty};
use crate::search::{SearchObserver, SearchSession, SearchView};

/// Extra wait after the debounce delay before checking for in-flight work
const SETTLE: Duration = Duration::from_millis(50);
const POLL: Duration = Duration::from_millis(20);

/// One parsed input line
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Input(&'a str),
    Submit(&'a str),
    Accept,
    Dismiss,
    Quit,
}

fn parse_line(line: &str) -> ReplCommand<'_> {
    match line.trim() {
        ":accept" => ReplCommand::Accept,
        ":dismiss" => ReplCommand::Dismiss,
        ":quit" | ":q" => ReplCommand::Quit,
        trimmed => match trimmed.strip_prefix('!') {
            Some(text) => ReplCommand::Submit(text),
            None => ReplCommand::Input(line),
        },
    }
}

/// Prints session output to stdout as it arrives
struct PrintingObserver {
    format: OutputFormat,
}

impl PrintingObserver {
    fn emit<T: Serialize + ?Sized>(&self, event: &str, data: &T) {
        match json::format_event(event, data) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!("Failed to encode {} event: {}", event, e),
        }
    }
}

impl SearchObserver for PrintingObserver {
    fn view_changed(&self, view: &SearchView) {
        if self.format == OutputFormat::Json {
            self.emit("view", view);
            return;
        }

        let text = pretty::search_view(view);
        if !text.is_empty() {
            println!("{}", text);
        }
    }

    fn results_ready(&self, query: &str, results: &SearchResults) {
        match self.format {
            OutputFormat::Json => self.emit(
                "results",
                &serde_json::json!({ "query": query, "results": results }),
            ),
            OutputFormat::Table => {
                let rows: Vec<ProductDisplay> =
                    results.results.iter().map(ProductDisplay::from).collect();
                if let Err(e) = rows.print(self.format) {
                    warn!("Failed to print results: {}", e);
                }
            }
            OutputFormat::Pretty => println!("{}", pretty::search_results(query, results)),
        }
    }

    fn search_failed(&self, error: &ApiError) {
        if self.format == OutputFormat::Json {
            self.emit("error", &error.to_string());
        } else {
            eprintln!("{} {}", "!".yellow(), error);
        }
    }

    fn response_discarded(&self, sequence: u64) {
        debug!("Dropped stale response #{}", sequence);
    }
}

pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let observer = Arc::new(PrintingObserver { format: ctx.format });
    let session = SearchSession::new(
        ctx.catalog.clone(),
        ctx.history.clone(),
        observer,
        ctx.config.search_config(),
    );

    if let Err(e) = session.load_trending().await {
        warn!("Could not load trending searches: {}", e);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Accept => {
                if !session.accept_correction() {
                    eprintln!("No correction to accept");
                }
            }
            ReplCommand::Dismiss => session.dismiss_correction(),
            ReplCommand::Submit(text) => {
                session.on_submit(text);
            }
            ReplCommand::Input(text) => session.on_input_change(text),
        }
    }

    drain(&session, ctx.config.timeout()).await;
    let stats = session.stats();
    debug!(
        "Session issued {} requests, {} stale responses dropped",
        stats.issued, stats.discarded
    );
    session.close();
    Ok(())
}

/// Let a pending debounce fire and the latest request finish before exit
async fn drain(session: &SearchSession, limit: Duration) {
    tokio::time::sleep(session.config().debounce + SETTLE).await;

    let deadline = Instant::now() + limit;
    while session.in_flight().is_some() && Instant::now() < deadline {
        tokio::time::sleep(POLL).await;
    }
}
