//! Search, suggestion and trending commands

use log::{debug, warn};

use crate::catalog::is_searchable;
use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::error::Result;
use crate::models::{ProductDisplay, SuggestionDisplay};
use crate::output::{Formattable, json, pretty};

/// Run a full search and remember it in the local history
pub async fn search(opts: &GlobalOptions, query: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let query = query.trim();
    if query.is_empty() {
        return Err(crate::error::Error::Other(
            "search text must not be empty".to_string(),
        ));
    }

    let results = ctx.catalog.search(query, &ctx.config.language).await?;
    debug!("Search returned {} results", results.results.len());

    if let Err(e) = ctx.history.record(query) {
        warn!("Failed to record search history: {}", e);
    }

    match ctx.format {
        OutputFormat::Json => println!("{}", json::format_json(&results)?),
        OutputFormat::Table => {
            let rows: Vec<ProductDisplay> =
                results.results.iter().map(ProductDisplay::from).collect();
            rows.print(ctx.format)?;
        }
        OutputFormat::Pretty => println!("{}", pretty::search_results(query, &results)),
    }

    Ok(())
}

/// Type-ahead suggestions; short input lists recent and trending searches
pub async fn suggest(opts: &GlobalOptions, query: &str) -> Result<()> {
    let ctx = CommandContext::new(opts)?;

    let mut rows = Vec::new();
    if is_searchable(query) {
        let response = ctx
            .catalog
            .suggestions(query.trim(), &ctx.config.language)
            .await?;
        if let Some(info) = response.query_info.as_ref().filter(|i| i.was_corrected) {
            rows.push(SuggestionDisplay {
                text: info.corrected.clone(),
                source: "correction",
            });
        }
        rows.extend(SuggestionDisplay::from_strings(
            &response.suggestions,
            "suggestion",
        ));
    } else {
        let recent: Vec<String> = ctx
            .history
            .matching(query)
            .into_iter()
            .map(|e| e.query)
            .collect();
        rows.extend(SuggestionDisplay::from_strings(&recent, "history"));

        match ctx.catalog.popular_searches().await {
            Ok(trending) => rows.extend(SuggestionDisplay::from_strings(&trending, "trending")),
            Err(e) => warn!("Could not load trending searches: {}", e),
        }
    }

    rows.print(ctx.format)
}

/// Trending searches across all users
pub async fn trending(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let searches = ctx.catalog.popular_searches().await?;

    match ctx.format {
        OutputFormat::Pretty => println!("{}", pretty::titled_list("Trending searches", &searches)),
        format => SuggestionDisplay::from_strings(&searches, "trending").print(format)?,
    }
    Ok(())
}
