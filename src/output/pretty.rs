//! Human-oriented rendering of search output

use colored::Colorize;

use super::table::format_table;
use crate::client::models::SearchResults;
use crate::models::ProductDisplay;
use crate::search::{SearchView, SuggestionCorrection};

fn correction_line(correction: &SuggestionCorrection) -> String {
    format!(
        "Did you mean {}? (searched for {})",
        correction.corrected.bold(),
        correction.original
    )
    .yellow()
    .to_string()
}

/// Search results with heading, correction notice and product table
pub fn search_results(query: &str, results: &SearchResults) -> String {
    let mut out = vec![format!("Results for \"{}\"", query).bold().to_string()];

    if let Some(info) = results.query_info.as_ref().filter(|i| i.was_corrected) {
        out.push(correction_line(&SuggestionCorrection {
            original: info.original.clone(),
            corrected: info.corrected.clone(),
        }));
    }

    let rows: Vec<ProductDisplay> = results.results.iter().map(ProductDisplay::from).collect();
    out.push(format_table(&rows));

    if !results.suggestions.is_empty() {
        out.push(format!("Related: {}", results.suggestions.join(", ")).dimmed().to_string());
    }

    let mut footer = format!("{} results", results.total_results.max(results.results.len()));
    if let Some(ms) = results.processing_time {
        footer.push_str(&format!(" in {:.0} ms", ms));
    }
    out.push(footer.dimmed().to_string());

    out.join("\n")
}

/// Suggestion dropdown, or recent and trending searches for short input
pub fn search_view(view: &SearchView) -> String {
    let mut out = Vec::new();

    if let Some(correction) = &view.correction {
        out.push(correction_line(correction));
    }

    if !view.suggestions.is_empty() {
        out.extend(view.suggestions.iter().map(|s| format!("  {} {}", "›".cyan(), s)));
    }

    if !view.history.is_empty() {
        out.push("Recent searches".bold().to_string());
        out.extend(view.history.iter().map(|e| format!("  {}", e.query)));
    }

    if !view.trending.is_empty() {
        out.push("Trending".bold().to_string());
        out.extend(view.trending.iter().map(|t| format!("  {} {}", "↑".green(), t)));
    }

    if let Some(intent) = &view.intent {
        out.push(format!("intent: {}", intent).dimmed().to_string());
    }

    out.join("\n")
}

/// Numbered list with a bold heading
pub fn titled_list(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return format!("{}\n  (none)", title.bold());
    }

    let mut out = vec![title.bold().to_string()];
    out.extend(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("  {:>2}. {}", i + 1, item)),
    );
    out.join("\n")
}
