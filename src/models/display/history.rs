//! History and suggestion display models

use serde::Serialize;
use tabled::Tabled;

use crate::history::HistoryEntry;

#[derive(Debug, Clone, Tabled, Serialize)]
pub struct HistoryDisplay {
    #[tabled(rename = "#")]
    pub position: usize,

    #[tabled(rename = "QUERY")]
    pub query: String,

    #[tabled(rename = "SEARCHED AT")]
    pub searched_at: String,
}

impl HistoryDisplay {
    /// Number entries from 1, newest first
    pub fn rows(entries: Vec<HistoryEntry>) -> Vec<Self> {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Self {
                position: i + 1,
                query: entry.query,
                searched_at: entry.timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            })
            .collect()
    }
}

/// One suggested or trending query
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SuggestionDisplay {
    #[tabled(rename = "SUGGESTION")]
    pub text: String,

    /// Where the entry came from: suggestion, history or trending
    #[tabled(rename = "SOURCE")]
    pub source: &'static str,
}

impl SuggestionDisplay {
    pub fn from_strings(texts: &[String], source: &'static str) -> Vec<Self> {
        texts
            .iter()
            .map(|text| Self {
                text: text.clone(),
                source,
            })
            .collect()
    }
}
