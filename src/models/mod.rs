//! Display models for CLI output

pub mod display;

pub use display::{CatalogItemDisplay, HistoryDisplay, ProductDisplay, SuggestionDisplay};
