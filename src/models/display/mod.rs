//! Display model implementations for table and JSON output
//!
//! Display models turn storefront response types into CLI rows with
//! column names and serialization.

mod catalog;
mod common;
mod history;
mod product;

pub use catalog::CatalogItemDisplay;
pub use common::{format_price, truncate_string};
pub use history::{HistoryDisplay, SuggestionDisplay};
pub use product::ProductDisplay;
