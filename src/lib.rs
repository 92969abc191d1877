//! shopsearch - storefront client with a TTL response cache, in-flight
//! request dedup, and debounced, race-safe search sessions

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gateway;
pub mod history;
pub mod models;
pub mod output;
pub mod search;

pub use catalog::{Catalog, ProductQuery};
pub use error::{ApiError, Error, Result};
pub use gateway::{FetchOptions, RequestGateway};
pub use history::LocalHistoryStore;
pub use search::{SearchConfig, SearchObserver, SearchSession};
