//! Command execution context
//!
//! Loads configuration once and wires the transport, gateway, catalog and
//! history store every command needs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::catalog::Catalog;
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::HttpTransport;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::RequestGateway;
use crate::history::{FileStore, LocalHistoryStore};

/// File holding persisted local state, next to the config file
const STATE_FILE: &str = "state.json";

pub struct CommandContext {
    /// Loaded configuration with CLI overrides applied
    pub config: Config,
    pub catalog: Catalog,
    pub history: Arc<LocalHistoryStore>,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Build the full context, including the network stack
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;
        if let Some(url) = opts.api_url_ref() {
            config.api_url = url.to_string();
        }

        let mut cache = config.cache_config();
        if opts.no_cache {
            debug!("Response cache disabled");
            cache.max_entries = 0;
        }

        let transport = HttpTransport::with_options(
            config.api_url.clone(),
            config.search_url.clone(),
            config.timeout(),
            config.requests_per_second,
        )?;
        let gateway = RequestGateway::new(Arc::new(transport), cache);
        let catalog = Catalog::new(gateway).with_timeout(config.timeout());

        let history = Arc::new(open_history(opts.config_ref(), &config)?);
        debug!("Using storefront API at {}", config.api_url);

        Ok(Self {
            config,
            catalog,
            history,
            format: opts.format,
        })
    }
}

/// Location of the state file: beside an explicit config file, else in
/// ~/.shopsearch
pub fn state_path(config_path: Option<&str>) -> Result<PathBuf> {
    let dir = match config_path.map(Path::new).and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => Config::home_dir()?,
    };
    Ok(dir.join(STATE_FILE))
}

/// History store for commands that never touch the network
pub fn open_history(config_path: Option<&str>, config: &Config) -> Result<LocalHistoryStore> {
    let store = FileStore::open(state_path(config_path)?);
    debug!("Using local state at {}", store.path().display());
    Ok(LocalHistoryStore::new(
        Arc::new(store),
        config.search.history_limit,
    ))
}
