//! Local search history commands

use colored::Colorize;

use crate::cli::context::open_history;
use crate::cli::{GlobalOptions, HistoryCommands};
use crate::config::Config;
use crate::error::Result;
use crate::models::HistoryDisplay;
use crate::output::Formattable;

pub fn run(opts: &GlobalOptions, command: HistoryCommands) -> Result<()> {
    let config = Config::load_at(opts.config_ref())?;
    let history = open_history(opts.config_ref(), &config)?;

    match command {
        HistoryCommands::List => HistoryDisplay::rows(history.list()).print(opts.format),
        HistoryCommands::Clear => {
            history.clear()?;
            println!("{} Search history cleared", "✓".green());
            Ok(())
        }
    }
}
