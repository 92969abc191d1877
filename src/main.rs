//! shopsearch CLI - storefront search with cached, de-duplicated requests

use clap::Parser;

use shopsearch::cli::{self, Cli, Commands, GlobalOptions};
use shopsearch::error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

/// `--debug` forces debug level; otherwise RUST_LOG, defaulting to warn
fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Search { query } => cli::search::search(&opts, &query).await,
        Commands::Suggest { query } => cli::search::suggest(&opts, &query).await,
        Commands::Products {
            category,
            brand,
            search,
            page,
        } => {
            let args = cli::catalog::ProductArgs {
                category,
                brand,
                search,
                page,
            };
            cli::catalog::products(&opts, &args).await
        }
        Commands::Catalog(which) => cli::catalog::catalog(&opts, which).await,
        Commands::Trending => cli::search::trending(&opts).await,
        Commands::History(command) => cli::history::run(&opts, command),
        Commands::Repl => cli::repl::run(&opts).await,
        Commands::Version => {
            println!("shopsearch version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
