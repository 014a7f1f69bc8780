//! commonlib CLI application
//!
//! Command-line front end for the grid spacing calculator, the HTTP client,
//! the image loader and the cache directory helpers.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

// Import CLI modules through the library (module is public but not re-exported)
use commonlib::cli::{
    handle_config, handle_dirs, handle_fetch, handle_grid, handle_image, Cli, Commands,
};
use commonlib::config::AppConfig;
use commonlib::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    let config = AppConfig::load(cli.global.config.clone()).await?;

    init_logging(&cli, &config);

    info!("commonlib v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Grid(args) => {
            info!("Executing grid command");
            handle_grid(args).await
        }
        Commands::Fetch(args) => {
            info!("Executing fetch command");
            handle_fetch(args, &config).await
        }
        Commands::Image(args) => {
            info!("Executing image command");
            handle_image(args, &config).await
        }
        Commands::Dirs(args) => {
            info!("Executing dirs command");
            handle_dirs(args, &config).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, &config).await
        }
    }
}

/// Initialize logging based on CLI verbosity, the debug flag and the
/// configured level
///
/// Debug mode with no explicit verbosity logs at debug level, so the HTTP
/// interceptor output is visible.
fn init_logging(cli: &Cli, config: &AppConfig) {
    let explicit = cli.global.quiet || cli.global.verbose || cli.global.very_verbose;
    let log_level = if explicit {
        cli.log_level()
    } else if config.debug.enabled {
        tracing::Level::DEBUG
    } else {
        config
            .logging
            .level
            .parse::<tracing::Level>()
            .unwrap_or_else(|_| cli.log_level())
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("commonlib={}", log_level).parse() {
        filter = filter.add_directive(directive);
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(config.logging.colored_output)
        .with_level(cli.global.very_verbose || config.debug.enabled)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
